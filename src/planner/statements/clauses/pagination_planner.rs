//! LIMIT/SKIP 子句规划器
//!
//! 负责规划 LIMIT 和 SKIP 子句的执行，实现结果分页。
//! skip 为 0 且 limit 为最大值的空操作分页由调用方整体省略，
//! 不会进入本规划器。

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{Limit, PlanNodeKind};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// LIMIT/SKIP 子句规划器
#[derive(Debug, Default)]
pub struct PaginationPlanner;

impl PaginationPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ClausePlanner for PaginationPlanner {
    fn name(&self) -> &'static str {
        "PaginationPlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::Pagination
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let pagination = match clause_ctx {
            ClauseContext::Pagination(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        let limit = qctx.make_node(
            PlanNodeKind::Limit(Limit {
                skip: pagination.skip,
                count: pagination.limit,
            }),
            vec![],
        );
        Ok(SubPlan::single(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::clause::PaginationContext;

    #[test]
    fn test_pagination_planner_creation() {
        let planner = PaginationPlanner::new();
        assert_eq!(planner.clause_kind(), CypherClauseKind::Pagination);
    }

    #[test]
    fn test_transform_builds_limit_node() {
        let planner = PaginationPlanner::new();
        let mut qctx = QueryContext::new();
        let ctx = ClauseContext::Pagination(PaginationContext { skip: 10, limit: 5 });
        let plan = planner.transform(&mut qctx, &ctx).expect("规划应成功");
        assert_eq!(plan.root, plan.tail);
        match &qctx.node(plan.root).kind {
            PlanNodeKind::Limit(limit) => {
                assert_eq!(limit.skip, 10);
                assert_eq!(limit.count, 5);
            }
            other => panic!("期望 Limit 节点，得到 {:?}", other),
        }
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let planner = PaginationPlanner::new();
        let mut qctx = QueryContext::new();
        let ctx = ClauseContext::Where(Default::default());
        let err = planner
            .transform(&mut qctx, &ctx)
            .expect_err("类别不符应报错");
        assert!(matches!(err, PlannerError::ContextKindMismatch { .. }));
    }
}
