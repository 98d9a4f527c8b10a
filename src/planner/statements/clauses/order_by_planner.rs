//! ORDER BY 子句规划器
//!
//! 负责规划 ORDER BY 子句的执行，对结果进行排序。
//! 产出的排序片段不带输入，由调用方经 SegmentsConnector 接入上游，
//! 列名在接入时继承上游输出。

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{PlanNodeKind, Sort};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// ORDER BY 子句规划器
#[derive(Debug, Default)]
pub struct OrderByClausePlanner;

impl OrderByClausePlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ClausePlanner for OrderByClausePlanner {
    fn name(&self) -> &'static str {
        "OrderByClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::OrderBy
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let order_ctx = match clause_ctx {
            ClauseContext::OrderBy(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        if order_ctx.indexed_order_factors.is_empty() {
            return Err(PlannerError::PlanGenerationFailed(
                "ORDER BY 子句缺少排序因子".to_string(),
            ));
        }

        let sort = qctx.make_node(
            PlanNodeKind::Sort(Sort {
                factors: order_ctx.indexed_order_factors.clone(),
            }),
            vec![],
        );
        Ok(SubPlan::single(sort))
    }
}
