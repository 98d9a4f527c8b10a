//! RETURN 子句规划器
//!
//! RETURN 的规划链：存在聚合时先交给聚合规划器，否则生成投影节点；
//! DISTINCT 在投影之上紧跟一个去重节点，继承投影的列名与输入变量；
//! 随后依次接入 ORDER BY 与分页片段。skip 为 0 且 limit 为最大值的
//! 分页是显式空操作，整条分页链路直接省略。

use crate::context::clause::{ClauseContext, CypherClauseKind, ReturnClauseContext};
use crate::context::QueryContext;
use crate::planner::connector::SegmentsConnector;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{PlanNodeKind, Project};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;
use crate::planner::statements::clauses::group_clause_planner::GroupClausePlanner;
use crate::planner::statements::clauses::order_by_planner::OrderByClausePlanner;
use crate::planner::statements::clauses::pagination_planner::PaginationPlanner;

/// RETURN 子句规划器
#[derive(Debug, Default)]
pub struct ReturnClausePlanner;

impl ReturnClausePlanner {
    pub fn new() -> Self {
        Self
    }

    fn build_return(
        &self,
        qctx: &mut QueryContext,
        rctx: &ReturnClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        // 列命名：有别名取别名，无别名取表达式文本
        let col_names: Vec<String> = rctx
            .yield_columns
            .iter()
            .map(|col| col.col_name())
            .collect();

        let mut subplan = if let Some(group) = &rctx.group {
            GroupClausePlanner::new()
                .transform(qctx, &ClauseContext::Group(group.clone()))?
        } else {
            if rctx.yield_columns.is_empty() {
                return Err(PlannerError::PlanGenerationFailed(
                    "RETURN 子句缺少输出列".to_string(),
                ));
            }
            let project = qctx.make_node(
                PlanNodeKind::Project(Project {
                    columns: rctx.yield_columns.clone(),
                }),
                vec![],
            );
            qctx.set_col_names(project, col_names);
            SubPlan::single(project)
        };

        if rctx.distinct {
            let dedup = qctx.make_node(PlanNodeKind::Dedup, vec![subplan.root]);
            // 去重继承投影的列名与输入变量，make_node 已按首依赖填好
            subplan.root = dedup;
        }

        if let Some(order) = &rctx.order_by {
            let order_plan = OrderByClausePlanner::new()
                .transform(qctx, &ClauseContext::OrderBy(order.clone()))?;
            subplan = SegmentsConnector::add_input(qctx, &order_plan, &subplan, true)?;
        }

        if let Some(pagination) = &rctx.pagination {
            if !pagination.is_noop() {
                let pagination_plan = PaginationPlanner::new()
                    .transform(qctx, &ClauseContext::Pagination(pagination.clone()))?;
                subplan =
                    SegmentsConnector::add_input(qctx, &pagination_plan, &subplan, true)?;
            }
        }

        log::debug!(
            "return root: {} colNames: {}",
            qctx.node(subplan.root).output_var,
            qctx.node(subplan.root).col_names.join(",")
        );

        Ok(subplan)
    }
}

impl ClausePlanner for ReturnClausePlanner {
    fn name(&self) -> &'static str {
        "ReturnClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::Return
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let rctx = match clause_ctx {
            ClauseContext::Return(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };
        self.build_return(qctx, rctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::clause::{
        OrderByClauseContext, PaginationContext, YieldColumn,
    };
    use crate::core::{Expression, OrderDirection};

    fn return_ctx(distinct: bool) -> ReturnClauseContext {
        ReturnClauseContext {
            yield_columns: vec![YieldColumn::new(Expression::variable("a"), None)],
            distinct,
            group: None,
            order_by: None,
            pagination: None,
        }
    }

    fn plan(qctx: &mut QueryContext, rctx: ReturnClauseContext) -> SubPlan {
        ReturnClausePlanner::new()
            .transform(qctx, &ClauseContext::Return(rctx))
            .expect("规划应成功")
    }

    #[test]
    fn test_plain_return_is_single_project() {
        let mut qctx = QueryContext::new();
        let subplan = plan(&mut qctx, return_ctx(false));
        assert_eq!(subplan.root, subplan.tail);
        assert_eq!(qctx.node(subplan.root).name(), "Project");
        assert_eq!(qctx.node(subplan.root).col_names, vec!["a".to_string()]);
    }

    #[test]
    fn test_distinct_adds_dedup_above_project() {
        let mut qctx = QueryContext::new();
        let subplan = plan(&mut qctx, return_ctx(true));

        let root = qctx.node(subplan.root);
        assert_eq!(root.name(), "Dedup");
        assert_eq!(root.dependencies.len(), 1);

        let project = qctx.node(root.dependencies[0]);
        assert_eq!(project.name(), "Project");
        assert_eq!(root.col_names, project.col_names);
        assert_eq!(root.input_var.as_deref(), Some(project.output_var.as_str()));
    }

    #[test]
    fn test_noop_pagination_elided() {
        let mut qctx = QueryContext::new();
        let mut rctx = return_ctx(false);
        rctx.pagination = Some(PaginationContext::default());
        let subplan = plan(&mut qctx, rctx);
        assert_eq!(qctx.node(subplan.root).name(), "Project");
    }

    #[test]
    fn test_effective_pagination_appends_limit() {
        let mut qctx = QueryContext::new();
        let mut rctx = return_ctx(false);
        rctx.pagination = Some(PaginationContext { skip: 10, limit: 5 });
        let subplan = plan(&mut qctx, rctx);

        let root = qctx.node(subplan.root);
        assert_eq!(root.name(), "Limit");
        assert_eq!(root.dependencies.len(), 1);
        assert_eq!(qctx.node(root.dependencies[0]).name(), "Project");
    }

    #[test]
    fn test_order_then_pagination_chain() {
        let mut qctx = QueryContext::new();
        let mut rctx = return_ctx(false);
        rctx.order_by = Some(OrderByClauseContext {
            indexed_order_factors: vec![(0, OrderDirection::Asc)],
        });
        rctx.pagination = Some(PaginationContext { skip: 0, limit: 10 });
        let subplan = plan(&mut qctx, rctx);

        let limit = qctx.node(subplan.root);
        assert_eq!(limit.name(), "Limit");
        let sort = qctx.node(limit.dependencies[0]);
        assert_eq!(sort.name(), "Sort");
        let project = qctx.node(sort.dependencies[0]);
        assert_eq!(project.name(), "Project");
        assert_eq!(subplan.tail, project.id);
        // 排序与分页继承投影列名
        assert_eq!(sort.col_names, project.col_names);
        assert_eq!(limit.col_names, project.col_names);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut qctx = QueryContext::new();
        let err = ReturnClausePlanner::new()
            .transform(&mut qctx, &ClauseContext::Where(Default::default()))
            .expect_err("类别不符应报错");
        assert!(matches!(err, PlannerError::ContextKindMismatch { .. }));
    }
}
