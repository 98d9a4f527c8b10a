//! WITH 子句规划器
//!
//! WITH 子句是数据流的转换点：
//! 1. 投影：选择并可能重命名输出列
//! 2. 过滤：通过 WHERE 子句过滤结果
//! 3. 排序：通过 ORDER BY 对结果排序
//! 4. 分页：通过 SKIP/LIMIT 限制结果数量
//! 5. 去重：DISTINCT 收尾
//!
//! 片段内部各节点直接串联，片段的 tail 是投影节点，由调用方接入上游。

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{Filter, Limit, PlanNodeKind, Project, Sort};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// WITH 子句规划器
#[derive(Debug, Default)]
pub struct WithClausePlanner;

impl WithClausePlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ClausePlanner for WithClausePlanner {
    fn name(&self) -> &'static str {
        "WithClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::With
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let wctx = match clause_ctx {
            ClauseContext::With(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        if wctx.yield_columns.is_empty() {
            return Err(PlannerError::PlanGenerationFailed(
                "WITH 子句缺少输出列".to_string(),
            ));
        }

        let col_names: Vec<String> = wctx
            .yield_columns
            .iter()
            .map(|col| col.col_name())
            .collect();
        let project = qctx.make_node(
            PlanNodeKind::Project(Project {
                columns: wctx.yield_columns.clone(),
            }),
            vec![],
        );
        qctx.set_col_names(project, col_names);
        let mut subplan = SubPlan::single(project);

        if let Some(condition) = &wctx.where_clause {
            let filter = qctx.make_node(
                PlanNodeKind::Filter(Filter {
                    condition: condition.clone(),
                }),
                vec![subplan.root],
            );
            subplan.root = filter;
        }

        if let Some(order) = &wctx.order_by {
            let sort = qctx.make_node(
                PlanNodeKind::Sort(Sort {
                    factors: order.indexed_order_factors.clone(),
                }),
                vec![subplan.root],
            );
            subplan.root = sort;
        }

        if let Some(pagination) = &wctx.pagination {
            if !pagination.is_noop() {
                let limit = qctx.make_node(
                    PlanNodeKind::Limit(Limit {
                        skip: pagination.skip,
                        count: pagination.limit,
                    }),
                    vec![subplan.root],
                );
                subplan.root = limit;
            }
        }

        if wctx.distinct {
            let dedup = qctx.make_node(PlanNodeKind::Dedup, vec![subplan.root]);
            subplan.root = dedup;
        }

        Ok(subplan)
    }
}
