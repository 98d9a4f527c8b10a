//! 聚合子句规划器
//!
//! 把分组键与聚合项转换为 Aggregate 节点；聚合表达式被外层表达式
//! 包裹时（如 `count(n) + 1`）在聚合之上补一个投影节点。

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{Aggregate, PlanNodeKind, Project};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// 聚合子句规划器
#[derive(Debug, Default)]
pub struct GroupClausePlanner;

impl GroupClausePlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ClausePlanner for GroupClausePlanner {
    fn name(&self) -> &'static str {
        "GroupClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::Group
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let gctx = match clause_ctx {
            ClauseContext::Group(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        if gctx.group_items.is_empty() {
            return Err(PlannerError::PlanGenerationFailed(
                "聚合子句缺少聚合项".to_string(),
            ));
        }

        let agg_col_names: Vec<String> =
            gctx.group_items.iter().map(|item| item.col_name()).collect();
        let agg = qctx.make_node(
            PlanNodeKind::Aggregate(Aggregate {
                group_keys: gctx.group_keys.clone(),
                group_items: gctx.group_items.clone(),
            }),
            vec![],
        );
        qctx.set_col_names(agg, agg_col_names);

        let mut subplan = SubPlan::single(agg);

        if gctx.need_gen_project {
            let proj_col_names: Vec<String> =
                gctx.proj_cols.iter().map(|col| col.col_name()).collect();
            let project = qctx.make_node(
                PlanNodeKind::Project(Project {
                    columns: gctx.proj_cols.clone(),
                }),
                vec![agg],
            );
            qctx.set_col_names(project, proj_col_names);
            subplan.root = project;
        }

        Ok(subplan)
    }
}
