//! WHERE 子句规划器
//!
//! 把过滤条件转换为 Filter 节点，由调用方接入上游。

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{Filter, PlanNodeKind};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// WHERE 子句规划器
#[derive(Debug, Default)]
pub struct WhereClausePlanner;

impl WhereClausePlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ClausePlanner for WhereClausePlanner {
    fn name(&self) -> &'static str {
        "WhereClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::Where
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let wctx = match clause_ctx {
            ClauseContext::Where(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        let condition = wctx.filter.clone().ok_or_else(|| {
            PlannerError::PlanGenerationFailed("WHERE 子句缺少过滤条件".to_string())
        })?;

        let filter = qctx.make_node(PlanNodeKind::Filter(Filter { condition }), vec![]);
        Ok(SubPlan::single(filter))
    }
}
