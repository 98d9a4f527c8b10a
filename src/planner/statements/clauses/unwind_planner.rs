//! UNWIND 子句规划器

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{PlanNodeKind, Unwind};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// UNWIND 子句规划器
///
/// 展开列表表达式，输出单列，列名取展开别名
#[derive(Debug, Default)]
pub struct UnwindClausePlanner;

impl UnwindClausePlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ClausePlanner for UnwindClausePlanner {
    fn name(&self) -> &'static str {
        "UnwindClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::Unwind
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let uctx = match clause_ctx {
            ClauseContext::Unwind(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        let alias = uctx.alias.clone();
        let unwind = qctx.make_node(
            PlanNodeKind::Unwind(Unwind {
                expr: uctx.expr.clone(),
                alias: alias.clone(),
            }),
            vec![],
        );
        qctx.set_col_names(unwind, vec![alias]);
        Ok(SubPlan::single(unwind))
    }
}
