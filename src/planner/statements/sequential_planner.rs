//! 顺序语句规划器
//!
//! 按子句出现顺序规划一条读语句：逐个把 MATCH / UNWIND / WITH 子句
//! 转换为片段并接入前序片段，最后接入 RETURN 子句。每一步的输入变量
//! 由连接器显式传递，下游算子读取正确的上游输出。
//! 任何子句规划失败立即中止整条链路，错误原样上抛。

use crate::context::clause::ClauseContext;
use crate::context::{AstContext, QueryContext};
use crate::planner::connector::SegmentsConnector;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::planner::{Planner, PlannerError};
use crate::planner::statements::clauses::{
    ClausePlanner, MatchClausePlanner, ReturnClausePlanner, UnwindClausePlanner,
    WithClausePlanner,
};

/// 顺序语句规划器
#[derive(Debug, Default)]
pub struct SequentialPlanner;

impl SequentialPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn make() -> Box<dyn Planner> {
        Box::new(Self::new())
    }

    /// 接受任意读语句
    pub fn match_ast_ctx(_ast_ctx: &AstContext) -> bool {
        true
    }

    fn plan_clause(
        &self,
        qctx: &mut QueryContext,
        clause: &ClauseContext,
        current: Option<SubPlan>,
    ) -> Result<SubPlan, PlannerError> {
        match clause {
            ClauseContext::Match(mctx) => {
                let fragment = MatchClausePlanner::new().transform(qctx, clause)?;
                match current {
                    None => Ok(fragment),
                    // 后续 MATCH 与前序结果连接：可选匹配保留左侧全部行
                    Some(prev) if mctx.optional => {
                        SegmentsConnector::left_join(qctx, &prev, &fragment)
                    }
                    Some(prev) => SegmentsConnector::cross_join(qctx, &prev, &fragment),
                }
            }
            ClauseContext::Unwind(_) => {
                let fragment = UnwindClausePlanner::new().transform(qctx, clause)?;
                match current {
                    None => Ok(fragment),
                    Some(prev) => {
                        SegmentsConnector::add_input(qctx, &fragment, &prev, false)
                    }
                }
            }
            ClauseContext::With(_) => {
                let fragment = WithClausePlanner::new().transform(qctx, clause)?;
                match current {
                    None => Ok(fragment),
                    Some(prev) => {
                        SegmentsConnector::add_input(qctx, &fragment, &prev, false)
                    }
                }
            }
            other => Err(PlannerError::PlanGenerationFailed(format!(
                "顺序规划器不支持 {} 子句出现在语句主体",
                other.kind()
            ))),
        }
    }
}

impl Planner for SequentialPlanner {
    fn transform(
        &mut self,
        qctx: &mut QueryContext,
        ast_ctx: &AstContext,
    ) -> Result<SubPlan, PlannerError> {
        let mut current: Option<SubPlan> = None;

        for clause in &ast_ctx.clauses {
            current = Some(self.plan_clause(qctx, clause, current)?);
        }

        let return_clause = ast_ctx
            .return_clause
            .as_ref()
            .ok_or_else(|| PlannerError::MissingInput("RETURN 子句".to_string()))?;
        let return_plan = ReturnClausePlanner::new().transform(qctx, return_clause)?;

        match current {
            None => Ok(return_plan),
            Some(prev) => SegmentsConnector::add_input(qctx, &return_plan, &prev, false),
        }
    }
}
