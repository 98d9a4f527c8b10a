//! 子句规划器统一接口
//!
//! 每种子句一个规划器，把校验后的子句上下文转换为一个连通的计划片段。
//! 规划器之间可以递归调用（如 RETURN 调用聚合、排序、分页规划器），
//! 片段之间用 SegmentsConnector 连接。

use crate::context::clause::{ClauseContext, CypherClauseKind};
use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::planner::PlannerError;

/// 子句级规划器 trait
pub trait ClausePlanner: std::fmt::Debug {
    /// 规划器名称
    fn name(&self) -> &'static str;

    /// 支持的子句类型
    fn clause_kind(&self) -> CypherClauseKind;

    /// 转换子句上下文为计划片段
    ///
    /// 实现必须先通过 `check_kind` 核对上下文类别；
    /// 任何嵌套转换失败立即原样上抛，绝不返回半连接的片段
    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError>;

    /// 核对上下文类别
    fn check_kind(&self, clause_ctx: &ClauseContext) -> Result<(), PlannerError> {
        let found = clause_ctx.kind();
        if found != self.clause_kind() {
            return Err(PlannerError::ContextKindMismatch {
                planner: self.name(),
                expected: self.clause_kind(),
                found,
            });
        }
        Ok(())
    }
}
