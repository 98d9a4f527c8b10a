//! 编译流水线
//!
//! 单条查询的规划与优化严格分阶段、互不重叠：子句规划完全结束后
//! 才开始优化，优化完全结束后才把提取出的计划交给执行。任何阶段
//! 出错都立即中止整条流水线，绝不向下游交付部分计划。

use crate::context::{AstContext, QueryContext};
use crate::optimizer::engine::Optimizer;
use crate::optimizer::plan::node::OptimizerError;
use crate::planner::plan::execution_plan::ExecutionPlan;
use crate::planner::planner::{PlannerError, PlannerRegistry};

/// 编译错误
///
/// 嵌套阶段的失败原样上抛，调用方只观察到首个失败
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

/// 编译一条语句：规划、优化、提取，产出可执行计划
pub fn compile(
    qctx: &mut QueryContext,
    ast_ctx: &AstContext,
    registry: &PlannerRegistry,
    optimizer: &Optimizer,
) -> Result<ExecutionPlan, CompileError> {
    let subplan = registry.create_plan(qctx, ast_ctx)?;
    let plan = ExecutionPlan::new(subplan.root);
    let optimized = optimizer.find_best_plan(qctx, plan)?;
    Ok(optimized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::clause::{
        ClauseContext, MatchClauseContext, NodePattern, PatternElement, ReturnClauseContext,
        YieldColumn,
    };
    use crate::core::Expression;
    use crate::planner::planner::SentenceKind;

    #[test]
    fn test_compile_simple_match() {
        let mut qctx = QueryContext::new();
        let ast_ctx = AstContext::new(SentenceKind::Match)
            .with_clause(ClauseContext::Match(MatchClauseContext {
                elements: vec![PatternElement::Node(NodePattern {
                    alias: Some("n".to_string()),
                    labels: vec![],
                })],
                ..Default::default()
            }))
            .with_return(ClauseContext::Return(ReturnClauseContext {
                yield_columns: vec![YieldColumn::new(Expression::variable("n"), None)],
                ..Default::default()
            }));

        let registry = PlannerRegistry::with_defaults();
        let optimizer = Optimizer::default_rules();
        let plan = compile(&mut qctx, &ast_ctx, &registry, &optimizer)
            .expect("编译应成功");

        let root = qctx.node(plan.root);
        assert_eq!(root.name(), "Project");
        assert!(!root.dependencies.is_empty());
    }

    #[test]
    fn test_compile_fails_fast_on_planner_error() {
        let mut qctx = QueryContext::new();
        let ast_ctx = AstContext::new(SentenceKind::Lookup);
        let registry = PlannerRegistry::with_defaults();
        let optimizer = Optimizer::default_rules();
        let err = compile(&mut qctx, &ast_ctx, &registry, &optimizer)
            .expect_err("未注册的语句类别应报错");
        assert!(matches!(
            err,
            CompileError::Planner(PlannerError::NoPlannerForStatement(_))
        ));
    }
}
