//! 集成测试公共构造器

use graph_planner::context::clause::{
    ClauseContext, MatchClauseContext, NodePattern, OrderByClauseContext, PaginationContext,
    PatternElement, ReturnClauseContext, YieldColumn,
};
use graph_planner::context::AstContext;
use graph_planner::core::{Expression, OrderDirection};
use graph_planner::planner::SentenceKind;

/// 单节点 MATCH 子句：MATCH (alias)
pub fn match_clause(alias: &str) -> ClauseContext {
    ClauseContext::Match(MatchClauseContext {
        elements: vec![PatternElement::Node(NodePattern {
            alias: Some(alias.to_string()),
            labels: vec![],
        })],
        ..Default::default()
    })
}

/// RETURN 子句：RETURN var
pub fn return_clause(var: &str) -> ClauseContext {
    ClauseContext::Return(ReturnClauseContext {
        yield_columns: vec![YieldColumn::new(Expression::variable(var), None)],
        ..Default::default()
    })
}

/// 带排序与分页的 RETURN 子句
pub fn return_with_order_and_pagination(
    var: &str,
    skip: i64,
    limit: i64,
) -> ClauseContext {
    ClauseContext::Return(ReturnClauseContext {
        yield_columns: vec![YieldColumn::new(Expression::variable(var), None)],
        order_by: Some(OrderByClauseContext {
            indexed_order_factors: vec![(0, OrderDirection::Asc)],
        }),
        pagination: Some(PaginationContext { skip, limit }),
        ..Default::default()
    })
}

/// MATCH (alias) RETURN alias
pub fn simple_match_ast(alias: &str) -> AstContext {
    AstContext::new(SentenceKind::Match)
        .with_clause(match_clause(alias))
        .with_return(return_clause(alias))
}
