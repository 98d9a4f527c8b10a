//! 规划器集成测试
//!
//! 测试范围:
//! - SegmentsConnector 的连接语义
//! - 子句规划器的组合（RETURN / DISTINCT / 分页省略）
//! - 规划器调度（谓词顺序、两类调度错误）
//! - 整条语句的规划链路与变量传递

mod common;

use common::{
    match_clause, return_clause, return_with_order_and_pagination, simple_match_ast,
};
use graph_planner::context::clause::{
    ClauseContext, PaginationContext, ReturnClauseContext, UnwindClauseContext, WithClauseContext,
    YieldColumn,
};
use graph_planner::context::{AstContext, QueryContext};
use graph_planner::core::Expression;
use graph_planner::planner::plan::{explain, PlanNodeKind};
use graph_planner::planner::planner::{Planner, PlannerError, PlannerRegistry};
use graph_planner::planner::statements::clauses::{
    ClausePlanner, GroupClausePlanner, MatchClausePlanner, OrderByClausePlanner,
    ReturnClausePlanner, UnwindClausePlanner, WhereClausePlanner, WithClausePlanner,
};
use graph_planner::planner::statements::SequentialPlanner;
use graph_planner::planner::{SegmentsConnector, SentenceKind, SubPlan};

// ==================== SegmentsConnector ====================

#[test]
fn test_connector_appends_producer_root_exactly_once() {
    let mut qctx = QueryContext::new();
    let producer_node = qctx.make_node(PlanNodeKind::Start, vec![]);
    let consumer_node = qctx.make_node(PlanNodeKind::Dedup, vec![]);
    let producer = SubPlan::single(producer_node);
    let consumer = SubPlan::single(consumer_node);

    let linked = SegmentsConnector::add_input(&mut qctx, &consumer, &producer, false)
        .expect("连接应成功");

    let deps = &qctx.node(consumer.tail).dependencies;
    assert_eq!(
        deps.iter().filter(|dep| **dep == producer.root).count(),
        1,
        "消费方 tail 的依赖列表应恰好包含一次生产方 root"
    );
    assert_eq!(linked.root, consumer.root, "消费方 root 不受连接影响");
    assert_eq!(linked.tail, producer.tail);
}

// ==================== 分页省略 ====================

#[test]
fn test_pagination_elided_iff_noop() {
    // skip=0, limit=max：计划中不出现分页算子
    let mut qctx = QueryContext::new();
    let noop = ReturnClausePlanner::new()
        .transform(
            &mut qctx,
            &ClauseContext::Return(ReturnClauseContext {
                yield_columns: vec![YieldColumn::new(Expression::variable("a"), None)],
                pagination: Some(PaginationContext::default()),
                ..Default::default()
            }),
        )
        .expect("规划应成功");
    assert_eq!(qctx.node(noop.root).name(), "Project");

    // skip=10, limit=5：恰好一个分页算子
    let mut qctx = QueryContext::new();
    let paged = ReturnClausePlanner::new()
        .transform(
            &mut qctx,
            &ClauseContext::Return(ReturnClauseContext {
                yield_columns: vec![YieldColumn::new(Expression::variable("a"), None)],
                pagination: Some(PaginationContext { skip: 10, limit: 5 }),
                ..Default::default()
            }),
        )
        .expect("规划应成功");
    let mut limit_count = 0;
    let mut stack = vec![paged.root];
    while let Some(id) = stack.pop() {
        if qctx.node(id).name() == "Limit" {
            limit_count += 1;
        }
        stack.extend(qctx.node(id).dependencies.iter().copied());
    }
    assert_eq!(limit_count, 1, "应恰好出现一个分页算子");
}

// ==================== RETURN DISTINCT ====================

#[test]
fn test_return_distinct_shape() {
    let mut qctx = QueryContext::new();
    let plan = ReturnClausePlanner::new()
        .transform(
            &mut qctx,
            &ClauseContext::Return(ReturnClauseContext {
                yield_columns: vec![YieldColumn::new(Expression::variable("a"), None)],
                distinct: true,
                ..Default::default()
            }),
        )
        .expect("规划应成功");

    let dedup = qctx.node(plan.root);
    assert_eq!(dedup.name(), "Dedup", "根应为去重算子");
    assert_eq!(dedup.dependencies.len(), 1, "去重应恰好有一个依赖");
    let project = qctx.node(dedup.dependencies[0]);
    assert_eq!(project.name(), "Project");
    assert_eq!(dedup.col_names, project.col_names, "去重继承投影列名");
    assert_eq!(
        dedup.input_var.as_deref(),
        Some(project.output_var.as_str()),
        "去重读取投影的输出变量"
    );
}

// ==================== 上下文类别核对 ====================

#[test]
fn test_every_planner_rejects_wrong_kind() {
    let mut qctx = QueryContext::new();
    let wrong = ClauseContext::Pagination(PaginationContext::default());
    let planners: Vec<Box<dyn ClausePlanner>> = vec![
        Box::new(MatchClausePlanner::new()),
        Box::new(WhereClausePlanner::new()),
        Box::new(ReturnClausePlanner::new()),
        Box::new(WithClausePlanner::new()),
        Box::new(UnwindClausePlanner::new()),
        Box::new(GroupClausePlanner::new()),
        Box::new(OrderByClausePlanner::new()),
    ];
    for planner in planners {
        let err = planner
            .transform(&mut qctx, &wrong)
            .expect_err("类别不符应报错");
        assert!(
            matches!(err, PlannerError::ContextKindMismatch { .. }),
            "{} 应拒绝错误类别的上下文",
            planner.name()
        );
    }
}

// ==================== 调度 ====================

#[test]
fn test_dispatch_selects_first_accepting_predicate() {
    fn never_match(_ast_ctx: &AstContext) -> bool {
        false
    }
    fn always_match(_ast_ctx: &AstContext) -> bool {
        true
    }
    fn instantiate() -> Box<dyn Planner> {
        SequentialPlanner::make()
    }

    let mut registry = PlannerRegistry::new();
    registry.register(SentenceKind::Match, never_match, instantiate);
    registry.register(SentenceKind::Match, always_match, instantiate);

    let mut qctx = QueryContext::new();
    let plan = registry
        .create_plan(&mut qctx, &simple_match_ast("n"))
        .expect("always-match 规划器应被选中并成功规划");
    assert_eq!(qctx.node(plan.root).name(), "Project");
}

#[test]
fn test_dispatch_error_taxonomy() {
    let registry = PlannerRegistry::new();
    let mut qctx = QueryContext::new();
    let err = registry
        .create_plan(&mut qctx, &simple_match_ast("n"))
        .expect_err("无注册应报错");
    assert!(matches!(err, PlannerError::NoPlannerForStatement(_)));

    fn never_match(_ast_ctx: &AstContext) -> bool {
        false
    }
    fn instantiate() -> Box<dyn Planner> {
        SequentialPlanner::make()
    }
    let mut registry = PlannerRegistry::new();
    registry.register(SentenceKind::Match, never_match, instantiate);
    let err = registry
        .create_plan(&mut qctx, &simple_match_ast("n"))
        .expect_err("无谓词命中应报错");
    assert!(matches!(err, PlannerError::NoPlannerMatched(_)));
}

#[test]
fn test_default_registry_routes_shortest_path() {
    let registry = PlannerRegistry::with_defaults();
    let mut qctx = QueryContext::new();

    let mut ast_ctx = AstContext::new(SentenceKind::Match)
        .with_clause(match_clause("a"))
        .with_return(return_clause("a"));
    ast_ctx.shortest_path = true;

    // 最短路径谓词在前，但该语句没有路径模式，最短路径规划器报错；
    // 错误应原样上抛而不是回落到顺序规划器
    let err = registry
        .create_plan(&mut qctx, &ast_ctx)
        .expect_err("最短路径规划器要求路径模式");
    assert!(matches!(err, PlannerError::PlanGenerationFailed(_)));
}

// ==================== 整条语句 ====================

#[test]
fn test_full_statement_chain_and_variable_propagation() {
    let registry = PlannerRegistry::with_defaults();
    let mut qctx = QueryContext::new();
    let ast_ctx = AstContext::new(SentenceKind::Match)
        .with_clause(match_clause("a"))
        .with_clause(ClauseContext::Unwind(UnwindClauseContext {
            expr: Expression::variable("a"),
            alias: "x".to_string(),
        }))
        .with_clause(ClauseContext::With(WithClauseContext {
            yield_columns: vec![YieldColumn::new(
                Expression::variable("x"),
                Some("y".to_string()),
            )],
            ..Default::default()
        }))
        .with_return(return_with_order_and_pagination("y", 0, 10));

    let plan = registry
        .create_plan(&mut qctx, &ast_ctx)
        .expect("规划应成功");

    // 自根向下：Limit -> Sort -> Project(RETURN) -> Project(WITH)
    //   -> Unwind -> ScanVertices
    let limit = qctx.node(plan.root);
    assert_eq!(limit.name(), "Limit");
    let sort = qctx.node(limit.dependencies[0]);
    assert_eq!(sort.name(), "Sort");
    let ret_project = qctx.node(sort.dependencies[0]);
    assert_eq!(ret_project.name(), "Project");
    let with_project = qctx.node(ret_project.dependencies[0]);
    assert_eq!(with_project.name(), "Project");
    let unwind = qctx.node(with_project.dependencies[0]);
    assert_eq!(unwind.name(), "Unwind");
    let scan = qctx.node(unwind.dependencies[0]);
    assert_eq!(scan.name(), "ScanVertices");
    assert_eq!(plan.tail, scan.id);

    // 每一步显式读取上游输出变量
    assert_eq!(
        unwind.input_var.as_deref(),
        Some(scan.output_var.as_str())
    );
    assert_eq!(
        with_project.input_var.as_deref(),
        Some(unwind.output_var.as_str())
    );
    assert_eq!(
        ret_project.input_var.as_deref(),
        Some(with_project.output_var.as_str())
    );

    // 所有输出变量都已注册进符号表
    let mut cursor = plan.root;
    loop {
        let node = qctx.node(cursor);
        assert!(
            qctx.sym_table().exists(&node.output_var),
            "变量 {} 应已注册",
            node.output_var
        );
        match node.dependencies.first() {
            Some(dep) => cursor = *dep,
            None => break,
        }
    }
}

#[test]
fn test_explain_renders_full_tree() {
    let registry = PlannerRegistry::with_defaults();
    let mut qctx = QueryContext::new();
    let plan = registry
        .create_plan(&mut qctx, &simple_match_ast("n"))
        .expect("规划应成功");

    let value = explain(&qctx, plan.root);
    assert_eq!(value["name"], "Project");
    assert_eq!(value["dependencies"][0]["name"], "ScanVertices");
    assert!(value["output_var"].as_str().is_some());
}
