//! 最短路径规划器
//!
//! MATCH 语句带最短路径请求时选用本策略。计划结构与普通匹配完全
//! 不同：源点扫描接入一个循环节点，循环的主体是一段独立的展开
//! 子计划（条件执行的嵌套作用域，不在流水线依赖里），循环结束后
//! 接 RETURN 投影。

use crate::context::clause::{ClauseContext, PatternElement};
use crate::context::{AstContext, QueryContext};
use crate::planner::connector::SegmentsConnector;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{Expand, Loop, PlanNodeKind, ScanVertices};
use crate::planner::planner::{Planner, PlannerError};
use crate::planner::statements::clauses::{ClausePlanner, ReturnClausePlanner};
use crate::core::{BinaryOperator, Expression, Value};

/// 路径搜索的最大步数
const MAX_PATH_LENGTH: i64 = 100;

/// 最短路径规划器
#[derive(Debug, Default)]
pub struct ShortestPathPlanner;

impl ShortestPathPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn make() -> Box<dyn Planner> {
        Box::new(Self::new())
    }

    /// 只接受语义上带最短路径请求的语句
    pub fn match_ast_ctx(ast_ctx: &AstContext) -> bool {
        ast_ctx.shortest_path
    }

    fn step_condition() -> Expression {
        Expression::binary(
            Expression::variable("__steps"),
            BinaryOperator::LessThan,
            Expression::literal(Value::Int(MAX_PATH_LENGTH)),
        )
    }
}

impl Planner for ShortestPathPlanner {
    fn transform(
        &mut self,
        qctx: &mut QueryContext,
        ast_ctx: &AstContext,
    ) -> Result<SubPlan, PlannerError> {
        let match_ctx = ast_ctx
            .clauses
            .iter()
            .find_map(|clause| match clause {
                ClauseContext::Match(m) => Some(m),
                _ => None,
            })
            .ok_or_else(|| {
                PlannerError::MissingInput("最短路径语句缺少 MATCH 子句".to_string())
            })?;

        let path = match_ctx
            .elements
            .iter()
            .find_map(|element| match element {
                PatternElement::Path(p) => Some(p),
                _ => None,
            })
            .ok_or_else(|| {
                PlannerError::PlanGenerationFailed(
                    "最短路径请求需要路径模式".to_string(),
                )
            })?;

        let source = path.nodes.first().ok_or_else(|| {
            PlannerError::PlanGenerationFailed("路径模式不能为空".to_string())
        })?;

        // 源点扫描
        let scan = qctx.make_node(
            PlanNodeKind::ScanVertices(ScanVertices {
                labels: source.labels.clone(),
            }),
            vec![],
        );
        let source_col = source.alias.clone().unwrap_or_else(|| "__src".to_string());
        qctx.set_col_names(scan, vec![source_col.clone()]);

        // 循环主体：逐步展开，属于嵌套作用域而非流水线依赖
        let edge = path.edges.first();
        let expand = qctx.make_node(
            PlanNodeKind::Expand(Expand {
                edge_types: edge.map(|e| e.edge_types.clone()).unwrap_or_default(),
                direction: edge.map(|e| e.direction).unwrap_or_default(),
            }),
            vec![],
        );
        qctx.set_col_names(expand, vec![source_col]);

        let loop_node = qctx.make_node(
            PlanNodeKind::Loop(Loop {
                condition: Self::step_condition(),
            }),
            vec![scan],
        );
        qctx.add_body(loop_node, expand);

        let mut subplan = SubPlan::new(loop_node, scan);

        if let Some(return_clause) = &ast_ctx.return_clause {
            let return_plan = ReturnClausePlanner::new().transform(qctx, return_clause)?;
            subplan = SegmentsConnector::add_input(qctx, &return_plan, &subplan, false)?;
        }

        Ok(subplan)
    }
}
