//! MATCH 子句规划器
//!
//! 把路径模式转换为扫描加展开的节点链：首个节点模式生成顶点扫描，
//! 其后每条边生成一次展开；多个模式元素之间做交叉连接；子句级过滤
//! 条件收尾。

use crate::context::clause::{
    ClauseContext, CypherClauseKind, NodePattern, PathPattern, PatternElement,
};
use crate::context::QueryContext;
use crate::planner::connector::SegmentsConnector;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::{Expand, Filter, PlanNodeKind, ScanVertices};
use crate::planner::planner::PlannerError;
use crate::planner::statements::clauses::clause_planner::ClausePlanner;

/// MATCH 子句规划器
#[derive(Debug, Default)]
pub struct MatchClausePlanner;

impl MatchClausePlanner {
    pub fn new() -> Self {
        Self
    }

    fn node_col_name(node: &NodePattern, ordinal: usize) -> String {
        node.alias
            .clone()
            .unwrap_or_else(|| format!("__anon_{}", ordinal))
    }

    fn plan_node_pattern(
        &self,
        qctx: &mut QueryContext,
        node: &NodePattern,
        ordinal: usize,
    ) -> SubPlan {
        let scan = qctx.make_node(
            PlanNodeKind::ScanVertices(ScanVertices {
                labels: node.labels.clone(),
            }),
            vec![],
        );
        qctx.set_col_names(scan, vec![Self::node_col_name(node, ordinal)]);
        SubPlan::single(scan)
    }

    fn plan_path_pattern(
        &self,
        qctx: &mut QueryContext,
        path: &PathPattern,
    ) -> Result<SubPlan, PlannerError> {
        let first = path.nodes.first().ok_or_else(|| {
            PlannerError::PlanGenerationFailed("路径模式不能为空".to_string())
        })?;

        let mut subplan = self.plan_node_pattern(qctx, first, 0);
        let mut col_names = qctx.node(subplan.root).col_names.clone();

        for (i, edge) in path.edges.iter().enumerate() {
            let dst = path.nodes.get(i + 1).ok_or_else(|| {
                PlannerError::PlanGenerationFailed(
                    "边模式必须跟随节点模式".to_string(),
                )
            })?;
            let expand = qctx.make_node(
                PlanNodeKind::Expand(Expand {
                    edge_types: edge.edge_types.clone(),
                    direction: edge.direction,
                }),
                vec![subplan.root],
            );
            col_names.push(Self::node_col_name(dst, i + 1));
            qctx.set_col_names(expand, col_names.clone());
            subplan.root = expand;
        }

        Ok(subplan)
    }

    fn plan_element(
        &self,
        qctx: &mut QueryContext,
        element: &PatternElement,
    ) -> Result<SubPlan, PlannerError> {
        match element {
            PatternElement::Node(node) => Ok(self.plan_node_pattern(qctx, node, 0)),
            PatternElement::Path(path) => self.plan_path_pattern(qctx, path),
        }
    }
}

impl ClausePlanner for MatchClausePlanner {
    fn name(&self) -> &'static str {
        "MatchClausePlanner"
    }

    fn clause_kind(&self) -> CypherClauseKind {
        CypherClauseKind::Match
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        clause_ctx: &ClauseContext,
    ) -> Result<SubPlan, PlannerError> {
        self.check_kind(clause_ctx)?;
        let mctx = match clause_ctx {
            ClauseContext::Match(ctx) => ctx,
            _ => unreachable!("check_kind 已核对上下文类别"),
        };

        let mut subplan: Option<SubPlan> = None;
        for element in &mctx.elements {
            let fragment = self.plan_element(qctx, element)?;
            subplan = Some(match subplan {
                None => fragment,
                Some(prev) => SegmentsConnector::cross_join(qctx, &prev, &fragment)?,
            });
        }

        let mut subplan = subplan.ok_or_else(|| {
            PlannerError::PlanGenerationFailed("MATCH 子句缺少模式".to_string())
        })?;

        if let Some(condition) = &mctx.filter {
            let filter = qctx.make_node(
                PlanNodeKind::Filter(Filter {
                    condition: condition.clone(),
                }),
                vec![subplan.root],
            );
            subplan.root = filter;
        }

        log::debug!(
            "match 模式 {} 规划为 {} 个节点的片段",
            mctx.elements
                .iter()
                .map(|e| e.render())
                .collect::<Vec<_>>()
                .join(", "),
            qctx.node_count()
        );

        Ok(subplan)
    }
}
