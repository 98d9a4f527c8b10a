//! 计划描述与 JSON 输出

use serde::{Deserialize, Serialize};

use super::node::PlanNodeId;
use crate::context::QueryContext;

/// 计划节点描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanNodeDescription {
    pub name: String,
    pub id: usize,
    pub output_var: String,
    pub col_names: Vec<String>,
    pub cost: f64,
    pub dependencies: Vec<PlanNodeDescription>,
    pub bodies: Vec<PlanNodeDescription>,
}

impl PlanNodeDescription {
    /// 从计划树构建描述
    pub fn from_plan(qctx: &QueryContext, root: PlanNodeId) -> Self {
        let node = qctx.node(root);
        Self {
            name: node.name().to_string(),
            id: node.id.0,
            output_var: node.output_var.clone(),
            col_names: node.col_names.clone(),
            cost: node.cost,
            dependencies: node
                .dependencies
                .iter()
                .map(|dep| Self::from_plan(qctx, *dep))
                .collect(),
            bodies: node
                .bodies
                .iter()
                .map(|body| Self::from_plan(qctx, *body))
                .collect(),
        }
    }
}

/// 渲染计划树为 JSON
pub fn explain(qctx: &QueryContext, root: PlanNodeId) -> serde_json::Value {
    serde_json::to_value(PlanNodeDescription::from_plan(qctx, root))
        .unwrap_or(serde_json::Value::Null)
}
