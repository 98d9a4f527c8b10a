//! 优化配置和统计
//! 定义优化器的配置参数和统计信息收集

use serde::{Deserialize, Serialize};

/// 探索轮次上限
///
/// 重写关系不保证合流也不保证度量递减，轮次上限是唯一的终止保证。
/// 触顶是强制停止而非失败：截至当时发现的替代照常参与代价选择。
pub const MAX_EXPLORATION_ROUND: usize = 128;

/// 优化器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 单条规则的探索轮次上限，测试场景可调小以确定性地触发封顶
    pub max_exploration_round: usize,
    /// 关闭后提取阶段退化为保留原计划
    pub enable_cost_model: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_exploration_round: MAX_EXPLORATION_ROUND,
            enable_cost_model: true,
        }
    }
}

impl OptimizerConfig {
    /// 从 TOML 文本加载配置
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// 优化统计
#[derive(Debug, Default, Clone)]
pub struct OptimizationStats {
    pub rules_applied: usize,
    pub plan_nodes_before: usize,
    pub plan_nodes_after: usize,
    pub group_count: usize,
    pub group_node_count: usize,
    pub best_cost: f64,
}

impl OptimizationStats {
    pub fn record_rule_application(&mut self) {
        self.rules_applied += 1;
    }
}
