//! 优化器模块
//!
//! 把逻辑计划包装为等价组 DAG，在轮次上限内自底向上应用重写规则，
//! 最后按最小代价提取具体计划。

pub mod core;
pub mod engine;
pub mod plan;
pub mod rules;

pub use core::{OptimizationStats, OptimizerConfig, MAX_EXPLORATION_ROUND};
pub use engine::{Explorer, Optimizer, RuleSet};
pub use plan::{
    GroupId, GroupNodeId, MatchedResult, OptContext, OptGroup, OptGroupNode, OptRule,
    OptimizerError, Pattern, TransformResult,
};
