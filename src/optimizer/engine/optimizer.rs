//! 优化器引擎核心实现
//! 提供 Optimizer 结构体及其优化逻辑实现

use std::time::Instant;

use crate::context::QueryContext;
use crate::optimizer::core::{OptimizationStats, OptimizerConfig};
use crate::optimizer::engine::exploration::Explorer;
use crate::optimizer::plan::context::OptContext;
use crate::optimizer::plan::node::{OptRule, OptimizerError};
use crate::planner::plan::execution_plan::ExecutionPlan;

/// 规则集
#[derive(Debug)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<Box<dyn OptRule>>,
}

impl RuleSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn OptRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &Vec<Box<dyn OptRule>> {
        &self.rules
    }
}

/// 优化器
///
/// 逐规则集、逐规则地驱动探索，随后按最小代价提取计划
#[derive(Debug)]
pub struct Optimizer {
    rule_sets: Vec<RuleSet>,
    pub config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(rule_sets: Vec<RuleSet>) -> Self {
        Self {
            rule_sets,
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(rule_sets: Vec<RuleSet>, config: OptimizerConfig) -> Self {
        Self { rule_sets, config }
    }

    /// 构造带默认规则集的优化器
    pub fn default_rules() -> Self {
        use crate::optimizer::rules::{
            CollapseProjectRule, MergeLimitsRule, PushLimitDownProjectRule, TopNRule,
        };

        let mut merge_rules = RuleSet::new("merge");
        merge_rules.add_rule(Box::new(CollapseProjectRule));
        merge_rules.add_rule(Box::new(MergeLimitsRule));
        merge_rules.add_rule(Box::new(TopNRule));

        let mut pushdown_rules = RuleSet::new("pushdown");
        pushdown_rules.add_rule(Box::new(PushLimitDownProjectRule));

        Self::new(vec![merge_rules, pushdown_rules])
    }

    /// 寻找最优计划
    ///
    /// 子句规划完全结束后才进入优化，优化完全结束后才把提取出的
    /// 计划交给执行；任何错误立即中止整条编译流水线
    pub fn find_best_plan(
        &self,
        qctx: &mut QueryContext,
        plan: ExecutionPlan,
    ) -> Result<ExecutionPlan, OptimizerError> {
        let (plan, _stats) = self.find_best_plan_with_stats(qctx, plan)?;
        Ok(plan)
    }

    /// 寻找最优计划并返回统计信息
    pub fn find_best_plan_with_stats(
        &self,
        qctx: &mut QueryContext,
        plan: ExecutionPlan,
    ) -> Result<(ExecutionPlan, OptimizationStats), OptimizerError> {
        let started = Instant::now();
        let mut stats = OptimizationStats::default();
        stats.plan_nodes_before = plan.node_count(qctx);

        let mut octx = OptContext::new();
        let root = octx.wrap_plan(qctx, plan.root);
        octx.group_mut(root).root_group = true;

        for rule_set in &self.rule_sets {
            log::debug!("应用规则集 {}", rule_set.name);
            for rule in rule_set.rules() {
                let mut explorer =
                    Explorer::new(qctx, &mut octx, self.config.max_exploration_round);
                explorer.explore_until_max_round(rule.as_ref(), root)?;
                stats.record_rule_application();
            }
        }

        let best_root = octx.extract_plan(qctx, root, self.config.enable_cost_model)?;
        if self.config.enable_cost_model {
            stats.best_cost = octx.group_cost(qctx, root)?;
        }
        stats.group_count = octx.group_count();
        stats.group_node_count = octx.group_node_count();

        let mut optimized = ExecutionPlan::new(best_root);
        optimized.set_optimize_time(started.elapsed().as_micros() as u64);
        stats.plan_nodes_after = optimized.node_count(qctx);

        log::debug!(
            "优化完成：{} 个组 {} 个组节点，最优代价 {:.2}，耗时 {}us",
            stats.group_count,
            stats.group_node_count,
            stats.best_cost,
            optimized.optimize_time_in_us
        );

        Ok((optimized, stats))
    }
}
