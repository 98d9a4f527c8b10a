//! 分页合并规则
//!
//! 相邻的两个 Limit 合并为一个：先应用内层 (skip_i, count_i) 再应用
//! 外层 (skip_o, count_o) 等价于 skip = skip_i + skip_o，
//! count = min(count_o, max(0, count_i - skip_o))。

use crate::context::QueryContext;
use crate::optimizer::plan::context::OptContext;
use crate::optimizer::plan::node::{
    MatchedResult, OptRule, OptimizerError, Pattern, TransformResult,
};
use crate::planner::plan::node::{Limit, PlanNodeKind};

/// 分页合并规则
#[derive(Debug)]
pub struct MergeLimitsRule;

impl OptRule for MergeLimitsRule {
    fn name(&self) -> &'static str {
        "MergeLimitsRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::node("Limit").with_dependency(Pattern::node("Limit"))
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        octx: &mut OptContext,
        matched: &MatchedResult,
    ) -> Result<TransformResult, OptimizerError> {
        let inner_matched = matched.dependencies.first().ok_or_else(|| {
            OptimizerError::InvalidPlanStructure("分页合并缺少依赖匹配".to_string())
        })?;

        let outer_node = octx.group_node(matched.node).clone();
        let inner_node = octx.group_node(inner_matched.node).clone();

        let outer = match &qctx.node(outer_node.plan_node).kind {
            PlanNodeKind::Limit(limit) => limit.clone(),
            _ => return Ok(TransformResult::unchanged()),
        };
        let inner = match &qctx.node(inner_node.plan_node).kind {
            PlanNodeKind::Limit(limit) => limit.clone(),
            _ => return Ok(TransformResult::unchanged()),
        };

        let merged = Limit {
            skip: inner.skip.saturating_add(outer.skip),
            count: outer
                .count
                .min(inner.count.saturating_sub(outer.skip).max(0)),
        };

        let kind = PlanNodeKind::Limit(merged);
        if octx.contains_equivalent(
            qctx,
            outer_node.group,
            &kind,
            &inner_node.dependencies,
            &inner_node.bodies,
        ) {
            return Ok(TransformResult::unchanged());
        }

        let col_names = qctx.node(outer_node.plan_node).col_names.clone();
        let merged_plan = qctx.make_node(kind, vec![]);
        qctx.set_col_names(merged_plan, col_names);
        let new_node = octx.make_group_node(
            merged_plan,
            outer_node.group,
            inner_node.dependencies.clone(),
            inner_node.bodies.clone(),
        );
        Ok(TransformResult::with_new_node(new_node))
    }
}
