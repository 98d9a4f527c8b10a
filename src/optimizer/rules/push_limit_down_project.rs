//! 分页下推规则
//!
//! Limit 紧跟 Project 时，把分页推到投影之下：先截断再投影，
//! 投影只处理截断后的行。下推需要新建一个中间组容纳下推后的
//! Limit，再向根组追加读该组的投影替代。

use crate::context::QueryContext;
use crate::optimizer::plan::context::OptContext;
use crate::optimizer::plan::node::{
    MatchedResult, OptRule, OptimizerError, Pattern, TransformResult,
};
use crate::planner::plan::node::PlanNodeKind;

/// 分页下推规则
#[derive(Debug)]
pub struct PushLimitDownProjectRule;

impl OptRule for PushLimitDownProjectRule {
    fn name(&self) -> &'static str {
        "PushLimitDownProjectRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::node("Limit").with_dependency(Pattern::node("Project"))
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        octx: &mut OptContext,
        matched: &MatchedResult,
    ) -> Result<TransformResult, OptimizerError> {
        let project_matched = matched.dependencies.first().ok_or_else(|| {
            OptimizerError::InvalidPlanStructure("分页下推缺少依赖匹配".to_string())
        })?;

        let limit_node = octx.group_node(matched.node).clone();
        let project_node = octx.group_node(project_matched.node).clone();

        let limit_kind = qctx.node(limit_node.plan_node).kind.clone();
        if !matches!(limit_kind, PlanNodeKind::Limit(_)) {
            return Ok(TransformResult::unchanged());
        }
        let project_kind = qctx.node(project_node.plan_node).kind.clone();
        if !matches!(project_kind, PlanNodeKind::Project(_)) {
            return Ok(TransformResult::unchanged());
        }

        let input_group = match project_node.dependencies.first() {
            Some(group) => *group,
            None => return Ok(TransformResult::unchanged()),
        };

        // 根组已有等价的下推结果则不再追加：
        // 存在一个投影替代，其唯一依赖组里有同参数的 Limit 读投影的输入组
        let already_pushed = octx.group(limit_node.group).nodes.iter().any(|member| {
            let node = octx.group_node(*member);
            if qctx.node(node.plan_node).kind != project_kind {
                return false;
            }
            match node.dependencies.as_slice() {
                [only] => octx.contains_equivalent(qctx, *only, &limit_kind, &[input_group], &[]),
                _ => false,
            }
        });
        if already_pushed {
            return Ok(TransformResult::unchanged());
        }

        // 下推后的 Limit 列名继承投影的输入
        let input_col_names = octx
            .group(input_group)
            .nodes
            .first()
            .map(|member| {
                qctx.node(octx.group_node(*member).plan_node)
                    .col_names
                    .clone()
            })
            .unwrap_or_default();
        let pushed_limit = qctx.make_node(limit_kind, vec![]);
        qctx.set_col_names(pushed_limit, input_col_names);
        let limit_group = octx.make_group();
        octx.make_group_node(pushed_limit, limit_group, vec![input_group], vec![]);

        let project_col_names = qctx.node(project_node.plan_node).col_names.clone();
        let lifted_project = qctx.make_node(project_kind, vec![]);
        qctx.set_col_names(lifted_project, project_col_names);
        let new_node =
            octx.make_group_node(lifted_project, limit_node.group, vec![limit_group], vec![]);

        Ok(TransformResult::with_new_node(new_node))
    }
}
