//! 投影合并规则
//!
//! 匹配上下相邻的两个投影。外层列都是对内层输出列的简单变量引用时，
//! 把内层表达式代入外层，生成一个直接读内层输入的合并投影，作为
//! 等价替代追加进外层投影所在的组。

use crate::context::clause::YieldColumn;
use crate::context::QueryContext;
use crate::core::Expression;
use crate::optimizer::plan::context::OptContext;
use crate::optimizer::plan::node::{
    MatchedResult, OptRule, OptimizerError, Pattern, TransformResult,
};
use crate::planner::plan::node::{PlanNodeKind, Project};

/// 投影合并规则
#[derive(Debug)]
pub struct CollapseProjectRule;

impl OptRule for CollapseProjectRule {
    fn name(&self) -> &'static str {
        "CollapseProjectRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::node("Project").with_dependency(Pattern::node("Project"))
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        octx: &mut OptContext,
        matched: &MatchedResult,
    ) -> Result<TransformResult, OptimizerError> {
        let inner_matched = matched.dependencies.first().ok_or_else(|| {
            OptimizerError::InvalidPlanStructure("投影合并缺少依赖匹配".to_string())
        })?;

        let outer_node = octx.group_node(matched.node).clone();
        let inner_node = octx.group_node(inner_matched.node).clone();

        let outer_columns = match &qctx.node(outer_node.plan_node).kind {
            PlanNodeKind::Project(project) => project.columns.clone(),
            _ => return Ok(TransformResult::unchanged()),
        };
        let (inner_columns, inner_col_names) = {
            let inner_plan = qctx.node(inner_node.plan_node);
            match &inner_plan.kind {
                PlanNodeKind::Project(project) => {
                    (project.columns.clone(), inner_plan.col_names.clone())
                }
                _ => return Ok(TransformResult::unchanged()),
            }
        };
        if inner_columns.len() != inner_col_names.len() {
            return Ok(TransformResult::unchanged());
        }

        // 外层列必须都是对内层输出列的简单变量引用
        let mut merged = Vec::with_capacity(outer_columns.len());
        for column in &outer_columns {
            let name = match &column.expr {
                Expression::Variable(name) => name,
                _ => return Ok(TransformResult::unchanged()),
            };
            let position = match inner_col_names.iter().position(|col| col == name) {
                Some(position) => position,
                None => return Ok(TransformResult::unchanged()),
            };
            merged.push(YieldColumn::new(
                inner_columns[position].expr.clone(),
                Some(column.col_name()),
            ));
        }

        let kind = PlanNodeKind::Project(Project { columns: merged });
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
        let collapsed = qctx.make_node(kind, vec![]);
        qctx.set_col_names(collapsed, col_names);
        let new_node = octx.make_group_node(
            collapsed,
            outer_node.group,
            inner_node.dependencies.clone(),
            inner_node.bodies.clone(),
        );
        Ok(TransformResult::with_new_node(new_node))
    }
}
