//! TopN 融合规则
//!
//! Limit 紧跟 Sort 时，把分页参数并进排序生成 TopN 节点：
//! 只维护前 skip + count 行的堆排序远比全量排序加截断便宜。
//! 新节点作为 Limit 所在组的等价替代，依赖 Sort 的输入组。

use crate::context::QueryContext;
use crate::optimizer::plan::context::OptContext;
use crate::optimizer::plan::node::{
    MatchedResult, OptRule, OptimizerError, Pattern, TransformResult,
};
use crate::planner::plan::node::{PlanNodeKind, TopN};

/// TopN 融合规则
#[derive(Debug)]
pub struct TopNRule;

impl OptRule for TopNRule {
    fn name(&self) -> &'static str {
        "TopNRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::node("Limit").with_dependency(Pattern::node("Sort"))
    }

    fn transform(
        &self,
        qctx: &mut QueryContext,
        octx: &mut OptContext,
        matched: &MatchedResult,
    ) -> Result<TransformResult, OptimizerError> {
        let sort_matched = matched.dependencies.first().ok_or_else(|| {
            OptimizerError::InvalidPlanStructure("TopN 融合缺少依赖匹配".to_string())
        })?;

        let limit_node = octx.group_node(matched.node).clone();
        let sort_node = octx.group_node(sort_matched.node).clone();

        let (skip, count) = match &qctx.node(limit_node.plan_node).kind {
            PlanNodeKind::Limit(limit) => (limit.skip, limit.count),
            _ => return Ok(TransformResult::unchanged()),
        };
        let factors = match &qctx.node(sort_node.plan_node).kind {
            PlanNodeKind::Sort(sort) => sort.factors.clone(),
            _ => return Ok(TransformResult::unchanged()),
        };

        let kind = PlanNodeKind::TopN(TopN {
            factors,
            skip,
            count,
        });
        if octx.contains_equivalent(
            qctx,
            limit_node.group,
            &kind,
            &sort_node.dependencies,
            &sort_node.bodies,
        ) {
            return Ok(TransformResult::unchanged());
        }

        let col_names = qctx.node(limit_node.plan_node).col_names.clone();
        let top_n = qctx.make_node(kind, vec![]);
        qctx.set_col_names(top_n, col_names);
        let new_node = octx.make_group_node(
            top_n,
            limit_node.group,
            sort_node.dependencies.clone(),
            sort_node.bodies.clone(),
        );
        Ok(TransformResult::with_new_node(new_node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OrderDirection;
    use crate::optimizer::engine::Explorer;
    use crate::planner::plan::node::{Limit, ScanVertices, Sort};

    fn sort_limit_plan(
        qctx: &mut QueryContext,
    ) -> crate::planner::plan::node::PlanNodeId {
        let scan = qctx.make_node(
            PlanNodeKind::ScanVertices(ScanVertices::default()),
            vec![],
        );
        let sort = qctx.make_node(
            PlanNodeKind::Sort(Sort {
                factors: vec![(0, OrderDirection::Desc)],
            }),
            vec![scan],
        );
        qctx.make_node(
            PlanNodeKind::Limit(Limit { skip: 2, count: 10 }),
            vec![sort],
        )
    }

    #[test]
    fn test_fuses_limit_over_sort() {
        let mut qctx = QueryContext::new();
        let limit = sort_limit_plan(&mut qctx);
        let mut octx = OptContext::new();
        let root = octx.wrap_plan(&qctx, limit);

        let rule = TopNRule;
        Explorer::new(&mut qctx, &mut octx, 8)
            .explore_until_max_round(&rule, root)
            .expect("探索应成功");

        assert_eq!(octx.group(root).node_count(), 2);
        let alternative = octx.group(root).nodes[1];
        match &qctx.node(octx.group_node(alternative).plan_node).kind {
            PlanNodeKind::TopN(top_n) => {
                assert_eq!(top_n.skip, 2);
                assert_eq!(top_n.count, 10);
                assert_eq!(top_n.factors, vec![(0, OrderDirection::Desc)]);
            }
            other => panic!("期望 TopN，得到 {:?}", other),
        }
    }

    #[test]
    fn test_cost_model_prefers_top_n() {
        let mut qctx = QueryContext::new();
        let limit = sort_limit_plan(&mut qctx);
        let mut octx = OptContext::new();
        let root = octx.wrap_plan(&qctx, limit);

        let rule = TopNRule;
        Explorer::new(&mut qctx, &mut octx, 8)
            .explore_until_max_round(&rule, root)
            .expect("探索应成功");

        let best = octx
            .extract_plan(&mut qctx, root, true)
            .expect("提取应成功");
        assert_eq!(qctx.node(best).name(), "TopN");
        // TopN 直接依赖扫描，Sort 不再出现在最优计划里
        assert_eq!(
            qctx.node(qctx.node(best).dependencies[0]).name(),
            "ScanVertices"
        );
    }
}
