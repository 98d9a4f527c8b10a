//! 优化上下文定义
//!
//! OptContext 是单次查询优化的全局状态：组与组节点的 arena、
//! 计划节点到组的映射（用于在包装逻辑计划时保留共享——两个逻辑
//! 节点引用同一个子结果时包装到同一个组）。代价与计划提取也在
//! 这里实现。
//!
//! 主体组的代价与依赖组一样无条件计入所属节点（设计记录见 DESIGN.md）。

use serde::Serialize;
use std::collections::HashMap;

use super::group::OptGroup;
use super::node::{GroupId, GroupNodeId, OptGroupNode, OptimizerError};
use crate::context::QueryContext;
use crate::planner::plan::node::{PlanNodeId, PlanNodeKind};

/// 优化上下文
#[derive(Debug, Default, Serialize)]
pub struct OptContext {
    groups: Vec<OptGroup>,
    group_nodes: Vec<OptGroupNode>,
    /// 计划节点到所在组的映射，包装时用来保留共享
    #[serde(skip)]
    plan_to_group: HashMap<PlanNodeId, GroupId>,
}

impl OptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_group(&mut self) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(OptGroup::new(id));
        id
    }

    /// 创建组节点并挂入所属组
    pub fn make_group_node(
        &mut self,
        plan_node: PlanNodeId,
        group: GroupId,
        dependencies: Vec<GroupId>,
        bodies: Vec<GroupId>,
    ) -> GroupNodeId {
        let id = GroupNodeId(self.group_nodes.len());
        let mut node = OptGroupNode::new(id, plan_node, group);
        node.dependencies = dependencies;
        node.bodies = bodies;
        self.group_nodes.push(node);
        self.groups[group.0].add_node(id);
        id
    }

    pub fn group(&self, id: GroupId) -> &OptGroup {
        &self.groups[id.0]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut OptGroup {
        &mut self.groups[id.0]
    }

    pub fn group_node(&self, id: GroupNodeId) -> &OptGroupNode {
        &self.group_nodes[id.0]
    }

    pub fn group_node_mut(&mut self, id: GroupNodeId) -> &mut OptGroupNode {
        &mut self.group_nodes[id.0]
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group_node_count(&self) -> usize {
        self.group_nodes.len()
    }

    /// 包装逻辑计划为组 DAG
    ///
    /// 一个计划节点包装为一个组；两个节点引用同一个子结果时映射到
    /// 同一个组，共享被保留直到最终提取
    pub fn wrap_plan(&mut self, qctx: &QueryContext, root: PlanNodeId) -> GroupId {
        if let Some(group) = self.plan_to_group.get(&root) {
            return *group;
        }

        let (dep_ids, body_ids) = {
            let node = qctx.node(root);
            (node.dependencies.clone(), node.bodies.clone())
        };

        let mut dependencies = Vec::with_capacity(dep_ids.len());
        for dep in dep_ids {
            dependencies.push(self.wrap_plan(qctx, dep));
        }
        let mut bodies = Vec::with_capacity(body_ids.len());
        for body in body_ids {
            bodies.push(self.wrap_plan(qctx, body));
        }

        let group = self.make_group();
        self.groups[group.0].output_var = Some(qctx.node(root).output_var.clone());
        self.make_group_node(root, group, dependencies, bodies);
        self.plan_to_group.insert(root, group);
        group
    }

    /// 组的代价：成员代价的最小值，结果连同最优成员一起缓存
    pub fn group_cost(
        &mut self,
        qctx: &QueryContext,
        group: GroupId,
    ) -> Result<f64, OptimizerError> {
        if let Some((cost, _)) = self.groups[group.0].best {
            return Ok(cost);
        }

        let members = self.groups[group.0].nodes.clone();
        if members.is_empty() {
            return Err(OptimizerError::EmptyGroup(group.0));
        }

        let mut best_cost = f64::INFINITY;
        let mut best_node = members[0];
        for node in members {
            let cost = self.node_cost(qctx, node)?;
            if cost < best_cost {
                best_cost = cost;
                best_node = node;
            }
        }

        self.groups[group.0].best = Some((best_cost, best_node));
        Ok(best_cost)
    }

    /// 节点的代价：算子自身估算加所有依赖组与主体组的代价之和
    pub fn node_cost(
        &mut self,
        qctx: &QueryContext,
        node: GroupNodeId,
    ) -> Result<f64, OptimizerError> {
        let (plan_node, dependencies, bodies) = {
            let group_node = &self.group_nodes[node.0];
            (
                group_node.plan_node,
                group_node.dependencies.clone(),
                group_node.bodies.clone(),
            )
        };

        let mut total = qctx.node(plan_node).cost;
        for dep in dependencies {
            total += self.group_cost(qctx, dep)?;
        }
        for body in bodies {
            total += self.group_cost(qctx, body)?;
        }
        Ok(total)
    }

    /// 提取最优计划
    ///
    /// 逐组选出最小代价成员，递归提取其依赖组与主体组，并把提取
    /// 结果回填到成员的计划节点上。`use_cost` 为假时退化为选取每组
    /// 的首个成员（原计划）。
    pub fn extract_plan(
        &mut self,
        qctx: &mut QueryContext,
        group: GroupId,
        use_cost: bool,
    ) -> Result<PlanNodeId, OptimizerError> {
        let best = if use_cost {
            self.group_cost(qctx, group)?;
            match self.groups[group.0].best {
                Some((_, node)) => node,
                None => return Err(OptimizerError::EmptyGroup(group.0)),
            }
        } else {
            match self.groups[group.0].nodes.first() {
                Some(node) => *node,
                None => return Err(OptimizerError::EmptyGroup(group.0)),
            }
        };

        let (plan_node, dependencies, bodies) = {
            let group_node = &self.group_nodes[best.0];
            (
                group_node.plan_node,
                group_node.dependencies.clone(),
                group_node.bodies.clone(),
            )
        };

        let mut dep_plans = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            dep_plans.push(self.extract_plan(qctx, dep, use_cost)?);
        }
        let mut body_plans = Vec::with_capacity(bodies.len());
        for body in bodies {
            body_plans.push(self.extract_plan(qctx, body, use_cost)?);
        }

        let input_var = dep_plans
            .first()
            .map(|dep| qctx.node(*dep).output_var.clone());
        let node = qctx.node_mut(plan_node);
        node.dependencies = dep_plans;
        node.bodies = body_plans;
        if node.input_var.is_none() {
            node.input_var = input_var;
        }

        Ok(plan_node)
    }

    /// 组内是否已存在等价成员（同种计划节点、同样的依赖与主体组）
    ///
    /// 规则用它来保证重复调用安全：等价成员已在则返回不变结果
    pub fn contains_equivalent(
        &self,
        qctx: &QueryContext,
        group: GroupId,
        kind: &PlanNodeKind,
        dependencies: &[GroupId],
        bodies: &[GroupId],
    ) -> bool {
        self.groups[group.0].nodes.iter().any(|member| {
            let node = &self.group_nodes[member.0];
            node.dependencies == dependencies
                && node.bodies == bodies
                && qctx.node(node.plan_node).kind == *kind
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::node::{Limit, PlanNodeKind};

    #[test]
    fn test_wrap_plan_preserves_sharing() {
        let mut qctx = QueryContext::new();
        // 菱形：两个父节点共享同一个扫描
        let scan = qctx.make_node(PlanNodeKind::ScanVertices(Default::default()), vec![]);
        let left = qctx.make_node(PlanNodeKind::Dedup, vec![scan]);
        let right = qctx.make_node(
            PlanNodeKind::Limit(Limit { skip: 0, count: 1 }),
            vec![scan],
        );
        let top = qctx.make_node(PlanNodeKind::CrossJoin, vec![left, right]);

        let mut octx = OptContext::new();
        let root = octx.wrap_plan(&qctx, top);

        // 4 个计划节点包装出 4 个组，共享的扫描只包装一次
        assert_eq!(octx.group_count(), 4);
        let root_member = octx.group(root).nodes[0];
        let deps = octx.group_node(root_member).dependencies.clone();
        assert_eq!(deps.len(), 2);
        let left_dep = octx.group_node(octx.group(deps[0]).nodes[0]).dependencies[0];
        let right_dep = octx.group_node(octx.group(deps[1]).nodes[0]).dependencies[0];
        assert_eq!(left_dep, right_dep);
    }

    #[test]
    fn test_linear_chain_cost() {
        let mut qctx = QueryContext::new();
        let a = qctx.make_node(PlanNodeKind::Start, vec![]);
        let b = qctx.make_node(PlanNodeKind::Dedup, vec![a]);
        let c = qctx.make_node(PlanNodeKind::Dedup, vec![b]);
        qctx.node_mut(a).set_cost(2.0);
        qctx.node_mut(b).set_cost(3.0);
        qctx.node_mut(c).set_cost(5.0);

        let mut octx = OptContext::new();
        let root = octx.wrap_plan(&qctx, c);
        let cost = octx.group_cost(&qctx, root).expect("代价计算应成功");
        assert_eq!(cost, 10.0);
    }

    #[test]
    fn test_body_cost_summed() {
        let mut qctx = QueryContext::new();
        let scan = qctx.make_node(PlanNodeKind::Start, vec![]);
        let body = qctx.make_node(PlanNodeKind::Start, vec![]);
        let loop_node = qctx.make_node(
            PlanNodeKind::Loop(crate::planner::plan::node::Loop {
                condition: crate::core::Expression::variable("cond"),
            }),
            vec![scan],
        );
        qctx.add_body(loop_node, body);
        qctx.node_mut(scan).set_cost(4.0);
        qctx.node_mut(body).set_cost(7.0);
        qctx.node_mut(loop_node).set_cost(1.0);

        let mut octx = OptContext::new();
        let root = octx.wrap_plan(&qctx, loop_node);
        let cost = octx.group_cost(&qctx, root).expect("代价计算应成功");
        assert_eq!(cost, 12.0);
    }

    #[test]
    fn test_empty_group_cost_is_error() {
        let mut octx = OptContext::new();
        let qctx = QueryContext::new();
        let group = octx.make_group();
        let err = octx
            .group_cost(&qctx, group)
            .expect_err("空组应报错");
        assert!(matches!(err, OptimizerError::EmptyGroup(_)));
    }
}
