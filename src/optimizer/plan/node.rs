//! 优化节点定义
//!
//! OptGroupNode 封装一个计划节点，是等价组中的一个具体替代。
//! 它持有两类子引用：dependencies 是提供行数据的普通子组，
//! bodies 是条件执行的嵌套作用域子组（如循环体）。两者分开存放，
//! 规则匹配与代价计算对它们的处理并不相同。
//! 所有引用都是 arena 句柄，身份可直接比较。

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::context::QueryContext;
use crate::optimizer::plan::context::OptContext;
use crate::planner::plan::node::PlanNodeId;

/// 等价组句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 组节点句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupNodeId(pub usize);

impl fmt::Display for GroupNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 优化组节点
#[derive(Debug, Clone, Serialize)]
pub struct OptGroupNode {
    pub id: GroupNodeId,
    pub plan_node: PlanNodeId,
    pub group: GroupId,
    pub dependencies: Vec<GroupId>,
    pub bodies: Vec<GroupId>,
    /// 节点粒度的规则探索备忘
    pub explored_rules: HashSet<String>,
}

impl OptGroupNode {
    pub fn new(id: GroupNodeId, plan_node: PlanNodeId, group: GroupId) -> Self {
        Self {
            id,
            plan_node,
            group,
            dependencies: Vec::new(),
            bodies: Vec::new(),
            explored_rules: HashSet::new(),
        }
    }

    pub fn is_explored(&self, rule_name: &str) -> bool {
        self.explored_rules.contains(rule_name)
    }

    pub fn set_explored(&mut self, rule_name: &str) {
        self.explored_rules.insert(rule_name.to_string());
    }

    pub fn set_unexplored(&mut self, rule_name: &str) {
        self.explored_rules.remove(rule_name);
    }
}

/// 匹配节点
#[derive(Debug, Clone)]
pub enum MatchNode {
    Single(&'static str),
    Multi(Vec<&'static str>),
    Any,
}

impl MatchNode {
    pub fn matches(&self, node_name: &str) -> bool {
        match self {
            MatchNode::Single(name) => *name == node_name,
            MatchNode::Multi(names) => names.contains(&node_name),
            MatchNode::Any => true,
        }
    }
}

/// 规则模式
///
/// 描述规则匹配的根节点形状，以及（可选）对直接依赖节点形状的要求。
/// 依赖模式按位置对应根节点的依赖组，在对应组内找任一命中的成员。
#[derive(Debug, Clone)]
pub struct Pattern {
    pub node: MatchNode,
    pub dependencies: Vec<Pattern>,
}

impl Pattern {
    pub fn node(name: &'static str) -> Self {
        Self {
            node: MatchNode::Single(name),
            dependencies: Vec::new(),
        }
    }

    pub fn multi(names: Vec<&'static str>) -> Self {
        Self {
            node: MatchNode::Multi(names),
            dependencies: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self {
            node: MatchNode::Any,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, dependency: Pattern) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// 对组节点尝试匹配
    pub fn match_node(
        &self,
        octx: &OptContext,
        qctx: &QueryContext,
        node_id: GroupNodeId,
    ) -> Option<MatchedResult> {
        let group_node = octx.group_node(node_id);
        let plan_name = qctx.node(group_node.plan_node).name();
        if !self.node.matches(plan_name) {
            return None;
        }

        if group_node.dependencies.len() < self.dependencies.len() {
            return None;
        }

        let mut dep_matches = Vec::with_capacity(self.dependencies.len());
        for (i, dep_pattern) in self.dependencies.iter().enumerate() {
            let dep_group = group_node.dependencies[i];
            let matched = octx
                .group(dep_group)
                .nodes
                .iter()
                .find_map(|member| dep_pattern.match_node(octx, qctx, *member))?;
            dep_matches.push(matched);
        }

        Some(MatchedResult {
            node: node_id,
            dependencies: dep_matches,
        })
    }
}

/// 匹配结果
///
/// 命中的组节点与按模式位置对应的依赖命中
#[derive(Debug, Clone)]
pub struct MatchedResult {
    pub node: GroupNodeId,
    pub dependencies: Vec<MatchedResult>,
}

/// 转换结果
///
/// 规则向被匹配的组追加的新成员；现有成员从不移除，
/// 所有替代都要保留到代价选择阶段
#[derive(Debug, Default, Clone)]
pub struct TransformResult {
    pub new_group_nodes: Vec<GroupNodeId>,
}

impl TransformResult {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn with_new_node(node: GroupNodeId) -> Self {
        Self {
            new_group_nodes: vec![node],
        }
    }
}

/// 重写规则特征
///
/// 规则无状态：声明匹配的形状，转换产出等价的新成员。
/// 探索引擎可能跨轮次对同一形状重复调用同一规则，实现必须保证
/// 重复调用安全：要么不再命中，要么检测到等价成员已存在并返回
/// 不变结果。
pub trait OptRule: fmt::Debug {
    fn name(&self) -> &'static str;

    fn pattern(&self) -> Pattern;

    fn transform(
        &self,
        qctx: &mut QueryContext,
        octx: &mut OptContext,
        matched: &MatchedResult,
    ) -> Result<TransformResult, OptimizerError>;
}

/// 优化器错误类型
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Group not found: {0}")]
    GroupNotFound(usize),

    #[error("Group node not found: {0}")]
    GroupNodeNotFound(usize),

    #[error("Empty group: {0}")]
    EmptyGroup(usize),

    #[error("Rule application failed: {rule} - {reason}")]
    RuleApplicationFailed { rule: &'static str, reason: String },

    #[error("Invalid plan structure: {0}")]
    InvalidPlanStructure(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::node::PlanNodeKind;

    #[test]
    fn test_match_node_variants() {
        assert!(MatchNode::Single("Project").matches("Project"));
        assert!(!MatchNode::Single("Project").matches("Filter"));
        assert!(MatchNode::Multi(vec!["Project", "Filter"]).matches("Filter"));
        assert!(MatchNode::Any.matches("ScanVertices"));
    }

    #[test]
    fn test_pattern_with_dependency_matches() {
        let mut qctx = QueryContext::new();
        let mut octx = OptContext::new();

        let scan = qctx.make_node(
            PlanNodeKind::ScanVertices(Default::default()),
            vec![],
        );
        let dedup = qctx.make_node(PlanNodeKind::Dedup, vec![scan]);
        let root = octx.wrap_plan(&qctx, dedup);
        let root_member = octx.group(root).nodes[0];

        let hit = Pattern::node("Dedup")
            .with_dependency(Pattern::node("ScanVertices"))
            .match_node(&octx, &qctx, root_member);
        assert!(hit.is_some());
        assert_eq!(hit.map(|m| m.dependencies.len()), Some(1));

        let miss = Pattern::node("Dedup")
            .with_dependency(Pattern::node("Project"))
            .match_node(&octx, &qctx, root_member);
        assert!(miss.is_none());
    }
}
