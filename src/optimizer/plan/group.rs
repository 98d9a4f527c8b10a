//! 优化组定义
//!
//! OptGroup 是一个等价类：「计算同一逻辑结果的若干种替代方式」。
//! 组持有有序的成员列表（探索期间只增不删，所有替代保留到代价
//! 选择）、组粒度的规则探索备忘，以及惰性缓存的（代价，最优成员）对。
//! 重写过程保持组身份不变，备忘正是按组身份记账的。

use serde::Serialize;
use std::collections::HashSet;

use super::node::{GroupId, GroupNodeId};

/// 优化组
#[derive(Debug, Clone, Serialize)]
pub struct OptGroup {
    pub id: GroupId,
    pub nodes: Vec<GroupNodeId>,
    /// 组粒度的规则探索备忘
    pub explored_rules: HashSet<String>,
    pub root_group: bool,
    pub output_var: Option<String>,
    /// 惰性缓存的最小代价与对应成员，新成员加入时失效
    pub best: Option<(f64, GroupNodeId)>,
}

impl OptGroup {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            nodes: Vec::new(),
            explored_rules: HashSet::new(),
            root_group: false,
            output_var: None,
            best: None,
        }
    }

    /// 追加成员并使缓存的最优对失效
    pub fn add_node(&mut self, node: GroupNodeId) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
            self.best = None;
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

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
