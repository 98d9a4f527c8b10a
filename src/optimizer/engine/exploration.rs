//! 探索引擎
//!
//! 自底向上地在组 DAG 上应用重写规则，配合两级备忘（组粒度与节点
//! 粒度）保证单次 explore 必然终止；explore_until_max_round 在轮次
//! 上限内反复清空备忘重探，直到不再发现新成员或触顶。

use std::collections::HashSet;

use crate::context::QueryContext;
use crate::optimizer::plan::context::OptContext;
use crate::optimizer::plan::node::{GroupId, OptRule, OptimizerError};

/// 探索器
///
/// 持有单次优化的可变状态，按规则驱动组 DAG 的探索
pub struct Explorer<'a> {
    qctx: &'a mut QueryContext,
    octx: &'a mut OptContext,
    max_round: usize,
}

impl<'a> Explorer<'a> {
    pub fn new(qctx: &'a mut QueryContext, octx: &'a mut OptContext, max_round: usize) -> Self {
        Self {
            qctx,
            octx,
            max_round,
        }
    }

    /// 对组应用一次规则探索
    ///
    /// 1. 组已对该规则探索过则立即返回（备忘避免重复推导）
    /// 2. 对每个成员先递归探索其依赖组与主体组——严格自底向上，
    ///    规则只在输入稳定后点火
    /// 3. 对尚未按该规则探索过的成员尝试匹配，命中则把转换产出的
    ///    新成员追加进同一个组，现有成员从不移除
    /// 4. 无论是否命中，完成后在节点与组两个粒度记下备忘
    pub fn explore(&mut self, rule: &dyn OptRule, group: GroupId) -> Result<(), OptimizerError> {
        if self.octx.group(group).is_explored(rule.name()) {
            return Ok(());
        }

        // 成员列表在迭代中可能增长，新成员也要走完同样的流程
        let mut index = 0;
        while index < self.octx.group(group).nodes.len() {
            let node = self.octx.group(group).nodes[index];
            index += 1;

            let (dependencies, bodies) = {
                let group_node = self.octx.group_node(node);
                (group_node.dependencies.clone(), group_node.bodies.clone())
            };
            for dep in dependencies {
                self.explore(rule, dep)?;
            }
            for body in bodies {
                self.explore(rule, body)?;
            }

            if self.octx.group_node(node).is_explored(rule.name()) {
                continue;
            }

            if let Some(matched) = rule.pattern().match_node(self.octx, self.qctx, node) {
                let result = rule.transform(self.qctx, self.octx, &matched)?;
                if !result.new_group_nodes.is_empty() {
                    log::trace!(
                        "规则 {} 命中组 {} 成员 {}，新增 {} 个替代",
                        rule.name(),
                        group,
                        node,
                        result.new_group_nodes.len()
                    );
                }
            }

            self.octx.group_node_mut(node).set_explored(rule.name());
        }

        self.octx.group_mut(group).set_explored(rule.name());
        Ok(())
    }

    /// 在轮次上限内反复探索
    ///
    /// 每轮先清空作用域内该规则的备忘再重探；一轮结束后成员总数
    /// 不再增长即达到不动点。触顶是强制停止而非失败，截至当时发现
    /// 的替代全部保留。
    pub fn explore_until_max_round(
        &mut self,
        rule: &dyn OptRule,
        group: GroupId,
    ) -> Result<(), OptimizerError> {
        for round in 0..self.max_round {
            self.set_unexplored(rule.name(), group, &mut HashSet::new());
            let before = self.member_count(group, &mut HashSet::new());
            self.explore(rule, group)?;
            let after = self.member_count(group, &mut HashSet::new());
            if after == before {
                log::trace!(
                    "规则 {} 在第 {} 轮后到达不动点，成员总数 {}",
                    rule.name(),
                    round + 1,
                    after
                );
                return Ok(());
            }
        }

        log::debug!(
            "规则 {} 触及探索轮次上限 {}，使用已发现的替代",
            rule.name(),
            self.max_round
        );
        Ok(())
    }

    /// 清空作用域内某条规则的组粒度与节点粒度备忘
    fn set_unexplored(&mut self, rule_name: &str, group: GroupId, visited: &mut HashSet<GroupId>) {
        if !visited.insert(group) {
            return;
        }
        self.octx.group_mut(group).set_unexplored(rule_name);
        let members = self.octx.group(group).nodes.clone();
        for node in members {
            self.octx.group_node_mut(node).set_unexplored(rule_name);
            let (dependencies, bodies) = {
                let group_node = self.octx.group_node(node);
                (group_node.dependencies.clone(), group_node.bodies.clone())
            };
            for dep in dependencies {
                self.set_unexplored(rule_name, dep, visited);
            }
            for body in bodies {
                self.set_unexplored(rule_name, body, visited);
            }
        }
    }

    /// 作用域内可达的成员总数
    fn member_count(&self, group: GroupId, visited: &mut HashSet<GroupId>) -> usize {
        if !visited.insert(group) {
            return 0;
        }
        let mut count = self.octx.group(group).node_count();
        let members = self.octx.group(group).nodes.clone();
        for node in members {
            let group_node = self.octx.group_node(node);
            for dep in group_node.dependencies.clone() {
                count += self.member_count(dep, visited);
            }
            for body in group_node.bodies.clone() {
                count += self.member_count(body, visited);
            }
        }
        count
    }
}
