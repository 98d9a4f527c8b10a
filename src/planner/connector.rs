//! 连接器模块
//!
//! 负责把子句规划器产出的独立片段连接成一个计划：消费方片段的
//! `tail` 追加对生产方片段 `root` 的依赖，并同步消费方读取的变量名。
//! 依赖只追加、从不替换；重复连接同一对片段是编程错误。

use crate::context::QueryContext;
use crate::planner::plan::execution_plan::SubPlan;
use crate::planner::plan::node::PlanNodeKind;
use crate::planner::planner::PlannerError;

/// 计划连接器
pub struct SegmentsConnector;

impl SegmentsConnector {
    /// 添加输入
    ///
    /// 将 `producer` 作为 `consumer` 的上游：`consumer.tail` 追加对
    /// `producer.root` 的依赖，输入变量改读生产方的输出变量。
    /// `copy_col_names` 为真时消费方尾节点继承生产方根节点的列名。
    /// 返回的片段以消费方 `root` 为根、生产方 `tail` 为尾。
    pub fn add_input(
        qctx: &mut QueryContext,
        consumer: &SubPlan,
        producer: &SubPlan,
        copy_col_names: bool,
    ) -> Result<SubPlan, PlannerError> {
        let tail = consumer.tail;
        let dep = producer.root;

        if qctx.node(tail).dependencies.contains(&dep) {
            debug_assert!(
                false,
                "片段 {} 与 {} 已连接，重复连接是编程错误",
                tail, dep
            );
            return Err(PlannerError::DuplicateConnection(format!(
                "node {} already depends on node {}",
                tail, dep
            )));
        }

        let input_var = qctx.node(dep).output_var.clone();
        let dep_col_names = qctx.node(dep).col_names.clone();

        let node = qctx.node_mut(tail);
        node.dependencies.push(dep);
        node.input_var = Some(input_var);
        if copy_col_names {
            qctx.set_col_names(tail, dep_col_names);
        }

        Ok(SubPlan::new(consumer.root, producer.tail))
    }

    /// 创建交叉连接
    ///
    /// 两个片段做笛卡尔积，输出列为左右列的拼接
    pub fn cross_join(
        qctx: &mut QueryContext,
        left: &SubPlan,
        right: &SubPlan,
    ) -> Result<SubPlan, PlannerError> {
        let join = qctx.make_node(PlanNodeKind::CrossJoin, vec![left.root, right.root]);
        let mut col_names = qctx.node(left.root).col_names.clone();
        col_names.extend(qctx.node(right.root).col_names.clone());
        qctx.set_col_names(join, col_names);
        Ok(SubPlan::new(join, left.tail))
    }

    /// 创建左连接
    ///
    /// 用于可选 MATCH 等场景，保留左侧全部行
    pub fn left_join(
        qctx: &mut QueryContext,
        left: &SubPlan,
        right: &SubPlan,
    ) -> Result<SubPlan, PlannerError> {
        let join = qctx.make_node(PlanNodeKind::LeftJoin, vec![left.root, right.root]);
        let mut col_names = qctx.node(left.root).col_names.clone();
        col_names.extend(qctx.node(right.root).col_names.clone());
        qctx.set_col_names(join, col_names);
        Ok(SubPlan::new(join, left.tail))
    }
}
