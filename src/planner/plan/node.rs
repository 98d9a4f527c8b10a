//! 计划节点定义
//!
//! 所有计划节点存放在查询级 arena 中，通过稳定的整数句柄引用。
//! 节点之间的依赖是句柄而非对象引用，两个节点可以共享同一个子结果，
//! 整体构成 DAG；句柄可直接比较，结构可序列化用于测试快照。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::clause::YieldColumn;
use crate::core::{EdgeDirection, Expression, OrderDirection};

/// 计划节点句柄
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlanNodeId(pub usize);

impl fmt::Display for PlanNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanVertices {
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expand {
    pub edge_types: Vec<String>,
    pub direction: EdgeDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub condition: Expression,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub columns: Vec<YieldColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub factors: Vec<(usize, OrderDirection)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopN {
    pub factors: Vec<(usize, OrderDirection)>,
    pub skip: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub skip: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub group_keys: Vec<Expression>,
    pub group_items: Vec<YieldColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unwind {
    pub expr: Expression,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub var: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub condition: Expression,
}

/// 计划节点种类
///
/// 封闭枚举，只覆盖计划组合与代价估算需要的算子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanNodeKind {
    Start,
    ScanVertices(ScanVertices),
    Expand(Expand),
    Filter(Filter),
    Project(Project),
    Dedup,
    Sort(Sort),
    TopN(TopN),
    Limit(Limit),
    Aggregate(Aggregate),
    Unwind(Unwind),
    Argument(Argument),
    CrossJoin,
    LeftJoin,
    Loop(Loop),
}

impl PlanNodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            PlanNodeKind::Start => "Start",
            PlanNodeKind::ScanVertices(_) => "ScanVertices",
            PlanNodeKind::Expand(_) => "Expand",
            PlanNodeKind::Filter(_) => "Filter",
            PlanNodeKind::Project(_) => "Project",
            PlanNodeKind::Dedup => "Dedup",
            PlanNodeKind::Sort(_) => "Sort",
            PlanNodeKind::TopN(_) => "TopN",
            PlanNodeKind::Limit(_) => "Limit",
            PlanNodeKind::Aggregate(_) => "Aggregate",
            PlanNodeKind::Unwind(_) => "Unwind",
            PlanNodeKind::Argument(_) => "Argument",
            PlanNodeKind::CrossJoin => "CrossJoin",
            PlanNodeKind::LeftJoin => "LeftJoin",
            PlanNodeKind::Loop(_) => "Loop",
        }
    }

    /// 算子的默认代价估算
    ///
    /// 估算值为预计处理行数与单行开销的乘积，TopN 低于 Sort + Limit，
    /// 这是优化器能选出融合替代的前提
    pub fn default_cost(&self) -> f64 {
        match self {
            PlanNodeKind::Start => 0.0,
            PlanNodeKind::ScanVertices(_) => 100.0,
            PlanNodeKind::Expand(_) => 50.0,
            PlanNodeKind::Filter(_) => 10.0,
            PlanNodeKind::Project(_) => 5.0,
            PlanNodeKind::Dedup => 8.0,
            PlanNodeKind::Sort(_) => 30.0,
            PlanNodeKind::TopN(_) => 12.0,
            PlanNodeKind::Limit(_) => 1.0,
            PlanNodeKind::Aggregate(_) => 20.0,
            PlanNodeKind::Unwind(_) => 5.0,
            PlanNodeKind::Argument(_) => 0.0,
            PlanNodeKind::CrossJoin => 80.0,
            PlanNodeKind::LeftJoin => 60.0,
            PlanNodeKind::Loop(_) => 40.0,
        }
    }
}

/// 计划节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub id: PlanNodeId,
    pub kind: PlanNodeKind,
    /// 输出变量名，下游算子按此名字读取本节点的输出
    pub output_var: String,
    /// 本节点读取的上游输出变量
    pub input_var: Option<String>,
    /// 有序输出列名
    pub col_names: Vec<String>,
    /// 普通依赖：提供行数据的子节点
    pub dependencies: Vec<PlanNodeId>,
    /// 主体：条件执行的嵌套作用域（如循环体），不属于流水线依赖
    pub bodies: Vec<PlanNodeId>,
    /// 算子自身的代价估算
    pub cost: f64,
}

impl PlanNode {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}
