//! 子句上下文定义
//!
//! 子句上下文是校验器产出的只读语义事实，是各子句规划器的唯一输入。
//! 每种子句一个结构体，统一包装在 `ClauseContext` 枚举中；
//! 规划器在转换前必须核对上下文类别。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::{AliasType, EdgeDirection, Expression, OrderDirection};

/// Cypher 子句类型
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, Serialize, Deserialize)]
pub enum CypherClauseKind {
    Match,
    Where,
    Return,
    With,
    Unwind,
    Group,
    OrderBy,
    Pagination,
}

impl CypherClauseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CypherClauseKind::Match => "MATCH",
            CypherClauseKind::Where => "WHERE",
            CypherClauseKind::Return => "RETURN",
            CypherClauseKind::With => "WITH",
            CypherClauseKind::Unwind => "UNWIND",
            CypherClauseKind::Group => "GROUP",
            CypherClauseKind::OrderBy => "ORDER BY",
            CypherClauseKind::Pagination => "PAGINATION",
        }
    }
}

impl fmt::Display for CypherClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 输出列
///
/// 列命名策略：有别名取别名，无别名取表达式的文本形式。
/// 该名字是下游变量解析的依据，必须确定且稳定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldColumn {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl YieldColumn {
    pub fn new(expr: Expression, alias: Option<String>) -> Self {
        Self { expr, alias }
    }

    pub fn col_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expr.render(),
        }
    }
}

/// 节点模式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePattern {
    pub alias: Option<String>,
    pub labels: Vec<String>,
}

/// 边模式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePattern {
    pub alias: Option<String>,
    pub edge_types: Vec<String>,
    pub direction: EdgeDirection,
}

/// 路径模式
///
/// 不变式：`nodes.len() == edges.len() + 1`，节点与边交替出现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPattern {
    pub nodes: Vec<NodePattern>,
    pub edges: Vec<EdgePattern>,
}

/// 模式元素
///
/// 语法解析完成后变体集合即固定，使用封闭枚举代替虚基类层次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternElement {
    Node(NodePattern),
    Path(PathPattern),
}

impl PatternElement {
    /// 渲染为模式的文本形式
    pub fn render(&self) -> String {
        match self {
            PatternElement::Node(node) => Self::render_node(node),
            PatternElement::Path(path) => {
                let mut out = String::new();
                for (i, node) in path.nodes.iter().enumerate() {
                    out.push_str(&Self::render_node(node));
                    if let Some(edge) = path.edges.get(i) {
                        out.push_str(&Self::render_edge(edge));
                    }
                }
                out
            }
        }
    }

    fn render_node(node: &NodePattern) -> String {
        let alias = node.alias.as_deref().unwrap_or("");
        if node.labels.is_empty() {
            format!("({})", alias)
        } else {
            format!("({}:{})", alias, node.labels.join(":"))
        }
    }

    fn render_edge(edge: &EdgePattern) -> String {
        let types = if edge.edge_types.is_empty() {
            String::new()
        } else {
            format!("[:{}]", edge.edge_types.join("|"))
        };
        match edge.direction {
            EdgeDirection::Out => format!("-{}->", types),
            EdgeDirection::In => format!("<-{}-", types),
            EdgeDirection::Both => format!("-{}-", types),
        }
    }
}

/// MATCH 子句上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchClauseContext {
    pub elements: Vec<PatternElement>,
    pub filter: Option<Expression>,
    pub optional: bool,
    pub aliases_used: HashMap<String, AliasType>,
}

/// WHERE 子句上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhereClauseContext {
    pub filter: Option<Expression>,
    pub aliases_used: HashMap<String, AliasType>,
}

/// ORDER BY 子句上下文
///
/// 排序因子以（输入列下标，方向）的形式给出，由校验器完成列名到下标的解析
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderByClauseContext {
    pub indexed_order_factors: Vec<(usize, OrderDirection)>,
}

/// 分页上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationContext {
    pub skip: i64,
    pub limit: i64,
}

impl Default for PaginationContext {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: i64::MAX,
        }
    }
}

impl PaginationContext {
    /// skip 为 0 且 limit 为最大值时分页是显式空操作，规划时整体省略
    pub fn is_noop(&self) -> bool {
        self.skip == 0 && self.limit == i64::MAX
    }
}

/// UNWIND 子句上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnwindClauseContext {
    pub expr: Expression,
    pub alias: String,
}

/// 聚合（GROUP）子句上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupClauseContext {
    pub group_keys: Vec<Expression>,
    pub group_items: Vec<YieldColumn>,
    /// 聚合表达式被外层表达式包裹时需要在聚合之上补一个投影
    pub need_gen_project: bool,
    pub proj_cols: Vec<YieldColumn>,
}

/// WITH 子句上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithClauseContext {
    pub yield_columns: Vec<YieldColumn>,
    pub distinct: bool,
    pub where_clause: Option<Expression>,
    pub order_by: Option<OrderByClauseContext>,
    pub pagination: Option<PaginationContext>,
}

/// RETURN 子句上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnClauseContext {
    pub yield_columns: Vec<YieldColumn>,
    pub distinct: bool,
    pub group: Option<GroupClauseContext>,
    pub order_by: Option<OrderByClauseContext>,
    pub pagination: Option<PaginationContext>,
}

/// 子句上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseContext {
    Match(MatchClauseContext),
    Where(WhereClauseContext),
    Return(ReturnClauseContext),
    With(WithClauseContext),
    Unwind(UnwindClauseContext),
    Group(GroupClauseContext),
    OrderBy(OrderByClauseContext),
    Pagination(PaginationContext),
}

impl ClauseContext {
    pub fn kind(&self) -> CypherClauseKind {
        match self {
            ClauseContext::Match(_) => CypherClauseKind::Match,
            ClauseContext::Where(_) => CypherClauseKind::Where,
            ClauseContext::Return(_) => CypherClauseKind::Return,
            ClauseContext::With(_) => CypherClauseKind::With,
            ClauseContext::Unwind(_) => CypherClauseKind::Unwind,
            ClauseContext::Group(_) => CypherClauseKind::Group,
            ClauseContext::OrderBy(_) => CypherClauseKind::OrderBy,
            ClauseContext::Pagination(_) => CypherClauseKind::Pagination,
        }
    }
}
