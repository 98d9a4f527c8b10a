//! 语句级上下文
//!
//! 校验通过的一条语句的语义摘要：语句类别、按出现顺序排列的读子句
//! 上下文，以及收尾的 RETURN 子句。规划器调度按语句类别加语义谓词
//! 选择策略，因此这里还带有影响调度的语义标记。

use serde::{Deserialize, Serialize};

use super::clause::ClauseContext;
use crate::planner::planner::SentenceKind;

/// 语句上下文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstContext {
    pub kind: SentenceKind,
    /// 按出现顺序排列的读子句（MATCH / UNWIND / WITH）
    pub clauses: Vec<ClauseContext>,
    /// 收尾的 RETURN 子句
    pub return_clause: Option<ClauseContext>,
    /// 是否为最短路径请求；同为 MATCH 语句，最短路径需要完全不同的计划结构
    pub shortest_path: bool,
}

impl AstContext {
    pub fn new(kind: SentenceKind) -> Self {
        Self {
            kind,
            clauses: Vec::new(),
            return_clause: None,
            shortest_path: false,
        }
    }

    pub fn with_clause(mut self, clause: ClauseContext) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn with_return(mut self, clause: ClauseContext) -> Self {
        self.return_clause = Some(clause);
        self
    }

    /// 语句中是否出现聚合
    pub fn has_aggregation(&self) -> bool {
        if let Some(ClauseContext::Return(ret)) = &self.return_clause {
            if ret.group.is_some() {
                return true;
            }
            if ret.yield_columns.iter().any(|c| c.expr.has_aggregate()) {
                return true;
            }
        }
        self.clauses.iter().any(|c| match c {
            ClauseContext::With(w) => w.yield_columns.iter().any(|c| c.expr.has_aggregate()),
            _ => false,
        })
    }
}
