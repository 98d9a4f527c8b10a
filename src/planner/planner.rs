//! 规划器注册机制
//!
//! 按语句类别维护一张有序的（谓词，工厂）表，按注册顺序逐个求值，
//! 第一个接受语句上下文的谓词胜出。同一语法类别的语句可能因语义
//! 上下文不同（最短路径请求、聚合、可选匹配）而需要结构完全不同
//! 的计划，这层间接正是为此而设。

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::clause::CypherClauseKind;
use crate::context::{AstContext, QueryContext};
use crate::planner::plan::execution_plan::SubPlan;

/// 语句类别
#[derive(Debug, Clone, PartialEq, Hash, Eq, Copy, Serialize, Deserialize)]
pub enum SentenceKind {
    Match,
    Lookup,
    Path,
}

impl SentenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentenceKind::Match => "MATCH",
            SentenceKind::Lookup => "LOOKUP",
            SentenceKind::Path => "PATH",
        }
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 匹配函数类型
pub type MatchFunc = fn(&AstContext) -> bool;

/// 规划器实例化函数类型
pub type PlannerInstantiateFunc = fn() -> Box<dyn Planner>;

/// 匹配和实例化结构
#[derive(Debug, Clone)]
pub struct MatchAndInstantiate {
    pub match_func: MatchFunc,
    pub instantiate_func: PlannerInstantiateFunc,
}

impl MatchAndInstantiate {
    pub fn new(match_func: MatchFunc, instantiate_func: PlannerInstantiateFunc) -> Self {
        Self {
            match_func,
            instantiate_func,
        }
    }
}

/// 规划器特征
pub trait Planner: fmt::Debug {
    fn transform(
        &mut self,
        qctx: &mut QueryContext,
        ast_ctx: &AstContext,
    ) -> Result<SubPlan, PlannerError>;
}

/// 规划器注册表
///
/// 静态有序表，注册完成后不再变化
#[derive(Debug, Default)]
pub struct PlannerRegistry {
    planners: HashMap<SentenceKind, Vec<MatchAndInstantiate>>,
}

impl PlannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造带默认注册的注册表
    ///
    /// MATCH 语句注册两个策略：最短路径规划器在前（谓词要求语义上
    /// 存在最短路径请求），顺序规划器在后（接受任意 MATCH 语句）
    pub fn with_defaults() -> Self {
        use crate::planner::statements::{SequentialPlanner, ShortestPathPlanner};

        let mut registry = Self::new();
        registry.register(
            SentenceKind::Match,
            ShortestPathPlanner::match_ast_ctx,
            ShortestPathPlanner::make,
        );
        registry.register(
            SentenceKind::Match,
            SequentialPlanner::match_ast_ctx,
            SequentialPlanner::make,
        );
        registry
    }

    /// 注册规划器，同类别内保持注册顺序
    pub fn register(
        &mut self,
        sentence_kind: SentenceKind,
        match_func: MatchFunc,
        instantiate_func: PlannerInstantiateFunc,
    ) {
        self.planners
            .entry(sentence_kind)
            .or_default()
            .push(MatchAndInstantiate::new(match_func, instantiate_func));
    }

    /// 创建执行计划
    ///
    /// 语句类别未注册与已注册但无谓词命中是两种不同的错误
    pub fn create_plan(
        &self,
        qctx: &mut QueryContext,
        ast_ctx: &AstContext,
    ) -> Result<SubPlan, PlannerError> {
        let planners = self
            .planners
            .get(&ast_ctx.kind)
            .ok_or(PlannerError::NoPlannerForStatement(ast_ctx.kind))?;

        for planner_info in planners {
            if (planner_info.match_func)(ast_ctx) {
                let mut planner = (planner_info.instantiate_func)();
                log::debug!("语句 {} 命中规划器 {:?}", ast_ctx.kind, planner);
                return planner.transform(qctx, ast_ctx);
            }
        }

        Err(PlannerError::NoPlannerMatched(ast_ctx.kind))
    }

    pub fn planner_count(&self) -> usize {
        self.planners.values().map(|v| v.len()).sum()
    }

    pub fn planner_count_for(&self, sentence_kind: &SentenceKind) -> usize {
        self.planners
            .get(sentence_kind)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

/// 规划器错误类型
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Not a valid context for {planner}: expected {expected}, found {found}")]
    ContextKindMismatch {
        planner: &'static str,
        expected: CypherClauseKind,
        found: CypherClauseKind,
    },

    #[error("No planners registered for sentence kind: {0}")]
    NoPlannerForStatement(SentenceKind),

    #[error("No planner matches sentence kind: {0}")]
    NoPlannerMatched(SentenceKind),

    #[error("Duplicate connection between plan segments: {0}")]
    DuplicateConnection(String),

    #[error("Plan generation failed: {0}")]
    PlanGenerationFailed(String),

    #[error("Missing input: {0}")]
    MissingInput(String),
}
