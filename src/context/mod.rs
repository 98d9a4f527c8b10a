//! 查询上下文模块
//!
//! `QueryContext` 是查询级的环境对象：持有本次编译中创建的全部计划节点
//! （arena 所有权），以及活动的符号表。规划器与优化器只按引用使用它，
//! 从不持有；查询编译结束时随上下文一并销毁。

pub mod ast;
pub mod clause;

pub use ast::AstContext;
pub use clause::{ClauseContext, CypherClauseKind};

use serde::Serialize;

use crate::core::{SymbolTable, Variable};
use crate::planner::plan::node::{PlanNode, PlanNodeId, PlanNodeKind};

/// 查询上下文
#[derive(Debug, Default, Serialize)]
pub struct QueryContext {
    nodes: Vec<PlanNode>,
    sym_table: SymbolTable,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建计划节点
    ///
    /// 输出变量名按「__种类_节点ID」生成并注册进符号表；
    /// 输入变量与列名默认继承第一个依赖，规划器按需覆盖
    pub fn make_node(&mut self, kind: PlanNodeKind, dependencies: Vec<PlanNodeId>) -> PlanNodeId {
        let id = PlanNodeId(self.nodes.len());
        let output_var = format!("__{}_{}", kind.name(), id.0);
        let input_var = dependencies
            .first()
            .map(|dep| self.nodes[dep.0].output_var.clone());
        let col_names = dependencies
            .first()
            .map(|dep| self.nodes[dep.0].col_names.clone())
            .unwrap_or_default();
        let cost = kind.default_cost();

        self.sym_table
            .register(Variable::new(&output_var, col_names.clone()));
        self.nodes.push(PlanNode {
            id,
            kind,
            output_var,
            input_var,
            col_names,
            dependencies,
            bodies: Vec::new(),
            cost,
        });
        id
    }

    pub fn node(&self, id: PlanNodeId) -> &PlanNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: PlanNodeId) -> &mut PlanNode {
        &mut self.nodes[id.0]
    }

    /// 设置节点列名并同步符号表
    pub fn set_col_names(&mut self, id: PlanNodeId, names: Vec<String>) {
        self.nodes[id.0].col_names = names.clone();
        let var = self.nodes[id.0].output_var.clone();
        self.sym_table.update_columns(&var, names);
    }

    /// 为节点追加主体（嵌套作用域的子计划入口）
    pub fn add_body(&mut self, id: PlanNodeId, body: PlanNodeId) {
        self.nodes[id.0].bodies.push(body);
    }

    pub fn sym_table(&self) -> &SymbolTable {
        &self.sym_table
    }

    pub fn sym_table_mut(&mut self) -> &mut SymbolTable {
        &mut self.sym_table
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
