//! 符号表模块 - 管理查询中的变量和别名
//!
//! 每个计划节点的输出变量在此注册，记录其有序列名。
//! 下游节点按变量名解析上游输出，因此列名必须与节点保持同步。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 变量信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub col_names: Vec<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, col_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            col_names,
        }
    }
}

/// 符号表
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    vars: HashMap<String, Variable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册变量，同名变量被覆盖
    pub fn register(&mut self, var: Variable) {
        self.vars.insert(var.name.clone(), var);
    }

    pub fn exists(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// 更新已注册变量的列名
    pub fn update_columns(&mut self, name: &str, col_names: Vec<String>) {
        if let Some(var) = self.vars.get_mut(name) {
            var.col_names = col_names;
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut table = SymbolTable::new();
        table.register(Variable::new("__Project_1", vec!["a".to_string()]));
        assert!(table.exists("__Project_1"));
        assert!(!table.exists("__Project_2"));
        let var = table.get("__Project_1").expect("变量应已注册");
        assert_eq!(var.col_names, vec!["a".to_string()]);
    }

    #[test]
    fn test_update_columns() {
        let mut table = SymbolTable::new();
        table.register(Variable::new("v", vec![]));
        table.update_columns("v", vec!["x".to_string(), "y".to_string()]);
        assert_eq!(
            table.get("v").expect("变量应已注册").col_names,
            vec!["x".to_string(), "y".to_string()]
        );
    }
}
