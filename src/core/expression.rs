//! 表达式定义
//!
//! 规划与优化层只需要表达式的结构与确定性文本渲染，不负责求值。
//! 使用封闭的枚举代替原 C++ 中基于虚函数的表达式继承层次。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 字面量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

/// 聚合函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Collect,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Collect => "collect",
        }
    }
}

/// 表达式
///
/// 列命名策略依赖 `render` 的稳定性：未加别名的列以表达式的文本形式作为列名，
/// 下游的变量解析按该名字查找，因此渲染结果必须确定且稳定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Variable(String),
    Property {
        object: Box<Expression>,
        property: String,
    },
    Literal(Value),
    Function {
        name: String,
        args: Vec<Expression>,
    },
    Aggregate {
        func: AggregateFunction,
        arg: Box<Expression>,
        distinct: bool,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn property(object: Expression, property: impl Into<String>) -> Self {
        Expression::Property {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function {
            name: name.into(),
            args,
        }
    }

    pub fn aggregate(func: AggregateFunction, arg: Expression, distinct: bool) -> Self {
        Expression::Aggregate {
            func,
            arg: Box::new(arg),
            distinct,
        }
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// 渲染为确定性的文本形式
    pub fn render(&self) -> String {
        match self {
            Expression::Variable(name) => name.clone(),
            Expression::Property { object, property } => {
                format!("{}.{}", object.render(), property)
            }
            Expression::Literal(value) => value.to_string(),
            Expression::Function { name, args } => {
                let args_str: Vec<String> = args.iter().map(|a| a.render()).collect();
                format!("{}({})", name, args_str.join(", "))
            }
            Expression::Aggregate {
                func,
                arg,
                distinct,
            } => {
                if *distinct {
                    format!("{}(distinct {})", func.as_str(), arg.render())
                } else {
                    format!("{}({})", func.as_str(), arg.render())
                }
            }
            Expression::Binary { left, op, right } => {
                format!("({} {} {})", left.render(), op.as_str(), right.render())
            }
        }
    }

    /// 检查表达式是否包含聚合函数
    pub fn has_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate { .. } => true,
            Expression::Property { object, .. } => object.has_aggregate(),
            Expression::Function { args, .. } => args.iter().any(|a| a.has_aggregate()),
            Expression::Binary { left, right, .. } => {
                left.has_aggregate() || right.has_aggregate()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
