//! # 表达式模块
//!
//! 定义 lux 语言的表达式 AST。
//!
//! AST 由外部前端构造，本模块只负责数据结构本身和便捷构造函数；
//! 求值规则见 [`crate::runtime::eval`]。
//!
//! ## 设计原则
//!
//! - 一切皆表达式：声明、赋值、函数定义都会产生值
//! - 所有节点都**可序列化**，前端可以直接交付 JSON 形式的 AST
//! - 函数体用 `Rc` 持有，闭包值与 AST 共享同一份函数体

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Operator;

/// 表达式 AST 节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// 布尔字面量
    BooleanLiteral(bool),

    /// 整数字面量（32 位有符号）
    IntegerLiteral(i32),

    /// 字符串字面量
    StringLiteral(String),

    /// 标识符引用
    Identifier(String),

    /// 表达式块
    ///
    /// 块**不是**作用域边界：块内的声明对块之后的代码仍然可见。
    Block(Vec<Expr>),

    /// 变量声明 `var name = initializer`
    VariableDeclaration {
        name: String,
        initializer: Option<Box<Expr>>,
    },

    /// 变量赋值 `name = value`
    VariableAssignment { name: String, value: Box<Expr> },

    /// 函数声明 `fun name(parameters) body`
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: Rc<Expr>,
    },

    /// 函数调用 `callee(arguments)`
    CallExpression {
        callee: String,
        arguments: Vec<Expr>,
    },

    /// 二元运算 `lhs operator rhs`
    BinaryOperation {
        operator: Operator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// 创建布尔字面量
    pub fn bool(b: bool) -> Self {
        Self::BooleanLiteral(b)
    }

    /// 创建整数字面量
    pub fn int(n: i32) -> Self {
        Self::IntegerLiteral(n)
    }

    /// 创建字符串字面量
    pub fn string(s: impl Into<String>) -> Self {
        Self::StringLiteral(s.into())
    }

    /// 创建标识符引用
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// 创建表达式块
    pub fn block(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self::Block(exprs.into_iter().collect())
    }

    /// 创建带初始值的变量声明
    pub fn declare(name: impl Into<String>, initializer: Expr) -> Self {
        Self::VariableDeclaration {
            name: name.into(),
            initializer: Some(Box::new(initializer)),
        }
    }

    /// 创建不带初始值的变量声明（初始值为 Nil）
    pub fn declare_nil(name: impl Into<String>) -> Self {
        Self::VariableDeclaration {
            name: name.into(),
            initializer: None,
        }
    }

    /// 创建变量赋值
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Self::VariableAssignment {
            name: name.into(),
            value: Box::new(value),
        }
    }

    /// 创建函数声明
    pub fn function<P, S>(name: impl Into<String>, parameters: P, body: Expr) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FunctionDeclaration {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            body: Rc::new(body),
        }
    }

    /// 创建函数调用
    pub fn call(callee: impl Into<String>, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Self::CallExpression {
            callee: callee.into(),
            arguments: arguments.into_iter().collect(),
        }
    }

    /// 创建二元运算
    pub fn binary(operator: Operator, lhs: Expr, rhs: Expr) -> Self {
        Self::BinaryOperation {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// 创建加法
    pub fn plus(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(Operator::Plus, lhs, rhs)
    }

    /// 向表达式块末尾追加表达式
    ///
    /// 若 `self` 不是块，则将其包装为只含自身的块后再追加。
    pub fn push(self, expr: Expr) -> Self {
        match self {
            Self::Block(mut exprs) => {
                exprs.push(expr);
                Self::Block(exprs)
            }
            other => Self::Block(vec![other, expr]),
        }
    }

    /// 从 JSON 文本解析 AST
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        assert_eq!(Expr::int(3), Expr::IntegerLiteral(3));
        assert_eq!(Expr::ident("x"), Expr::Identifier("x".to_string()));
        assert_eq!(
            Expr::declare_nil("x"),
            Expr::VariableDeclaration {
                name: "x".to_string(),
                initializer: None,
            }
        );

        let expr = Expr::function("foo", ["x", "y"], Expr::ident("x"));
        match expr {
            Expr::FunctionDeclaration {
                name, parameters, ..
            } => {
                assert_eq!(name, "foo");
                assert_eq!(parameters, vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("期望 FunctionDeclaration，实际 {:?}", other),
        }
    }

    #[test]
    fn test_push_appends_to_block() {
        let block = Expr::block([Expr::int(1)]).push(Expr::int(2));
        assert_eq!(block, Expr::Block(vec![Expr::int(1), Expr::int(2)]));

        // 非块表达式会被包装
        let block = Expr::int(1).push(Expr::int(2));
        assert_eq!(block, Expr::Block(vec![Expr::int(1), Expr::int(2)]));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "Block": [
                { "VariableDeclaration": { "name": "x", "initializer": { "IntegerLiteral": 1 } } },
                { "BinaryOperation": {
                    "operator": "Plus",
                    "lhs": { "Identifier": "x" },
                    "rhs": { "IntegerLiteral": 2 }
                } }
            ]
        }"#;

        let expr = Expr::from_json(json).unwrap();
        assert_eq!(
            expr,
            Expr::block([
                Expr::declare("x", Expr::int(1)),
                Expr::plus(Expr::ident("x"), Expr::int(2)),
            ])
        );
    }

    #[test]
    fn test_json_rejects_unknown_node() {
        assert!(Expr::from_json(r#"{ "WhileLoop": [] }"#).is_err());
    }
}
