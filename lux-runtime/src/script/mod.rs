//! # Script 模块
//!
//! 脚本的 AST 定义。
//!
//! ## 模块结构
//!
//! - [`expr`]：表达式节点及构造函数
//! - [`operator`]：二元运算符

pub mod expr;
pub mod operator;

pub use expr::Expr;
pub use operator::Operator;
