//! # Runtime 模块
//!
//! 求值核心，负责作用域管理和 AST 求值。
//!
//! ## 模块结构
//!
//! - [`scope`]：作用域链
//! - [`eval`]：各 AST 节点的求值规则
//! - [`interpreter`]：解释器入口和函数调用协议

pub mod eval;
pub mod interpreter;
pub mod scope;

pub use eval::{EvalContext, evaluate};
pub use interpreter::Interpreter;
pub use scope::{Assignment, ScopeHeap, ScopeRef, WeakScope};
