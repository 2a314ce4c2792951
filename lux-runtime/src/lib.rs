//! # Lux Runtime
//!
//! lux 脚本语言的求值核心。
//!
//! ## 架构概述
//!
//! `lux-runtime` 是纯逻辑核心，不负责词法/语法分析，也不做任何 IO。
//! 外部前端构造好 AST 后交给解释器求值，每次顶层求值产生一个值：
//!
//! ```text
//! Frontend                       Runtime
//!   │                              │
//!   │──── Expr (AST) ────────────►│
//!   │                              │ evaluate()
//!   │◄─── Result<Value, EvalError> ─│
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`Expr`]：表达式 AST
//! - [`Value`]：运行时值
//! - [`Interpreter`]：解释器，持有全局作用域
//! - [`EvalError`]：求值错误
//!
//! ## 使用示例
//!
//! ```ignore
//! use lux_runtime::{Expr, Interpreter, Value};
//!
//! // fun foo(x) { x + 2 }
//! // foo(1)
//! let program = Expr::block([
//!     Expr::function("foo", ["x"], Expr::plus(Expr::ident("x"), Expr::int(2))),
//!     Expr::call("foo", [Expr::int(1)]),
//! ]);
//!
//! let mut interpreter = Interpreter::new();
//! assert_eq!(interpreter.evaluate(&program)?, Value::Integer(3));
//! ```
//!
//! ## 模块结构
//!
//! - [`script`]：AST 定义
//! - [`value`]：运行时值
//! - [`runtime`]：作用域链、求值规则、解释器
//! - [`config`]：求值配置
//! - [`error`]：错误类型定义

pub mod config;
pub mod error;
pub mod runtime;
pub mod script;
pub mod value;

// 重导出核心类型
pub use config::{EvalConfig, LogicSemantics, UndeclaredAssignment};
pub use error::{ConfigError, EvalError, EvalResult};
pub use runtime::{Interpreter, ScopeHeap, ScopeRef, WeakScope};
pub use script::{Expr, Operator};
pub use value::{Function, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let expr = Expr::plus(Expr::int(1), Expr::int(2));
        let mut interpreter = Interpreter::with_config(EvalConfig::default());
        assert_eq!(interpreter.evaluate(&expr), Ok(Value::Integer(3)));

        let _scope: &ScopeRef = interpreter.global_scope();
        let _op = Operator::Minus;
        let _logic = LogicSemantics::Legacy;
        let _policy = UndeclaredAssignment::Error;
    }
}
