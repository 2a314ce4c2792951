//! # Error 模块
//!
//! 定义 lux-runtime 中使用的错误类型。
//!
//! 求值过程中的任何错误都会立即中止整个求值，不存在语言层面的捕获机制。
//! 宿主只在 [`Interpreter::evaluate`](crate::Interpreter::evaluate) 这一层接住错误。

use thiserror::Error;

use crate::script::Operator;

/// 求值错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// 变量未定义
    #[error("变量 '{name}' 未定义")]
    UndefinedVariable { name: String },

    /// 操作数类型不匹配
    #[error("类型不匹配: '{operator}' 期望 {expected}，实际 {actual}")]
    TypeMismatch {
        operator: Operator,
        expected: &'static str,
        actual: &'static str,
    },

    /// 运算符不适用于该类型
    #[error("运算符 '{operator}' 不能用于 {operand}")]
    InvalidOperator {
        operator: Operator,
        operand: &'static str,
    },

    /// 调用目标不是函数
    #[error("'{name}' 不是函数，实际为 {actual}")]
    NotCallable { name: String, actual: &'static str },

    /// 参数个数不匹配
    #[error("函数 '{name}' 需要 {expected} 个参数，实际传入 {actual} 个")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// 整数除零
    #[error("整数除零")]
    DivisionByZero,
}

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置内容解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result 类型别名
pub type EvalResult<T> = Result<T, EvalError>;
