//! # Config 模块
//!
//! 求值语义的可选项。
//!
//! ## 配置优先级
//!
//! 1. 代码中显式调用 `with_*`（最高）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）
//!
//! 所有字段都带默认值，空对象 `{}` 即为默认配置。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// `and` / `or` 的求值语义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicSemantics {
    /// 常规短路求值：`and` 左侧为 false 时短路，`or` 左侧为 true 时短路
    #[default]
    ShortCircuit,

    /// 兼容旧行为：两个运算符都在左侧为 true 时直接返回左侧，
    /// 否则求值并返回右侧
    Legacy,
}

/// 对从未声明过的变量赋值时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeclaredAssignment {
    /// 在全局作用域中隐式创建该变量
    #[default]
    Global,

    /// 报 `UndefinedVariable` 错误
    Error,
}

/// 默认回收阈值
const DEFAULT_CYCLE_COLLECTION_THRESHOLD: usize = 256;

fn default_cycle_collection_threshold() -> usize {
    DEFAULT_CYCLE_COLLECTION_THRESHOLD
}

/// 求值配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// 逻辑运算语义
    #[serde(default)]
    pub logic: LogicSemantics,

    /// 未声明变量赋值策略
    #[serde(default)]
    pub undeclared_assignment: UndeclaredAssignment,

    /// 顶层求值结束后，新建作用域数达到该值时回收作用域环（0 表示只手动回收）
    #[serde(default = "default_cycle_collection_threshold")]
    pub cycle_collection_threshold: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            logic: LogicSemantics::default(),
            undeclared_assignment: UndeclaredAssignment::default(),
            cycle_collection_threshold: DEFAULT_CYCLE_COLLECTION_THRESHOLD,
        }
    }
}

impl EvalConfig {
    /// 从 JSON 文本解析配置
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// 从 JSON 文件加载配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// 设置逻辑运算语义
    pub fn with_logic(mut self, logic: LogicSemantics) -> Self {
        self.logic = logic;
        self
    }

    /// 设置未声明变量赋值策略
    pub fn with_undeclared_assignment(mut self, policy: UndeclaredAssignment) -> Self {
        self.undeclared_assignment = policy;
        self
    }

    /// 设置自动回收阈值
    pub fn with_cycle_collection_threshold(mut self, threshold: usize) -> Self {
        self.cycle_collection_threshold = threshold;
        self
    }
}
