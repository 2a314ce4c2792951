//! # Interpreter 模块
//!
//! 解释器入口和函数调用协议。
//!
//! ## 调用协议
//!
//! ```text
//! caller scope ──(求值实参)──► args
//!                                │
//! closure scope ◄── parent ── call scope (绑定形参)
//!                                │
//!                          求值函数体 ──► result
//! ```
//!
//! 调用作用域的父作用域是函数**声明时**捕获的作用域，而不是调用方的作用域
//! （词法作用域）。调用方的上下文在调用期间保持不变，返回后直接继续使用。
//!
//! ## 回收
//!
//! 所有作用域都登记在解释器的 [`ScopeHeap`] 中。顶层的 `evaluate` / `call`
//! 返回后，如果新建作用域数达到 `cycle_collection_threshold`，就回收一次
//! 作用域环；`collect_cycles` 可以随时手动回收。解释器被 drop 时会断开
//! 全局作用域的环，除非宿主仍持有引用它的函数值。

use tracing::{debug, trace};

use crate::config::EvalConfig;
use crate::error::{EvalError, EvalResult};
use crate::runtime::eval::{self, EvalContext};
use crate::runtime::scope::{ScopeHeap, ScopeRef};
use crate::script::Expr;
use crate::value::{Function, Value};

/// lux 解释器
///
/// 持有全局作用域和作用域堆。同一个实例在一次求值结束前不能被再次使用，
/// `evaluate` 要求 `&mut self` 保证这一点。
///
/// # 使用示例
///
/// ```ignore
/// let program = Expr::block([
///     Expr::declare("x", Expr::int(1)),
///     Expr::plus(Expr::ident("x"), Expr::int(2)),
/// ]);
///
/// let mut interpreter = Interpreter::new();
/// assert_eq!(interpreter.evaluate(&program)?, Value::Integer(3));
/// ```
#[derive(Debug)]
pub struct Interpreter {
    /// 全局（根）作用域
    global: ScopeRef,
    /// 求值配置
    config: EvalConfig,
    /// 受管作用域
    heap: ScopeHeap,
}

impl Interpreter {
    /// 使用默认配置创建解释器
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    /// 使用指定配置创建解释器
    pub fn with_config(config: EvalConfig) -> Self {
        let heap = ScopeHeap::new();
        Self {
            global: heap.root(),
            config,
            heap,
        }
    }

    /// 全局作用域
    pub fn global_scope(&self) -> &ScopeRef {
        &self.global
    }

    /// 在全局作用域中对 AST 求值
    ///
    /// 出错时已经执行的作用域修改不会回滚。
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        let result = eval::evaluate(expr, &self.context())
            .inspect_err(|error| debug!(error = %error, "求值中止"));
        self.maybe_collect();
        result
    }

    /// 在全局作用域中声明变量（初始为 Nil）
    pub fn declare(&mut self, name: &str) {
        self.global.declare(name);
    }

    /// 读取全局作用域中的变量
    pub fn lookup(&self, name: &str) -> EvalResult<Value> {
        eval::lookup(name, &self.context())
    }

    /// 对全局作用域中的变量赋值
    pub fn assign(&mut self, name: &str, value: Value) -> EvalResult<()> {
        eval::assign(name, value, &self.context())
    }

    /// 按名字调用全局作用域中的函数
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let result = eval::call_by_name(name, args, &self.context());
        self.maybe_collect();
        result
    }

    /// 立即回收不可达的作用域环，返回被回收的作用域数
    ///
    /// 宿主持有的值（包括刚返回的结果）引用的作用域不会被回收。
    pub fn collect_cycles(&mut self) -> usize {
        self.heap.collect()
    }

    /// 当前存活的作用域数（含全局作用域）
    pub fn live_scopes(&self) -> usize {
        self.heap.live_count()
    }

    fn maybe_collect(&mut self) {
        let threshold = self.config.cycle_collection_threshold;
        if threshold > 0 && self.heap.allocated_since_collect() >= threshold {
            self.heap.collect();
        }
    }

    fn context(&self) -> EvalContext<'_> {
        EvalContext::new(self.global.clone(), &self.config, &self.heap)
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // 放掉对全局作用域的外部引用，它就只剩下环内引用
        drop(std::mem::replace(&mut self.global, ScopeRef::root()));
        self.heap.collect();
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// 调用函数
///
/// 参数个数必须与形参个数一致。
pub(crate) fn call_function(
    function: &Function,
    args: Vec<Value>,
    ctx: &EvalContext<'_>,
) -> EvalResult<Value> {
    if args.len() != function.arity() {
        return Err(EvalError::ArityMismatch {
            name: function.name.clone(),
            expected: function.arity(),
            actual: args.len(),
        });
    }

    let call_scope = ctx.heap().child_of(&function.closure);
    for (parameter, arg) in function.parameters.iter().zip(args) {
        call_scope.define(parameter.as_str(), arg);
    }

    let call_ctx = ctx.enter_call(call_scope);
    trace!(
        function = %function.name,
        argc = function.arity(),
        depth = call_ctx.call_depth(),
        closure_depth = function.closure.depth(),
        "调用函数"
    );

    eval::evaluate(&function.body, &call_ctx)
}
