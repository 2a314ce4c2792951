//! # Eval 模块
//!
//! 每种 AST 节点的求值规则。
//!
//! ## 求值模型
//!
//! - 当前作用域通过 [`EvalContext`] **显式传递**，不存在共享的可变游标
//! - 子表达式严格按从左到右的顺序立即求值
//! - 任何错误都会立即中止整个求值
//!
//! ## 运算符分派
//!
//! 二元运算先求值左操作数，由它的运行时类型决定合法的运算符集合：
//!
//! | 左操作数 | 合法运算符 | 右操作数 |
//! |----------|------------|----------|
//! | Boolean  | `and` `or` | Boolean（可能被短路） |
//! | Integer  | 算术、比较 | Integer |
//! | String   | `+`        | String |
//! | 其他     | 无         | 不求值 |

use std::rc::Rc;

use tracing::debug;

use crate::config::{EvalConfig, LogicSemantics, UndeclaredAssignment};
use crate::error::{EvalError, EvalResult};
use crate::runtime::interpreter::call_function;
use crate::runtime::scope::{Assignment, ScopeHeap, ScopeRef};
use crate::script::{Expr, Operator};
use crate::value::{Function, Value};

/// 求值上下文
///
/// 携带当前作用域。进入函数调用时产生新的上下文，
/// 调用返回后调用方继续使用自己的上下文，不需要恢复任何状态。
/// 调用作用域在 `heap` 中登记。
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    scope: ScopeRef,
    config: &'a EvalConfig,
    heap: &'a ScopeHeap,
    call_depth: usize,
}

impl<'a> EvalContext<'a> {
    /// 创建顶层上下文
    pub fn new(scope: ScopeRef, config: &'a EvalConfig, heap: &'a ScopeHeap) -> Self {
        Self {
            scope,
            config,
            heap,
            call_depth: 0,
        }
    }

    /// 当前作用域
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn config(&self) -> &EvalConfig {
        self.config
    }

    pub fn heap(&self) -> &'a ScopeHeap {
        self.heap
    }

    /// 当前函数调用嵌套层数（顶层为 0）
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// 进入函数调用作用域
    pub(crate) fn enter_call(&self, scope: ScopeRef) -> EvalContext<'a> {
        EvalContext {
            scope,
            config: self.config,
            heap: self.heap,
            call_depth: self.call_depth + 1,
        }
    }
}

/// 对表达式求值
pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> EvalResult<Value> {
    match expr {
        Expr::BooleanLiteral(b) => Ok(Value::Boolean(*b)),

        Expr::IntegerLiteral(n) => Ok(Value::Integer(*n)),

        Expr::StringLiteral(s) => Ok(Value::String(s.clone())),

        Expr::Identifier(name) => lookup(name, ctx),

        Expr::Block(exprs) => {
            // 块不引入新作用域
            let mut result = Value::Nil;
            for expr in exprs {
                result = evaluate(expr, ctx)?;
            }
            Ok(result)
        }

        Expr::VariableDeclaration { name, initializer } => {
            ctx.scope().declare(name);
            let value = match initializer {
                Some(initializer) => evaluate(initializer, ctx)?,
                None => Value::Nil,
            };
            assign(name, value.clone(), ctx)?;
            Ok(value)
        }

        Expr::VariableAssignment { name, value } => {
            let value = evaluate(value, ctx)?;
            assign(name, value.clone(), ctx)?;
            Ok(value)
        }

        Expr::FunctionDeclaration {
            name,
            parameters,
            body,
        } => {
            let function = Value::Function(Function {
                name: name.clone(),
                closure: ctx.scope().clone(),
                parameters: parameters.clone(),
                body: Rc::clone(body),
            });
            ctx.scope().declare(name);
            assign(name, function.clone(), ctx)?;
            Ok(function)
        }

        Expr::CallExpression { callee, arguments } => {
            let args = arguments
                .iter()
                .map(|argument| evaluate(argument, ctx))
                .collect::<EvalResult<Vec<_>>>()?;
            call_by_name(callee, args, ctx)
        }

        Expr::BinaryOperation { operator, lhs, rhs } => eval_binary(*operator, lhs, rhs, ctx),
    }
}

/// 沿当前作用域链查找变量
pub(crate) fn lookup(name: &str, ctx: &EvalContext<'_>) -> EvalResult<Value> {
    ctx.scope()
        .lookup(name)
        .ok_or_else(|| EvalError::UndefinedVariable {
            name: name.to_string(),
        })
}

/// 按配置的策略赋值
pub(crate) fn assign(name: &str, value: Value, ctx: &EvalContext<'_>) -> EvalResult<()> {
    let scope = ctx.scope();
    if ctx.config().undeclared_assignment == UndeclaredAssignment::Error && !scope.contains(name)
    {
        return Err(EvalError::UndefinedVariable {
            name: name.to_string(),
        });
    }

    if scope.assign(name, value) == Assignment::CreatedInRoot {
        debug!(variable = %name, "对未声明的变量赋值，已在全局作用域中创建");
    }
    Ok(())
}

/// 查找并调用函数，参数已在调用方作用域中求值完毕
pub(crate) fn call_by_name(
    callee: &str,
    args: Vec<Value>,
    ctx: &EvalContext<'_>,
) -> EvalResult<Value> {
    match lookup(callee, ctx)? {
        Value::Function(function) => call_function(&function, args, ctx),
        other => Err(EvalError::NotCallable {
            name: callee.to_string(),
            actual: other.type_name(),
        }),
    }
}

fn eval_binary(
    operator: Operator,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &EvalContext<'_>,
) -> EvalResult<Value> {
    match evaluate(lhs, ctx)? {
        Value::Boolean(left) => eval_logical(operator, left, rhs, ctx),

        Value::Integer(left) => match evaluate(rhs, ctx)? {
            Value::Integer(right) => apply_integer(operator, left, right),
            other => Err(type_mismatch(operator, "Integer", &other)),
        },

        Value::String(left) => match evaluate(rhs, ctx)? {
            Value::String(right) => apply_string(operator, left, &right),
            other => Err(type_mismatch(operator, "String", &other)),
        },

        other => Err(type_mismatch(operator, "Boolean、Integer 或 String", &other)),
    }
}

/// 布尔运算，右操作数可能不被求值
fn eval_logical(
    operator: Operator,
    left: bool,
    rhs: &Expr,
    ctx: &EvalContext<'_>,
) -> EvalResult<Value> {
    if !operator.is_logical() {
        return Err(EvalError::InvalidOperator {
            operator,
            operand: "Boolean",
        });
    }

    let short_circuit = match (ctx.config().logic, operator) {
        (LogicSemantics::ShortCircuit, Operator::And) => !left,
        (LogicSemantics::ShortCircuit, _) => left,
        (LogicSemantics::Legacy, _) => left,
    };
    if short_circuit {
        return Ok(Value::Boolean(left));
    }

    match evaluate(rhs, ctx)? {
        Value::Boolean(right) => Ok(Value::Boolean(right)),
        other => Err(type_mismatch(operator, "Boolean", &other)),
    }
}

/// 整数运算，算术溢出时回绕
pub(crate) fn apply_integer(operator: Operator, left: i32, right: i32) -> EvalResult<Value> {
    let value = match operator {
        Operator::Plus => Value::Integer(left.wrapping_add(right)),
        Operator::Minus => Value::Integer(left.wrapping_sub(right)),
        Operator::Times => Value::Integer(left.wrapping_mul(right)),
        Operator::Divides => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // i32::MIN / -1 回绕为 i32::MIN
            Value::Integer(left.wrapping_div(right))
        }
        Operator::Equals => Value::Boolean(left == right),
        Operator::NotEquals => Value::Boolean(left != right),
        Operator::Less => Value::Boolean(left < right),
        Operator::LessEquals => Value::Boolean(left <= right),
        Operator::Greater => Value::Boolean(left > right),
        Operator::GreaterEquals => Value::Boolean(left >= right),
        Operator::And | Operator::Or | Operator::Not => {
            return Err(EvalError::InvalidOperator {
                operator,
                operand: "Integer",
            });
        }
    };
    Ok(value)
}

/// 字符串运算，只支持拼接
pub(crate) fn apply_string(operator: Operator, left: String, right: &str) -> EvalResult<Value> {
    match operator {
        Operator::Plus => {
            let mut joined = left;
            joined.push_str(right);
            Ok(Value::String(joined))
        }
        _ => Err(EvalError::InvalidOperator {
            operator,
            operand: "String",
        }),
    }
}

fn type_mismatch(operator: Operator, expected: &'static str, actual: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operator,
        expected,
        actual: actual.type_name(),
    }
}
