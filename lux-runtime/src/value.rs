//! # Value 模块
//!
//! 定义运行时值。
//!
//! ## 设计原则
//!
//! - 值是**不可变**的，产生之后不会被修改
//! - 不同类型之间**不做隐式转换**
//! - 整数为 32 位有符号数，溢出时回绕

use std::fmt;
use std::rc::Rc;

use crate::runtime::scope::ScopeRef;
use crate::script::Expr;

/// 运行时值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 布尔值
    Boolean(bool),
    /// 整数
    Integer(i32),
    /// 字符串
    String(String),
    /// 空值
    Nil,
    /// 函数（闭包）
    Function(Function),
}

impl Value {
    /// 类型名，用于错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::String(_) => "String",
            Value::Nil => "Nil",
            Value::Function(_) => "Function",
        }
    }

    /// 创建字符串值
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// 取出函数值
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Nil => f.write_str("nil"),
            Value::Function(function) => write!(f, "{}", function),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// 函数值
///
/// 持有声明时所在作用域的引用（闭包），而不是该作用域的快照：
/// 调用时读到的是被捕获变量的**当前**值。
#[derive(Clone)]
pub struct Function {
    /// 声明时的函数名
    pub name: String,
    /// 捕获的作用域
    pub closure: ScopeRef,
    /// 形参列表
    pub parameters: Vec<String>,
    /// 函数体（与 AST 共享）
    pub body: Rc<Expr>,
}

impl Function {
    /// 形参个数
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

// 闭包作用域里通常就有这个函数自己，Debug 不能展开 closure
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("closure_depth", &self.closure.depth())
            .finish_non_exhaustive()
    }
}

/// 只有同一个闭包实例才相等
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && self.closure.ptr_eq(&other.closure)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fun {}({})>", self.name, self.parameters.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_function(closure: &ScopeRef) -> Function {
        Function {
            name: "foo".to_string(),
            closure: closure.clone(),
            parameters: vec!["x".to_string(), "y".to_string()],
            body: Rc::new(Expr::ident("x")),
        }
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Boolean(true).type_name(), "Boolean");
        assert_eq!(Value::Integer(1).type_name(), "Integer");
        assert_eq!(Value::string("a").type_name(), "String");
        assert_eq!(Value::Nil.type_name(), "Nil");

        let root = ScopeRef::root();
        assert_eq!(Value::Function(sample_function(&root)).type_name(), "Function");
    }

    #[test]
    fn test_display() {
        let root = ScopeRef::root();
        insta::assert_snapshot!(Value::Boolean(true).to_string(), @"true");
        insta::assert_snapshot!(Value::Integer(-7).to_string(), @"-7");
        insta::assert_snapshot!(Value::string("ab").to_string(), @"ab");
        insta::assert_snapshot!(Value::Nil.to_string(), @"nil");
        insta::assert_snapshot!(Value::Function(sample_function(&root)).to_string(), @"<fun foo(x, y)>");
    }

    #[test]
    fn test_function_identity_equality() {
        let root = ScopeRef::root();
        let function = sample_function(&root);
        assert_eq!(function, function.clone());

        // 同样的源码、不同的实例
        let other = sample_function(&root);
        assert_ne!(function, other);

        // 同一函数体、不同的闭包
        let rebound = Function {
            closure: root.child(),
            ..function.clone()
        };
        assert_ne!(function, rebound);
    }

    #[test]
    fn test_self_referential_debug_terminates() {
        let root = ScopeRef::root();
        let function = sample_function(&root);
        root.define("foo", Value::Function(function.clone()));

        let debug = format!("{:?}", Value::Function(function));
        assert!(debug.contains("foo"));
        assert!(debug.contains("closure_depth"));
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(3), Value::Integer(3));
        assert_eq!(Value::from("x"), Value::string("x"));
    }
}
