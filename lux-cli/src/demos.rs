//! 内置示例程序

use lux_runtime::{Expr, Operator};

/// 一个命名的示例程序
pub struct Demo {
    pub name: &'static str,
    pub program: Expr,
}

/// 全部示例，按顺序运行
pub fn all() -> Vec<Demo> {
    vec![
        Demo {
            name: "comparison",
            program: comparison(),
        },
        Demo {
            name: "variable",
            program: variable(),
        },
        Demo {
            name: "function",
            program: function(),
        },
        Demo {
            name: "closure",
            program: closure(),
        },
    ]
}

/// (1 + 2) <= 3
fn comparison() -> Expr {
    Expr::binary(
        Operator::LessEquals,
        Expr::plus(Expr::int(1), Expr::int(2)),
        Expr::int(3),
    )
}

/// var x = 1
/// x + 2
fn variable() -> Expr {
    Expr::block([
        Expr::declare("x", Expr::int(1)),
        Expr::plus(Expr::ident("x"), Expr::int(2)),
    ])
}

/// fun foo(x) { x + 2 }
/// foo(1)
fn function() -> Expr {
    Expr::block([
        Expr::function("foo", ["x"], Expr::plus(Expr::ident("x"), Expr::int(2))),
        Expr::call("foo", [Expr::int(1)]),
    ])
}

/// fun foo(x) {
///     fun bar() { x + 1 }
/// }
/// var foobar = foo(2)
/// foobar()
fn closure() -> Expr {
    Expr::block([
        Expr::function(
            "foo",
            ["x"],
            Expr::block([Expr::function(
                "bar",
                Vec::<String>::new(),
                Expr::plus(Expr::ident("x"), Expr::int(1)),
            )]),
        ),
        Expr::declare("foobar", Expr::call("foo", [Expr::int(2)])),
        Expr::call("foobar", []),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_runtime::{Interpreter, Value};

    #[test]
    fn test_demo_results() {
        let results: Vec<Value> = all()
            .into_iter()
            .map(|demo| Interpreter::new().evaluate(&demo.program).unwrap())
            .collect();

        assert_eq!(
            results,
            vec![
                Value::Boolean(true),
                Value::Integer(3),
                Value::Integer(3),
                Value::Integer(3),
            ]
        );
    }

    #[test]
    fn test_demo_output() {
        let output: Vec<String> = all()
            .into_iter()
            .map(|demo| Interpreter::new().evaluate(&demo.program).unwrap().to_string())
            .collect();
        insta::assert_snapshot!(output.join("\n"), @r"
        true
        3
        3
        3
        ");
    }
}
