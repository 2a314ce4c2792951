//! # lux - 求值演示宿主
//!
//! 构造示例程序的 AST 并交给 `lux-runtime` 求值，打印结果。
//!
//! ## 用法
//!
//! ```text
//! lux                       运行内置示例程序
//! lux program.json ...      对 JSON 形式的 AST 求值
//! lux --config lux.json     指定求值配置
//! ```
//!
//! 日志级别通过 `RUST_LOG` 控制，例如 `RUST_LOG=lux_runtime=trace`。

mod demos;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use lux_runtime::{EvalConfig, Expr, Interpreter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lux", about = "lux 表达式求值演示")]
struct Args {
    /// 求值配置文件（JSON）
    #[arg(long)]
    config: Option<PathBuf>,

    /// AST 文件（JSON），不指定时运行内置示例
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("lux error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EvalConfig::load(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => EvalConfig::default(),
    };
    info!(?config, "求值配置");

    if args.files.is_empty() {
        for demo in demos::all() {
            // 每个示例使用独立的解释器
            let mut interpreter = Interpreter::with_config(config.clone());
            let value = interpreter
                .evaluate(&demo.program)
                .with_context(|| format!("示例 '{}' 求值失败", demo.name))?;
            println!("{value}");
        }
        return Ok(());
    }

    for path in &args.files {
        let text =
            fs::read_to_string(path).with_context(|| format!("无法读取 {}", path.display()))?;
        let program =
            Expr::from_json(&text).with_context(|| format!("AST 解析失败: {}", path.display()))?;

        let mut interpreter = Interpreter::with_config(config.clone());
        let value = interpreter
            .evaluate(&program)
            .with_context(|| format!("求值失败: {}", path.display()))?;
        println!("{value}");
    }

    Ok(())
}
