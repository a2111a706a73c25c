//! # 演示应用程序
//!
//! 演示 IoC 框架的完整用法：组件扫描、依赖注入、
//! 配置值注入、定时任务和事件总线。

mod components;
mod events;

use clap::Parser;
use ioc_runtime::{AppRuntime, LoggingConfig};
use std::time::Duration;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "demo-app")]
#[command(about = "IoC 框架演示应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "demo-app/config/application.properties")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 传递给应用入口组件的功能名称列表
    features: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        level: parse_log_level(&args.log_level),
        ..LoggingConfig::default()
    };

    let runtime = AppRuntime::builder()
        .with_logging(logging)
        .with_properties_file(&args.config)?
        .add_scanner(components::scanner())
        .start()?;

    runtime.run(&args.features)?;
    runtime.wait_for_shutdown()?;

    runtime.shutdown(Duration::from_secs(5));
    info!("应用已关闭");
    Ok(())
}

/// 解析日志级别字符串
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
