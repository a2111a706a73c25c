//! 日志初始化
//!
//! 运行时缺省不接管日志，只有显式配置时才初始化全局订阅器，
//! 避免在测试环境中重复初始化。

use anyhow::Context;
use tracing::info;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境预设：DEBUG 级别，带文件名和行号
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_file: true,
            show_line_number: true,
            ..Self::default()
        }
    }

    /// 生产环境预设：INFO 级别，JSON 输出，带线程ID
    pub fn production() -> Self {
        Self {
            show_thread_ids: true,
            json_format: true,
            ..Self::default()
        }
    }

    /// 初始化全局日志订阅器
    pub fn init(&self) -> anyhow::Result<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| anyhow::anyhow!(e))
        .context("日志初始化失败")?;

        info!("日志系统初始化完成 (级别 {})", self.level);
        Ok(())
    }
}
