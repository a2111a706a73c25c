//! # IoC Runtime
//!
//! 应用运行时层：把容器、事件总线、定时调度器和异步分发器
//! 组装为一个可启动、可等待、可关闭的应用实例。
//!
//! ## 启动流程
//!
//! 1. 初始化日志（可选，见 [`LoggingConfig`]）
//! 2. 收集组件定义（显式注册 + 组件扫描器）
//! 3. 自动注册框架组件（事件总线、异步分发器）
//! 4. 引导容器（实例化 + 注入）
//! 5. 按配置创建任务调度器并调度全部定时任务
//! 6. 调用根可运行组件（如注册了 [`RunnableComponent`]）

pub mod logging;
pub mod runtime;
pub mod scanner;

pub use logging::*;
pub use runtime::*;
pub use scanner::*;
