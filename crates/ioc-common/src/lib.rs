//! # IoC Common
//!
//! 这个 crate 提供 IoC 容器各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`TypeInfo`] - 类型描述符，同时支持具体类型和 trait 对象
//! - [`InstanceId`] - 单例实例的唯一标识
//! - [`Trigger`] - 定时任务的触发规格
//! - [`ContainerError`] - 容器错误分类
//! - [`InstanceCreationError`] - 对外暴露的统一失败类型
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时注册，不依赖运行时反射
//! - 启动期快速失败：任何装配错误都会中止引导，不留下半成品容器
//! - 容器是显式传递的值，没有全局可变状态

pub mod errors;
pub mod metadata;
pub mod trigger;

pub use errors::*;
pub use metadata::*;
pub use trigger::*;
