//! # IoC Config
//!
//! 配置值来源层。容器的值注入和调度器池大小都从这里取值。
//!
//! 配置是一个扁平的 `key -> 字符串值` 存储，由一个属性文件支撑；
//! 没有层级结构，也没有热重载。
//!
//! ## 核心接口
//!
//! - [`PropertySource`] - 配置键解析契约
//! - [`PropertiesFileSource`] - 文件支撑的实现
//! - [`MemoryPropertySource`] - 内存实现，用于测试和默认值

pub mod keys;
pub mod source;

pub use source::*;
