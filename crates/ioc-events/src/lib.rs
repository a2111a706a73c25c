//! # IoC Events
//!
//! 进程内同步事件总线：按事件的具体类型分发，
//! 监听器在发布者线程上按注册顺序依次执行。
//!
//! 单个监听器 panic 会被捕获并记录，不影响后续监听器，
//! 也不会传播回发布者。

pub mod bus;

pub use bus::*;
