//! # IoC Scheduler
//!
//! 容器引导完成后的任务调度层：
//!
//! - [`TaskScheduler`] - 固定频率执行组件声明的定时任务
//! - [`AsyncDispatcher`] - 把一次性工作投递到后台线程池
//! - [`period_seconds`] - 触发规格到秒级周期的换算
//!
//! 调度器和分发器各自持有独立的 Tokio 运行时，
//! 关闭时显式排空，不依赖进程退出时的隐式清理。

pub mod dispatch;
pub mod period;
pub mod scheduler;

pub use dispatch::*;
pub use period::*;
pub use scheduler::*;
