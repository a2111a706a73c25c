//! 框架识别的配置键

/// 调度器工作线程池大小，默认 5
pub const SCHEDULER_POOL_SIZE: &str = "scheduler.pool.size";
