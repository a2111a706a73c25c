//! 异步分发器
//!
//! 把一次性工作投递到后台线程池后立即返回（发射后不管）。
//! 工作体的 panic 被捕获并记录，调用方观察不到结果。
//!
//! 分发器作为普通组件注册进容器，业务组件按类型注入后
//! 即可把耗时逻辑移出调用线程。

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, error, info};

/// 缺省后台线程数
pub const DEFAULT_DISPATCH_THREADS: usize = 2;

/// 后台任务分发器
pub struct AsyncDispatcher {
    runtime: tokio::runtime::Runtime,
}

impl AsyncDispatcher {
    /// 以缺省线程数创建分发器
    pub fn new() -> io::Result<Self> {
        Self::with_threads(DEFAULT_DISPATCH_THREADS)
    }

    /// 以指定线程数创建分发器
    pub fn with_threads(threads: usize) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name("ioc-dispatch")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    /// 投递一项后台工作
    ///
    /// `name` 仅用于日志定位；调用立即返回，不等待执行。
    pub fn dispatch<F>(&self, name: &str, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        debug!("投递后台任务: {}", name);
        let name = name.to_string();
        self.runtime.spawn(async move {
            if catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("后台任务 {} 执行 panic", name);
            }
        });
    }

    /// 关闭分发器，限期内排空未完成的工作
    pub fn shutdown(self, timeout: Duration) {
        info!("关闭异步分发器");
        self.runtime.shutdown_timeout(timeout);
    }
}

impl std::fmt::Debug for AsyncDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncDispatcher").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn dispatched_job_runs_in_background() {
        let dispatcher = AsyncDispatcher::new().unwrap();
        let done = Arc::new(Mutex::new(false));

        let flag = done.clone();
        dispatcher.dispatch("mark-done", move || {
            *flag.lock() = true;
        });

        thread::sleep(Duration::from_millis(200));
        assert!(*done.lock());
        dispatcher.shutdown(Duration::from_millis(100));
    }

    #[test]
    fn panicking_job_does_not_poison_the_pool() {
        let dispatcher = AsyncDispatcher::with_threads(1).unwrap();
        dispatcher.dispatch("explode", || panic!("后台故障"));

        let done = Arc::new(Mutex::new(false));
        let flag = done.clone();
        dispatcher.dispatch("after-explosion", move || {
            *flag.lock() = true;
        });

        thread::sleep(Duration::from_millis(200));
        assert!(*done.lock());
        dispatcher.shutdown(Duration::from_millis(100));
    }
}
