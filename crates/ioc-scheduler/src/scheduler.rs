//! 定时任务调度器
//!
//! 引导完成后扫描容器里每个组件定义声明的定时任务，
//! 在自有的多线程运行时上按固定频率执行：首次触发不延迟，
//! 执行耗时落后于节拍时连发追平（与固定频率语义一致）。
//!
//! 同一任务的多次触发串行执行；不同任务并发执行，
//! 任务体访问共享组件状态时自行负责同步。

use crate::period::period_seconds;
use ioc_common::{ContainerError, ContainerResult};
use ioc_config::{keys, PropertySource};
use ioc_core::Container;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// 缺省工作线程数
pub const DEFAULT_POOL_SIZE: usize = 5;

/// 定时任务调度器
pub struct TaskScheduler {
    runtime: tokio::runtime::Runtime,
    worker_count: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl TaskScheduler {
    /// 以指定工作线程数创建调度器
    pub fn new(worker_count: usize) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_count)
            .thread_name("ioc-scheduler")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            worker_count,
            tasks: Vec::new(),
        })
    }

    /// 从属性来源读取线程池配置创建调度器
    ///
    /// 读取 `scheduler.pool.size`；键缺失或值非数字时退回缺省值，
    /// 非数字值额外记告警。
    pub fn from_properties(properties: &dyn PropertySource) -> io::Result<Self> {
        let worker_count = match properties.get(keys::SCHEDULER_POOL_SIZE) {
            Some(value) => match value.parse::<usize>() {
                Ok(count) if count > 0 => count,
                _ => {
                    warn!(
                        "配置项 {} 的值 {:?} 不是有效的线程数，使用缺省值 {}",
                        keys::SCHEDULER_POOL_SIZE,
                        value,
                        DEFAULT_POOL_SIZE
                    );
                    DEFAULT_POOL_SIZE
                }
            },
            None => DEFAULT_POOL_SIZE,
        };
        Self::new(worker_count)
    }

    /// 工作线程数
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 已调度任务数
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// 调度容器内全部组件声明的定时任务
    ///
    /// 任何任务的触发规格非法都会使整个调度失败；
    /// 成功时返回调度的任务数。
    pub fn schedule_all(&mut self, container: &Container) -> ContainerResult<usize> {
        let mut scheduled = 0usize;

        for definition in container.definitions().iter() {
            if definition.tasks().is_empty() {
                continue;
            }

            let owner = container.instance_of(definition)?;
            let handle = owner.form(definition.type_info().id).cloned().ok_or_else(
                || ContainerError::DependencyInstanceMismatch {
                    expected: definition.type_info().name.clone(),
                    actual: owner.type_info().name.clone(),
                    owner: definition.identifier().to_string(),
                },
            )?;

            for task in definition.tasks() {
                let seconds = period_seconds(&task.trigger)?;
                let task = task.clone();
                let handle = handle.clone();

                info!(
                    "调度定时任务 {} (组件 {}, 周期 {} 秒)",
                    task.name,
                    definition.identifier(),
                    seconds
                );
                let join = self.runtime.spawn(async move {
                    let mut interval =
                        tokio::time::interval(Duration::from_secs(seconds));
                    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
                    loop {
                        interval.tick().await;
                        let outcome =
                            catch_unwind(AssertUnwindSafe(|| task.fire(&handle)));
                        if outcome.is_err() {
                            error!("定时任务 {} 执行 panic，等待下次触发", task.name);
                        }
                    }
                });
                self.tasks.push(join);
                scheduled += 1;
            }
        }

        info!("定时任务调度完成: {} 个任务", scheduled);
        Ok(scheduled)
    }

    /// 关闭调度器
    ///
    /// 取消全部任务并在限期内排空运行时。
    pub fn shutdown(self, timeout: Duration) {
        info!("关闭定时任务调度器 ({} 个任务)", self.tasks.len());
        for task in &self.tasks {
            task.abort();
        }
        self.runtime.shutdown_timeout(timeout);
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("worker_count", &self.worker_count)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
