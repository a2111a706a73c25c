//! 应用运行时
//!
//! [`AppRuntimeBuilder`] 收集组件定义、扫描器和属性来源，
//! `start` 完成整个引导流程并返回运行中的 [`AppRuntime`]。
//! 事件总线和异步分发器作为框架组件自动注册，
//! 业务组件可以像依赖普通组件一样注入它们。

use crate::logging::LoggingConfig;
use crate::scanner::ComponentScanner;
use anyhow::Context;
use chrono::{DateTime, Utc};
use ioc_common::ContainerError;
use ioc_config::{PropertiesFileSource, PropertySource};
use ioc_core::{ComponentDefinition, Container};
use ioc_events::EventBus;
use ioc_scheduler::{AsyncDispatcher, TaskScheduler};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 根可运行组件
///
/// 应用通过提供该 trait 的实现声明启动入口；
/// 引导完成后运行时用命令行参数调用它一次。
pub trait RunnableComponent: Send + Sync {
    /// 执行应用入口逻辑
    fn run(&self, args: &[String]);
}

/// 运行时状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// 引导完成，定时任务已调度
    Running,
    /// 已关闭
    Stopped,
}

/// 运行中的应用实例
pub struct AppRuntime {
    container: Arc<Container>,
    scheduler: TaskScheduler,
    status: RwLock<RuntimeStatus>,
    started_at: DateTime<Utc>,
}

impl AppRuntime {
    /// 创建运行时构建器
    pub fn builder() -> AppRuntimeBuilder {
        AppRuntimeBuilder::new()
    }

    /// 容器
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// 当前状态
    pub fn status(&self) -> RuntimeStatus {
        *self.status.read()
    }

    /// 启动时刻
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 已运行时长
    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// 调用根可运行组件
    ///
    /// 未注册 [`RunnableComponent`] 时记日志跳过，不是错误；
    /// 注册了多个实现则照常按“恰好一个”规则失败。
    pub fn run(&self, args: &[String]) -> anyhow::Result<()> {
        match self.container.get::<dyn RunnableComponent>() {
            Ok(root) => {
                info!("调用根可运行组件 (参数 {} 个)", args.len());
                root.run(args);
                Ok(())
            }
            Err(ContainerError::InstanceNotFound { .. }) => {
                info!("未注册可运行组件，跳过启动入口");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 阻塞等待进程收到 Ctrl-C
    pub fn wait_for_shutdown(&self) -> anyhow::Result<()> {
        info!("应用运行中，按 Ctrl-C 退出");
        let waiter = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("创建信号等待运行时失败")?;
        waiter
            .block_on(tokio::signal::ctrl_c())
            .context("等待退出信号失败")?;
        info!("收到退出信号");
        Ok(())
    }

    /// 关闭运行时
    ///
    /// 停止全部定时任务并在限期内排空调度线程池；
    /// 容器内的组件实例随最后一个引用释放。
    pub fn shutdown(self, timeout: Duration) {
        *self.status.write() = RuntimeStatus::Stopped;
        info!("关闭应用运行时 (已运行 {} 秒)", self.uptime().num_seconds());
        self.scheduler.shutdown(timeout);
    }
}

impl std::fmt::Debug for AppRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRuntime")
            .field("status", &self.status())
            .field("started_at", &self.started_at)
            .field("container", &self.container)
            .finish()
    }
}

/// 应用运行时构建器
#[derive(Default)]
pub struct AppRuntimeBuilder {
    definitions: Vec<ComponentDefinition>,
    scanners: Vec<Box<dyn ComponentScanner>>,
    properties: Option<Arc<dyn PropertySource>>,
    logging: Option<LoggingConfig>,
}

impl AppRuntimeBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接注册一个组件定义
    pub fn register(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 添加组件扫描器
    pub fn add_scanner<S: ComponentScanner + 'static>(mut self, scanner: S) -> Self {
        self.scanners.push(Box::new(scanner));
        self
    }

    /// 使用 properties 配置文件作为属性来源
    pub fn with_properties_file<P: AsRef<Path>>(mut self, path: P) -> anyhow::Result<Self> {
        let source = PropertiesFileSource::new(path.as_ref())
            .with_context(|| format!("加载配置文件 {} 失败", path.as_ref().display()))?;
        info!("使用配置文件: {}", source.path().display());
        self.properties = Some(Arc::new(source));
        Ok(self)
    }

    /// 使用自定义属性来源
    pub fn with_property_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.properties = Some(source);
        self
    }

    /// 配置日志初始化
    ///
    /// 未配置时运行时不接管日志。
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 执行引导并启动运行时
    pub fn start(self) -> anyhow::Result<AppRuntime> {
        if let Some(logging) = &self.logging {
            logging.init()?;
        }

        info!("开始应用引导");
        let mut builder = Container::builder();
        for definition in self.definitions {
            builder = builder.register(definition);
        }
        for scanner in &self.scanners {
            info!("运行组件扫描器: {}", scanner.name());
            builder = builder.register_all(scanner.scan());
        }
        builder = builder
            .register(event_bus_definition())
            .register(dispatcher_definition());

        if let Some(properties) = self.properties {
            builder = builder.with_property_source(properties);
        }

        let container = Arc::new(builder.build().context("容器引导失败")?);
        let mut scheduler = TaskScheduler::from_properties(container.properties())
            .context("创建任务调度器失败")?;
        let scheduled = scheduler
            .schedule_all(&container)
            .context("调度定时任务失败")?;

        info!(
            "应用引导完成: {} 个组件实例, {} 个定时任务",
            container.instance_count(),
            scheduled
        );
        Ok(AppRuntime {
            container,
            scheduler,
            status: RwLock::new(RuntimeStatus::Running),
            started_at: Utc::now(),
        })
    }
}

/// 事件总线的框架组件定义
fn event_bus_definition() -> ComponentDefinition {
    ComponentDefinition::of::<EventBus>()
        .with_id("eventBus")
        .constructor(vec![], |_| Ok(EventBus::new()))
        .build()
}

/// 异步分发器的框架组件定义
fn dispatcher_definition() -> ComponentDefinition {
    ComponentDefinition::of::<AsyncDispatcher>()
        .with_id("asyncDispatcher")
        .constructor(vec![], |_| {
            AsyncDispatcher::new().map_err(|e| {
                warn!("异步分发器创建失败: {}", e);
                ContainerError::ComponentConstruction {
                    component: "AsyncDispatcher".to_string(),
                    message: e.to_string(),
                }
            })
        })
        .build()
}
