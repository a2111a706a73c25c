//! 演示应用的业务组件
//!
//! 覆盖框架的全部注入形态：主构造函数注入、限定符字段注入、
//! 配置值注入、Setter 注入，以及定时任务和事件发布。

use crate::events::{FeatureAdded, FeatureAuditListener, FeatureRemoved};
use ioc_common::Trigger;
use ioc_core::{ComponentDefinition, ParameterSpec};
use ioc_events::EventBus;
use ioc_runtime::{RunnableComponent, StaticComponentScanner};
use ioc_scheduler::AsyncDispatcher;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;

/// 观察者接口：接收业务侧的文本通知
pub trait Observer: Send + Sync {
    fn notify(&self, message: &str);
}

/// 日志观察者
pub struct LoggerObserver;

impl Observer for LoggerObserver {
    fn notify(&self, message: &str) {
        info!("[日志观察者] {}", message);
    }
}

/// 邮件观察者
pub struct EmailSenderObserver;

impl Observer for EmailSenderObserver {
    fn notify(&self, message: &str) {
        info!("[邮件观察者] 发送通知邮件: {}", message);
    }
}

/// 数据访问接口
pub trait DemoDao: Send + Sync {
    fn save(&self, record: &str);
    fn count(&self) -> usize;
    fn environment(&self) -> String;
}

/// 内存实现的数据访问组件
///
/// 观察者按限定符字段注入，运行环境名从配置值注入。
#[derive(Default)]
pub struct InMemoryDemoDao {
    observer: RwLock<Option<Arc<dyn Observer>>>,
    environment: RwLock<String>,
    records: Mutex<Vec<String>>,
}

impl InMemoryDemoDao {
    fn set_observer(&self, observer: Arc<dyn Observer>) {
        *self.observer.write() = Some(observer);
    }

    fn set_environment(&self, environment: &str) {
        *self.environment.write() = environment.to_string();
    }
}

impl DemoDao for InMemoryDemoDao {
    fn save(&self, record: &str) {
        self.records.lock().push(record.to_string());
        if let Some(observer) = self.observer.read().clone() {
            observer.notify(&format!("已保存记录: {record}"));
        }
    }

    fn count(&self) -> usize {
        self.records.lock().len()
    }

    fn environment(&self) -> String {
        self.environment.read().clone()
    }
}

/// 业务服务
///
/// 数据访问层走主构造函数注入，通知观察者走 Setter 注入，
/// 另声明两个定时任务：固定频率的指标汇报和周期表达式的清理。
pub struct DemoService {
    dao: Arc<dyn DemoDao>,
    notifier: RwLock<Option<Arc<dyn Observer>>>,
    processed: Mutex<u64>,
}

impl DemoService {
    fn new(dao: Arc<dyn DemoDao>) -> Self {
        Self {
            dao,
            notifier: RwLock::new(None),
            processed: Mutex::new(0),
        }
    }

    fn set_notifier(&self, notifier: Arc<dyn Observer>) {
        *self.notifier.write() = Some(notifier);
    }

    /// 处理一个功能请求
    pub fn process(&self, feature: &str) {
        self.dao.save(feature);
        *self.processed.lock() += 1;
        if let Some(notifier) = self.notifier.read().clone() {
            notifier.notify(&format!("功能 {feature} 处理完成"));
        }
    }

    /// 已处理请求数
    pub fn processed(&self) -> u64 {
        *self.processed.lock()
    }

    fn report_metrics(&self) {
        info!(
            "指标汇报: 已处理 {} 个请求, 存量记录 {} 条 (环境 {})",
            self.processed(),
            self.dao.count(),
            self.dao.environment()
        );
    }

    fn cleanup(&self) {
        info!("周期清理: 当前存量记录 {} 条", self.dao.count());
    }
}

/// 应用入口组件
///
/// 引导完成后由运行时调用，串起事件订阅、业务处理和后台分发。
pub struct Application {
    service: Arc<DemoService>,
    bus: Arc<EventBus>,
    dispatcher: Arc<AsyncDispatcher>,
    audit: Arc<FeatureAuditListener>,
}

impl RunnableComponent for Application {
    fn run(&self, args: &[String]) {
        self.audit.attach(&self.bus);

        let features: Vec<String> = if args.is_empty() {
            vec!["请求缓存".to_string(), "自动重试".to_string()]
        } else {
            args.to_vec()
        };

        for feature in &features {
            self.service.process(feature);
            self.bus.publish(&FeatureAdded {
                name: feature.clone(),
            });
        }
        self.bus.publish(&FeatureRemoved {
            name: "旧版接口".to_string(),
        });

        let service = Arc::clone(&self.service);
        self.dispatcher.dispatch("demo-summary", move || {
            info!("后台汇总: 共处理 {} 个功能请求", service.processed());
        });

        info!("启动流程完成, 审计流水 {} 条", self.audit.entries().len());
    }
}

/// 演示应用的组件扫描器
pub fn scanner() -> StaticComponentScanner {
    StaticComponentScanner::new("demo-components")
        .with(
            ComponentDefinition::of::<LoggerObserver>()
                .with_id("loggerObserver")
                .provides::<dyn Observer, _>(|o| o)
                .constructor(vec![], |_| Ok(LoggerObserver))
                .build(),
        )
        .with(
            ComponentDefinition::of::<EmailSenderObserver>()
                .with_id("emailSenderObserver")
                .provides::<dyn Observer, _>(|o| o)
                .constructor(vec![], |_| Ok(EmailSenderObserver))
                .build(),
        )
        .with(
            ComponentDefinition::of::<InMemoryDemoDao>()
                .with_id("demoDao")
                .provides::<dyn DemoDao, _>(|d| d)
                .constructor(vec![], |_| Ok(InMemoryDemoDao::default()))
                .inject_field_qualified::<dyn Observer, _>("loggerObserver", |dao, observer| {
                    dao.set_observer(observer);
                })
                .inject_value("env", |dao, value| dao.set_environment(value))
                .build(),
        )
        .with(
            ComponentDefinition::of::<DemoService>()
                .with_id("demoService")
                .primary_constructor(vec![ParameterSpec::of::<dyn DemoDao>()], |args| {
                    Ok(DemoService::new(args.get::<dyn DemoDao>(0)?))
                })
                .inject_setter(
                    vec![ParameterSpec::of::<dyn Observer>().qualified("emailSenderObserver")],
                    |service, args| {
                        service.set_notifier(args.get::<dyn Observer>(0)?);
                        Ok(())
                    },
                )
                .scheduled("demo-metrics", Trigger::fixed_rate_ms(5000), |service| {
                    service.report_metrics();
                })
                .scheduled("demo-cleanup", Trigger::period("5 1"), |service| {
                    service.cleanup();
                })
                .build(),
        )
        .with(
            ComponentDefinition::of::<FeatureAuditListener>()
                .with_id("featureAuditListener")
                .constructor(vec![], |_| Ok(FeatureAuditListener::default()))
                .build(),
        )
        .with(
            ComponentDefinition::of::<Application>()
                .with_id("application")
                .provides::<dyn RunnableComponent, _>(|a| a)
                .constructor(
                    vec![
                        ParameterSpec::of::<DemoService>(),
                        ParameterSpec::of::<EventBus>(),
                        ParameterSpec::of::<AsyncDispatcher>(),
                        ParameterSpec::of::<FeatureAuditListener>(),
                    ],
                    |args| {
                        Ok(Application {
                            service: args.get::<DemoService>(0)?,
                            bus: args.get::<EventBus>(1)?,
                            dispatcher: args.get::<AsyncDispatcher>(2)?,
                            audit: args.get::<FeatureAuditListener>(3)?,
                        })
                    },
                )
                .build(),
        )
}
