//! 框架端到端集成测试
//!
//! 覆盖从组件定义到运行时的完整链路：递归解析、两阶段注入、
//! 配置文件加载、定时任务调度和事件总线协作。

use ioc_common::{ContainerError, Trigger};
use ioc_config::{MemoryPropertySource, PropertiesFileSource};
use ioc_core::{ComponentDefinition, Container, ParameterSpec};
use ioc_events::EventBus;
use ioc_runtime::{AppRuntime, RunnableComponent, StaticComponentScanner};
use ioc_scheduler::TaskScheduler;
use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

trait Cache: Send + Sync + std::fmt::Debug {
    fn label(&self) -> &'static str;
}

#[derive(Debug)]
struct RedisCache;

impl Cache for RedisCache {
    fn label(&self) -> &'static str {
        "redis"
    }
}

#[derive(Debug)]
struct LocalCache;

impl Cache for LocalCache {
    fn label(&self) -> &'static str {
        "local"
    }
}

struct Database;

struct UserRepo {
    db: Arc<Database>,
}

struct OrderRepo {
    db: Arc<Database>,
}

struct CheckoutService {
    users: Arc<UserRepo>,
    orders: Arc<OrderRepo>,
    cache: RwLock<Option<Arc<dyn Cache>>>,
}

fn diamond_definitions() -> Vec<ComponentDefinition> {
    vec![
        // 依赖方排在最前，验证深度优先的依赖先行创建
        ComponentDefinition::of::<CheckoutService>()
            .constructor(
                vec![
                    ParameterSpec::of::<UserRepo>(),
                    ParameterSpec::of::<OrderRepo>(),
                ],
                |args| {
                    Ok(CheckoutService {
                        users: args.get::<UserRepo>(0)?,
                        orders: args.get::<OrderRepo>(1)?,
                        cache: RwLock::new(None),
                    })
                },
            )
            .inject_field_qualified::<dyn Cache, _>("redisCache", |service, cache| {
                *service.cache.write() = Some(cache);
            })
            .build(),
        ComponentDefinition::of::<UserRepo>()
            .constructor(vec![ParameterSpec::of::<Database>()], |args| {
                Ok(UserRepo {
                    db: args.get::<Database>(0)?,
                })
            })
            .build(),
        ComponentDefinition::of::<OrderRepo>()
            .constructor(vec![ParameterSpec::of::<Database>()], |args| {
                Ok(OrderRepo {
                    db: args.get::<Database>(0)?,
                })
            })
            .build(),
        ComponentDefinition::of::<Database>()
            .constructor(vec![], |_| Ok(Database))
            .build(),
        ComponentDefinition::of::<RedisCache>()
            .with_id("redisCache")
            .provides::<dyn Cache, _>(|c| c)
            .constructor(vec![], |_| Ok(RedisCache))
            .build(),
        ComponentDefinition::of::<LocalCache>()
            .with_id("localCache")
            .provides::<dyn Cache, _>(|c| c)
            .constructor(vec![], |_| Ok(LocalCache))
            .build(),
    ]
}

#[test]
fn diamond_graph_resolves_with_shared_singletons() {
    let container = Container::builder()
        .register_all(diamond_definitions())
        .build()
        .unwrap();

    assert_eq!(container.instance_count(), 6);

    let service = container.get::<CheckoutService>().unwrap();
    let db = container.get::<Database>().unwrap();
    // 菱形两条边共享同一个底层实例
    assert!(Arc::ptr_eq(&service.users.db, &db));
    assert!(Arc::ptr_eq(&service.orders.db, &db));

    // 字段注入按限定符命中了指定实现
    let cache = service.cache.read().clone().unwrap();
    assert_eq!(cache.label(), "redis");
}

#[test]
fn named_and_typed_lookups_reach_the_same_instance() {
    let container = Container::builder()
        .register_all(diamond_definitions())
        .build()
        .unwrap();

    let by_name = container.get_named::<dyn Cache>("localCache").unwrap();
    assert_eq!(by_name.label(), "local");

    let typed = container.get::<RedisCache>().unwrap();
    let named = container.get_named::<RedisCache>("redisCache").unwrap();
    assert!(Arc::ptr_eq(&typed, &named));
}

#[test]
fn unqualified_interface_lookup_with_two_implementations_fails() {
    let container = Container::builder()
        .register_all(diamond_definitions())
        .build()
        .unwrap();

    let err = container.get::<dyn Cache>().unwrap_err();
    assert!(matches!(
        err,
        ContainerError::MultipleCandidates { count: 2, .. }
    ));
}

#[test]
fn constructor_cycle_is_reported_with_chain() {
    struct Ping {
        _pong: Arc<Pong>,
    }
    struct Pong {
        _ping: Arc<Ping>,
    }

    let err = Container::builder()
        .register(
            ComponentDefinition::of::<Ping>()
                .constructor(vec![ParameterSpec::of::<Pong>()], |args| {
                    Ok(Ping {
                        _pong: args.get::<Pong>(0)?,
                    })
                })
                .build(),
        )
        .register(
            ComponentDefinition::of::<Pong>()
                .constructor(vec![ParameterSpec::of::<Ping>()], |args| {
                    Ok(Pong {
                        _ping: args.get::<Ping>(0)?,
                    })
                })
                .build(),
        )
        .build()
        .unwrap_err();

    match err.cause() {
        ContainerError::CyclicDependency { chain } => {
            assert!(chain.len() >= 3);
            assert_eq!(chain.first(), chain.last());
        }
        other => panic!("意外的错误类型: {other:?}"),
    }
}

#[test]
fn all_unsupported_constructor_types_are_reported_at_once() {
    struct Needy;

    let err = Container::builder()
        .register(
            ComponentDefinition::of::<Needy>()
                .constructor(
                    vec![ParameterSpec::of::<String>(), ParameterSpec::of::<u64>()],
                    |_| Ok(Needy),
                )
                .build(),
        )
        .build()
        .unwrap_err();

    match err.cause() {
        ContainerError::DependencyTypeNotSupportedOrFound { unsupported, .. } => {
            assert_eq!(unsupported.len(), 2);
        }
        other => panic!("意外的错误类型: {other:?}"),
    }
}

#[test]
fn properties_file_feeds_value_injection_and_pool_size() {
    struct Configured {
        env: RwLock<String>,
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# 集成测试配置").unwrap();
    writeln!(file, "env=integration").unwrap();
    writeln!(file, "scheduler.pool.size=2").unwrap();

    let source = Arc::new(PropertiesFileSource::new(file.path()).unwrap());
    let container = Container::builder()
        .register(
            ComponentDefinition::of::<Configured>()
                .constructor(vec![], |_| {
                    Ok(Configured {
                        env: RwLock::new(String::new()),
                    })
                })
                .inject_value("env", |c, value| *c.env.write() = value.to_string())
                .build(),
        )
        .with_property_source(source)
        .build()
        .unwrap();

    let configured = container.get::<Configured>().unwrap();
    assert_eq!(*configured.env.read(), "integration");

    let scheduler = TaskScheduler::from_properties(container.properties()).unwrap();
    assert_eq!(scheduler.worker_count(), 2);
    scheduler.shutdown(Duration::from_millis(100));
}

#[test]
fn missing_properties_file_fails_bootstrap() {
    let err = PropertiesFileSource::new("/nonexistent/application.properties").unwrap_err();
    assert!(matches!(
        err,
        ContainerError::ResourcePropertiesNotFound { .. }
    ));
}

#[test]
fn scheduled_task_fires_immediately_and_then_periodically() {
    struct Heartbeat {
        beats: Mutex<u32>,
    }

    let container = Container::builder()
        .register(
            ComponentDefinition::of::<Heartbeat>()
                .constructor(vec![], |_| {
                    Ok(Heartbeat {
                        beats: Mutex::new(0),
                    })
                })
                .scheduled("heartbeat", Trigger::fixed_rate_ms(1000), |h| {
                    *h.beats.lock() += 1;
                })
                .build(),
        )
        .build()
        .unwrap();

    let mut scheduler = TaskScheduler::new(1).unwrap();
    scheduler.schedule_all(&container).unwrap();

    thread::sleep(Duration::from_millis(2300));
    let beats = *container.get::<Heartbeat>().unwrap().beats.lock();
    // 首次立即触发 + 约每秒一次，区间放宽以容忍调度抖动
    assert!((2..=4).contains(&beats), "心跳次数异常: {beats}");

    scheduler.shutdown(Duration::from_millis(100));
}

#[test]
fn invalid_period_spec_fails_runtime_start() {
    struct Broken;

    let scanner = StaticComponentScanner::new("broken").with(
        ComponentDefinition::of::<Broken>()
            .constructor(vec![], |_| Ok(Broken))
            .scheduled("broken", Trigger::period("every five"), |_| {})
            .build(),
    );

    let err = AppRuntime::builder().add_scanner(scanner).start().unwrap_err();
    assert!(err.to_string().contains("调度定时任务失败"));
}

#[test]
fn runtime_wires_event_bus_between_components() {
    struct Counter {
        count: Mutex<u32>,
    }

    struct Publisher {
        bus: Arc<EventBus>,
        counter: Arc<Counter>,
    }

    struct Tick;

    impl RunnableComponent for Publisher {
        fn run(&self, _args: &[String]) {
            let counter = Arc::clone(&self.counter);
            self.bus.subscribe::<Tick, _>(move |_| *counter.count.lock() += 1);
            self.bus.publish(&Tick);
            self.bus.publish(&Tick);
        }
    }

    let scanner = StaticComponentScanner::new("event-demo")
        .with(
            ComponentDefinition::of::<Counter>()
                .constructor(vec![], |_| {
                    Ok(Counter {
                        count: Mutex::new(0),
                    })
                })
                .build(),
        )
        .with(
            ComponentDefinition::of::<Publisher>()
                .provides::<dyn RunnableComponent, _>(|p| p)
                .constructor(
                    vec![
                        ParameterSpec::of::<EventBus>(),
                        ParameterSpec::of::<Counter>(),
                    ],
                    |args| {
                        Ok(Publisher {
                            bus: args.get::<EventBus>(0)?,
                            counter: args.get::<Counter>(1)?,
                        })
                    },
                )
                .build(),
        );

    let runtime = AppRuntime::builder()
        .add_scanner(scanner)
        .with_property_source(Arc::new(MemoryPropertySource::new()))
        .start()
        .unwrap();

    runtime.run(&[]).unwrap();
    let counter = runtime.container().get::<Counter>().unwrap();
    assert_eq!(*counter.count.lock(), 2);

    runtime.shutdown(Duration::from_millis(200));
}

#[test]
fn two_constructors_without_primary_fail_bootstrap() {
    struct Ambiguous;

    let err = Container::builder()
        .register(
            ComponentDefinition::of::<Ambiguous>()
                .constructor(vec![], |_| Ok(Ambiguous))
                .constructor(vec![], |_| Ok(Ambiguous))
                .build(),
        )
        .build()
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        ContainerError::MultipleConstructorsNonPrimary { count: 2, .. }
    ));
}
