//! 事件总线
//!
//! 监听器表按事件类型 (`TypeId`) 分桶，桶内保持注册顺序。
//! 发布是同步的：先在读锁下拷出监听器列表再逐个调用，
//! 因此监听器内可以安全地再次订阅或发布而不会死锁。

use ioc_common::simple_name;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 监听器句柄，用于退订
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

type HandlerFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

struct Subscription {
    id: ListenerId,
    event_name: &'static str,
    handler: HandlerFn,
}

/// 同步事件总线
pub struct EventBus {
    listeners: RwLock<HashMap<TypeId, Vec<Subscription>>>,
    next_id: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// 订阅一种事件类型
    ///
    /// 同一类型可注册任意多个监听器，分发时按注册顺序调用。
    pub fn subscribe<E, F>(&self, handler: F) -> ListenerId
    where
        E: Any + Send + Sync,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let event_name = simple_name(std::any::type_name::<E>());
        let handler: HandlerFn = Arc::new(move |event| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });

        self.listeners
            .write()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Subscription {
                id,
                event_name,
                handler,
            });
        debug!("注册事件监听器 {} (事件类型 {})", id, event_name);
        id
    }

    /// 退订
    ///
    /// 返回是否确实移除了监听器；已退订的句柄再次退订是无害的。
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        for bucket in listeners.values_mut() {
            if let Some(index) = bucket.iter().position(|s| s.id == id) {
                let removed = bucket.remove(index);
                debug!("移除事件监听器 {} (事件类型 {})", id, removed.event_name);
                return true;
            }
        }
        false
    }

    /// 发布一个事件
    ///
    /// 同步分发给该具体类型的全部监听器；没有监听器时静默返回。
    pub fn publish<E: Any + Send + Sync>(&self, event: &E) {
        self.dispatch(TypeId::of::<E>(), event);
    }

    /// 发布一个可能缺失的装箱事件
    ///
    /// `None` 不是错误：记一条诊断告警后返回，与同步发布路径保持
    /// 相同的“缺失事件不致命”语义。
    pub fn publish_boxed(&self, event: Option<Box<dyn Any + Send + Sync>>) {
        match event {
            Some(event) => self.dispatch((*event).type_id(), event.as_ref()),
            None => warn!("收到空事件（None），忽略本次发布"),
        }
    }

    /// 指定事件类型当前的监听器数量
    pub fn listener_count<E: Any + Send + Sync>(&self) -> usize {
        self.listeners
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    fn dispatch(&self, type_id: TypeId, event: &(dyn Any + Send + Sync)) {
        // 拷出监听器再释放锁，允许监听器内再次订阅/发布
        let snapshot: Vec<(ListenerId, &'static str, HandlerFn)> = {
            let listeners = self.listeners.read();
            match listeners.get(&type_id) {
                Some(bucket) => bucket
                    .iter()
                    .map(|s| (s.id, s.event_name, s.handler.clone()))
                    .collect(),
                None => return,
            }
        };

        for (id, event_name, handler) in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(event)));
            if let Err(payload) = outcome {
                let message = panic_message(&payload);
                error!(
                    "事件监听器 {} 处理 {} 事件时 panic: {}",
                    id, event_name, message
                );
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let total: usize = listeners.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("event_types", &listeners.len())
            .field("listeners", &total)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<非字符串 panic>"
    }
}
