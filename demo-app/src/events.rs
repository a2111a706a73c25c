//! 演示应用的事件与监听器

use ioc_events::EventBus;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// 功能已上线事件
pub struct FeatureAdded {
    pub name: String,
}

/// 功能已下线事件
pub struct FeatureRemoved {
    pub name: String,
}

/// 功能变更审计监听器
///
/// 订阅两种功能事件，按发生顺序记录变更流水。
#[derive(Default)]
pub struct FeatureAuditListener {
    entries: Mutex<Vec<String>>,
}

impl FeatureAuditListener {
    /// 把自身的处理器挂到事件总线上
    pub fn attach(self: &Arc<Self>, bus: &EventBus) {
        let listener = Arc::clone(self);
        bus.subscribe::<FeatureAdded, _>(move |event| {
            info!("审计: 功能上线 {}", event.name);
            listener.entries.lock().push(format!("+{}", event.name));
        });

        let listener = Arc::clone(self);
        bus.subscribe::<FeatureRemoved, _>(move |event| {
            info!("审计: 功能下线 {}", event.name);
            listener.entries.lock().push(format!("-{}", event.name));
        });
    }

    /// 当前审计流水
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_listener_records_both_event_kinds_in_order() {
        let bus = EventBus::new();
        let listener = Arc::new(FeatureAuditListener::default());
        listener.attach(&bus);

        bus.publish(&FeatureAdded {
            name: "缓存".to_string(),
        });
        bus.publish(&FeatureRemoved {
            name: "旧版接口".to_string(),
        });

        assert_eq!(listener.entries(), vec!["+缓存", "-旧版接口"]);
    }
}
