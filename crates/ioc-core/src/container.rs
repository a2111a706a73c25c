//! 容器门面
//!
//! [`ContainerBuilder`] 收集组件定义与属性来源，`build` 一次性完成
//! 引导：递归解析实例化、二次注入，随后容器进入只读状态。
//! 引导期间的任何底层错误都包装为 [`InstanceCreationError`] 对外上报。

use crate::definition::{ComponentDefinition, DefinitionSet};
use crate::registry::{lookup_owner, InstanceRegistry, RegisteredInstance};
use crate::{DependencyResolver, Injector};
use ioc_common::{ContainerResult, CreationResult};
use ioc_config::{MemoryPropertySource, PropertySource};
use std::sync::Arc;
use tracing::info;

/// 引导完成后的容器
///
/// 注册表结构在引导结束后不再变化，查询接口只读，
/// 可安全地跨线程共享（定时任务和事件监听器都会并发访问组件）。
pub struct Container {
    definitions: DefinitionSet,
    registry: InstanceRegistry,
    properties: Arc<dyn PropertySource>,
}

impl Container {
    /// 开始构建容器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 按类型取组件实例（规范类型查找，要求恰好一个候选）
    pub fn get<P>(&self) -> ContainerResult<Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        self.registry.get::<P>()
    }

    /// 按标识取组件实例
    pub fn get_named<P>(&self, name: &str) -> ContainerResult<Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        self.registry.get_named::<P>(name)
    }

    /// 属性来源
    pub fn properties(&self) -> &dyn PropertySource {
        self.properties.as_ref()
    }

    /// 全部组件定义
    pub fn definitions(&self) -> &DefinitionSet {
        &self.definitions
    }

    /// 已注册实例数量
    pub fn instance_count(&self) -> usize {
        self.registry.instance_count()
    }

    /// 查找定义对应的宿主实例（定时任务调度时取宿主用）
    pub fn instance_of(
        &self,
        definition: &ComponentDefinition,
    ) -> ContainerResult<&RegisteredInstance> {
        lookup_owner(&self.registry, definition)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.definitions.len())
            .field("instances", &self.registry.instance_count())
            .field("properties", &self.properties.name())
            .finish()
    }
}

/// 容器构建器
#[derive(Default)]
pub struct ContainerBuilder {
    definitions: DefinitionSet,
    properties: Option<Arc<dyn PropertySource>>,
}

impl ContainerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个组件定义
    pub fn register(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.insert(definition);
        self
    }

    /// 批量注册组件定义
    pub fn register_all(mut self, definitions: impl IntoIterator<Item = ComponentDefinition>) -> Self {
        for definition in definitions {
            self.definitions.insert(definition);
        }
        self
    }

    /// 设置属性来源，缺省为空的内存来源
    pub fn with_property_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.properties = Some(source);
        self
    }

    /// 引导容器：解析实例化全部组件，再执行字段/Setter 注入
    pub fn build(self) -> CreationResult<Container> {
        let properties = self
            .properties
            .unwrap_or_else(|| Arc::new(MemoryPropertySource::new()));

        info!(
            "开始容器引导: {} 个组件定义, 属性来源 {}",
            self.definitions.len(),
            properties.name()
        );

        let mut registry = InstanceRegistry::new();
        DependencyResolver::new(&self.definitions, &mut registry).resolve_all()?;
        Injector::new(&self.definitions, &registry, properties.as_ref()).inject_all()?;

        info!("容器引导完成: {} 个组件实例", registry.instance_count());
        Ok(Container {
            definitions: self.definitions,
            registry,
            properties,
        })
    }
}
