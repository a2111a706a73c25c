//! 单例实例注册表
//!
//! 双索引存储：按标识（唯一键，首次注册生效）和按类型
//! （每类型一组候选，支持一个接口多个实现）。
//! 注册是原子的：标识、具体类型和全部提供类型在一次调用里建齐，
//! 保证从任一索引可达的实例在另一索引下同样可达。

use crate::definition::ComponentDefinition;
use crate::handle::{unerase, AnyHandle};
use ioc_common::{ContainerError, ContainerResult, InstanceId, TypeInfo};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// 已注册的单例实例
///
/// 对每个可赋值类型保存一个擦除形态，
/// 可赋值性校验即“是否存在该类型的形态”。
pub struct RegisteredInstance {
    id: InstanceId,
    name: String,
    type_info: TypeInfo,
    forms: HashMap<TypeId, AnyHandle>,
}

impl RegisteredInstance {
    /// 创建注册项
    pub fn new(name: String, type_info: TypeInfo, forms: HashMap<TypeId, AnyHandle>) -> Self {
        Self {
            id: InstanceId::new(),
            name,
            type_info,
            forms,
        }
    }

    /// 实例标识
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// 注册名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 具体类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 实例是否可赋值给指定类型
    pub fn is_assignable_to(&self, type_id: TypeId) -> bool {
        self.forms.contains_key(&type_id)
    }

    /// 取指定类型的擦除形态
    pub fn form(&self, type_id: TypeId) -> Option<&AnyHandle> {
        self.forms.get(&type_id)
    }

    /// 以具体类型取实例
    pub fn get<P>(&self) -> Option<std::sync::Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        self.form(TypeId::of::<P>()).and_then(unerase::<P>)
    }
}

impl fmt::Debug for RegisteredInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_info", &self.type_info)
            .field("forms", &self.forms.len())
            .finish()
    }
}

/// 实例注册表
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    by_name: HashMap<String, InstanceId>,
    by_type: HashMap<TypeId, Vec<InstanceId>>,
    instances: HashMap<InstanceId, RegisteredInstance>,
}

impl InstanceRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个实例
    ///
    /// 按名称注册是幂等的：标识已绑定时保留首个实例；
    /// 按类型注册会覆盖实例的全部可赋值类型。
    pub fn register(&mut self, instance: RegisteredInstance) -> InstanceId {
        let instance_id = instance.id();

        if self.by_name.contains_key(instance.name()) {
            debug!("标识 {} 已绑定，保留首次注册的实例", instance.name());
        } else {
            self.by_name.insert(instance.name().to_string(), instance_id);
        }

        for &type_id in instance.forms.keys() {
            let candidates = self.by_type.entry(type_id).or_default();
            if !candidates.contains(&instance_id) {
                candidates.push(instance_id);
            }
        }

        debug!(
            "注册组件实例: {} ({}), 可赋值类型 {} 个",
            instance.name(),
            instance.type_info(),
            instance.forms.len()
        );
        self.instances.insert(instance_id, instance);
        instance_id
    }

    /// 指定类型是否已有实例
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.by_type.get(&type_id).is_some_and(|c| !c.is_empty())
    }

    /// 指定标识是否已绑定
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// 按标识查找
    ///
    /// `expected` 仅用于错误信息，标注查找方声明的依赖类型。
    pub fn lookup_by_name(
        &self,
        name: &str,
        expected: &str,
    ) -> ContainerResult<&RegisteredInstance> {
        self.by_name
            .get(name)
            .and_then(|id| self.instances.get(id))
            .ok_or_else(|| ContainerError::InstanceNotFound {
                type_name: expected.to_string(),
                qualifier: Some(name.to_string()),
            })
    }

    /// 按类型查找
    ///
    /// 无限定符的类型查找要求恰好一个候选：
    /// 零个报 `InstanceNotFound`，多于一个报 `MultipleCandidates`。
    pub fn lookup_by_type(&self, type_info: &TypeInfo) -> ContainerResult<&RegisteredInstance> {
        let candidates = self
            .by_type
            .get(&type_info.id)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ContainerError::InstanceNotFound {
                type_name: type_info.name.clone(),
                qualifier: None,
            })?;

        if candidates.len() > 1 {
            return Err(ContainerError::MultipleCandidates {
                type_name: type_info.name.clone(),
                count: candidates.len(),
            });
        }

        self.instances
            .get(&candidates[0])
            .ok_or_else(|| ContainerError::InstanceNotFound {
                type_name: type_info.name.clone(),
                qualifier: None,
            })
    }

    /// 按类型取实例（规范类型查找）
    pub fn get<P>(&self) -> ContainerResult<std::sync::Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<P>();
        let instance = self.lookup_by_type(&type_info)?;
        instance
            .get::<P>()
            .ok_or_else(|| ContainerError::DependencyInstanceMismatch {
                expected: type_info.name,
                actual: instance.type_info().name.clone(),
                owner: "<lookup>".to_string(),
            })
    }

    /// 按标识取实例，并校验可赋值性
    pub fn get_named<P>(&self, name: &str) -> ContainerResult<std::sync::Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<P>();
        let instance = self.lookup_by_name(name, &type_info.name)?;
        instance
            .get::<P>()
            .ok_or_else(|| ContainerError::DependencyInstanceMismatch {
                expected: type_info.name,
                actual: instance.type_info().name.clone(),
                owner: "<lookup>".to_string(),
            })
    }

    /// 已注册实例数量（按实例计，不按索引项计）
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// 遍历全部实例
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredInstance> {
        self.instances.values()
    }
}

/// 查找定义对应的宿主实例
///
/// 有显式标识的按标识查找，否则按具体类型做规范查找。
pub(crate) fn lookup_owner<'a>(
    registry: &'a InstanceRegistry,
    definition: &ComponentDefinition,
) -> ContainerResult<&'a RegisteredInstance> {
    match definition.explicit_id() {
        Some(id) => registry.lookup_by_name(id, &definition.type_info().name),
        None => registry.lookup_by_type(definition.type_info()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::erase;
    use std::sync::Arc;

    trait Sink: Send + Sync {
        fn label(&self) -> &'static str;
    }

    struct FileSink;

    impl Sink for FileSink {
        fn label(&self) -> &'static str {
            "file"
        }
    }

    #[derive(Debug)]
    struct NetSink;

    impl Sink for NetSink {
        fn label(&self) -> &'static str {
            "net"
        }
    }

    fn registered<T: Sink + Send + Sync + 'static>(name: &str, value: T) -> RegisteredInstance {
        let concrete = Arc::new(value);
        let as_sink: Arc<dyn Sink> = concrete.clone();
        let mut forms = HashMap::new();
        forms.insert(TypeId::of::<T>(), erase(concrete));
        forms.insert(TypeId::of::<dyn Sink>(), erase(as_sink));
        RegisteredInstance::new(name.to_string(), TypeInfo::of::<T>(), forms)
    }

    #[test]
    fn register_then_lookup_round_trip() {
        let mut registry = InstanceRegistry::new();
        registry.register(registered("fileSink", FileSink));

        let by_type = registry.get::<FileSink>().unwrap();
        assert_eq!(by_type.label(), "file");

        let by_trait = registry.get::<dyn Sink>().unwrap();
        assert_eq!(by_trait.label(), "file");

        let by_name = registry.get_named::<dyn Sink>("fileSink").unwrap();
        assert_eq!(by_name.label(), "file");
    }

    #[test]
    fn name_registration_is_idempotent() {
        let mut registry = InstanceRegistry::new();
        let first = registry.register(registered("sink", FileSink));
        registry.register(registered("sink", NetSink));

        let instance = registry.lookup_by_name("sink", "Sink").unwrap();
        assert_eq!(instance.id(), first);
        assert_eq!(instance.type_info().short_name(), "FileSink");
    }

    #[test]
    fn unqualified_lookup_requires_exactly_one() {
        let mut registry = InstanceRegistry::new();

        let err = registry.lookup_by_type(&TypeInfo::of::<dyn Sink>()).unwrap_err();
        assert!(matches!(err, ContainerError::InstanceNotFound { .. }));

        registry.register(registered("fileSink", FileSink));
        assert!(registry.lookup_by_type(&TypeInfo::of::<dyn Sink>()).is_ok());

        registry.register(registered("netSink", NetSink));
        let err = registry.lookup_by_type(&TypeInfo::of::<dyn Sink>()).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::MultipleCandidates { count: 2, .. }
        ));
    }

    #[test]
    fn mismatch_on_named_lookup_with_wrong_type() {
        let mut registry = InstanceRegistry::new();
        registry.register(registered("fileSink", FileSink));

        let err = registry.get_named::<NetSink>("fileSink").unwrap_err();
        assert!(matches!(err, ContainerError::DependencyInstanceMismatch { .. }));
    }
}
