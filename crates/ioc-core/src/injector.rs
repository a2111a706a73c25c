//! 二次注入器
//!
//! 解析器把全部实例建好之后运行：对每个可实例化定义，
//! 先注入依赖字段和配置值字段，再调用 Setter 注入点。
//! 两阶段顺序保证字段/Setter 引用的依赖一定已存在，
//! 这也是允许出现环状引用关系（非构造环）的前提。

use crate::definition::{DefinitionSet, FieldSpec};
use crate::registry::{lookup_owner, InstanceRegistry};
use crate::resolver::resolve_arguments;
use ioc_common::{ContainerError, ContainerResult, InjectionPosition};
use ioc_config::PropertySource;
use tracing::{debug, warn};

/// 字段/Setter 注入器
pub struct Injector<'a> {
    definitions: &'a DefinitionSet,
    registry: &'a InstanceRegistry,
    properties: &'a dyn PropertySource,
}

impl<'a> Injector<'a> {
    /// 创建注入器
    pub fn new(
        definitions: &'a DefinitionSet,
        registry: &'a InstanceRegistry,
        properties: &'a dyn PropertySource,
    ) -> Self {
        Self {
            definitions,
            registry,
            properties,
        }
    }

    /// 对全部定义执行注入
    pub fn inject_all(&self) -> ContainerResult<()> {
        for definition in self.definitions.iter() {
            self.inject_definition(definition)?;
        }
        Ok(())
    }

    fn inject_definition(
        &self,
        definition: &crate::definition::ComponentDefinition,
    ) -> ContainerResult<()> {
        if definition.fields().is_empty() && definition.setters().is_empty() {
            return Ok(());
        }

        let owner = lookup_owner(self.registry, definition)?;
        let owner_handle = owner.form(definition.type_info().id).ok_or_else(|| {
            ContainerError::DependencyInstanceMismatch {
                expected: definition.type_info().name.clone(),
                actual: owner.type_info().name.clone(),
                owner: definition.identifier().to_string(),
            }
        })?;

        for field in definition.fields() {
            match field {
                FieldSpec::Dependency { param, apply } => {
                    self.definitions.validate_parameters(
                        definition.identifier(),
                        std::slice::from_ref(param),
                        InjectionPosition::Field,
                    )?;
                    let instance = match &param.qualifier {
                        Some(qualifier) => {
                            self.registry.lookup_by_name(qualifier, &param.type_info.name)?
                        }
                        None => self.registry.lookup_by_type(&param.type_info)?,
                    };
                    let form = instance.form(param.type_info.id).ok_or_else(|| {
                        ContainerError::DependencyInstanceMismatch {
                            expected: param.type_info.name.clone(),
                            actual: instance.type_info().name.clone(),
                            owner: definition.identifier().to_string(),
                        }
                    })?;
                    apply(owner_handle, form)?;
                }
                FieldSpec::Value { key, apply } => match self.properties.get(key) {
                    Some(value) => apply(owner_handle, &value)?,
                    None => {
                        // 缺失的配置键不是错误，跳过该字段并告警
                        warn!(
                            "配置键 {} 不存在，跳过组件 {} 的值注入",
                            key,
                            definition.identifier()
                        );
                    }
                },
            }
        }

        for setter in definition.setters() {
            self.definitions.validate_parameters(
                definition.identifier(),
                &setter.params,
                InjectionPosition::Setter,
            )?;
            let args = resolve_arguments(self.registry, definition, &setter.params)?;
            (setter.invoke)(owner_handle, &args)?;
        }

        debug!(
            "注入完成: {} ({} 个字段, {} 个 Setter)",
            definition.identifier(),
            definition.fields().len(),
            definition.setters().len()
        );
        Ok(())
    }
}
