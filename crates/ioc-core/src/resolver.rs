//! 依赖解析器
//!
//! 自底向上递归构建依赖图：先解析构造函数参数类型（深度优先，
//! 依赖先于依赖方创建），再实例化并注册。每个类型恰好实例化一次；
//! 递归展开期间维护“构建中”集合，重入即为循环依赖，立即失败。

use crate::definition::{ComponentDefinition, ConstructorSpec, DefinitionSet, ParameterSpec};
use crate::handle::{AnyHandle, ResolvedArguments};
use crate::registry::{InstanceRegistry, RegisteredInstance};
use ioc_common::{ContainerError, ContainerResult, InjectionPosition};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// 依赖解析器
///
/// 对一个定义集合运行一次，产出填满的注册表。
pub struct DependencyResolver<'a> {
    definitions: &'a DefinitionSet,
    registry: &'a mut InstanceRegistry,
    in_progress: Vec<String>,
    in_progress_ids: HashSet<TypeId>,
}

impl<'a> DependencyResolver<'a> {
    /// 创建解析器
    pub fn new(definitions: &'a DefinitionSet, registry: &'a mut InstanceRegistry) -> Self {
        Self {
            definitions,
            registry,
            in_progress: Vec::new(),
            in_progress_ids: HashSet::new(),
        }
    }

    /// 解析全部定义
    ///
    /// 按加入顺序遍历；已被兄弟依赖带出的实例直接复用。
    pub fn resolve_all(mut self) -> ContainerResult<()> {
        let definitions = self.definitions;
        for definition in definitions.iter() {
            self.resolve_definition(definition)?;
        }
        info!(
            "依赖解析完成: {} 个定义产出 {} 个实例",
            definitions.len(),
            self.registry.instance_count()
        );
        Ok(())
    }

    fn resolve_definition(&mut self, definition: &'a ComponentDefinition) -> ContainerResult<()> {
        let type_id = definition.type_info().id;

        // 实例化按类型幂等：类型或标识任一已注册即复用
        if self.registry.contains_type(type_id)
            || self.registry.contains_name(definition.identifier())
        {
            return Ok(());
        }

        if self.in_progress_ids.contains(&type_id) {
            let mut chain = self.in_progress.clone();
            chain.push(definition.identifier().to_string());
            return Err(ContainerError::CyclicDependency { chain });
        }

        let Some(constructor) = preferred_constructor(definition)? else {
            // 零构造函数按策略跳过：接口等不可实例化类型不是错误
            debug!("类型 {} 没有构造函数，跳过", definition.type_info());
            return Ok(());
        };

        self.definitions.validate_parameters(
            definition.identifier(),
            &constructor.params,
            InjectionPosition::Constructor,
        )?;

        self.in_progress_ids.insert(type_id);
        self.in_progress.push(definition.identifier().to_string());

        for param in &constructor.params {
            self.resolve_dependency_type(param.type_info.id)?;
        }

        // 递归展开期间可能已作为兄弟依赖被创建
        if !self.registry.contains_type(type_id)
            && !self.registry.contains_name(definition.identifier())
        {
            let args = resolve_arguments(self.registry, definition, &constructor.params)?;
            let handle = (constructor.construct)(&args)?;
            let instance = build_registered_instance(definition, handle)?;
            debug!("创建组件实例: {}", definition.identifier());
            self.registry.register(instance);
        }

        self.in_progress.pop();
        self.in_progress_ids.remove(&type_id);
        Ok(())
    }

    /// 解析一个被依赖的托管类型
    ///
    /// 有自身定义的直接解析；是接口（无自身可实例化定义）时，
    /// 解析所有提供该类型的定义，使单实现的接口依赖与定义顺序无关。
    fn resolve_dependency_type(&mut self, type_id: TypeId) -> ContainerResult<()> {
        let definitions = self.definitions;
        if let Some(definition) = definitions.get(type_id) {
            self.resolve_definition(definition)?;
        }
        for provider in definitions.providers_of(type_id) {
            self.resolve_definition(provider)?;
        }
        Ok(())
    }
}

/// 选择首选构造函数
///
/// 策略：恰好一个主构造函数 > 唯一构造函数；
/// 多个主构造函数或多构造函数且无主标记都是错误；
/// 零构造函数返回 `None`（调用方按不可实例化处理）。
pub(crate) fn preferred_constructor(
    definition: &ComponentDefinition,
) -> ContainerResult<Option<&ConstructorSpec>> {
    let primaries: Vec<&ConstructorSpec> = definition
        .constructors()
        .iter()
        .filter(|c| c.primary)
        .collect();

    if primaries.len() > 1 {
        return Err(ContainerError::MultiplePrimaryConstructors {
            type_name: definition.type_info().name.clone(),
            count: primaries.len(),
        });
    }
    if let Some(primary) = primaries.first() {
        return Ok(Some(primary));
    }

    match definition.constructors() {
        [] => Ok(None),
        [single] => Ok(Some(single)),
        many => Err(ContainerError::MultipleConstructorsNonPrimary {
            type_name: definition.type_info().name.clone(),
            count: many.len(),
        }),
    }
}

/// 解析一组参数为实参列表
///
/// 带限定符的参数按标识查找，否则按类型做规范查找；
/// 查到的实例必须可赋值给声明的参数类型。
pub(crate) fn resolve_arguments(
    registry: &InstanceRegistry,
    owner: &ComponentDefinition,
    params: &[ParameterSpec],
) -> ContainerResult<ResolvedArguments> {
    let mut args = ResolvedArguments::new(owner.identifier().to_string());

    for param in params {
        let instance = match &param.qualifier {
            Some(qualifier) => registry.lookup_by_name(qualifier, &param.type_info.name)?,
            None => registry.lookup_by_type(&param.type_info)?,
        };

        let form = instance.form(param.type_info.id).ok_or_else(|| {
            ContainerError::DependencyInstanceMismatch {
                expected: param.type_info.name.clone(),
                actual: instance.type_info().name.clone(),
                owner: owner.identifier().to_string(),
            }
        })?;

        args.push(param.type_info.clone(), form.clone());
    }

    Ok(args)
}

/// 由定义和新实例句柄组装注册项
///
/// 形态表包含具体类型本身与每个提供类型的转换结果。
fn build_registered_instance(
    definition: &ComponentDefinition,
    handle: AnyHandle,
) -> ContainerResult<RegisteredInstance> {
    let mut forms: HashMap<TypeId, AnyHandle> = HashMap::new();
    forms.insert(definition.type_info().id, handle.clone());

    for provided in definition.provides() {
        let form = (provided.cast)(&handle).ok_or_else(|| {
            ContainerError::DependencyInstanceMismatch {
                expected: provided.type_info.name.clone(),
                actual: definition.type_info().name.clone(),
                owner: definition.identifier().to_string(),
            }
        })?;
        forms.insert(provided.type_info.id, form);
    }

    Ok(RegisteredInstance::new(
        definition.identifier().to_string(),
        definition.type_info().clone(),
        forms,
    ))
}
