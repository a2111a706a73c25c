//! 组件定义
//!
//! [`ComponentDefinition`] 是显式的编译时注册表项：标识、提供的
//! 父类型/接口、构造函数、注入点和定时任务都在代码里声明，
//! 取代源头上基于运行时反射的注解扫描。

use crate::handle::{erase, unerase, AnyHandle, ResolvedArguments};
use ioc_common::{ContainerError, ContainerResult, InjectionPosition, Trigger, TypeInfo};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

/// 构造闭包：接收已解析的参数，产出擦除后的新实例
pub type ConstructFn = Arc<dyn Fn(&ResolvedArguments) -> ContainerResult<AnyHandle> + Send + Sync>;

/// 父类型转换闭包：把具体实例的句柄转换为某个提供类型的擦除形态
pub type CastFn = Arc<dyn Fn(&AnyHandle) -> Option<AnyHandle> + Send + Sync>;

/// 依赖字段注入闭包：(宿主句柄, 依赖句柄)
pub type ApplyFieldFn = Arc<dyn Fn(&AnyHandle, &AnyHandle) -> ContainerResult<()> + Send + Sync>;

/// 配置值注入闭包：(宿主句柄, 配置值)
pub type ApplyValueFn = Arc<dyn Fn(&AnyHandle, &str) -> ContainerResult<()> + Send + Sync>;

/// Setter 调用闭包：(宿主句柄, 已解析参数)
pub type InvokeSetterFn = Arc<dyn Fn(&AnyHandle, &ResolvedArguments) -> ContainerResult<()> + Send + Sync>;

/// 定时任务体：接收宿主实例句柄
pub type TaskFn = Arc<dyn Fn(&AnyHandle) + Send + Sync>;

/// 依赖参数规格
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// 声明的依赖类型
    pub type_info: TypeInfo,
    /// 可选的限定符（显式实例标识）
    pub qualifier: Option<String>,
}

impl ParameterSpec {
    /// 按类型声明参数
    pub fn of<P: ?Sized + Send + Sync + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<P>(),
            qualifier: None,
        }
    }

    /// 附加限定符
    pub fn qualified(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// 构造函数规格
#[derive(Clone)]
pub struct ConstructorSpec {
    /// 是否被标记为主构造函数
    pub primary: bool,
    /// 参数规格
    pub params: Vec<ParameterSpec>,
    pub(crate) construct: ConstructFn,
}

impl fmt::Debug for ConstructorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("primary", &self.primary)
            .field("params", &self.params)
            .field("construct", &"<function>")
            .finish()
    }
}

/// 注入字段规格
#[derive(Clone)]
pub enum FieldSpec {
    /// 依赖注入字段
    Dependency {
        param: ParameterSpec,
        apply: ApplyFieldFn,
    },
    /// 配置值注入字段
    Value { key: String, apply: ApplyValueFn },
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dependency { param, .. } => f
                .debug_struct("FieldSpec::Dependency")
                .field("param", param)
                .field("apply", &"<function>")
                .finish(),
            Self::Value { key, .. } => f
                .debug_struct("FieldSpec::Value")
                .field("key", key)
                .field("apply", &"<function>")
                .finish(),
        }
    }
}

/// Setter 注入规格
#[derive(Clone)]
pub struct SetterSpec {
    /// 参数规格
    pub params: Vec<ParameterSpec>,
    pub(crate) invoke: InvokeSetterFn,
}

impl fmt::Debug for SetterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetterSpec")
            .field("params", &self.params)
            .field("invoke", &"<function>")
            .finish()
    }
}

/// 定时任务规格
#[derive(Clone)]
pub struct ScheduledSpec {
    /// 任务名称，用于日志
    pub name: String,
    /// 触发规格
    pub trigger: Trigger,
    pub(crate) run: TaskFn,
}

impl ScheduledSpec {
    /// 以宿主实例句柄执行一次任务体
    pub fn fire(&self, owner: &AnyHandle) {
        (self.run)(owner);
    }
}

impl fmt::Debug for ScheduledSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledSpec")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("run", &"<function>")
            .finish()
    }
}

/// 提供的父类型/接口
#[derive(Clone)]
pub struct ProvidedType {
    /// 提供的类型
    pub type_info: TypeInfo,
    pub(crate) cast: CastFn,
}

impl fmt::Debug for ProvidedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedType")
            .field("type_info", &self.type_info)
            .field("cast", &"<function>")
            .finish()
    }
}

/// 组件定义
#[derive(Clone)]
pub struct ComponentDefinition {
    type_info: TypeInfo,
    id: Option<String>,
    provides: Vec<ProvidedType>,
    constructors: Vec<ConstructorSpec>,
    fields: Vec<FieldSpec>,
    setters: Vec<SetterSpec>,
    tasks: Vec<ScheduledSpec>,
}

impl ComponentDefinition {
    /// 开始定义一个具体组件类型
    pub fn of<T: Send + Sync + 'static>() -> DefinitionBuilder<T> {
        DefinitionBuilder::new()
    }

    /// 定义一个接口类型
    ///
    /// 接口没有构造函数，解析器会跳过它（按策略视为不可实例化），
    /// 但它会进入托管类型集合，可以作为依赖被声明。
    pub fn interface<P: ?Sized + Send + Sync + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<P>(),
            id: None,
            provides: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            setters: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// 组件标识：显式标识，缺省为类型简单名称
    pub fn identifier(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.type_info.name)
    }

    /// 显式标识（如有）
    pub fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// 具体类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 提供的父类型/接口
    pub fn provides(&self) -> &[ProvidedType] {
        &self.provides
    }

    /// 构造函数规格
    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    /// 注入字段规格
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Setter 注入规格
    pub fn setters(&self) -> &[SetterSpec] {
        &self.setters
    }

    /// 定时任务规格
    pub fn tasks(&self) -> &[ScheduledSpec] {
        &self.tasks
    }

    /// 是否可实例化（至少声明了一个构造函数）
    pub fn is_instantiable(&self) -> bool {
        !self.constructors.is_empty()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("type_info", &self.type_info)
            .field("id", &self.id)
            .field("provides", &self.provides)
            .field("constructors", &self.constructors.len())
            .field("fields", &self.fields.len())
            .field("setters", &self.setters.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

/// 组件定义构建器
///
/// 类型参数 `T` 是被定义的具体组件类型，
/// 闭包内的向下转型由构建器统一封装。
pub struct DefinitionBuilder<T> {
    definition: ComponentDefinition,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DefinitionBuilder<T> {
    fn new() -> Self {
        Self {
            definition: ComponentDefinition {
                type_info: TypeInfo::of::<T>(),
                id: None,
                provides: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
                setters: Vec::new(),
                tasks: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// 设置显式标识
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.definition.id = Some(id.into());
        self
    }

    /// 声明组件提供某个父类型/接口
    ///
    /// 注册时实例会同时索引到该类型下，父类型查找因此可以命中。
    pub fn provides<P, F>(mut self, cast: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<P> + Send + Sync + 'static,
    {
        let cast_fn: CastFn = Arc::new(move |handle: &AnyHandle| {
            unerase::<T>(handle).map(|concrete| erase(cast(concrete)))
        });
        self.definition.provides.push(ProvidedType {
            type_info: TypeInfo::of::<P>(),
            cast: cast_fn,
        });
        self
    }

    /// 声明一个普通构造函数
    pub fn constructor<F>(self, params: Vec<ParameterSpec>, construct: F) -> Self
    where
        F: Fn(&ResolvedArguments) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.push_constructor(false, params, construct)
    }

    /// 声明一个主构造函数（多构造函数时的首选）
    pub fn primary_constructor<F>(self, params: Vec<ParameterSpec>, construct: F) -> Self
    where
        F: Fn(&ResolvedArguments) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.push_constructor(true, params, construct)
    }

    fn push_constructor<F>(mut self, primary: bool, params: Vec<ParameterSpec>, construct: F) -> Self
    where
        F: Fn(&ResolvedArguments) -> ContainerResult<T> + Send + Sync + 'static,
    {
        let construct_fn: ConstructFn =
            Arc::new(move |args| Ok(erase(Arc::new(construct(args)?))));
        self.definition.constructors.push(ConstructorSpec {
            primary,
            params,
            construct: construct_fn,
        });
        self
    }

    /// 声明一个按类型解析的依赖注入字段
    pub fn inject_field<P, F>(self, apply: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&T, Arc<P>) + Send + Sync + 'static,
    {
        self.push_field::<P, F>(None, apply)
    }

    /// 声明一个按限定符解析的依赖注入字段
    pub fn inject_field_qualified<P, F>(self, qualifier: impl Into<String>, apply: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&T, Arc<P>) + Send + Sync + 'static,
    {
        self.push_field::<P, F>(Some(qualifier.into()), apply)
    }

    fn push_field<P, F>(mut self, qualifier: Option<String>, apply: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&T, Arc<P>) + Send + Sync + 'static,
    {
        let owner_name = self.definition.type_info.name.clone();
        let apply_fn: ApplyFieldFn = Arc::new(move |owner, dependency| {
            let owner_arc =
                unerase::<T>(owner).ok_or_else(|| ContainerError::DependencyInstanceMismatch {
                    expected: TypeInfo::of::<T>().name,
                    actual: "<擦除句柄>".to_string(),
                    owner: owner_name.clone(),
                })?;
            let dependency_arc = unerase::<P>(dependency).ok_or_else(|| {
                ContainerError::DependencyInstanceMismatch {
                    expected: TypeInfo::of::<P>().name,
                    actual: "<擦除句柄>".to_string(),
                    owner: owner_name.clone(),
                }
            })?;
            apply(&owner_arc, dependency_arc);
            Ok(())
        });

        let mut param = ParameterSpec::of::<P>();
        param.qualifier = qualifier;
        self.definition.fields.push(FieldSpec::Dependency {
            param,
            apply: apply_fn,
        });
        self
    }

    /// 声明一个配置值注入字段
    ///
    /// 注入时通过属性来源解析 `key`，值以字符串形式交给闭包。
    pub fn inject_value<F>(mut self, key: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&T, &str) + Send + Sync + 'static,
    {
        let owner_name = self.definition.type_info.name.clone();
        let apply_fn: ApplyValueFn = Arc::new(move |owner, value| {
            let owner_arc =
                unerase::<T>(owner).ok_or_else(|| ContainerError::DependencyInstanceMismatch {
                    expected: TypeInfo::of::<T>().name,
                    actual: "<擦除句柄>".to_string(),
                    owner: owner_name.clone(),
                })?;
            apply(&owner_arc, value);
            Ok(())
        });
        self.definition.fields.push(FieldSpec::Value {
            key: key.into(),
            apply: apply_fn,
        });
        self
    }

    /// 声明一个 Setter 注入点
    pub fn inject_setter<F>(mut self, params: Vec<ParameterSpec>, invoke: F) -> Self
    where
        F: Fn(&T, &ResolvedArguments) -> ContainerResult<()> + Send + Sync + 'static,
    {
        let owner_name = self.definition.type_info.name.clone();
        let invoke_fn: InvokeSetterFn = Arc::new(move |owner, args| {
            let owner_arc =
                unerase::<T>(owner).ok_or_else(|| ContainerError::DependencyInstanceMismatch {
                    expected: TypeInfo::of::<T>().name,
                    actual: "<擦除句柄>".to_string(),
                    owner: owner_name.clone(),
                })?;
            invoke(&owner_arc, args)
        });
        self.definition.setters.push(SetterSpec {
            params,
            invoke: invoke_fn,
        });
        self
    }

    /// 声明一个定时任务
    pub fn scheduled<F>(mut self, name: impl Into<String>, trigger: Trigger, run: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let run_fn: TaskFn = Arc::new(move |owner: &AnyHandle| {
            if let Some(owner_arc) = unerase::<T>(owner) {
                run(&owner_arc);
            } else {
                warn!("定时任务 {} 的宿主实例类型不符，跳过本次触发", task_name);
            }
        });
        self.definition.tasks.push(ScheduledSpec {
            name,
            trigger,
            run: run_fn,
        });
        self
    }

    /// 完成定义
    pub fn build(self) -> ComponentDefinition {
        self.definition
    }
}

/// 组件定义集合
///
/// 类型扫描器的产出物；同时维护“托管类型”集合
/// （所有定义的具体类型 + 它们提供的父类型/接口）
/// 以及提供关系的反向索引。
#[derive(Debug, Default)]
pub struct DefinitionSet {
    definitions: Vec<ComponentDefinition>,
    by_type: HashMap<TypeId, usize>,
    managed: HashSet<TypeId>,
    providers: HashMap<TypeId, Vec<usize>>,
}

impl DefinitionSet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个定义
    ///
    /// 同一具体类型只保留首个定义，重复加入记告警后忽略。
    pub fn insert(&mut self, definition: ComponentDefinition) {
        let type_id = definition.type_info().id;
        if self.by_type.contains_key(&type_id) {
            warn!("组件类型 {} 已定义，忽略重复定义", definition.type_info());
            return;
        }

        let index = self.definitions.len();
        self.by_type.insert(type_id, index);
        self.managed.insert(type_id);
        for provided in definition.provides() {
            self.managed.insert(provided.type_info.id);
            self.providers.entry(provided.type_info.id).or_default().push(index);
        }
        self.definitions.push(definition);
    }

    /// 按具体类型取定义
    pub fn get(&self, type_id: TypeId) -> Option<&ComponentDefinition> {
        self.by_type.get(&type_id).map(|&i| &self.definitions[i])
    }

    /// 类型是否在托管集合内
    pub fn is_managed(&self, type_id: TypeId) -> bool {
        self.managed.contains(&type_id)
    }

    /// 提供指定类型的全部定义
    pub fn providers_of(&self, type_id: TypeId) -> impl Iterator<Item = &ComponentDefinition> {
        self.providers
            .get(&type_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.definitions[i])
    }

    /// 按加入顺序遍历定义
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.iter()
    }

    /// 定义数量
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 校验一组参数类型全部处于托管集合
    ///
    /// 未托管的类型一次性全部上报，而不是只报第一个。
    pub fn validate_parameters(
        &self,
        owner: &str,
        params: &[ParameterSpec],
        position: InjectionPosition,
    ) -> ContainerResult<()> {
        let unsupported: Vec<String> = params
            .iter()
            .filter(|p| !self.is_managed(p.type_info.id))
            .map(|p| p.type_info.name.clone())
            .collect();

        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(ContainerError::DependencyTypeNotSupportedOrFound {
                owner: owner.to_string(),
                unsupported,
                position,
            })
        }
    }
}
