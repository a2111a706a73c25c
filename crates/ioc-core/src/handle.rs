//! 类型擦除的实例句柄
//!
//! 注册表按 `TypeId` 存储擦除后的实例形态。对每个可赋值类型 `P`
//! （具体类型或 trait 对象）存储一个 `Arc<P>`，外层再包一层
//! `Arc<dyn Any>` 完成擦除；还原时按 `Arc<P>` 向下转型。
//! 这使得父类型查找和可赋值性校验都是真实可判定的操作。

use ioc_common::{ContainerError, ContainerResult, TypeInfo};
use std::any::Any;
use std::sync::Arc;

/// 擦除后的实例句柄
pub type AnyHandle = Arc<dyn Any + Send + Sync>;

/// 将 `Arc<P>` 擦除为 [`AnyHandle`]
pub fn erase<P>(instance: Arc<P>) -> AnyHandle
where
    P: ?Sized + Send + Sync + 'static,
{
    Arc::new(instance)
}

/// 从句柄还原 `Arc<P>`，类型不符时返回 `None`
pub fn unerase<P>(handle: &AnyHandle) -> Option<Arc<P>>
where
    P: ?Sized + Send + Sync + 'static,
{
    handle.downcast_ref::<Arc<P>>().cloned()
}

/// 已解析的参数列表
///
/// 解析器按声明顺序填入每个参数对应的擦除形态，
/// 构造/Setter 闭包再按索引取出具体类型。
pub struct ResolvedArguments {
    owner: String,
    values: Vec<AnyHandle>,
    declared: Vec<TypeInfo>,
}

impl ResolvedArguments {
    pub(crate) fn new(owner: String) -> Self {
        Self {
            owner,
            values: Vec::new(),
            declared: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, declared: TypeInfo, value: AnyHandle) {
        self.declared.push(declared);
        self.values.push(value);
    }

    /// 按索引取出参数
    ///
    /// 请求的类型必须与声明的参数类型一致，
    /// 否则报 `DependencyInstanceMismatch`。
    pub fn get<P>(&self, index: usize) -> ContainerResult<Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let expected = TypeInfo::of::<P>();
        let value = self
            .values
            .get(index)
            .ok_or_else(|| ContainerError::DependencyInstanceMismatch {
                expected: expected.name.clone(),
                actual: format!("<缺少第 {} 个参数>", index),
                owner: self.owner.clone(),
            })?;

        unerase::<P>(value).ok_or_else(|| ContainerError::DependencyInstanceMismatch {
            expected: expected.name.clone(),
            actual: self.declared[index].name.clone(),
            owner: self.owner.clone(),
        })
    }

    /// 参数个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
