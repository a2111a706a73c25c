//! 元数据定义
//!
//! 提供组件类型和实例的标识信息

use std::any::TypeId;
use std::fmt;
use uuid::Uuid;

/// 类型信息
///
/// 同时适用于具体类型和 trait 对象（`?Sized`），
/// 是注册表按类型索引和错误报告的基础。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 简单名称（不含模块路径）
    pub name: String,
    /// 完整类型路径
    pub full_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            name: simple_name(full_name).to_string(),
            full_name,
        }
    }

    /// 获取简单类型名称
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 截取类型路径的最后一段作为简单名称
pub fn simple_name(full_name: &str) -> &str {
    full_name.rsplit("::").next().unwrap_or(full_name)
}

/// 单例实例的唯一标识
///
/// 注册表的按类型索引需要集合语义，
/// 该标识用于在多个索引间判定同一实例。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// 生成新的实例标识
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Marker {}

    struct Plain;

    #[test]
    fn simple_name_strips_module_path() {
        let info = TypeInfo::of::<Plain>();
        assert_eq!(info.short_name(), "Plain");
        assert!(info.full_name.contains("metadata"));
    }

    #[test]
    fn trait_object_type_info() {
        let info = TypeInfo::of::<dyn Marker>();
        assert_eq!(info.short_name(), "Marker");
        assert_eq!(info.id, TypeId::of::<dyn Marker>());
    }

    #[test]
    fn instance_ids_are_unique() {
        assert_ne!(InstanceId::new(), InstanceId::new());
    }
}
