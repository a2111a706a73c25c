//! 错误类型定义

use std::fmt;
use thiserror::Error;

/// 依赖注入点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionPosition {
    /// 构造函数参数
    Constructor,
    /// 字段
    Field,
    /// Setter 参数
    Setter,
}

impl fmt::Display for InjectionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Setter => "setter",
        };
        write!(f, "{}", label)
    }
}

/// 容器错误类型
///
/// 全部发生在装配期（解析、注入、调度注册），快速失败且不可重试。
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("依赖类型不受支持或未找到: 组件 {owner} 的 {position} 参数中 {unsupported:?} 不在托管类型集合内")]
    DependencyTypeNotSupportedOrFound {
        owner: String,
        unsupported: Vec<String>,
        position: InjectionPosition,
    },

    #[error("组件 {type_name} 有 {count} 个被标记为主构造函数的构造函数，最多允许一个")]
    MultiplePrimaryConstructors { type_name: String, count: usize },

    #[error("组件 {type_name} 有 {count} 个构造函数且均未标记为主构造函数")]
    MultipleConstructorsNonPrimary { type_name: String, count: usize },

    #[error("应用上下文中未找到实例: {type_name}{}", .qualifier.as_deref().map(|q| format!(" (标识: {})", q)).unwrap_or_default())]
    InstanceNotFound {
        type_name: String,
        qualifier: Option<String>,
    },

    #[error("类型 {type_name} 存在 {count} 个候选实例，无限定符的查找要求恰好一个")]
    MultipleCandidates { type_name: String, count: usize },

    #[error("依赖实例不匹配: 组件 {owner} 声明的依赖类型 {expected} 无法由实例 {actual} 满足")]
    DependencyInstanceMismatch {
        expected: String,
        actual: String,
        owner: String,
    },

    #[error("检测到循环依赖: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("定时周期格式无效: 期望两个整数（例如 \"5 0\" 表示 5 秒 + 0 分钟），实际为 {value:?}")]
    InvalidPeriodFormat { value: String },

    #[error("配置文件不存在: {path}")]
    ResourcePropertiesNotFound { path: String },

    #[error("组件 {component} 构造失败: {message}")]
    ComponentConstruction { component: String, message: String },
}

/// 对外暴露的统一失败类型
///
/// 所有装配期错误都包装为这一种，保持公共签名只有一种失败模式，
/// 原始错误通过 `source` 链保留。
#[derive(Error, Debug)]
#[error("组件实例创建失败: {source}")]
pub struct InstanceCreationError {
    #[from]
    source: ContainerError,
}

impl InstanceCreationError {
    /// 获取引发失败的容器错误
    pub fn cause(&self) -> &ContainerError {
        &self.source
    }
}

/// 结果类型别名
pub type ContainerResult<T> = Result<T, ContainerError>;
pub type CreationResult<T> = Result<T, InstanceCreationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_preserves_cause() {
        let inner = ContainerError::MultipleConstructorsNonPrimary {
            type_name: "DemoService".to_string(),
            count: 2,
        };
        let wrapped = InstanceCreationError::from(inner);
        assert!(matches!(
            wrapped.cause(),
            ContainerError::MultipleConstructorsNonPrimary { count: 2, .. }
        ));
        assert!(wrapped.to_string().contains("DemoService"));
    }

    #[test]
    fn not_found_message_carries_qualifier() {
        let err = ContainerError::InstanceNotFound {
            type_name: "Observer".to_string(),
            qualifier: Some("loggerObserver".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("Observer"));
        assert!(message.contains("loggerObserver"));
    }

    #[test]
    fn cyclic_message_joins_chain() {
        let err = ContainerError::CyclicDependency {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert!(err.to_string().contains("A -> B -> A"));
    }
}
