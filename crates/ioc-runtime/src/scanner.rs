//! 组件扫描器
//!
//! 组件定义是编译时构造的，扫描器负责把分散在各业务模块里的
//! 定义收集到一处。运行时在引导前依次调用全部扫描器，
//! 产出合并进同一个定义集合（重复类型按先到先得处理）。

use ioc_core::ComponentDefinition;
use tracing::debug;

/// 组件扫描器 trait
pub trait ComponentScanner: Send + Sync {
    /// 产出本扫描器负责的组件定义
    fn scan(&self) -> Vec<ComponentDefinition>;

    /// 扫描器名称，用于日志
    fn name(&self) -> &str;
}

/// 静态组件扫描器
///
/// 持有一组预先构造的定义，`scan` 时整体交出副本。
/// 业务模块通常各自暴露一个返回本模块扫描器的函数。
pub struct StaticComponentScanner {
    name: String,
    definitions: Vec<ComponentDefinition>,
}

impl StaticComponentScanner {
    /// 创建命名扫描器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    /// 加入一个组件定义
    pub fn with(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 当前持有的定义数量
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ComponentScanner for StaticComponentScanner {
    fn scan(&self) -> Vec<ComponentDefinition> {
        debug!("扫描器 {} 产出 {} 个组件定义", self.name, self.definitions.len());
        self.definitions.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
