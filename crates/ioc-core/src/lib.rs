//! # IoC Core
//!
//! 容器核心层：组件定义、单例注册表、递归依赖解析器和二次注入器。
//!
//! ## 核心组件
//!
//! - [`ComponentDefinition`] - 编译时组件注册表项（替代运行时反射扫描）
//! - [`InstanceRegistry`] - 按标识和按类型双索引的单例存储
//! - [`DependencyResolver`] - 深度优先、依赖先行的实例化算法
//! - [`Injector`] - 全部实例就绪后的字段/Setter 注入
//! - [`Container`] - 组合以上各部分的容器门面
//!
//! ## 生命周期模型
//!
//! 引导（解析 + 注入）严格单线程，结束后注册表结构不再变化；
//! 每个组件恰好实例化一次，存活到进程退出，没有作用域或原型生命周期。

pub mod container;
pub mod definition;
pub mod handle;
pub mod injector;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use definition::*;
pub use handle::*;
pub use injector::*;
pub use registry::*;
pub use resolver::*;
