//! 配置来源实现
//!
//! 属性文件是一份扁平的 `key=value` 文本，`#` 与 `!` 开头的行为注释。
//! 文件缺失是致命错误（[`ContainerError::ResourcePropertiesNotFound`]），
//! 在来源构造时即失败，不会延迟到运行期。

use ioc_common::{ContainerError, ContainerResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 配置键解析契约
///
/// 外部协作者接口：容器只依赖 `get`，不关心值从哪里来。
pub trait PropertySource: Send + Sync {
    /// 解析配置键，键不存在时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 来源名称，用于诊断输出
    fn name(&self) -> &str;
}

/// 属性文件配置来源
#[derive(Debug)]
pub struct PropertiesFileSource {
    file_path: PathBuf,
    values: HashMap<String, String>,
}

impl PropertiesFileSource {
    /// 加载属性文件并创建来源
    ///
    /// 文件不存在或不可读时返回 `ResourcePropertiesNotFound`。
    pub fn new<P: AsRef<Path>>(path: P) -> ContainerResult<Self> {
        let file_path = path.as_ref().to_path_buf();
        debug!("加载属性文件: {}", file_path.display());

        let content = std::fs::read_to_string(&file_path).map_err(|_| {
            ContainerError::ResourcePropertiesNotFound {
                path: file_path.display().to_string(),
            }
        })?;

        let values = parse_properties(&content);
        debug!("属性文件加载完成，共 {} 个键", values.len());

        Ok(Self { file_path, values })
    }

    /// 属性文件路径
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// 已加载的键数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有任何配置项
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertySource for PropertiesFileSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn name(&self) -> &str {
        "properties-file"
    }
}

/// 内存配置来源
///
/// 测试和无文件场景使用。
#[derive(Debug, Default)]
pub struct MemoryPropertySource {
    values: HashMap<String, String>,
}

impl MemoryPropertySource {
    /// 创建空的内存来源
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入配置项
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PropertySource for MemoryPropertySource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// 解析扁平属性文本
///
/// 每行 `key=value`；空行与注释行跳过；没有分隔符的行记告警后忽略。
fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                warn!("属性文件第 {} 行缺少 '=' 分隔符，已忽略: {}", line_no + 1, line);
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_flat_key_values() {
        let values = parse_properties("env=production\n# 注释\n\nmyapp.mail.to = a@b.c\n");
        assert_eq!(values.get("env").map(String::as_str), Some("production"));
        assert_eq!(values.get("myapp.mail.to").map(String::as_str), Some("a@b.c"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = PropertiesFileSource::new("/no/such/application.properties").unwrap_err();
        assert!(matches!(err, ContainerError::ResourcePropertiesNotFound { .. }));
    }

    #[test]
    fn file_source_resolves_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scheduler.pool.size=3").unwrap();
        writeln!(file, "env=dev").unwrap();

        let source = PropertiesFileSource::new(file.path()).unwrap();
        assert_eq!(source.get("scheduler.pool.size").as_deref(), Some("3"));
        assert_eq!(source.get("env").as_deref(), Some("dev"));
        assert_eq!(source.get("missing"), None);
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn memory_source_round_trip() {
        let source = MemoryPropertySource::new().with("env", "test");
        assert_eq!(source.get("env").as_deref(), Some("test"));
        assert_eq!(source.get("other"), None);
    }
}
