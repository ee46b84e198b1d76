// ==========================================
// 表格数据导入核心 - 导入配置
// ==========================================
// 职责: 工作表筛选 + 表头标志 + 列定位
// 红线: 一次导入期间配置不可变
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ==========================================
// ImportConfiguration - 基础导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfiguration {
    /// 需要导入的工作表名称；为空表示全部工作表
    pub worksheet_names: Vec<String>,

    /// 首行是否为表头（决定按列名还是按列序号定位）
    pub first_row_has_headers: bool,
}

impl Default for ImportConfiguration {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ImportConfiguration {
    pub fn new(first_row_has_headers: bool) -> Self {
        Self {
            worksheet_names: Vec::new(),
            first_row_has_headers,
        }
    }

    /// 限定导入的工作表
    pub fn with_worksheets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.worksheet_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// 判断工作表是否在筛选范围内
    pub fn includes_worksheet(&self, name: &str) -> bool {
        self.worksheet_names.is_empty() || self.worksheet_names.iter().any(|w| w == name)
    }
}

// ==========================================
// ImportConfig Trait
// ==========================================
// 用途: 按模型定制的配置（携带每个字段的列定位）
// 实现者: 调用方的具体配置类型
pub trait ImportConfig {
    fn import_configuration(&self) -> &ImportConfiguration;

    fn first_row_has_headers(&self) -> bool {
        self.import_configuration().first_row_has_headers
    }

    fn worksheet_names(&self) -> &[String] {
        &self.import_configuration().worksheet_names
    }
}

impl ImportConfig for ImportConfiguration {
    fn import_configuration(&self) -> &ImportConfiguration {
        self
    }
}

// ==========================================
// ColumnLocator - 列定位
// ==========================================
// 表头模式下列名有效，否则列序号（从 0 开始）有效
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLocator {
    pub name: Option<String>,
    pub index: Option<usize>,
}

impl ColumnLocator {
    pub fn new(name: Option<&str>, index: Option<usize>) -> Self {
        Self {
            name: name.map(str::to_string),
            index,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            index: None,
        }
    }

    pub fn by_index(index: usize) -> Self {
        Self {
            name: None,
            index: Some(index),
        }
    }

    /// 不映射该字段
    pub fn unset() -> Self {
        Self::default()
    }

    /// 在给定表头模式下，该定位是否生效
    pub fn is_set(&self, first_row_has_headers: bool) -> bool {
        if first_row_has_headers {
            self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
        } else {
            self.index.is_some()
        }
    }
}

impl fmt::Display for ColumnLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.index) {
            (Some(name), Some(index)) => write!(f, "{} (#{})", name, index),
            (Some(name), None) => write!(f, "{}", name),
            (None, Some(index)) => write!(f, "#{}", index),
            (None, None) => write!(f, "<unset>"),
        }
    }
}

// ==========================================
// JSON 加载
// ==========================================

/// 从 JSON 文本加载配置（基础配置或按模型定制的配置）
pub fn from_json_str<C: DeserializeOwned>(json: &str) -> ImportResult<C> {
    serde_json::from_str(json).map_err(ImportError::from)
}

/// 从 JSON 文件加载配置
pub fn from_json_file<C: DeserializeOwned>(path: impl AsRef<Path>) -> ImportResult<C> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    from_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_headers_and_all_sheets() {
        let config = ImportConfiguration::default();
        assert!(config.first_row_has_headers);
        assert!(config.includes_worksheet("Anything"));
    }

    #[test]
    fn test_worksheet_filter() {
        let config = ImportConfiguration::new(true).with_worksheets(["People"]);
        assert!(config.includes_worksheet("People"));
        assert!(!config.includes_worksheet("Archive"));
        assert!(!config.includes_worksheet("people"));
    }

    #[test]
    fn test_locator_is_set_follows_header_flag() {
        let locator = ColumnLocator::new(Some("Email"), Some(2));
        assert!(locator.is_set(true));
        assert!(locator.is_set(false));

        assert!(!ColumnLocator::by_index(0).is_set(true));
        assert!(!ColumnLocator::by_name("Email").is_set(false));
        assert!(!ColumnLocator::by_name("   ").is_set(true));
        assert!(!ColumnLocator::unset().is_set(true));
    }

    #[test]
    fn test_from_json_str_partial() {
        let config: ImportConfiguration =
            from_json_str(r#"{ "worksheet_names": ["People"] }"#).unwrap();
        assert_eq!(config.worksheet_names, vec!["People".to_string()]);
        assert!(config.first_row_has_headers);
    }

    #[test]
    fn test_from_json_str_invalid() {
        let result: ImportResult<ImportConfiguration> = from_json_str("{ not json");
        assert!(matches!(result, Err(ImportError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_file_missing() {
        let result: ImportResult<ImportConfiguration> =
            from_json_file("definitely/not/here.json");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
