// ==========================================
// 表格数据导入核心 - 领域类型定义
// ==========================================
// 职责: 数据源格式标签（由调用方显式提供）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ==========================================
// 数据源格式 (File Data Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileDataType {
    Csv,  // 分隔文本
    Xls,  // 旧版二进制电子表格
    Xlsx, // OOXML 电子表格
}

impl FileDataType {
    /// 根据文件扩展名推断格式（忽略大小写）
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }

    /// 是否为电子表格格式
    pub fn is_spreadsheet(self) -> bool {
        matches!(self, FileDataType::Xls | FileDataType::Xlsx)
    }

    /// 是否按序列日（serial day-count）编码日期
    ///
    /// 仅旧版二进制格式在日期解析失败时回退到序列日解释
    pub fn uses_serial_dates(self) -> bool {
        matches!(self, FileDataType::Xls)
    }
}

impl fmt::Display for FileDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileDataType::Csv => write!(f, "Csv"),
            FileDataType::Xls => write!(f, "Xls"),
            FileDataType::Xlsx => write!(f, "Xlsx"),
        }
    }
}

impl FromStr for FileDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileDataType::Csv),
            "xls" => Ok(FileDataType::Xls),
            "xlsx" => Ok(FileDataType::Xlsx),
            other => Err(format!("未知的数据源格式: {}", other)),
        }
    }
}
