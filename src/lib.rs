// ==========================================
// 表格数据导入核心 - 核心库
// ==========================================
// 职责: 将 CSV / Excel 行逐字段转换为强类型模型
// 定位: 模型定义与业务校验由调用方通过 RowMapper 注入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据源格式
pub mod domain;

// 配置层 - 导入配置与参考区域设置
pub mod config;

// 导入层 - 解析、转换、管道
pub mod importer;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::FileDataType;

pub use config::{ColumnLocator, ImportConfig, ImportConfiguration, ReferenceLocale};

pub use importer::{
    Coercion, CsvImporter, EnumMember, ExcelImporter, Field, FieldInfo, ImportEnum, ImportError,
    ImportResult, Importer, RowMapper, RowReader, UniversalImporter,
};

// ==========================================
// 版本信息
// ==========================================
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
