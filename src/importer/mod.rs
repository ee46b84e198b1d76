// ==========================================
// 表格数据导入核心 - 导入层
// ==========================================
// 职责: 原始行读取、字段转换、导入管道
// 支持: CSV, Excel (.xls / .xlsx)
// ==========================================

// 模块声明
pub mod coercion;
pub mod enum_resolver;
pub mod error;
pub mod field;
pub mod file_parser;
pub mod pipeline;
pub mod raw_row;

// 重导出核心类型
pub use coercion::{Coercion, ImportNumber, RowReader, ValueParser};
pub use enum_resolver::{resolve_enum, EnumMember, ImportEnum};
pub use error::{describe_fields, ImportError, ImportResult};
pub use field::{Field, FieldInfo};
pub use file_parser::{CsvParser, ExcelParser, FileParser};
pub use raw_row::{has_header, CsvRow, HeaderIndex, RawRow, RawValue, SheetRow};

// 重导出 Trait 接口与导入器
pub use pipeline::{
    CsvImporter, ExcelImporter, Importer, RowMapper, TabularImporter, UniversalImporter,
};
