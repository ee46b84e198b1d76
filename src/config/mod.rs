// ==========================================
// 表格数据导入核心 - 配置层
// ==========================================
// 职责: 导入配置、列定位、参考区域设置
// 存储: 内存 / JSON 文件
// ==========================================

pub mod import_configuration;
pub mod locale;

// 重导出核心配置类型
pub use import_configuration::{
    from_json_file, from_json_str, ColumnLocator, ImportConfig, ImportConfiguration,
};
pub use locale::ReferenceLocale;
