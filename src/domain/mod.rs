// ==========================================
// 表格数据导入核心 - 领域层
// ==========================================

pub mod types;

pub use types::FileDataType;
