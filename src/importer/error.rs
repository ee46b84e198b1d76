// ==========================================
// 表格数据导入核心 - 导入错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 字段级错误携带字段描述，便于直接展示给用户
// ==========================================

use crate::domain::types::FileDataType;
use crate::importer::field::FieldInfo;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源错误 =====
    #[error("The data type {0} cannot be processed by this importer")]
    UnsupportedSourceKind(FileDataType),

    #[error("Unrecognised file extension: '{0}' (expected .csv, .xls or .xlsx)")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read source data: {0}")]
    FileReadError(String),

    #[error("Failed to parse delimited text: {0}")]
    CsvParseError(String),

    #[error("Failed to parse spreadsheet: {0}")]
    ExcelParseError(String),

    // ===== 列定位错误 =====
    #[error("The column '{0}' does not exist in the source")]
    ColumnNotFound(String),

    #[error("A column index is required when the first row does not contain headers")]
    MissingColumnIndex,

    // ===== 字段转换错误 =====
    #[error("{message}")]
    MissingRequiredValue {
        fields: Vec<String>,
        message: String,
    },

    #[error("The value of '{value}' for '{field}' could not be converted into a number.")]
    InvalidNumericValue {
        value: String,
        target_type: &'static str,
        field: String,
    },

    #[error("The value of '{value}' for '{field}' could not be converted into a date.")]
    InvalidDateTimeValue {
        value: String,
        target_type: &'static str,
        field: String,
    },

    #[error("The value '{value}' is not part of the enum '{enum_type}'")]
    UnknownEnumValue {
        value: String,
        enum_type: &'static str,
    },

    // ===== 配置错误 =====
    #[error("Invalid import configuration: {0}")]
    ConfigError(String),

    // ===== 调用方钩子错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 一个或多个字段缺失
    ///
    /// 描述逐个加引号并以 `, ` 连接；字段列表为空时描述为 `Something`
    pub fn missing_values(fields: &[&dyn FieldInfo]) -> Self {
        let message = format!("The value for {} was not provided.", describe_fields(fields));
        ImportError::MissingRequiredValue {
            fields: fields.iter().map(|f| f.display_name().to_string()).collect(),
            message,
        }
    }

    /// 字段缺失，但另一字段依赖它
    pub fn missing_required_by(missing: &dyn FieldInfo, wanting: &dyn FieldInfo) -> Self {
        let message = format!(
            "The value for '{}' was not provided but is required by '{}'.",
            missing.display_name(),
            wanting.display_name()
        );
        ImportError::MissingRequiredValue {
            fields: vec![missing.display_name().to_string()],
            message,
        }
    }

    /// 自定义缺失消息
    pub fn missing_message(message: impl Into<String>) -> Self {
        ImportError::MissingRequiredValue {
            fields: Vec::new(),
            message: message.into(),
        }
    }

    /// 是否为字段级错误（可定位到某个模型字段）
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            ImportError::MissingRequiredValue { .. }
                | ImportError::InvalidNumericValue { .. }
                | ImportError::InvalidDateTimeValue { .. }
                | ImportError::UnknownEnumValue { .. }
        )
    }
}

/// 拼接字段描述: `'A', 'B'`
pub fn describe_fields(fields: &[&dyn FieldInfo]) -> String {
    if fields.is_empty() {
        return "Something".to_string();
    }
    fields
        .iter()
        .map(|f| format!("'{}'", f.display_name()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field::Field;

    struct Order {
        amount: i16,
        reference: String,
        note: String,
    }

    const AMOUNT: Field<Order, i16> = Field::new("amount", |m: &mut Order, v: i16| m.amount = v)
        .described("Amount");
    const REFERENCE: Field<Order, String> =
        Field::new("reference", |m: &mut Order, v: String| m.reference = v)
            .described("Order Reference");
    const NOTE: Field<Order, String> = Field::new("note", |m: &mut Order, v: String| m.note = v);

    #[test]
    fn test_missing_values_message() {
        let err = ImportError::missing_values(&[&AMOUNT, &REFERENCE]);
        assert_eq!(
            err.to_string(),
            "The value for 'Amount', 'Order Reference' was not provided."
        );
        match err {
            ImportError::MissingRequiredValue { fields, .. } => {
                assert_eq!(fields, vec!["Amount".to_string(), "Order Reference".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_values_without_fields() {
        let err = ImportError::missing_values(&[]);
        assert_eq!(err.to_string(), "The value for Something was not provided.");
    }

    #[test]
    fn test_description_falls_back_to_member_name() {
        let err = ImportError::missing_required_by(&NOTE, &AMOUNT);
        assert_eq!(
            err.to_string(),
            "The value for 'note' was not provided but is required by 'Amount'."
        );
    }

    #[test]
    fn test_numeric_message() {
        let err = ImportError::InvalidNumericValue {
            value: "abc".to_string(),
            target_type: "decimal",
            field: "Amount".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The value of 'abc' for 'Amount' could not be converted into a number."
        );
        assert!(err.is_field_error());
    }

    #[test]
    fn test_unsupported_source_message() {
        let err = ImportError::UnsupportedSourceKind(FileDataType::Xls);
        assert_eq!(
            err.to_string(),
            "The data type Xls cannot be processed by this importer"
        );
        assert!(!err.is_field_error());
    }

    #[test]
    fn test_setters_bound_to_fields() {
        let mut order = Order {
            amount: 0,
            reference: String::new(),
            note: String::new(),
        };
        AMOUNT.set(&mut order, 5);
        REFERENCE.set(&mut order, "R-1".to_string());
        NOTE.set(&mut order, "n".to_string());
        assert_eq!(order.amount, 5);
        assert_eq!(order.reference, "R-1");
        assert_eq!(order.note, "n");
    }
}
