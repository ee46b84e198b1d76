// ==========================================
// 表格数据导入核心 - 原始行访问
// ==========================================
// 职责: 按列名或列序号读取单个字段的原始值
// 实现: CsvRow（分隔文本行）/ SheetRow（工作表行）共用 RawRow 契约
// ==========================================

use crate::config::ColumnLocator;
use crate::domain::types::FileDataType;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;

// ==========================================
// RawValue - 原始单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime), // 解码器已识别的原生时间戳
}

impl RawValue {
    /// 空值或纯空白文本
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 字符串化后的值（类型化单元格的文本回退）
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            RawValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Empty => Ok(()),
            RawValue::Text(s) => write!(f, "{}", s),
            // f64 的 Display 对整数值不输出小数部分（42370.0 → "42370"）
            RawValue::Float(v) => write!(f, "{}", round_significant(*v)),
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::Bool(true) => write!(f, "True"),
            RawValue::Bool(false) => write!(f, "False"),
            RawValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// 数值单元格按 15 位有效数字输出，消除二进制浮点尾差（0.1 + 0.2 → 0.3）
fn round_significant(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    format!("{:.14e}", v).parse().unwrap_or(v)
}

// ==========================================
// HeaderIndex - 表头索引
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    names: Vec<String>,
}

impl HeaderIndex {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 查找列位置：先精确匹配，再去空白后忽略大小写匹配
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|h| h == name).or_else(|| {
            let wanted = name.trim();
            self.names
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        })
    }
}

/// 表头中是否存在某列（去空白、忽略大小写）
pub fn has_header(headers: &[String], name: &str) -> bool {
    headers
        .iter()
        .any(|h| h.trim().eq_ignore_ascii_case(name.trim()))
}

// ==========================================
// RawRow Trait
// ==========================================
// 用途: 统一的原始行读取契约
// 实现者: CsvRow, SheetRow
pub trait RawRow {
    /// 行所属数据源格式
    fn source_kind(&self) -> FileDataType;

    fn header_index(&self) -> &HeaderIndex;

    /// 行宽（列数）
    fn width(&self) -> usize;

    /// 按绝对位置读取原始值；超出行宽返回 None
    fn value_at(&self, position: usize) -> Option<RawValue>;

    /// 解析列定位
    ///
    /// # 返回
    /// - Ok(None): 当前模式下定位未设置（调用方不映射该字段）
    /// - Ok(Some(pos)): 列位置
    /// - Err(ColumnNotFound): 列名不在表头中，或列序号超出行宽
    fn locate(&self, first_row_has_headers: bool, locator: &ColumnLocator) -> ImportResult<Option<usize>> {
        if first_row_has_headers {
            match locator.name.as_deref() {
                Some(name) if !name.trim().is_empty() => self
                    .header_index()
                    .position(name)
                    .map(Some)
                    .ok_or_else(|| ImportError::ColumnNotFound(name.to_string())),
                _ => Ok(None),
            }
        } else {
            match locator.index {
                Some(index) if index < self.width() => Ok(Some(index)),
                Some(index) => Err(ImportError::ColumnNotFound(format!("#{}", index))),
                None => Ok(None),
            }
        }
    }

    /// 读取类型化原始值；表头存在但该行缺少尾部单元格时视为空
    fn typed_value(&self, first_row_has_headers: bool, locator: &ColumnLocator) -> ImportResult<Option<RawValue>> {
        Ok(self
            .locate(first_row_has_headers, locator)?
            .map(|pos| self.value_at(pos).unwrap_or(RawValue::Empty)))
    }

    /// 读取字符串值
    fn string_value(&self, first_row_has_headers: bool, locator: &ColumnLocator) -> ImportResult<Option<String>> {
        Ok(self
            .typed_value(first_row_has_headers, locator)?
            .map(|raw| raw.to_text()))
    }

    /// 读取日期字段的原始值
    ///
    /// 无表头模式下列序号是必需参数，缺失即为参数错误
    fn date_time_value(&self, first_row_has_headers: bool, locator: &ColumnLocator) -> ImportResult<Option<RawValue>> {
        if !first_row_has_headers && locator.index.is_none() {
            return Err(ImportError::MissingColumnIndex);
        }
        self.typed_value(first_row_has_headers, locator)
    }
}

// ==========================================
// CsvRow - 分隔文本行
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvRow {
    headers: Arc<HeaderIndex>,
    fields: Vec<String>,
}

impl CsvRow {
    pub fn new(headers: Arc<HeaderIndex>, fields: Vec<String>) -> Self {
        Self { headers, fields }
    }

    /// 无表头行
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Arc::new(HeaderIndex::default()),
            fields.into_iter().map(Into::into).collect(),
        )
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// 所有字段均为空
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty())
    }
}

impl RawRow for CsvRow {
    fn source_kind(&self) -> FileDataType {
        FileDataType::Csv
    }

    fn header_index(&self) -> &HeaderIndex {
        &self.headers
    }

    fn width(&self) -> usize {
        self.fields.len()
    }

    fn value_at(&self, position: usize) -> Option<RawValue> {
        self.fields
            .get(position)
            .map(|f| RawValue::Text(f.clone()))
    }
}

// ==========================================
// SheetRow - 工作表行
// ==========================================
#[derive(Debug, Clone)]
pub struct SheetRow {
    kind: FileDataType,
    worksheet: String,
    headers: Arc<HeaderIndex>,
    cells: Vec<RawValue>,
}

impl SheetRow {
    pub fn new(
        kind: FileDataType,
        worksheet: impl Into<String>,
        headers: Arc<HeaderIndex>,
        cells: Vec<RawValue>,
    ) -> Self {
        Self {
            kind,
            worksheet: worksheet.into(),
            headers,
            cells,
        }
    }

    /// 所属工作表
    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    pub fn cells(&self) -> &[RawValue] {
        &self.cells
    }
}

impl RawRow for SheetRow {
    fn source_kind(&self) -> FileDataType {
        self.kind
    }

    fn header_index(&self) -> &HeaderIndex {
        &self.headers
    }

    fn width(&self) -> usize {
        self.cells.len()
    }

    fn value_at(&self, position: usize) -> Option<RawValue> {
        self.cells.get(position).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn csv_row_with_headers() -> CsvRow {
        let headers = Arc::new(HeaderIndex::new(vec![
            "First Name".to_string(),
            "Last Name".to_string(),
            "Email".to_string(),
        ]));
        CsvRow::new(headers, vec!["Ann".into(), "Lee".into(), "".into()])
    }

    #[test]
    fn test_header_lookup_exact_then_case_insensitive() {
        let row = csv_row_with_headers();
        let by_exact = row.string_value(true, &ColumnLocator::by_name("Last Name")).unwrap();
        assert_eq!(by_exact, Some("Lee".to_string()));

        let by_loose = row.string_value(true, &ColumnLocator::by_name(" first name ")).unwrap();
        assert_eq!(by_loose, Some("Ann".to_string()));
    }

    #[test]
    fn test_unset_locator_is_absent_not_blank() {
        let row = csv_row_with_headers();
        // 表头模式下只看列名，列序号被忽略
        let value = row.string_value(true, &ColumnLocator::by_index(0)).unwrap();
        assert_eq!(value, None);

        let blank = row.string_value(true, &ColumnLocator::by_name("Email")).unwrap();
        assert_eq!(blank, Some(String::new()));
    }

    #[test]
    fn test_index_mode_ignores_name() {
        let row = CsvRow::from_fields(["Ann", "Lee"]);
        let value = row
            .string_value(false, &ColumnLocator::new(Some("Last Name"), Some(0)))
            .unwrap();
        assert_eq!(value, Some("Ann".to_string()));
        assert_eq!(row.string_value(false, &ColumnLocator::by_name("Last Name")).unwrap(), None);
    }

    #[test]
    fn test_missing_column_errors() {
        let row = csv_row_with_headers();
        let err = row.string_value(true, &ColumnLocator::by_name("Phone")).unwrap_err();
        assert!(matches!(err, ImportError::ColumnNotFound(ref c) if c == "Phone"));

        let row = CsvRow::from_fields(["Ann"]);
        let err = row.string_value(false, &ColumnLocator::by_index(3)).unwrap_err();
        assert!(matches!(err, ImportError::ColumnNotFound(_)));
    }

    #[test]
    fn test_date_value_requires_index_without_headers() {
        let row = CsvRow::from_fields(["01/02/2020"]);
        let err = row.date_time_value(false, &ColumnLocator::unset()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumnIndex));

        // 表头模式下未设置列名仍是"不映射"
        let row = csv_row_with_headers();
        assert_eq!(row.date_time_value(true, &ColumnLocator::unset()).unwrap(), None);
    }

    #[test]
    fn test_sheet_row_typed_values() {
        let joined = NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let headers = Arc::new(HeaderIndex::new(vec!["Joined".into(), "Amount".into()]));
        let row = SheetRow::new(
            FileDataType::Xlsx,
            "People",
            headers,
            vec![RawValue::DateTime(joined), RawValue::Float(42370.0)],
        );

        assert_eq!(row.worksheet(), "People");
        assert_eq!(
            row.typed_value(true, &ColumnLocator::by_name("Joined")).unwrap(),
            Some(RawValue::DateTime(joined))
        );
        assert_eq!(
            row.string_value(true, &ColumnLocator::by_name("Amount")).unwrap(),
            Some("42370".to_string())
        );
    }

    #[test]
    fn test_float_text_uses_fifteen_significant_digits() {
        assert_eq!(RawValue::Float(0.1 + 0.2).to_text(), "0.3");
        assert_eq!(RawValue::Float(45.5).to_text(), "45.5");
        assert_eq!(RawValue::Float(-0.001).to_text(), "-0.001");
        assert_eq!(RawValue::Float(123456789.125).to_text(), "123456789.125");
    }

    #[test]
    fn test_blank_detection() {
        assert!(RawValue::Empty.is_blank());
        assert!(RawValue::Text("   ".into()).is_blank());
        assert!(!RawValue::Float(0.0).is_blank());
        assert!(!RawValue::Text("x".into()).is_blank());
    }

    #[test]
    fn test_has_header() {
        let headers = vec!["First Name".to_string(), " Email ".to_string()];
        assert!(has_header(&headers, "email"));
        assert!(!has_header(&headers, "Phone"));
    }
}
