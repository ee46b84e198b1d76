// ==========================================
// 表格数据导入核心 - 字段转换引擎
// ==========================================
// 统一策略（所有目标类型共用）:
// - 定位未设置 → 不处理（字段保持原值）
// - 存在但为空 → 有默认值则写入默认值，否则不处理
// - 非空且可解析 → 写入
// - 非空但不可解析 → 类型化错误（原始值 + 目标类型 + 字段描述）
// ==========================================

mod datetime;
mod numeric;
mod parsers;


pub use datetime::{from_serial_day_count, parse_date_time, parse_permissive};
pub use numeric::ImportNumber;
pub use parsers::{
    BooleanParser, CustomParser, DateTimeParser, EnumParser, InvalidKind, Nullable, NumberParser,
    ParseContext, Parsed, TextParser, ValueParser,
};

use crate::config::{ColumnLocator, ReferenceLocale};
use crate::domain::types::FileDataType;
use crate::importer::enum_resolver::ImportEnum;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field::{Field, FieldInfo};
use crate::importer::raw_row::{HeaderIndex, RawRow};
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use tracing::debug;

// ==========================================
// Coercion - 单字段转换结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion<T> {
    /// 定位未设置，调用方不映射该字段
    NotPresent,
    /// 列存在但值为空
    Blank,
    Value(T),
    /// 非空但无法识别，按规则静默跳过（携带原始值）
    Ignored(String),
    InvalidFormat {
        raw: String,
        target_type: &'static str,
        field_description: String,
        kind: InvalidKind,
    },
}

impl<T> Coercion<T> {
    pub fn is_value(&self) -> bool {
        matches!(self, Coercion::Value(_))
    }

    /// 转为值（仅 Value 分支有值）
    pub fn value(self) -> Option<T> {
        match self {
            Coercion::Value(v) => Some(v),
            _ => None,
        }
    }

    /// InvalidFormat 对应的类型化错误
    pub fn into_error(self) -> Option<ImportError> {
        match self {
            Coercion::InvalidFormat {
                raw,
                target_type,
                field_description,
                kind,
            } => Some(match kind {
                InvalidKind::Numeric => ImportError::InvalidNumericValue {
                    value: raw,
                    target_type,
                    field: field_description,
                },
                InvalidKind::DateTime => ImportError::InvalidDateTimeValue {
                    value: raw,
                    target_type,
                    field: field_description,
                },
            }),
            _ => None,
        }
    }

    /// 按统一策略写入模型字段
    pub fn apply<M>(self, model: &mut M, field: &Field<M, T>, default: Option<T>) -> ImportResult<()> {
        match self {
            Coercion::Value(value) => field.set(model, value),
            Coercion::Blank => {
                if let Some(value) = default {
                    field.set(model, value);
                }
            }
            Coercion::NotPresent => {}
            Coercion::Ignored(raw) => {
                debug!(field = field.member(), raw = %raw, "值无法识别，跳过");
            }
            invalid @ Coercion::InvalidFormat { .. } => {
                if let Some(err) = invalid.into_error() {
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

// ==========================================
// RowReader - 行级转换入口
// ==========================================
// 持有: 当前原始行 + 表头标志 + 参考区域设置
// 用法: RowMapper::map_row 中对每个模型字段调用一次 set_*
pub struct RowReader<'a> {
    row: &'a dyn RawRow,
    first_row_has_headers: bool,
    locale: &'a ReferenceLocale,
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a dyn RawRow, first_row_has_headers: bool, locale: &'a ReferenceLocale) -> Self {
        Self {
            row,
            first_row_has_headers,
            locale,
        }
    }

    pub fn row(&self) -> &'a dyn RawRow {
        self.row
    }

    pub fn source_kind(&self) -> FileDataType {
        self.row.source_kind()
    }

    pub fn first_row_has_headers(&self) -> bool {
        self.first_row_has_headers
    }

    pub fn locale(&self) -> &'a ReferenceLocale {
        self.locale
    }

    /// 当前行的表头
    pub fn headers(&self) -> &'a HeaderIndex {
        self.row.header_index()
    }

    /// 字符串原值（None = 定位未设置）
    pub fn string_value(&self, locator: &ColumnLocator) -> ImportResult<Option<String>> {
        self.row.string_value(self.first_row_has_headers, locator)
    }

    /// 读取并解析单个字段，不写入模型
    pub fn read<T, P>(
        &self,
        locator: &ColumnLocator,
        parser: &P,
        field: &dyn FieldInfo,
    ) -> ImportResult<Coercion<T>>
    where
        P: ValueParser<T> + ?Sized,
    {
        let raw = match parser.fetch(self.row, self.first_row_has_headers, locator)? {
            Some(raw) => raw,
            None => return Ok(Coercion::NotPresent),
        };

        if raw.is_blank() && !parser.accepts_blank() {
            return Ok(Coercion::Blank);
        }

        let cx = ParseContext {
            locale: self.locale,
            source: self.row.source_kind(),
        };
        Ok(match parser.parse(&raw, &cx)? {
            Parsed::Value(value) => Coercion::Value(value),
            Parsed::Ignored => Coercion::Ignored(raw.to_text()),
            Parsed::Invalid(kind) => Coercion::InvalidFormat {
                raw: raw.to_text(),
                target_type: parser.target_type(),
                field_description: field.display_name().to_string(),
                kind,
            },
        })
    }

    /// 通用入口: 读取 → 解析 → 按统一策略写入
    pub fn set<M, T, P>(
        &self,
        model: &mut M,
        field: &Field<M, T>,
        locator: &ColumnLocator,
        parser: &P,
        default: Option<T>,
    ) -> ImportResult<()>
    where
        P: ValueParser<T> + ?Sized,
    {
        self.read(locator, parser, field)?.apply(model, field, default)
    }

    // ===== 文本 =====

    pub fn set_text<M>(
        &self,
        model: &mut M,
        field: &Field<M, String>,
        locator: &ColumnLocator,
    ) -> ImportResult<()> {
        self.set(model, field, locator, &TextParser::default(), None)
    }

    /// 文本 + 清洗函数（仅对非空值执行）
    pub fn set_text_with<M>(
        &self,
        model: &mut M,
        field: &Field<M, String>,
        locator: &ColumnLocator,
        cleaner: &dyn Fn(&str) -> String,
    ) -> ImportResult<()> {
        let parser = TextParser {
            cleaner: Some(cleaner),
        };
        self.set(model, field, locator, &parser, None)
    }

    // ===== 布尔 =====

    /// 布尔字段
    ///
    /// 提供默认值时，列不存在也不报错，直接写入默认值
    pub fn set_bool<M>(
        &self,
        model: &mut M,
        field: &Field<M, bool>,
        locator: &ColumnLocator,
        evaluator: Option<&dyn Fn(&str) -> Option<bool>>,
        default: Option<bool>,
    ) -> ImportResult<()> {
        let parser = BooleanParser { evaluator, default };
        let outcome = match self.read(locator, &parser, field) {
            Err(ImportError::ColumnNotFound(column)) if default.is_some() => {
                debug!(column = %column, field = field.member(), "列不存在，使用默认值");
                Coercion::Blank
            }
            // 未映射的列同样写入默认值（数值、日期保持不写）
            Ok(Coercion::NotPresent) if default.is_some() => Coercion::Blank,
            other => other?,
        };
        outcome.apply(model, field, default)
    }

    // ===== 数值 =====

    pub fn set_number<M, N: ImportNumber>(
        &self,
        model: &mut M,
        field: &Field<M, N>,
        locator: &ColumnLocator,
        default: Option<N>,
    ) -> ImportResult<()> {
        self.set(model, field, locator, &NumberParser::<N>::new(), default)
    }

    /// 可空数值: 剥离 $/% 后为空则置为 None
    pub fn set_optional_number<M, N: ImportNumber>(
        &self,
        model: &mut M,
        field: &Field<M, Option<N>>,
        locator: &ColumnLocator,
        default: Option<N>,
    ) -> ImportResult<()> {
        let parser = Nullable(NumberParser::<N>::new());
        self.set(model, field, locator, &parser, default.map(Some))
    }

    pub fn set_decimal<M>(
        &self,
        model: &mut M,
        field: &Field<M, BigDecimal>,
        locator: &ColumnLocator,
        default: Option<BigDecimal>,
    ) -> ImportResult<()> {
        self.set_number(model, field, locator, default)
    }

    pub fn set_optional_decimal<M>(
        &self,
        model: &mut M,
        field: &Field<M, Option<BigDecimal>>,
        locator: &ColumnLocator,
        default: Option<BigDecimal>,
    ) -> ImportResult<()> {
        self.set_optional_number(model, field, locator, default)
    }

    /// 短整型（百分比为整数除法，结果截断）
    pub fn set_short<M>(
        &self,
        model: &mut M,
        field: &Field<M, i16>,
        locator: &ColumnLocator,
        default: Option<i16>,
    ) -> ImportResult<()> {
        self.set_number(model, field, locator, default)
    }

    pub fn set_optional_short<M>(
        &self,
        model: &mut M,
        field: &Field<M, Option<i16>>,
        locator: &ColumnLocator,
        default: Option<i16>,
    ) -> ImportResult<()> {
        self.set_optional_number(model, field, locator, default)
    }

    // ===== 日期时间 =====

    pub fn set_date_time<M>(
        &self,
        model: &mut M,
        field: &Field<M, NaiveDateTime>,
        locator: &ColumnLocator,
        default: Option<NaiveDateTime>,
    ) -> ImportResult<()> {
        self.set(model, field, locator, &DateTimeParser, default)
    }

    /// 可空日期: 空白 → None
    pub fn set_optional_date_time<M>(
        &self,
        model: &mut M,
        field: &Field<M, Option<NaiveDateTime>>,
        locator: &ColumnLocator,
    ) -> ImportResult<()> {
        self.set(model, field, locator, &Nullable(DateTimeParser), None)
    }

    // ===== 枚举 =====

    /// 枚举字段
    ///
    /// `resolve_blank` 为 true 时空白值也参与解析（通常由 cleaner 映射为某个成员）
    pub fn set_enum<M, E: ImportEnum>(
        &self,
        model: &mut M,
        field: &Field<M, E>,
        locator: &ColumnLocator,
        cleaner: Option<&dyn Fn(&str) -> String>,
        resolve_blank: bool,
    ) -> ImportResult<()> {
        let parser = EnumParser::<E>::new(cleaner, resolve_blank);
        self.set(model, field, locator, &parser, None)
    }

    // ===== 自定义转换 =====

    /// 任意目标类型 + 调用方转换函数（仅对非空值执行）
    pub fn set_with<M, T, F>(
        &self,
        model: &mut M,
        field: &Field<M, T>,
        locator: &ColumnLocator,
        converter: F,
    ) -> ImportResult<()>
    where
        F: Fn(&str) -> anyhow::Result<T>,
    {
        self.set(model, field, locator, &CustomParser(converter), None)
    }
}
