// ==========================================
// 字段解析策略
// ==========================================
// 每种目标类型一个策略对象；空白/默认值/错误包装由 RowReader 统一处理
// ==========================================

use super::datetime::parse_date_time;
use super::numeric::{evaluate, ImportNumber, NumberToken};
use crate::config::{ColumnLocator, ReferenceLocale};
use crate::domain::types::FileDataType;
use crate::importer::enum_resolver::{resolve_enum, ImportEnum};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::raw_row::{RawRow, RawValue};
use chrono::NaiveDateTime;
use std::marker::PhantomData;

/// 单次解析的上下文
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub locale: &'a ReferenceLocale,
    pub source: FileDataType,
}

/// 非空值无法解析时的错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKind {
    Numeric,
    DateTime,
}

/// 策略解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    /// 非空但无法识别，且按规则不报错（不赋值）
    Ignored,
    Invalid(InvalidKind),
}

// ==========================================
// ValueParser Trait
// ==========================================
pub trait ValueParser<T> {
    /// 目标类型名（出现在错误信息中）
    fn target_type(&self) -> &'static str;

    /// 空白值是否也交给 parse 处理
    fn accepts_blank(&self) -> bool {
        false
    }

    /// 从行中取原始值
    fn fetch(
        &self,
        row: &dyn RawRow,
        first_row_has_headers: bool,
        locator: &ColumnLocator,
    ) -> ImportResult<Option<RawValue>> {
        row.typed_value(first_row_has_headers, locator)
    }

    fn parse(&self, raw: &RawValue, cx: &ParseContext<'_>) -> ImportResult<Parsed<T>>;
}

/// 可空目标包装
#[derive(Debug, Clone, Copy, Default)]
pub struct Nullable<P>(pub P);

// ==========================================
// 文本
// ==========================================
#[derive(Default)]
pub struct TextParser<'a> {
    pub cleaner: Option<&'a dyn Fn(&str) -> String>,
}

impl ValueParser<String> for TextParser<'_> {
    fn target_type(&self) -> &'static str {
        "string"
    }

    fn parse(&self, raw: &RawValue, _cx: &ParseContext<'_>) -> ImportResult<Parsed<String>> {
        let text = raw.to_text();
        Ok(Parsed::Value(match self.cleaner {
            Some(clean) => clean(text.as_str()),
            None => text,
        }))
    }
}

// ==========================================
// 布尔
// ==========================================
// 严格解析 true/false → 自定义求值（可回落到默认值）→ 固定词表 → 忽略
#[derive(Default)]
pub struct BooleanParser<'a> {
    pub evaluator: Option<&'a dyn Fn(&str) -> Option<bool>>,
    pub default: Option<bool>,
}

impl BooleanParser<'_> {
    fn strict(token: &str) -> Option<bool> {
        if token.eq_ignore_ascii_case("true") {
            Some(true)
        } else if token.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn token_table(token: &str) -> Option<bool> {
        match token.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }
}

impl ValueParser<bool> for BooleanParser<'_> {
    fn target_type(&self) -> &'static str {
        "bool"
    }

    fn parse(&self, raw: &RawValue, _cx: &ParseContext<'_>) -> ImportResult<Parsed<bool>> {
        if let RawValue::Bool(b) = raw {
            return Ok(Parsed::Value(*b));
        }

        let text = raw.to_text();
        let token = text.trim();

        if let Some(value) = Self::strict(token) {
            return Ok(Parsed::Value(value));
        }

        if let Some(evaluate) = self.evaluator {
            if let Some(value) = evaluate(token).or(self.default) {
                return Ok(Parsed::Value(value));
            }
        }

        Ok(Self::token_table(token).map_or(Parsed::Ignored, Parsed::Value))
    }
}

// ==========================================
// 数值（decimal / short / ...）
// ==========================================
pub struct NumberParser<N> {
    _marker: PhantomData<fn() -> N>,
}

impl<N> NumberParser<N> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<N> Default for NumberParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: ImportNumber> ValueParser<N> for NumberParser<N> {
    fn target_type(&self) -> &'static str {
        N::TYPE_NAME
    }

    fn parse(&self, raw: &RawValue, cx: &ParseContext<'_>) -> ImportResult<Parsed<N>> {
        Ok(match evaluate::<N>(&raw.to_text(), cx.locale) {
            NumberToken::Value(value) => Parsed::Value(value),
            NumberToken::Empty | NumberToken::Invalid => Parsed::Invalid(InvalidKind::Numeric),
        })
    }
}

// 可空数值：剥离 $/% 后为空 → 显式置空
impl<N: ImportNumber> ValueParser<Option<N>> for Nullable<NumberParser<N>> {
    fn target_type(&self) -> &'static str {
        N::TYPE_NAME
    }

    fn parse(&self, raw: &RawValue, cx: &ParseContext<'_>) -> ImportResult<Parsed<Option<N>>> {
        Ok(match evaluate::<N>(&raw.to_text(), cx.locale) {
            NumberToken::Value(value) => Parsed::Value(Some(value)),
            NumberToken::Empty => Parsed::Value(None),
            NumberToken::Invalid => Parsed::Invalid(InvalidKind::Numeric),
        })
    }
}

// ==========================================
// 日期时间
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeParser;

impl DateTimeParser {
    fn resolve(raw: &RawValue, cx: &ParseContext<'_>) -> Parsed<NaiveDateTime> {
        // 原生时间戳直接使用，不做字符串解析
        if let Some(dt) = raw.as_datetime() {
            return Parsed::Value(dt);
        }
        match parse_date_time(&raw.to_text(), cx.locale, cx.source) {
            Some(dt) => Parsed::Value(dt),
            None => Parsed::Invalid(InvalidKind::DateTime),
        }
    }
}

impl ValueParser<NaiveDateTime> for DateTimeParser {
    fn target_type(&self) -> &'static str {
        "DateTime"
    }

    fn fetch(
        &self,
        row: &dyn RawRow,
        first_row_has_headers: bool,
        locator: &ColumnLocator,
    ) -> ImportResult<Option<RawValue>> {
        row.date_time_value(first_row_has_headers, locator)
    }

    fn parse(&self, raw: &RawValue, cx: &ParseContext<'_>) -> ImportResult<Parsed<NaiveDateTime>> {
        Ok(Self::resolve(raw, cx))
    }
}

// 可空日期：空白 → 显式置空
impl ValueParser<Option<NaiveDateTime>> for Nullable<DateTimeParser> {
    fn target_type(&self) -> &'static str {
        "DateTime?"
    }

    fn accepts_blank(&self) -> bool {
        true
    }

    fn fetch(
        &self,
        row: &dyn RawRow,
        first_row_has_headers: bool,
        locator: &ColumnLocator,
    ) -> ImportResult<Option<RawValue>> {
        row.date_time_value(first_row_has_headers, locator)
    }

    fn parse(
        &self,
        raw: &RawValue,
        cx: &ParseContext<'_>,
    ) -> ImportResult<Parsed<Option<NaiveDateTime>>> {
        if raw.is_blank() {
            return Ok(Parsed::Value(None));
        }
        Ok(match DateTimeParser::resolve(raw, cx) {
            Parsed::Value(dt) => Parsed::Value(Some(dt)),
            Parsed::Ignored => Parsed::Ignored,
            Parsed::Invalid(kind) => Parsed::Invalid(kind),
        })
    }
}

// ==========================================
// 枚举
// ==========================================
pub struct EnumParser<'a, E> {
    pub cleaner: Option<&'a dyn Fn(&str) -> String>,
    /// 空白值也参与解析（通常配合 cleaner 把空白映射为某个成员）
    pub resolve_blank: bool,
    _marker: PhantomData<fn() -> E>,
}

impl<'a, E> EnumParser<'a, E> {
    pub fn new(cleaner: Option<&'a dyn Fn(&str) -> String>, resolve_blank: bool) -> Self {
        Self {
            cleaner,
            resolve_blank,
            _marker: PhantomData,
        }
    }
}

impl<E: ImportEnum> ValueParser<E> for EnumParser<'_, E> {
    fn target_type(&self) -> &'static str {
        E::TYPE_NAME
    }

    fn accepts_blank(&self) -> bool {
        self.resolve_blank
    }

    fn parse(&self, raw: &RawValue, _cx: &ParseContext<'_>) -> ImportResult<Parsed<E>> {
        let text = raw.to_text();
        let candidate = match self.cleaner {
            Some(clean) => clean(text.as_str()),
            None => text,
        };
        resolve_enum::<E>(&candidate).map(Parsed::Value)
    }
}

// ==========================================
// 自定义转换
// ==========================================
pub struct CustomParser<F>(pub F);

impl<T, F> ValueParser<T> for CustomParser<F>
where
    F: Fn(&str) -> anyhow::Result<T>,
{
    fn target_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn parse(&self, raw: &RawValue, _cx: &ParseContext<'_>) -> ImportResult<Parsed<T>> {
        let text = raw.to_text();
        (self.0)(text.as_str())
            .map(Parsed::Value)
            .map_err(ImportError::Other)
    }
}
