// ==========================================
// 数值转换规则
// ==========================================
// 1. 剥离一次货币前缀（$）
// 2. 剥离一次百分号后缀（%），解析后除以 100
// 3. 按参考区域设置解析剩余字面量
// ==========================================

use crate::config::ReferenceLocale;
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// 可导入的数值类型
pub trait ImportNumber: Sized {
    /// 目标类型名（出现在错误信息中）
    const TYPE_NAME: &'static str;

    fn parse_localized(token: &str, locale: &ReferenceLocale) -> Option<Self>;

    /// 百分比归一化
    fn from_percentage(self) -> Self;
}

impl ImportNumber for BigDecimal {
    const TYPE_NAME: &'static str = "decimal";

    fn parse_localized(token: &str, locale: &ReferenceLocale) -> Option<Self> {
        let normalized = locale.normalize_number(token, true)?;
        BigDecimal::from_str(&normalized).ok()
    }

    fn from_percentage(self) -> Self {
        // 小数位右移两位，结果精确
        let (digits, scale) = self.into_bigint_and_exponent();
        BigDecimal::new(digits, scale + 2)
    }
}

impl ImportNumber for f64 {
    const TYPE_NAME: &'static str = "double";

    fn parse_localized(token: &str, locale: &ReferenceLocale) -> Option<Self> {
        locale.normalize_number(token, true)?.parse().ok()
    }

    fn from_percentage(self) -> Self {
        self / 100.0
    }
}

impl ImportNumber for i16 {
    const TYPE_NAME: &'static str = "short";

    fn parse_localized(token: &str, locale: &ReferenceLocale) -> Option<Self> {
        locale.normalize_number(token, false)?.parse().ok()
    }

    // 整数除法，小数部分被截断（"150%" → 1）
    fn from_percentage(self) -> Self {
        self / 100
    }
}

impl ImportNumber for i32 {
    const TYPE_NAME: &'static str = "int";

    fn parse_localized(token: &str, locale: &ReferenceLocale) -> Option<Self> {
        locale.normalize_number(token, false)?.parse().ok()
    }

    fn from_percentage(self) -> Self {
        self / 100
    }
}

/// 单个数值字面量的求值结果
#[derive(Debug, PartialEq)]
pub(crate) enum NumberToken<N> {
    /// 剥离前后缀后为空（如单独的 "$"）
    Empty,
    Value(N),
    Invalid,
}

/// 剥离货币前缀与百分号后缀
///
/// # 返回
/// (剩余字面量, 是否为百分比)
pub(crate) fn strip_affixes<'t>(text: &'t str, locale: &ReferenceLocale) -> (&'t str, bool) {
    let mut token = text.trim();
    if !locale.currency_symbol.is_empty() {
        if let Some(rest) = token.strip_prefix(locale.currency_symbol.as_str()) {
            token = rest;
        }
    }
    if !locale.percent_symbol.is_empty() {
        if let Some(rest) = token.strip_suffix(locale.percent_symbol.as_str()) {
            return (rest, true);
        }
    }
    (token, false)
}

pub(crate) fn evaluate<N: ImportNumber>(text: &str, locale: &ReferenceLocale) -> NumberToken<N> {
    let (token, percentage) = strip_affixes(text, locale);
    if token.trim().is_empty() {
        return NumberToken::Empty;
    }
    match N::parse_localized(token, locale) {
        Some(value) if percentage => NumberToken::Value(value.from_percentage()),
        Some(value) => NumberToken::Value(value),
        None => NumberToken::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_strip_affixes() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(strip_affixes("$120", &locale), ("120", false));
        assert_eq!(strip_affixes("45.5%", &locale), ("45.5", true));
        assert_eq!(strip_affixes("$12%", &locale), ("12", true));
        // 只剥离一次
        assert_eq!(strip_affixes("$$5", &locale), ("$5", false));
    }

    #[test]
    fn test_decimal_percentage_is_exact() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(
            evaluate::<BigDecimal>("45.5%", &locale),
            NumberToken::Value(decimal("0.455"))
        );
        assert_eq!(
            evaluate::<BigDecimal>("$1,250.75", &locale),
            NumberToken::Value(decimal("1250.75"))
        );
    }

    #[test]
    fn test_short_percentage_truncates() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(evaluate::<i16>("150%", &locale), NumberToken::Value(1));
        assert_eq!(evaluate::<i16>("-250%", &locale), NumberToken::Value(-2));
        assert_eq!(evaluate::<i16>("99%", &locale), NumberToken::Value(0));
    }

    #[test]
    fn test_empty_and_invalid_tokens() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(evaluate::<BigDecimal>("$", &locale), NumberToken::Empty);
        assert_eq!(evaluate::<BigDecimal>("%", &locale), NumberToken::Empty);
        assert_eq!(evaluate::<BigDecimal>("abc", &locale), NumberToken::Invalid);
        assert_eq!(evaluate::<i16>("40000", &locale), NumberToken::Invalid);
        assert_eq!(evaluate::<i16>("1.5", &locale), NumberToken::Invalid);
    }

    #[test]
    fn test_other_numeric_types() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(evaluate::<f64>("12.5%", &locale), NumberToken::Value(0.125));
        assert_eq!(evaluate::<i32>("$70000", &locale), NumberToken::Value(70000));
    }
}
