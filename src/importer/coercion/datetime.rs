// ==========================================
// 日期时间转换规则
// ==========================================
// 1. 宽松解析（参考区域设置的格式列表）
// 2. 旧版二进制电子表格: 回退为序列日（1899-12-30 起算）
// ==========================================

use crate::config::ReferenceLocale;
use crate::domain::types::FileDataType;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

// 序列日有效范围（开区间下界、闭区间外上界）
const SERIAL_MIN: f64 = -657_435.0;
const SERIAL_MAX: f64 = 2_958_466.0;

/// 宽松解析日期时间字面量
pub fn parse_permissive(text: &str, locale: &ReferenceLocale) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    if let Some(dt) = locale
        .datetime_formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
    {
        return Some(dt);
    }

    locale
        .date_formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 序列日 → 日期时间
///
/// 小数部分为当日时间（毫秒取整）；负值按整数部分向前计日，小数部分仍向后计时
pub fn from_serial_day_count(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= SERIAL_MIN || serial >= SERIAL_MAX {
        return None;
    }

    let rounding = if serial >= 0.0 { 0.5 } else { -0.5 };
    let mut millis = (serial * MILLIS_PER_DAY as f64 + rounding) as i64;
    if millis < 0 {
        millis -= (millis % MILLIS_PER_DAY) * 2;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// 将字面量按序列日解释
pub fn parse_serial(text: &str, locale: &ReferenceLocale) -> Option<NaiveDateTime> {
    let normalized = locale.normalize_number(text, true)?;
    let serial: f64 = normalized.parse().ok()?;
    from_serial_day_count(serial)
}

/// 按数据源格式选择解析策略链
pub fn parse_date_time(
    text: &str,
    locale: &ReferenceLocale,
    source: FileDataType,
) -> Option<NaiveDateTime> {
    parse_permissive(text, locale).or_else(|| {
        if source.uses_serial_dates() {
            parse_serial(text, locale)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_permissive_formats() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(parse_permissive("01/15/2020", &locale), Some(ymd_hms(2020, 1, 15, 0, 0, 0)));
        assert_eq!(parse_permissive("1/5/2020", &locale), Some(ymd_hms(2020, 1, 5, 0, 0, 0)));
        assert_eq!(parse_permissive("1/5/20", &locale), Some(ymd_hms(2020, 1, 5, 0, 0, 0)));
        assert_eq!(parse_permissive("2020-01-15", &locale), Some(ymd_hms(2020, 1, 15, 0, 0, 0)));
        assert_eq!(
            parse_permissive("2020-01-15 13:45:10", &locale),
            Some(ymd_hms(2020, 1, 15, 13, 45, 10))
        );
        assert_eq!(
            parse_permissive("1/15/2020 1:45:10 PM", &locale),
            Some(ymd_hms(2020, 1, 15, 13, 45, 10))
        );
        assert_eq!(
            parse_permissive("January 15, 2020", &locale),
            Some(ymd_hms(2020, 1, 15, 0, 0, 0))
        );
        assert_eq!(
            parse_permissive("2020-01-15T10:00:00+02:00", &locale),
            Some(ymd_hms(2020, 1, 15, 8, 0, 0))
        );
    }

    #[test]
    fn test_permissive_rejects_serials_and_garbage() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(parse_permissive("42370", &locale), None);
        assert_eq!(parse_permissive("not a date", &locale), None);
        assert_eq!(parse_permissive("13/45/2020", &locale), None);
    }

    #[test]
    fn test_serial_day_count() {
        assert_eq!(from_serial_day_count(42370.0), Some(ymd_hms(2016, 1, 1, 0, 0, 0)));
        assert_eq!(from_serial_day_count(43831.5), Some(ymd_hms(2020, 1, 1, 12, 0, 0)));
        assert_eq!(from_serial_day_count(0.0), Some(ymd_hms(1899, 12, 30, 0, 0, 0)));
        assert_eq!(from_serial_day_count(-1.5), Some(ymd_hms(1899, 12, 29, 12, 0, 0)));
        assert_eq!(from_serial_day_count(3_000_000.0), None);
        assert_eq!(from_serial_day_count(f64::NAN), None);
    }

    #[test]
    fn test_serial_fallback_only_for_legacy_binary() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(
            parse_date_time("42370", &locale, FileDataType::Xls),
            Some(ymd_hms(2016, 1, 1, 0, 0, 0))
        );
        assert_eq!(parse_date_time("42370", &locale, FileDataType::Xlsx), None);
        assert_eq!(parse_date_time("42370", &locale, FileDataType::Csv), None);
        assert_eq!(parse_date_time("abc", &locale, FileDataType::Xls), None);
    }
}
