// ==========================================
// 表格数据导入核心 - 参考区域设置
// ==========================================
// 职责: 数值/日期字面量解析所用的固定文化设置
// 红线: 显式传入每次解析，不读写任何进程级全局状态
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLocale {
    /// 区域名称（仅用于日志）
    pub name: String,

    pub decimal_separator: char,
    pub group_separator: char,

    /// 货币前缀（数值解析前剥离一次）
    pub currency_symbol: String,

    /// 百分号后缀（剥离后结果除以 100）
    pub percent_symbol: String,

    /// 日期时间格式（chrono strftime 语法），按顺序尝试
    pub datetime_formats: Vec<String>,

    /// 纯日期格式，解析结果时间为 00:00:00
    pub date_formats: Vec<String>,
}

impl Default for ReferenceLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl ReferenceLocale {
    /// en-US 参考文化
    pub fn en_us() -> Self {
        let datetime_formats = [
            "%m/%d/%Y %I:%M:%S %p",
            "%m/%d/%Y %I:%M %p",
            "%m/%d/%Y %H:%M:%S",
            "%m/%d/%Y %H:%M",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
            "%Y/%m/%d %H:%M:%S",
            "%B %d, %Y %I:%M:%S %p",
        ];
        // %y 在 %Y 之前：两位年份只匹配两位，四位年份会因剩余字符失败后落到 %Y
        let date_formats = [
            "%m/%d/%y",
            "%m/%d/%Y",
            "%m-%d-%Y",
            "%Y-%m-%d",
            "%Y/%m/%d",
            "%B %d, %Y",
            "%b %d, %Y",
            "%d %B %Y",
            "%d %b %Y",
            "%A, %B %d, %Y",
        ];

        Self {
            name: "en-US".to_string(),
            decimal_separator: '.',
            group_separator: ',',
            currency_symbol: "$".to_string(),
            percent_symbol: "%".to_string(),
            datetime_formats: datetime_formats.iter().map(|f| f.to_string()).collect(),
            date_formats: date_formats.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// 将本地化数值字面量规范化为 `-123.45` 形式
    ///
    /// # 参数
    /// - token: 已剥离货币/百分号的字面量
    /// - allow_fraction: true 时允许小数点、千分位和尾随负号（十进制风格）；
    ///   false 时只允许前导符号和数字（整数风格）
    ///
    /// # 返回
    /// - Some(String): 规范化后的字面量
    /// - None: 不是合法数值
    pub fn normalize_number(&self, token: &str, allow_fraction: bool) -> Option<String> {
        let mut body = token.trim();
        let mut negative = false;

        if let Some(rest) = body.strip_prefix('-') {
            negative = true;
            body = rest;
        } else if let Some(rest) = body.strip_prefix('+') {
            body = rest;
        } else if allow_fraction {
            if let Some(rest) = body.strip_suffix('-') {
                negative = true;
                body = rest;
            }
        }

        let mut integer = String::new();
        let mut fraction = String::new();
        let mut seen_point = false;

        for c in body.chars() {
            if c.is_ascii_digit() {
                if seen_point {
                    fraction.push(c);
                } else {
                    integer.push(c);
                }
            } else if allow_fraction && c == self.decimal_separator && !seen_point {
                seen_point = true;
            } else if allow_fraction && c == self.group_separator && !seen_point {
                continue;
            } else {
                return None;
            }
        }

        if integer.is_empty() && fraction.is_empty() {
            return None;
        }

        let mut normalized = String::with_capacity(integer.len() + fraction.len() + 3);
        if negative {
            normalized.push('-');
        }
        if integer.is_empty() {
            normalized.push('0');
        } else {
            normalized.push_str(&integer);
        }
        if !fraction.is_empty() {
            normalized.push('.');
            normalized.push_str(&fraction);
        }
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_decimal_style() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(locale.normalize_number("1,234.50", true), Some("1234.50".to_string()));
        assert_eq!(locale.normalize_number("  -7.5 ", true), Some("-7.5".to_string()));
        assert_eq!(locale.normalize_number("7.5-", true), Some("-7.5".to_string()));
        assert_eq!(locale.normalize_number(".5", true), Some("0.5".to_string()));
        assert_eq!(locale.normalize_number("+12", true), Some("12".to_string()));
        assert_eq!(locale.normalize_number("abc", true), None);
        assert_eq!(locale.normalize_number("1.2.3", true), None);
        assert_eq!(locale.normalize_number("", true), None);
        assert_eq!(locale.normalize_number("-", true), None);
    }

    #[test]
    fn test_normalize_integer_style() {
        let locale = ReferenceLocale::en_us();
        assert_eq!(locale.normalize_number("-42", false), Some("-42".to_string()));
        assert_eq!(locale.normalize_number("1,000", false), None);
        assert_eq!(locale.normalize_number("1.0", false), None);
        assert_eq!(locale.normalize_number("42-", false), None);
    }

    #[test]
    fn test_custom_separators() {
        let locale = ReferenceLocale {
            name: "de-DE".to_string(),
            decimal_separator: ',',
            group_separator: '.',
            ..ReferenceLocale::en_us()
        };
        assert_eq!(locale.normalize_number("1.234,5", true), Some("1234.5".to_string()));
    }
}
