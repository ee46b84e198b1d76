// ==========================================
// 表格数据导入核心 - 枚举解析
// ==========================================
// 规则:
// 1. 字面成员名（忽略大小写）优先
// 2. 其次按声明顺序比对序列化别名（区分大小写），首个命中即返回
// 3. 均未命中 → UnknownEnumValue
// ==========================================

use crate::importer::error::{ImportError, ImportResult};

/// 枚举成员声明
#[derive(Debug, Clone, Copy)]
pub struct EnumMember<E: 'static> {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub value: E,
}

impl<E: 'static> EnumMember<E> {
    pub const fn new(name: &'static str, value: E) -> Self {
        Self {
            name,
            alias: None,
            value,
        }
    }

    pub const fn aliased(name: &'static str, alias: &'static str, value: E) -> Self {
        Self {
            name,
            alias: Some(alias),
            value,
        }
    }
}

/// 可从表格字面量导入的枚举
///
/// 别名在同一枚举内应唯一（约定，不做校验）
pub trait ImportEnum: Copy + 'static {
    /// 枚举类型名（出现在错误信息中）
    const TYPE_NAME: &'static str;

    /// 按声明顺序列出的成员
    const MEMBERS: &'static [EnumMember<Self>];
}

/// 将字面量解析为枚举值
pub fn resolve_enum<E: ImportEnum>(candidate: &str) -> ImportResult<E> {
    if let Some(member) = E::MEMBERS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(candidate))
    {
        return Ok(member.value);
    }

    E::MEMBERS
        .iter()
        .find(|m| m.alias == Some(candidate))
        .map(|m| m.value)
        .ok_or_else(|| ImportError::UnknownEnumValue {
            value: candidate.to_string(),
            enum_type: E::TYPE_NAME,
        })
}
