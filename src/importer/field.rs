// ==========================================
// 表格数据导入核心 - 字段描述符
// ==========================================
// 职责: 编译期绑定的字段 setter + 字段元数据（成员名、描述）
// 说明: 转换引擎只通过 setter 写入模型，不做运行时成员查找
// ==========================================

use std::fmt;

/// 字段元数据（与目标类型无关，便于错误信息拼接多个字段）
pub trait FieldInfo {
    /// 模型成员名
    fn member(&self) -> &'static str;

    /// 人类可读描述
    fn description(&self) -> Option<&'static str>;

    /// 错误信息中展示的名称：有描述用描述，否则用成员名
    fn display_name(&self) -> &'static str {
        self.description().unwrap_or_else(|| self.member())
    }
}

/// 模型 `M` 上类型为 `T` 的可写字段
pub struct Field<M, T> {
    member: &'static str,
    description: Option<&'static str>,
    setter: fn(&mut M, T),
}

impl<M, T> Field<M, T> {
    pub const fn new(member: &'static str, setter: fn(&mut M, T)) -> Self {
        Self {
            member,
            description: None,
            setter,
        }
    }

    /// 附加人类可读描述
    pub const fn described(self, description: &'static str) -> Self {
        Self {
            member: self.member,
            description: Some(description),
            setter: self.setter,
        }
    }

    /// 写入字段值
    pub fn set(&self, model: &mut M, value: T) {
        (self.setter)(model, value)
    }
}

impl<M, T> Clone for Field<M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, T> Copy for Field<M, T> {}

impl<M, T> FieldInfo for Field<M, T> {
    fn member(&self) -> &'static str {
        self.member
    }

    fn description(&self) -> Option<&'static str> {
        self.description
    }
}

impl<M, T> fmt::Debug for Field<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("member", &self.member)
            .field("description", &self.description)
            .finish()
    }
}

/// 声明字段描述符
///
/// ```
/// use tabular_import::field;
/// use tabular_import::importer::Field;
///
/// struct Person { first_name: String }
///
/// const FIRST_NAME: Field<Person, String> = field!(Person, first_name: String, "First Name");
/// ```
#[macro_export]
macro_rules! field {
    ($model:ty, $member:ident : $ty:ty) => {
        $crate::importer::field::Field::<$model, $ty>::new(
            stringify!($member),
            |model: &mut $model, value: $ty| model.$member = value,
        )
    };
    ($model:ty, $member:ident : $ty:ty, $description:expr) => {
        $crate::field!($model, $member: $ty).described($description)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Contact {
        email: String,
        age: Option<i16>,
    }

    const EMAIL: Field<Contact, String> = crate::field!(Contact, email: String, "Email Address");
    const AGE: Field<Contact, Option<i16>> = crate::field!(Contact, age: Option<i16>);

    #[test]
    fn test_macro_binds_setter_and_metadata() {
        let mut contact = Contact::default();
        EMAIL.set(&mut contact, "a@x.com".to_string());
        AGE.set(&mut contact, Some(30));

        assert_eq!(contact.email, "a@x.com");
        assert_eq!(contact.age, Some(30));
        assert_eq!(EMAIL.member(), "email");
        assert_eq!(EMAIL.display_name(), "Email Address");
        assert_eq!(AGE.display_name(), "age");
    }
}
