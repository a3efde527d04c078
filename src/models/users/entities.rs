use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色（由外部身份服务签发）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Student, // 学生
    Teacher, // 教师
    Admin,   // 管理员
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";
    pub const ADMIN: &'static str = "admin";

    /// 可以审核成果的角色
    pub fn reviewer_roles() -> &'static [UserRole] {
        &[UserRole::Teacher, UserRole::Admin]
    }

    pub fn is_reviewer(&self) -> bool {
        Self::reviewer_roles().contains(self)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: student, teacher, admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// 已验证的调用方身份
///
/// 由 `RequireJWT` 中间件在令牌校验通过后写入请求扩展，业务层只信任这一来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: i64,
    pub role: UserRole,
}

impl Caller {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in [UserRole::Student, UserRole::Teacher, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("guest".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_reviewer_roles() {
        assert!(UserRole::Teacher.is_reviewer());
        assert!(UserRole::Admin.is_reviewer());
        assert!(!UserRole::Student.is_reviewer());
    }

    #[test]
    fn test_deserialize_rejects_unknown_role() {
        let err = serde_json::from_str::<UserRole>(r#""user""#).unwrap_err();
        assert!(err.to_string().contains("无效的用户角色"));
    }
}
