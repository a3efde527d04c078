//! 外部身份服务签发的 JWT 校验
//!
//! 本服务不签发令牌，`generate_token` 只用于测试与本地调试。

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::users::entities::{Caller, UserRole};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub role: String, // 用户角色
    pub exp: usize,   // Expiration time (时间戳)
    pub iat: usize,   // Issued at (签发时间)
}

impl Claims {
    /// 转换为已验证的调用方身份
    pub fn into_caller(self) -> Result<Caller, jsonwebtoken::errors::Error> {
        let id = self
            .sub
            .parse::<i64>()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject)?;
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidToken)?;
        Ok(Caller::new(id, role))
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 使用全局配置中的密钥验证令牌
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::verify_token_with(token, &config.jwt.secret, config.jwt.leeway)
    }

    // 使用指定密钥验证令牌
    pub fn verify_token_with(
        token: &str,
        secret: &str,
        leeway: u64,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let mut validation = Validation::default();
        validation.leeway = leeway;

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token(
        secret: &str,
        user_id: i64,
        role: UserRole,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_valid_token_yields_caller() {
        let token =
            JwtUtils::generate_token(SECRET, 42, UserRole::Teacher, chrono::Duration::minutes(5))
                .unwrap();
        let caller = JwtUtils::verify_token_with(&token, SECRET, 0)
            .unwrap()
            .into_caller()
            .unwrap();
        assert_eq!(caller, Caller::new(42, UserRole::Teacher));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token =
            JwtUtils::generate_token(SECRET, 42, UserRole::Admin, chrono::Duration::minutes(5))
                .unwrap();
        assert!(JwtUtils::verify_token_with(&token, "other", 0).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = JwtUtils::generate_token(
            SECRET,
            42,
            UserRole::Student,
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(JwtUtils::verify_token_with(&token, SECRET, 0).is_err());
    }

    #[test]
    fn test_unknown_role_claim_is_rejected() {
        let claims = Claims {
            sub: "1".into(),
            role: "guest".into(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.into_caller().is_err());
    }
}
