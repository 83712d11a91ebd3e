//! 自描述签名 Token 实现
//!
//! 基于 HMAC-SHA256 的 JWT：`sub` 存放账号标识，`exp` 存放绝对过期时间
//! （配置为永不过期时省略），`jti` 保证同一账号同一秒内两次登录也会得到
//! 不同的 Token 串。
//!
//! 解码失败区分三种结果：格式错误、签名不匹配、已过期，调用方据此给出
//! 不同的响应。

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result, TokenError};

/// 签名 Token 的载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 账号标识
    pub sub: String,

    /// 签发时间（Unix 时间戳）
    pub iat: i64,

    /// 绝对过期时间（Unix 时间戳），永不过期时省略
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Token 唯一标识
    pub jti: String,
}

/// 签发一个签名 Token
///
/// `timeout` 为绝对超时秒数，`-1` 表示永不过期（不写入 `exp`）。
pub fn issue(login_id: &str, timeout: i64, secret: &str) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: login_id.to_string(),
        iat: now,
        exp: (timeout != -1).then(|| now + timeout),
        jti: Uuid::new_v4().simple().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Token(TokenError::EncodingFailed(e.to_string())))
}

/// 解码并校验签名 Token
///
/// 校验签名与绝对过期时间；不访问存储。失败返回的 [`TokenError`] 区分
/// 格式错误、签名不匹配与已过期。
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp 允许缺失（永不过期的 Token），存在时才校验
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.leeway = 0;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(Error::Token(TokenError::Expired)),
            ErrorKind::InvalidSignature => Err(Error::Token(TokenError::InvalidSignature)),
            _ => Err(Error::Token(TokenError::Malformed(e.to_string()))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "my-secret-key-at-least-32-bytes!";

    #[test]
    fn test_issue_and_verify() {
        let token = issue("user123", 3600, SECRET).unwrap();
        let claims = verify(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "user123");
        assert!(claims.exp.unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_no_expiry_when_timeout_is_never() {
        let token = issue("user123", -1, SECRET).unwrap();
        let claims = verify(&token, SECRET).unwrap();
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue("user123", 3600, SECRET).unwrap();
        let err = verify(&token, "another-secret-of-enough-length!").unwrap_err();
        assert_eq!(err, Error::Token(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue("user123", -10, SECRET).unwrap();
        // timeout 为负但不等于 -1 时会签出已过期的 exp，这里借此构造过期 Token
        let err = verify(&token, SECRET).unwrap_err();
        assert_eq!(err, Error::Token(TokenError::Expired));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let err = verify("not-a-jwt", SECRET).unwrap_err();
        assert!(matches!(err, Error::Token(TokenError::Malformed(_))));
    }

    #[test]
    fn test_same_second_logins_distinct() {
        let a = issue("user123", 3600, SECRET).unwrap();
        let b = issue("user123", 3600, SECRET).unwrap();
        assert_ne!(a, b);
    }
}
