//! Token 生成模块
//!
//! 提供可配置的 Token 风格与对应的生成策略。
//!
//! ## 支持的风格
//!
//! - **Uuid**: 标准 UUID v4（默认）
//! - **SimpleUuid**: 去掉连字符的 UUID v4
//! - **Random32 / Random64 / Random128**: 对应长度的字母数字随机串
//! - **Jwt**: 自描述签名 Token，内嵌账号与过期时间（需启用 `jwt` feature）
//!
//! 随机风格的 Token 本身不携带任何信息，有效性完全由存储索引决定；
//! Jwt 风格可以在不查存储的情况下校验签名与绝对过期，但登出、踢人、
//! 活跃超时仍然依赖索引记录，签名自身无法吊销。

#[cfg(feature = "jwt")]
pub mod jwt;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result, TokenError};
use crate::random::random_alphanumeric;

/// Token 风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenStyle {
    /// UUID v4（默认）
    #[default]
    Uuid,
    /// 去掉连字符的 UUID v4
    SimpleUuid,
    /// 32 位字母数字随机串
    Random32,
    /// 64 位字母数字随机串
    Random64,
    /// 128 位字母数字随机串
    Random128,
    /// 自描述签名 Token
    #[cfg(feature = "jwt")]
    Jwt,
}

impl TokenStyle {
    /// 该风格是否为自描述 Token（可脱离存储解码出账号与过期时间）
    pub fn is_self_describing(&self) -> bool {
        #[cfg(feature = "jwt")]
        {
            matches!(self, TokenStyle::Jwt)
        }
        #[cfg(not(feature = "jwt"))]
        {
            false
        }
    }
}

impl fmt::Display for TokenStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenStyle::Uuid => "uuid",
            TokenStyle::SimpleUuid => "simple-uuid",
            TokenStyle::Random32 => "random-32",
            TokenStyle::Random64 => "random-64",
            TokenStyle::Random128 => "random-128",
            #[cfg(feature = "jwt")]
            TokenStyle::Jwt => "jwt",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TokenStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uuid" => Ok(TokenStyle::Uuid),
            "simple-uuid" => Ok(TokenStyle::SimpleUuid),
            "random-32" => Ok(TokenStyle::Random32),
            "random-64" => Ok(TokenStyle::Random64),
            "random-128" => Ok(TokenStyle::Random128),
            #[cfg(feature = "jwt")]
            "jwt" => Ok(TokenStyle::Jwt),
            other => Err(Error::Token(TokenError::Malformed(format!(
                "unknown token style: {}",
                other
            )))),
        }
    }
}

/// 按配置的风格生成一个新 Token
///
/// `timeout` 为绝对超时秒数（`-1` 表示永不过期），仅自描述风格使用；
/// `secret` 仅自描述风格使用，由配置校验保证此时非空。
#[cfg_attr(not(feature = "jwt"), allow(unused_variables))]
pub(crate) fn generate(
    style: TokenStyle,
    login_id: &str,
    timeout: i64,
    secret: Option<&str>,
) -> Result<String> {
    match style {
        TokenStyle::Uuid => Ok(Uuid::new_v4().to_string()),
        TokenStyle::SimpleUuid => Ok(Uuid::new_v4().simple().to_string()),
        TokenStyle::Random32 => random_alphanumeric(32),
        TokenStyle::Random64 => random_alphanumeric(64),
        TokenStyle::Random128 => random_alphanumeric(128),
        #[cfg(feature = "jwt")]
        TokenStyle::Jwt => {
            let secret = secret.ok_or_else(|| {
                Error::Config(crate::error::ConfigError::MissingRequired("secret".into()))
            })?;
            jwt::issue(login_id, timeout, secret)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_style() {
        let t = generate(TokenStyle::Uuid, "u1", 3600, None).unwrap();
        assert_eq!(t.len(), 36);
        assert_eq!(t.matches('-').count(), 4);
    }

    #[test]
    fn test_simple_uuid_style() {
        let t = generate(TokenStyle::SimpleUuid, "u1", 3600, None).unwrap();
        assert_eq!(t.len(), 32);
        assert!(!t.contains('-'));
    }

    #[test]
    fn test_random_styles() {
        for (style, len) in [
            (TokenStyle::Random32, 32),
            (TokenStyle::Random64, 64),
            (TokenStyle::Random128, 128),
        ] {
            let t = generate(style, "u1", 3600, None).unwrap();
            assert_eq!(t.len(), len);
            assert!(t.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_tokens_unique() {
        let a = generate(TokenStyle::Random64, "u1", 3600, None).unwrap();
        let b = generate(TokenStyle::Random64, "u1", 3600, None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_style_display_roundtrip() {
        for style in [
            TokenStyle::Uuid,
            TokenStyle::SimpleUuid,
            TokenStyle::Random32,
            TokenStyle::Random64,
            TokenStyle::Random128,
        ] {
            let parsed: TokenStyle = style.to_string().parse().unwrap();
            assert_eq!(parsed, style);
        }
        assert!("no-such-style".parse::<TokenStyle>().is_err());
    }

    #[test]
    fn test_self_describing() {
        assert!(!TokenStyle::Uuid.is_self_describing());
        #[cfg(feature = "jwt")]
        assert!(TokenStyle::Jwt.is_self_describing());
    }
}
