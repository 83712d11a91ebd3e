//! 安全随机数生成模块
//!
//! 提供密码学安全的随机数生成功能，用于生成登录 Token 等敏感数据。
//! 随机源不可用被视为致命错误并以 [`CryptoError`] 上报，绝不降级为弱随机。

use rand::{Rng, TryRngCore, distr::Alphanumeric, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use authkit::random::random_bytes;
///
/// let bytes = random_bytes(32).unwrap();
/// assert_eq!(bytes.len(), 32);
/// ```
pub fn random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 生成 Base64 URL 安全编码的随机字符串（不含填充）
///
/// # Example
///
/// ```rust
/// use authkit::random::random_base64_url;
///
/// let token = random_base64_url(32).unwrap();
/// assert!(!token.contains('+'));
/// assert!(!token.contains('/'));
/// ```
pub fn random_base64_url(byte_length: usize) -> Result<String> {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let bytes = random_bytes(byte_length)?;
    Ok(URL_SAFE_NO_PAD.encode(&bytes))
}

/// 生成指定长度的字母数字随机字符串
///
/// 只包含 a-z, A-Z, 0-9 字符，适合直接放入 Header 或 Cookie。
///
/// # Example
///
/// ```rust
/// use authkit::random::random_alphanumeric;
///
/// let token = random_alphanumeric(64).unwrap();
/// assert_eq!(token.len(), 64);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn random_alphanumeric(length: usize) -> Result<String> {
    let token: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_length() {
        let bytes = random_bytes(16).unwrap();
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn test_random_bytes_unique() {
        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_base64_url_charset() {
        let s = random_base64_url(32).unwrap();
        assert!(!s.contains('+'));
        assert!(!s.contains('/'));
        assert!(!s.contains('='));
    }

    #[test]
    fn test_random_alphanumeric() {
        let s = random_alphanumeric(128).unwrap();
        assert_eq!(s.len(), 128);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
