//! 统一错误类型模块
//!
//! 提供 authkit 库中所有操作的错误类型定义。
//!
//! 登录态相关的失败（未登录、已过期、被踢下线等）通过 [`AuthError`] 细分，
//! 便于适配层把不同失败映射为不同的响应（如 401 与"已在别处登录"提示）。

use std::fmt;

/// authkit 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// authkit 库的错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 登录态错误
    Auth(AuthError),

    /// Token 编解码错误
    Token(TokenError),

    /// 配置错误
    Config(ConfigError),

    /// 存储错误
    Storage(StorageError),

    /// 加密/随机数错误
    Crypto(CryptoError),

    /// 内部错误（不变量被破坏）
    Internal(String),

    /// 其他错误
    Other(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 创建一个存储操作失败错误
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(StorageError::OperationFailed(msg.into()))
    }

    /// 是否为"未登录"
    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Error::Auth(AuthError::NotLoggedIn))
    }

    /// 是否为"活跃超时"（空闲过久）
    pub fn is_session_timeout(&self) -> bool {
        matches!(self, Error::Auth(AuthError::SessionTimeout))
    }

    /// 是否为"Token 已过期"（绝对超时或签名过期）
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Error::Auth(AuthError::TokenExpired))
    }

    /// 是否为"被踢下线"
    pub fn is_kicked(&self) -> bool {
        matches!(self, Error::Auth(AuthError::Kicked))
    }
}

/// 登录态相关错误
///
/// 这些错误都表示当前请求携带的 Token 不再对应一个有效登录，
/// 区分它们是为了让调用方给出准确的提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// 未登录：Token 为空或索引中不存在
    NotLoggedIn,
    /// 活跃超时：距最后一次访问超过了配置的活跃超时
    SessionTimeout,
    /// Token 已过期：达到绝对超时（或自描述 Token 的签名过期）
    TokenExpired,
    /// 被踢下线：Token 被并发登录策略或主动踢人操作吊销
    Kicked,
}

/// Token 编解码相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token 格式无效
    Malformed(String),
    /// Token 签名无效
    InvalidSignature,
    /// 自描述 Token 已过期
    Expired,
    /// Token 编码失败
    EncodingFailed(String),
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 缺少必需的配置
    MissingRequired(String),
    /// 无效的配置值
    InvalidValue { key: String, message: String },
}

/// 存储相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// 连接失败
    ConnectionFailed(String),
    /// 记录未找到
    NotFound(String),
    /// 操作失败
    OperationFailed(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Auth(e) => write!(f, "Auth error: {}", e),
            Error::Token(e) => write!(f, "Token error: {}", e),
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotLoggedIn => write!(f, "not logged in"),
            AuthError::SessionTimeout => write!(f, "session timed out due to inactivity"),
            AuthError::TokenExpired => write!(f, "token has expired"),
            AuthError::Kicked => write!(f, "token was kicked offline"),
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(msg) => write!(f, "malformed token: {}", msg),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::EncodingFailed(msg) => write!(f, "token encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(key) => {
                write!(f, "missing required configuration: {}", key)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid configuration value for '{}': {}", key, message)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed(msg) => write!(f, "storage connection failed: {}", msg),
            StorageError::NotFound(item) => write!(f, "not found: {}", item),
            StorageError::OperationFailed(msg) => write!(f, "storage operation failed: {}", msg),
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::error::Error for AuthError {}
impl std::error::Error for TokenError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        Error::Token(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Auth(AuthError::NotLoggedIn);
        assert_eq!(err.to_string(), "Auth error: not logged in");
    }

    #[test]
    fn test_error_from_auth() {
        let err: Error = AuthError::Kicked.into();
        assert!(err.is_kicked());
        assert!(!err.is_not_logged_in());
    }

    #[test]
    fn test_token_error_display() {
        let err = TokenError::InvalidSignature;
        assert_eq!(err.to_string(), "invalid token signature");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired("secret".to_string());
        assert_eq!(err.to_string(), "missing required configuration: secret");
    }

    #[test]
    fn test_predicates() {
        assert!(Error::Auth(AuthError::SessionTimeout).is_session_timeout());
        assert!(Error::Auth(AuthError::TokenExpired).is_token_expired());
        assert!(!Error::Auth(AuthError::TokenExpired).is_session_timeout());
    }
}
