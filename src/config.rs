//! 配置模块
//!
//! [`Config`] 在 Manager 构造时一次性给定，此后只读；多线程并发读取
//! 无需任何同步。所有时长单位为秒，`-1` 统一表示"不限制/关闭"。

use serde::{Deserialize, Serialize};

use crate::adapter::CookieOptions;
use crate::error::{ConfigError, Error, Result};
use crate::token::TokenStyle;

/// 默认 Token 名称（请求头/Cookie/查询参数共用的键名）
pub const DEFAULT_TOKEN_NAME: &str = "satoken";

/// 默认设备标识（未区分设备的登录统一归入此设备）
pub const DEFAULT_DEVICE: &str = "default";

/// 认证核心配置
///
/// # 示例
///
/// ```rust
/// use authkit::config::Config;
/// use authkit::token::TokenStyle;
///
/// let config = Config::new()
///     .with_timeout(3600)
///     .with_active_timeout(1800)
///     .with_token_style(TokenStyle::Random64)
///     .with_concurrent(false)
///     .with_key_prefix("myapp");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Token 名称，同时作为请求头、Cookie、查询参数的键名
    pub token_name: String,

    /// 绝对超时（秒），自签发起计算，`-1` 表示永不过期
    pub timeout: i64,

    /// 活跃超时（秒），距最后一次访问的最大空闲时长，`-1` 表示关闭
    pub active_timeout: i64,

    /// 是否允许同一账号多个 Token 同时在线
    pub is_concurrent: bool,

    /// 同一账号同一设备重复登录时是否复用已有 Token
    pub is_share: bool,

    /// 单账号最大同时在线 Token 数，`-1` 表示不限制；超出时按签发顺序
    /// 踢掉最早的 Token
    pub max_login_count: i64,

    /// Token 风格
    pub token_style: TokenStyle,

    /// 活跃时间戳落盘的节流周期（秒），限制高频访问下的写放大
    pub data_refresh_period: i64,

    /// 访问时是否自动续期（刷新活跃时间戳与存储 TTL）
    pub auto_renew: bool,

    /// 存储键前缀，空串表示无前缀（与不带前缀的对端实现互通）
    pub key_prefix: String,

    /// 签名密钥，仅自描述 Token 风格需要
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Cookie 属性，原样转发给适配器
    pub cookie: CookieOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            timeout: 60 * 60 * 24 * 30,
            active_timeout: -1,
            is_concurrent: true,
            is_share: true,
            max_login_count: 12,
            token_style: TokenStyle::default(),
            data_refresh_period: 30,
            auto_renew: true,
            key_prefix: "satoken:".to_string(),
            secret: None,
            cookie: CookieOptions {
                name: DEFAULT_TOKEN_NAME.to_string(),
                ..Default::default()
            },
        }
    }
}

impl Config {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置 Token 名称
    pub fn with_token_name(mut self, name: impl Into<String>) -> Self {
        self.token_name = name.into();
        self
    }

    /// 设置绝对超时（秒），`-1` 表示永不过期
    pub fn with_timeout(mut self, timeout: i64) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置活跃超时（秒），`-1` 表示关闭
    pub fn with_active_timeout(mut self, active_timeout: i64) -> Self {
        self.active_timeout = active_timeout;
        self
    }

    /// 设置是否允许同账号并发登录
    pub fn with_concurrent(mut self, is_concurrent: bool) -> Self {
        self.is_concurrent = is_concurrent;
        self
    }

    /// 设置同设备重复登录是否复用 Token
    pub fn with_share(mut self, is_share: bool) -> Self {
        self.is_share = is_share;
        self
    }

    /// 设置单账号最大在线 Token 数，`-1` 表示不限制
    pub fn with_max_login_count(mut self, max: i64) -> Self {
        self.max_login_count = max;
        self
    }

    /// 设置 Token 风格
    pub fn with_token_style(mut self, style: TokenStyle) -> Self {
        self.token_style = style;
        self
    }

    /// 设置活跃时间戳落盘节流周期（秒）
    pub fn with_data_refresh_period(mut self, seconds: i64) -> Self {
        self.data_refresh_period = seconds;
        self
    }

    /// 设置访问时是否自动续期
    pub fn with_auto_renew(mut self, auto_renew: bool) -> Self {
        self.auto_renew = auto_renew;
        self
    }

    /// 设置存储键前缀（空串表示无前缀）
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// 设置签名密钥
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// 设置 Cookie 属性
    pub fn with_cookie(mut self, cookie: CookieOptions) -> Self {
        self.cookie = cookie;
        self
    }

    /// 校验配置的自洽性
    ///
    /// Manager 构造时会调用；无效配置在启动期即失败，而不是在第一次
    /// 登录时才暴露。
    pub fn validate(&self) -> Result<()> {
        if self.token_name.is_empty() {
            return Err(Error::Config(ConfigError::MissingRequired(
                "token_name".into(),
            )));
        }
        if self.timeout == 0 || self.timeout < -1 {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "timeout".into(),
                message: "must be positive seconds or -1 (never expires)".into(),
            }));
        }
        if self.active_timeout == 0 || self.active_timeout < -1 {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "active_timeout".into(),
                message: "must be positive seconds or -1 (disabled)".into(),
            }));
        }
        if self.max_login_count == 0 || self.max_login_count < -1 {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "max_login_count".into(),
                message: "must be a positive count or -1 (unlimited)".into(),
            }));
        }
        if self.data_refresh_period <= 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "data_refresh_period".into(),
                message: "must be positive seconds".into(),
            }));
        }
        if self.token_style.is_self_describing()
            && self.secret.as_deref().unwrap_or("").is_empty()
        {
            return Err(Error::Config(ConfigError::MissingRequired("secret".into())));
        }
        Ok(())
    }

    /// 绝对超时对应的存储 TTL，永不过期时为 `None`
    pub(crate) fn storage_ttl(&self) -> Option<std::time::Duration> {
        (self.timeout != -1).then(|| std::time::Duration::from_secs(self.timeout as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = Config::new()
            .with_token_name("Authorization")
            .with_timeout(3600)
            .with_active_timeout(600)
            .with_concurrent(false)
            .with_share(false)
            .with_max_login_count(3)
            .with_token_style(TokenStyle::Random32)
            .with_key_prefix("app1");

        assert_eq!(config.token_name, "Authorization");
        assert_eq!(config.timeout, 3600);
        assert_eq!(config.active_timeout, 600);
        assert!(!config.is_concurrent);
        assert!(!config.is_share);
        assert_eq!(config.max_login_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::new().with_timeout(0).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_never_expire_accepted() {
        assert!(Config::new().with_timeout(-1).validate().is_ok());
    }

    #[test]
    fn test_zero_max_login_count_rejected() {
        assert!(Config::new().with_max_login_count(0).validate().is_err());
        assert!(Config::new().with_max_login_count(-1).validate().is_ok());
    }

    #[cfg(feature = "jwt")]
    #[test]
    fn test_jwt_style_requires_secret() {
        let config = Config::new().with_token_style(TokenStyle::Jwt);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingRequired(_))
        ));

        let config = Config::new()
            .with_token_style(TokenStyle::Jwt)
            .with_secret("my-secret-key-at-least-32-bytes!");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_ttl() {
        assert_eq!(
            Config::new().with_timeout(60).storage_ttl(),
            Some(std::time::Duration::from_secs(60))
        );
        assert_eq!(Config::new().with_timeout(-1).storage_ttl(), None);
    }
}
