//! 框架适配层契约模块
//!
//! 定义 Web 框架适配器与认证核心之间的请求上下文抽象 [`RequestContext`]。
//! 每个框架实现一次该 trait，核心自身从不接触任何框架类型，也从不直接
//! 调用该 trait —— 适配器从上下文中提取 Token 字符串交给
//! [`Manager`](crate::manager::Manager)，再根据返回结果决定放行或拒绝。
//!
//! ## 示例
//!
//! ```rust
//! use authkit::adapter::{CookieOptions, SameSite};
//!
//! let cookie = CookieOptions::new("satoken", "token-value")
//!     .http_only(true)
//!     .secure(true)
//!     .same_site(SameSite::Lax)
//!     .max_age(3600)
//!     .path("/");
//!
//! let header = cookie.to_header_value();
//! assert!(header.starts_with("satoken=token-value"));
//! assert!(header.contains("HttpOnly"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::error::Result;

/// SameSite Cookie 属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    /// 严格模式：Cookie 只在同站请求时发送
    Strict,
    /// 宽松模式：允许顶级导航的跨站请求
    #[default]
    Lax,
    /// 无限制：所有请求都发送 Cookie（需要 Secure 属性）
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Cookie 设置选项
///
/// 配置中的 Cookie 属性会原样转发给适配器，由适配器写出响应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    /// Cookie 名称
    pub name: String,
    /// Cookie 值
    pub value: String,
    /// 过期时间（秒），`0` 表示删除，`-1` 表示会话 Cookie
    pub max_age: i64,
    /// Path 属性
    pub path: String,
    /// Domain 属性
    pub domain: String,
    /// Secure 属性（仅通过 HTTPS 发送）
    pub secure: bool,
    /// HttpOnly 属性（禁止 JavaScript 访问）
    pub http_only: bool,
    /// SameSite 属性
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            max_age: -1,
            path: "/".to_string(),
            domain: String::new(),
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieOptions {
    /// 创建新的 Cookie 选项
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// 设置过期时间（秒）
    pub fn max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// 设置 Path 属性
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// 设置 Domain 属性
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// 设置 Secure 属性
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// 设置 HttpOnly 属性
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// 设置 SameSite 属性
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// 生成 Set-Cookie 头值
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        if self.max_age >= 0 {
            parts.push(format!("Max-Age={}", self.max_age));
        }
        if !self.path.is_empty() {
            parts.push(format!("Path={}", self.path));
        }
        if !self.domain.is_empty() {
            parts.push(format!("Domain={}", self.domain));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.push(format!("SameSite={}", self.same_site));

        parts.join("; ")
    }
}

/// 请求上下文接口，抽象不同 Web 框架的请求/响应
///
/// 所有读取方法都是显式可失败的：值不存在返回 `None`，不提供任何
/// panic 式的取值入口。
pub trait RequestContext {
    /// 获取请求头
    fn header(&self, key: &str) -> Option<String>;

    /// 获取查询参数
    fn query(&self, key: &str) -> Option<String>;

    /// 获取 Cookie
    fn cookie(&self, key: &str) -> Option<String>;

    /// 获取请求体字节数据
    fn body(&self) -> Result<Vec<u8>>;

    /// 设置响应头
    fn set_header(&mut self, key: &str, value: &str);

    /// 写出 Cookie
    fn set_cookie(&mut self, options: &CookieOptions);

    /// 中止请求处理
    fn abort(&mut self);

    /// 检查请求是否已中止
    fn is_aborted(&self) -> bool;
}

/// 按约定顺序从请求上下文中提取 Token：请求头 → Cookie → 查询参数
///
/// 取配置的 `token_name` 作为三处的键名；都不存在时返回 `None`。
pub fn token_from_context(ctx: &dyn RequestContext, config: &Config) -> Option<String> {
    let name = &config.token_name;
    ctx.header(name)
        .or_else(|| ctx.cookie(name))
        .or_else(|| ctx.query(name))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeContext {
        headers: HashMap<String, String>,
        cookies: HashMap<String, String>,
        queries: HashMap<String, String>,
        aborted: bool,
    }

    impl RequestContext for FakeContext {
        fn header(&self, key: &str) -> Option<String> {
            self.headers.get(key).cloned()
        }
        fn query(&self, key: &str) -> Option<String> {
            self.queries.get(key).cloned()
        }
        fn cookie(&self, key: &str) -> Option<String> {
            self.cookies.get(key).cloned()
        }
        fn body(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn set_header(&mut self, _key: &str, _value: &str) {}
        fn set_cookie(&mut self, _options: &CookieOptions) {}
        fn abort(&mut self) {
            self.aborted = true;
        }
        fn is_aborted(&self) -> bool {
            self.aborted
        }
    }

    #[test]
    fn test_token_extraction_order() {
        let config = Config::default();
        let mut ctx = FakeContext::default();

        assert_eq!(token_from_context(&ctx, &config), None);

        ctx.queries
            .insert(config.token_name.clone(), "from-query".into());
        assert_eq!(
            token_from_context(&ctx, &config),
            Some("from-query".to_string())
        );

        ctx.cookies
            .insert(config.token_name.clone(), "from-cookie".into());
        assert_eq!(
            token_from_context(&ctx, &config),
            Some("from-cookie".to_string())
        );

        ctx.headers
            .insert(config.token_name.clone(), "from-header".into());
        assert_eq!(
            token_from_context(&ctx, &config),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn test_empty_token_ignored() {
        let config = Config::default();
        let mut ctx = FakeContext::default();
        ctx.headers.insert(config.token_name.clone(), "".into());
        assert_eq!(token_from_context(&ctx, &config), None);
    }

    #[test]
    fn test_cookie_header_value() {
        let cookie = CookieOptions::new("satoken", "abc")
            .max_age(0)
            .domain("example.com")
            .secure(true)
            .same_site(SameSite::Strict);

        let header = cookie.to_header_value();
        assert!(header.contains("satoken=abc"));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Domain=example.com"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=Strict"));
    }

    #[test]
    fn test_session_cookie_omits_max_age() {
        let cookie = CookieOptions::new("satoken", "abc").max_age(-1);
        assert!(!cookie.to_header_value().contains("Max-Age"));
    }
}
