//! 存储键构造模块
//!
//! 所有持久化记录的键布局由 [`KeyScheme`] 统一生成：
//! `<prefix><namespace>:<identifier>`。
//!
//! 命名空间固定为五类：`token`（Token→账号索引）、`account`（账号+设备→Token
//! 列表索引）、`session`（账号会话数据）、`role`、`permission`（授权集合）。
//!
//! 前缀为空时键形如 `token:xxx`，与共用同一存储、不带前缀的对端实现逐字节一致；
//! 非空前缀统一规范化为以 `:` 结尾，如 `myapp` 与 `myapp:` 等价。

/// 存储键构造器
///
/// 纯函数式组件，不持有任何存储连接。
///
/// # Example
///
/// ```rust
/// use authkit::keys::KeyScheme;
///
/// let keys = KeyScheme::new("satoken");
/// assert_eq!(keys.token_key("abc"), "satoken:token:abc");
/// assert_eq!(keys.account_key("u1", "web"), "satoken:account:u1:web");
///
/// let bare = KeyScheme::new("");
/// assert_eq!(bare.session_key("u1"), "session:u1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScheme {
    prefix: String,
}

impl KeyScheme {
    /// 创建键构造器，规范化前缀（非空前缀补齐结尾的 `:`）
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with(':') {
            prefix.push(':');
        }
        Self { prefix }
    }

    /// 获取规范化后的前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Token→账号索引键：`<prefix>token:<token>`
    pub fn token_key(&self, token: &str) -> String {
        format!("{}token:{}", self.prefix, token)
    }

    /// 账号+设备→Token 列表索引键：`<prefix>account:<login_id>:<device>`
    pub fn account_key(&self, login_id: &str, device: &str) -> String {
        format!("{}account:{}:{}", self.prefix, login_id, device)
    }

    /// 账号所有设备的索引键扫描模式：`<prefix>account:<login_id>:*`
    pub fn account_pattern(&self, login_id: &str) -> String {
        format!("{}account:{}:*", self.prefix, login_id)
    }

    /// 会话数据键：`<prefix>session:<login_id>`
    pub fn session_key(&self, login_id: &str) -> String {
        format!("{}session:{}", self.prefix, login_id)
    }

    /// 角色集合键：`<prefix>role:<login_id>`
    pub fn role_key(&self, login_id: &str) -> String {
        format!("{}role:{}", self.prefix, login_id)
    }

    /// 权限集合键：`<prefix>permission:<login_id>`
    pub fn permission_key(&self, login_id: &str) -> String {
        format!("{}permission:{}", self.prefix, login_id)
    }
}
