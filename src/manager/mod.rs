//! 登录管理模块
//!
//! [`Manager`] 是认证核心的编排者：登录时签发 Token、执行并发登录策略、
//! 写入索引与会话；访问时校验/续期 Token；登出时吊销 Token 并回收会话；
//! 同时提供角色/权限的读写与判断。
//!
//! Manager 不持有任何全局状态，调用方显式持有实例并注入到需要的地方；
//! 过期只在访问时惰性判定，核心不起任何后台线程。
//!
//! ## 示例
//!
//! ```rust
//! use authkit::{Config, Manager};
//!
//! let manager = Manager::in_memory(Config::default()).unwrap();
//!
//! // 登录并校验
//! let token = manager.login("user123").unwrap();
//! assert_eq!(manager.check_login(&token).unwrap(), "user123");
//!
//! // 授权
//! manager
//!     .set_permissions("user123", vec!["order:*".to_string()])
//!     .unwrap();
//! assert!(manager.has_permission("user123", "order:cancel").unwrap());
//!
//! // 登出后 Token 失效
//! manager.logout(&token).unwrap();
//! assert!(manager.check_login(&token).unwrap_err().is_not_logged_in());
//! ```

mod concurrency;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::authority;
use crate::config::{Config, DEFAULT_DEVICE};
use crate::error::{AuthError, Error, Result};
use crate::keys::KeyScheme;
use crate::session::Session;
use crate::storage::{MemoryStorage, Storage};
use crate::token;

use concurrency::{ActiveToken, plan_login};

/// Token→账号索引记录
///
/// 被踢下线的 Token 保留一条 `kicked` 墓碑记录，使后续校验能区分
/// "被踢下线"与"从未登录"。
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenRecord {
    login_id: String,
    device: String,
    create_time: DateTime<Utc>,
    active_time: DateTime<Utc>,
    #[serde(default)]
    kicked: bool,
}

/// 账号索引中的一条 Token 引用
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountEntry {
    token: String,
    create_time: DateTime<Utc>,
}

/// Token 的概要信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token 串
    pub token: String,
    /// 所属账号
    pub login_id: String,
    /// 登录设备
    pub device: String,
    /// 签发时间
    pub create_time: DateTime<Utc>,
    /// 最后活跃时间（落盘值，受节流影响可能略有滞后）
    pub active_time: DateTime<Utc>,
    /// 距绝对过期的剩余秒数，`-1` 表示永不过期
    pub timeout_remaining: i64,
}

/// 登录管理器
///
/// 线程安全：内部只含只读配置与存储句柄，可放入 `Arc` 在多线程间共享。
pub struct Manager {
    config: Config,
    keys: KeyScheme,
    storage: Arc<dyn Storage>,
}

impl Manager {
    /// 使用指定存储后端创建管理器
    ///
    /// 配置无效时立即返回 [`ConfigError`](crate::error::ConfigError)。
    pub fn new(storage: Arc<dyn Storage>, config: Config) -> Result<Self> {
        config.validate()?;
        let keys = KeyScheme::new(config.key_prefix.clone());
        Ok(Self {
            config,
            keys,
            storage,
        })
    }

    /// 使用内置内存存储创建管理器（适合开发与测试）
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::new(Arc::new(MemoryStorage::new()), config)
    }

    /// 当前配置
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========================================================================
    // 登录 / 校验 / 登出
    // ========================================================================

    /// 登录（默认设备）
    pub fn login(&self, login_id: &str) -> Result<String> {
        self.login_with_device(login_id, DEFAULT_DEVICE)
    }

    /// 以指定设备登录，返回 Token
    ///
    /// 依次执行：并发策略决策 → 踢人 → 写 Token 索引与账号索引 →
    /// 创建/刷新会话。除存储错误外总是成功。
    pub fn login_with_device(&self, login_id: &str, device: &str) -> Result<String> {
        let device = if device.is_empty() {
            DEFAULT_DEVICE
        } else {
            device
        };

        let active = self.active_tokens(login_id)?;
        let plan = plan_login(&self.config, device, &active);

        if let Some(reused) = plan.reuse {
            // 复用已有 Token：按重新签发处理，刷新签发/活跃时间与 TTL，
            // 不改变在线数；先进先出的淘汰顺序按最近一次签发计算
            let now = Utc::now();
            if let Some(mut record) = self.load_token_record(&reused)? {
                record.create_time = now;
                record.active_time = now;
                self.write_token_record(&reused, &record)?;

                let account_key = self.keys.account_key(login_id, device);
                let mut entries = self.load_account_entries(&account_key)?;
                for entry in entries.iter_mut() {
                    if entry.token == reused {
                        entry.create_time = now;
                    }
                }
                self.write_account_entries(&account_key, &entries)?;
            }
            self.touch_session(login_id)?;
            debug!(login_id, device, "login reused existing token");
            return Ok(reused);
        }

        let token = token::generate(
            self.config.token_style,
            login_id,
            self.config.timeout,
            self.config.secret.as_deref(),
        )?;
        // 随机源足够强时不应发生；一旦撞上视为不变量被破坏，绝不覆盖他人会话
        if self.storage.get(&self.keys.token_key(&token))?.is_some() {
            return Err(Error::internal("token collision detected"));
        }

        for victim in &plan.evict {
            self.tombstone_token(victim)?;
        }

        let now = Utc::now();
        let record = TokenRecord {
            login_id: login_id.to_string(),
            device: device.to_string(),
            create_time: now,
            active_time: now,
            kicked: false,
        };
        self.write_token_record(&token, &record)?;

        let account_key = self.keys.account_key(login_id, device);
        let mut entries = self.load_account_entries(&account_key)?;
        entries.push(AccountEntry {
            token: token.clone(),
            create_time: now,
        });
        self.write_account_entries(&account_key, &entries)?;

        self.touch_session(login_id)?;
        debug!(
            login_id,
            device,
            evicted = plan.evict.len(),
            "login issued new token"
        );
        Ok(token)
    }

    /// 校验 Token 并返回其账号标识
    ///
    /// 失败时区分：未登录、被踢下线、绝对过期、活跃超时。成功且开启
    /// 自动续期时刷新活跃时间戳与存储 TTL；该写入按
    /// `data_refresh_period` 节流，本次请求的判定始终以当前时刻为准，
    /// 节流只影响落盘。
    pub fn check_login(&self, token: &str) -> Result<String> {
        if token.is_empty() {
            return Err(AuthError::NotLoggedIn.into());
        }

        // 自描述风格先行校验签名与内嵌过期时间，无需存储往返；
        // 但登出/踢人仍由索引记录决定，签名通过不代表仍在登录态
        #[cfg(feature = "jwt")]
        if self.config.token_style == token::TokenStyle::Jwt {
            if let Some(secret) = self.config.secret.as_deref() {
                match crate::token::jwt::verify(token, secret) {
                    Ok(_) => {}
                    Err(Error::Token(crate::error::TokenError::Expired)) => {
                        return Err(AuthError::TokenExpired.into());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let record = match self.load_token_record(token)? {
            Some(r) => r,
            None => return Err(AuthError::NotLoggedIn.into()),
        };
        if record.kicked {
            return Err(AuthError::Kicked.into());
        }

        let now = Utc::now();

        // 绝对超时：开启自动续期时有效期由滑动的存储 TTL 决定，
        // 这里只在续期关闭时按签发时间判定
        if !self.config.auto_renew && self.config.timeout != -1 {
            let deadline = record.create_time + chrono::Duration::seconds(self.config.timeout);
            if now > deadline {
                return Err(AuthError::TokenExpired.into());
            }
        }

        // 活跃超时：以落盘的最后活跃时间判定
        if self.config.active_timeout != -1 {
            let idle_deadline =
                record.active_time + chrono::Duration::seconds(self.config.active_timeout);
            if now > idle_deadline {
                return Err(AuthError::SessionTimeout.into());
            }
        }

        if self.config.auto_renew {
            let elapsed_ms = (now - record.active_time).num_milliseconds();
            if elapsed_ms >= self.refresh_threshold_ms() {
                let mut refreshed = record.clone();
                refreshed.active_time = now;
                self.write_token_record(token, &refreshed)?;
            }
        }

        Ok(record.login_id)
    }

    /// Token 是否处于登录态
    pub fn is_login(&self, token: &str) -> bool {
        self.check_login(token).is_ok()
    }

    /// 获取 Token 对应的账号标识（校验与 [`check_login`](Self::check_login) 一致）
    pub fn get_login_id(&self, token: &str) -> Result<String> {
        self.check_login(token)
    }

    /// 登出指定 Token
    ///
    /// 幂等：Token 不存在（或已自然过期）时直接成功。账号最后一个
    /// Token 登出时一并删除会话。
    pub fn logout(&self, token: &str) -> Result<()> {
        let record = match self.load_token_record(token)? {
            Some(r) => r,
            None => return Ok(()),
        };

        self.storage.delete(&self.keys.token_key(token))?;
        self.remove_from_account_index(&record.login_id, &record.device, token)?;

        if self.active_tokens(&record.login_id)?.is_empty() {
            self.storage
                .delete(&self.keys.session_key(&record.login_id))?;
        }
        debug!(login_id = %record.login_id, device = %record.device, "logout");
        Ok(())
    }

    /// 登出账号的全部设备
    ///
    /// 删除该账号所有 Token 记录、账号索引与会话。
    pub fn logout_account(&self, login_id: &str) -> Result<()> {
        for active in self.active_tokens(login_id)? {
            self.storage.delete(&self.keys.token_key(&active.token))?;
        }
        for key in self.storage.keys(&self.keys.account_pattern(login_id))? {
            self.storage.delete(&key)?;
        }
        self.storage.delete(&self.keys.session_key(login_id))?;
        debug!(login_id, "logout account");
        Ok(())
    }

    /// 将账号在指定设备上的登录踢下线
    ///
    /// 被踢的 Token 保留墓碑记录，后续校验返回"被踢下线"而非"未登录"。
    /// 仅当被踢的是账号最后一个在线 Token 时才删除会话。
    pub fn kickout(&self, login_id: &str, device: &str) -> Result<()> {
        let victims: Vec<String> = self
            .active_tokens(login_id)?
            .into_iter()
            .filter(|t| t.device == device)
            .map(|t| t.token)
            .collect();

        for token in &victims {
            self.tombstone_token(token)?;
        }

        if !victims.is_empty() && self.active_tokens(login_id)?.is_empty() {
            self.storage.delete(&self.keys.session_key(login_id))?;
        }
        debug!(login_id, device, kicked = victims.len(), "kickout");
        Ok(())
    }

    // ========================================================================
    // 查询
    // ========================================================================

    /// 获取 Token 的概要信息
    ///
    /// 只要求索引记录存在，不做活跃/踢人判定。
    pub fn token_info(&self, token: &str) -> Result<TokenInfo> {
        let record = self
            .load_token_record(token)?
            .ok_or(Error::Auth(AuthError::NotLoggedIn))?;

        let timeout_remaining = if self.config.timeout == -1 {
            -1
        } else {
            // 自动续期时有效期随活跃时间滑动
            let base = if self.config.auto_renew {
                record.active_time
            } else {
                record.create_time
            };
            let deadline = base + chrono::Duration::seconds(self.config.timeout);
            (deadline - Utc::now()).num_seconds().max(0)
        };

        Ok(TokenInfo {
            token: token.to_string(),
            login_id: record.login_id,
            device: record.device,
            create_time: record.create_time,
            active_time: record.active_time,
            timeout_remaining,
        })
    }

    /// 列出账号当前所有在线 Token，按签发时间从早到晚排序
    pub fn token_values(&self, login_id: &str) -> Result<Vec<String>> {
        let mut active = self.active_tokens(login_id)?;
        active.sort_by_key(|t| t.create_time);
        Ok(active.into_iter().map(|t| t.token).collect())
    }

    /// 获取账号会话（不存在时创建）
    ///
    /// 返回的句柄直接绑定存储，后续读写不再经过 Manager。
    pub fn get_session(&self, login_id: &str) -> Result<Session> {
        let key = self.keys.session_key(login_id);
        let ttl = self.config.storage_ttl();
        match Session::load(self.storage.clone(), key.clone(), ttl)? {
            Some(session) => Ok(session),
            None => Session::create(self.storage.clone(), key, login_id, ttl),
        }
    }

    // ========================================================================
    // 角色 / 权限
    // ========================================================================

    /// 设置账号的角色集合（覆盖式写入，自动去重）
    ///
    /// 授权集合不设 TTL，与 Token 生命周期无关。
    pub fn set_roles(&self, login_id: &str, roles: Vec<String>) -> Result<()> {
        self.write_grants(&self.keys.role_key(login_id), roles)
    }

    /// 获取账号的角色集合
    pub fn get_roles(&self, login_id: &str) -> Result<Vec<String>> {
        self.read_grants(&self.keys.role_key(login_id))
    }

    /// 账号是否具有指定角色（支持通配符授权）
    pub fn has_role(&self, login_id: &str, role: &str) -> Result<bool> {
        Ok(authority::any_match(&self.get_roles(login_id)?, role))
    }

    /// 账号是否具有任一指定角色
    pub fn has_any_role(&self, login_id: &str, roles: &[&str]) -> Result<bool> {
        Ok(authority::any_of_match(&self.get_roles(login_id)?, roles))
    }

    /// 账号是否同时具有全部指定角色
    pub fn has_all_roles(&self, login_id: &str, roles: &[&str]) -> Result<bool> {
        Ok(authority::all_match(&self.get_roles(login_id)?, roles))
    }

    /// 设置账号的权限集合（覆盖式写入，自动去重）
    pub fn set_permissions(&self, login_id: &str, permissions: Vec<String>) -> Result<()> {
        self.write_grants(&self.keys.permission_key(login_id), permissions)
    }

    /// 获取账号的权限集合
    pub fn get_permissions(&self, login_id: &str) -> Result<Vec<String>> {
        self.read_grants(&self.keys.permission_key(login_id))
    }

    /// 账号是否具有指定权限（支持通配符授权）
    pub fn has_permission(&self, login_id: &str, permission: &str) -> Result<bool> {
        Ok(authority::any_match(
            &self.get_permissions(login_id)?,
            permission,
        ))
    }

    /// 账号是否具有任一指定权限
    pub fn has_any_permission(&self, login_id: &str, permissions: &[&str]) -> Result<bool> {
        Ok(authority::any_of_match(
            &self.get_permissions(login_id)?,
            permissions,
        ))
    }

    /// 账号是否同时具有全部指定权限
    pub fn has_all_permissions(&self, login_id: &str, permissions: &[&str]) -> Result<bool> {
        Ok(authority::all_match(
            &self.get_permissions(login_id)?,
            permissions,
        ))
    }

    // ========================================================================
    // 内部辅助
    // ========================================================================

    /// 活跃时间戳落盘的节流阈值（毫秒）
    ///
    /// 配置了活跃超时时收紧到其一半，保证持续访问的落盘间隔始终小于
    /// 空闲窗口，不会因节流被误判超时。
    fn refresh_threshold_ms(&self) -> i64 {
        let period_ms = self.config.data_refresh_period * 1000;
        if self.config.active_timeout == -1 {
            period_ms
        } else {
            period_ms.min(self.config.active_timeout * 1000 / 2)
        }
    }

    fn load_token_record(&self, token: &str) -> Result<Option<TokenRecord>> {
        match self.storage.get(&self.keys.token_key(token))? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::internal(format!("corrupt token record: {}", e))),
            None => Ok(None),
        }
    }

    fn write_token_record(&self, token: &str, record: &TokenRecord) -> Result<()> {
        let raw = serde_json::to_string(record)
            .map_err(|e| Error::internal(format!("serialize token record: {}", e)))?;
        self.storage
            .set(&self.keys.token_key(token), &raw, self.config.storage_ttl())
    }

    fn load_account_entries(&self, account_key: &str) -> Result<Vec<AccountEntry>> {
        match self.storage.get(account_key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::internal(format!("corrupt account index: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    fn write_account_entries(&self, account_key: &str, entries: &[AccountEntry]) -> Result<()> {
        if entries.is_empty() {
            return self.storage.delete(account_key);
        }
        let raw = serde_json::to_string(entries)
            .map_err(|e| Error::internal(format!("serialize account index: {}", e)))?;
        self.storage
            .set(account_key, &raw, self.config.storage_ttl())
    }

    /// 收集账号当前所有在线 Token，同时惰性清理索引中已失效的条目
    ///
    /// 索引条目指向的 Token 记录不存在（已过期）或已是墓碑时，从索引
    /// 中剔除并回写。
    fn active_tokens(&self, login_id: &str) -> Result<Vec<ActiveToken>> {
        let mut keys = self.storage.keys(&self.keys.account_pattern(login_id))?;
        keys.sort();

        let device_base = self.keys.account_key(login_id, "");
        let mut active = Vec::new();

        for account_key in keys {
            let device = match account_key.strip_prefix(&device_base) {
                Some(d) => d.to_string(),
                None => continue,
            };
            let entries = self.load_account_entries(&account_key)?;
            let mut live = Vec::with_capacity(entries.len());
            for entry in &entries {
                match self.load_token_record(&entry.token)? {
                    Some(record) if !record.kicked => {
                        live.push(entry.clone());
                        active.push(ActiveToken {
                            token: entry.token.clone(),
                            device: device.clone(),
                            create_time: entry.create_time,
                        });
                    }
                    _ => {}
                }
            }
            if live.len() != entries.len() {
                self.write_account_entries(&account_key, &live)?;
            }
        }
        Ok(active)
    }

    /// 将 Token 标记为被踢下线（墓碑），并从账号索引中摘除
    ///
    /// Token 记录已不存在时视为成功。
    fn tombstone_token(&self, token: &str) -> Result<()> {
        let mut record = match self.load_token_record(token)? {
            Some(r) => r,
            None => return Ok(()),
        };
        if !record.kicked {
            record.kicked = true;
            self.write_token_record(token, &record)?;
        }
        self.remove_from_account_index(&record.login_id, &record.device, token)
    }

    fn remove_from_account_index(&self, login_id: &str, device: &str, token: &str) -> Result<()> {
        let account_key = self.keys.account_key(login_id, device);
        let entries = self.load_account_entries(&account_key)?;
        let remaining: Vec<AccountEntry> = entries
            .into_iter()
            .filter(|e| e.token != token)
            .collect();
        self.write_account_entries(&account_key, &remaining)
    }

    /// 确保会话存在并刷新其 TTL
    fn touch_session(&self, login_id: &str) -> Result<()> {
        let key = self.keys.session_key(login_id);
        if self.storage.get(&key)?.is_some() {
            self.storage.expire(&key, self.config.storage_ttl())
        } else {
            Session::create(self.storage.clone(), key, login_id, self.config.storage_ttl())
                .map(|_| ())
        }
    }

    fn write_grants(&self, key: &str, mut grants: Vec<String>) -> Result<()> {
        grants.sort();
        grants.dedup();
        let raw = serde_json::to_string(&grants)
            .map_err(|e| Error::internal(format!("serialize grants: {}", e)))?;
        self.storage.set(key, &raw, None)
    }

    fn read_grants(&self, key: &str) -> Result<Vec<String>> {
        match self.storage.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::internal(format!("corrupt grant set: {}", e))),
            None => Ok(Vec::new()),
        }
    }
}
