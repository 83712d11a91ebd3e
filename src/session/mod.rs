//! 会话数据模块
//!
//! 每个账号对应一个可变的键值会话包，持久化在存储的 `session` 命名空间下，
//! TTL 跟随账号的登录有效期（每次登录时刷新）。[`Session`] 是绑定存储的
//! 句柄：取得句柄后的读写直接落到存储，不再经过 Manager。
//!
//! 会话包整体序列化为一条 JSON 记录；两个句柄并发写同一账号时按
//! 后写覆盖处理，与存储契约的按键原子性一致。
//!
//! ## 示例
//!
//! ```rust
//! use authkit::{Config, Manager};
//!
//! let manager = Manager::in_memory(Config::default()).unwrap();
//! manager.login("user123").unwrap();
//!
//! let mut session = manager.get_session("user123").unwrap();
//! session.set("nickname", "老张").unwrap();
//! session.set("age", 42).unwrap();
//!
//! assert_eq!(session.get_string("nickname"), Some("老张".to_string()));
//! assert_eq!(session.get::<i64>("age"), Some(42));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// 会话包的持久化形态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SessionData {
    /// 所属账号标识
    pub id: String,
    /// 创建时间
    pub create_time: DateTime<Utc>,
    /// 自定义数据
    #[serde(default)]
    pub data: HashMap<String, Value>,
}

/// 会话句柄
///
/// 由 [`Manager::get_session`](crate::manager::Manager::get_session) 返回；
/// 所有写操作立即持久化。
pub struct Session {
    key: String,
    ttl: Option<Duration>,
    storage: Arc<dyn Storage>,
    inner: SessionData,
}

impl Session {
    /// 从存储加载会话，不存在返回 `Ok(None)`
    pub(crate) fn load(
        storage: Arc<dyn Storage>,
        key: String,
        ttl: Option<Duration>,
    ) -> Result<Option<Self>> {
        match storage.get(&key)? {
            Some(raw) => {
                let inner: SessionData = serde_json::from_str(&raw)
                    .map_err(|e| Error::internal(format!("corrupt session record: {}", e)))?;
                Ok(Some(Self {
                    key,
                    ttl,
                    storage,
                    inner,
                }))
            }
            None => Ok(None),
        }
    }

    /// 创建并持久化一个空会话
    pub(crate) fn create(
        storage: Arc<dyn Storage>,
        key: String,
        id: &str,
        ttl: Option<Duration>,
    ) -> Result<Self> {
        let session = Self {
            key,
            ttl,
            storage,
            inner: SessionData {
                id: id.to_string(),
                create_time: Utc::now(),
                data: HashMap::new(),
            },
        };
        session.persist()?;
        Ok(session)
    }

    /// 所属账号标识
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// 会话创建时间
    pub fn create_time(&self) -> DateTime<Utc> {
        self.inner.create_time
    }

    /// 写入一个值并立即持久化
    pub fn set<V: Serialize>(&mut self, key: impl Into<String>, value: V) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| Error::internal(format!("unserializable session value: {}", e)))?;
        self.inner.data.insert(key.into(), json_value);
        self.persist()
    }

    /// 读取一个值并反序列化为目标类型
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        self.inner
            .data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// 读取字符串值
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    /// 读取整数值
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)
    }

    /// 删除一个值并立即持久化，返回被删除的原始值
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        let removed = self.inner.data.remove(key);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// 清空所有自定义数据并立即持久化
    pub fn clear(&mut self) -> Result<()> {
        self.inner.data.clear();
        self.persist()
    }

    /// 是否包含指定键
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.data.contains_key(key)
    }

    /// 当前所有键
    pub fn keys(&self) -> Vec<String> {
        self.inner.data.keys().cloned().collect()
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.inner)
            .map_err(|e| Error::internal(format!("serialize session record: {}", e)))?;
        self.storage.set(&self.key, &raw, self.ttl)
    }
}
