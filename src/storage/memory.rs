//! 内存存储实现
//!
//! 用于开发和测试，生产环境建议使用 Redis 等持久化存储。
//! 单把读写锁即可满足按键原子性；过期键在读取和扫描时惰性判定，
//! 不在内部起任何后台清理线程。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use super::{Storage, pattern_matches};
use crate::error::{Error, Result, StorageError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if now > at)
    }
}

/// 内存键值存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStorage {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 清理所有已过期的键，返回清理数量
    ///
    /// 核心自身从不调用此方法；供外部调度任务按需触发。
    pub fn cleanup_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;

        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        Ok(before - entries.len())
    }

    /// 当前存活键数量（不含已过期未清理的键）
    pub fn len(&self) -> Result<usize> {
        let now = Utc::now();
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;
        Ok(entries.values().filter(|e| !e.is_expired(now)).count())
    }

    /// 是否没有任何存活键
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Storage for MemoryStorage {
    fn set(&self, key: &str, value: &str, ttl: Option<std::time::Duration>) -> Result<()> {
        let expires_at = ttl.map(|d| {
            Utc::now() + Duration::from_std(d).unwrap_or_else(|_| Duration::MAX)
        });
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;
        entries.remove(key);
        Ok(())
    }

    fn expire(&self, key: &str, ttl: Option<std::time::Duration>) -> Result<()> {
        let now = Utc::now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            return Ok(());
        }
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at =
                ttl.map(|d| now + Duration::from_std(d).unwrap_or_else(|_| Duration::MAX));
        }
        Ok(())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let now = Utc::now();
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::Storage(StorageError::OperationFailed("lock poisoned".into())))?;
        Ok(entries
            .iter()
            .filter(|(k, e)| !e.is_expired(now) && pattern_matches(pattern, k))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
