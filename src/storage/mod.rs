//! 存储抽象模块
//!
//! 定义认证核心对键值存储后端的唯一依赖 [`Storage`]，并内置一个用于开发
//! 和测试的内存实现 [`MemoryStorage`]。
//!
//! ## 契约
//!
//! - 每个键的读写由后端保证原子性；核心不会发起跨键事务，也不会在一次
//!   存储往返期间持有任何锁。
//! - `ttl` 为 `None` 表示永不过期；到期后的键视同不存在。
//! - 删除不存在的键是成功而非错误（吊销一个已自然过期的 Token 是常态）。
//! - 后端错误原样上报为 [`StorageError`](crate::error::StorageError)，
//!   核心不做任何重试，重试策略属于后端或调用方。
//!
//! Redis 等远程后端由外部 crate 实现本 trait 接入，核心对任何符合契约的
//! 实现行为一致。

mod memory;

pub use memory::MemoryStorage;

use std::time::Duration;

use crate::error::Result;

/// 键值存储后端接口
///
/// 实现此 trait 即可作为认证核心的持久层。所有方法都是同步完成语义：
/// 内部可以使用连接池或异步 IO，但对核心暴露的是阻塞调用。
pub trait Storage: Send + Sync {
    /// 写入键值，`ttl` 为 `None` 时永不过期
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// 读取键值，不存在（或已过期）返回 `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 删除键，键不存在时也返回成功
    fn delete(&self, key: &str) -> Result<()>;

    /// 重设键的过期时间，`ttl` 为 `None` 时取消过期
    fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<()>;

    /// 按模式枚举键，`*` 匹配任意长度的任意字符
    fn keys(&self, pattern: &str) -> Result<Vec<String>>;
}

/// 简单通配符匹配：`*` 匹配任意长度的任意字符序列
///
/// 供存储实现复用，语义与常见 KV 存储的 `KEYS` 模式一致（仅支持 `*`）。
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    fn inner(p: &[u8], k: &[u8]) -> bool {
        match p.first() {
            None => k.is_empty(),
            Some(b'*') => {
                // 贪婪回溯：`*` 吞掉 0..=len 个字符
                (0..=k.len()).any(|i| inner(&p[1..], &k[i..]))
            }
            Some(c) => k.first() == Some(c) && inner(&p[1..], &k[1..]),
        }
    }
    inner(pattern.as_bytes(), key.as_bytes())
}
