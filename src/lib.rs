//! # AuthKit
//!
//! 一个框架无关的 Rust 认证与会话管理库。
//!
//! ## 功能特性
//!
//! - **Token 签发**: 多种 Token 风格（UUID、随机串、自描述签名 Token）
//! - **登录校验**: 绝对超时与活跃超时两种过期模型，访问时自动续期
//! - **多端登录策略**: 互斥/并发登录、同设备 Token 共享、最大在线数淘汰
//! - **会话数据**: 按账号的键值会话包，TTL 跟随登录有效期
//! - **角色/权限**: 通配符授权匹配（`admin:*` 匹配 `admin:delete`）
//! - **可插拔存储**: 内置内存存储，任何键值后端实现 [`Storage`] 即可接入
//!
//! 凭证校验（密码、OAuth、多因素认证）不在本库范围内：调用方完成身份
//! 核验后，只需把账号标识交给 [`Manager`] 换取 Token。
//!
//! ## Features
//!
//! - `jwt` - 启用自描述签名 Token 风格（默认启用）
//!
//! ## 登录示例
//!
//! ```rust
//! use authkit::{Config, Manager};
//!
//! let manager = Manager::in_memory(Config::default()).unwrap();
//!
//! // 登录，拿到 Token
//! let token = manager.login("user123").unwrap();
//!
//! // 校验 Token
//! let login_id = manager.check_login(&token).unwrap();
//! assert_eq!(login_id, "user123");
//!
//! // 登出
//! manager.logout(&token).unwrap();
//! assert!(!manager.is_login(&token));
//! ```
//!
//! ## 权限示例
//!
//! ```rust
//! use authkit::{Config, Manager};
//!
//! let manager = Manager::in_memory(Config::default()).unwrap();
//!
//! manager
//!     .set_permissions("user123", vec!["user:read".into(), "admin:*".into()])
//!     .unwrap();
//!
//! assert!(manager.has_permission("user123", "user:read").unwrap());
//! assert!(manager.has_permission("user123", "admin:delete").unwrap());
//! assert!(!manager.has_permission("user123", "user:write").unwrap());
//! ```
//!
//! ## 多端登录策略示例
//!
//! ```rust
//! use authkit::{Config, Manager};
//!
//! // 互斥登录：同一账号再次登录会把旧 Token 踢下线
//! let manager = Manager::in_memory(Config::new().with_concurrent(false)).unwrap();
//!
//! let old_token = manager.login_with_device("user123", "web").unwrap();
//! let new_token = manager.login_with_device("user123", "app").unwrap();
//!
//! assert!(manager.check_login(&old_token).unwrap_err().is_kicked());
//! assert!(manager.is_login(&new_token));
//! ```

pub mod adapter;
pub mod authority;
pub mod config;
pub mod error;
pub mod keys;
pub mod manager;
pub mod random;
pub mod session;
pub mod storage;
pub mod token;

pub use error::{AuthError, ConfigError, CryptoError, Error, Result, StorageError, TokenError};

// ============================================================================
// 核心类型导出
// ============================================================================

pub use config::{Config, DEFAULT_DEVICE, DEFAULT_TOKEN_NAME};
pub use manager::{Manager, TokenInfo};
pub use session::Session;
pub use storage::{MemoryStorage, Storage};
pub use token::TokenStyle;

// ============================================================================
// 适配层契约导出
// ============================================================================

pub use adapter::{CookieOptions, RequestContext, SameSite, token_from_context};
