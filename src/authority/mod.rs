//! 授权判断模块
//!
//! 提供角色/权限授权串的通配符匹配。授权集合按账号存储，与 Token 生命周期
//! 无关：账号登出后授权依然保留，校验登录态是调用方的另一步操作。
//!
//! ## 匹配规则
//!
//! - 完全相等即匹配，区分大小写
//! - 授权串以 `*` 结尾时，按字面前缀匹配：`admin:*` 匹配 `admin:delete`
//! - 单独的 `*` 匹配任意请求
//!
//! ## 示例
//!
//! ```rust
//! use authkit::authority::{matches, any_match};
//!
//! assert!(matches("order:*", "order:cancel"));
//! assert!(!matches("order:*", "orders:cancel"));
//! assert!(matches("*", "anything"));
//!
//! let grants = vec!["user:read".to_string(), "admin:*".to_string()];
//! assert!(any_match(&grants, "admin:delete"));
//! assert!(!any_match(&grants, "user:write"));
//! ```

/// 通配符常量
pub const WILDCARD: &str = "*";

/// 判断单条授权串是否满足请求
///
/// 区分大小写；`*` 仅在授权串末尾有通配含义。
pub fn matches(grant: &str, request: &str) -> bool {
    if grant == WILDCARD {
        return true;
    }
    if let Some(prefix) = grant.strip_suffix('*') {
        return request.starts_with(prefix);
    }
    grant == request
}

/// 授权集合中任意一条满足请求即为真（OR 归约）
pub fn any_match<S: AsRef<str>>(grants: &[S], request: &str) -> bool {
    grants.iter().any(|g| matches(g.as_ref(), request))
}

/// 每个请求都能被授权集合满足才为真（AND 归约）
///
/// 请求列表为空时返回真。
pub fn all_match<S: AsRef<str>, R: AsRef<str>>(grants: &[S], requests: &[R]) -> bool {
    requests.iter().all(|r| any_match(grants, r.as_ref()))
}

/// 授权集合能满足请求列表中的任意一个即为真
pub fn any_of_match<S: AsRef<str>, R: AsRef<str>>(grants: &[S], requests: &[R]) -> bool {
    requests.iter().any(|r| any_match(grants, r.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("user:read", "user:read"));
        assert!(!matches("user:read", "user:write"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches("User:Read", "user:read"));
        assert!(!matches("admin:*", "Admin:delete"));
    }

    #[test]
    fn test_prefix_wildcard() {
        assert!(matches("admin:*", "admin:delete"));
        assert!(matches("admin:*", "admin:"));
        assert!(matches("order:*", "order:cancel"));
        // 前缀按字面比较，"orders:" 不以 "order:" 开头
        assert!(!matches("order:*", "orders:cancel"));
    }

    #[test]
    fn test_bare_wildcard() {
        assert!(matches("*", "anything"));
        assert!(matches("*", ""));
        assert!(matches("*", "a:b:c"));
    }

    #[test]
    fn test_inner_star_is_literal() {
        // `*` 不在末尾时没有通配含义
        assert!(!matches("a*c", "abc"));
        assert!(matches("a*c", "a*c"));
    }

    #[test]
    fn test_any_match() {
        let grants = vec!["a".to_string(), "b:*".to_string()];
        assert!(any_match(&grants, "a"));
        assert!(any_match(&grants, "b:x"));
        assert!(!any_match(&grants, "c"));
        assert!(!any_match(&Vec::<String>::new(), "a"));
    }

    #[test]
    fn test_all_match() {
        let grants = vec!["a".to_string(), "b:*".to_string()];
        assert!(all_match(&grants, &["a", "b:1", "b:2"]));
        assert!(!all_match(&grants, &["a", "c"]));
        assert!(all_match(&grants, &[] as &[&str]));
    }

    #[test]
    fn test_any_of_match() {
        let grants = vec!["x:*".to_string()];
        assert!(any_of_match(&grants, &["y", "x:1"]));
        assert!(!any_of_match(&grants, &["y", "z"]));
    }
}
