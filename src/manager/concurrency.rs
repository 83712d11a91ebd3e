//! 并发登录策略
//!
//! 登录时的纯决策逻辑：是否复用已有 Token、哪些 Token 需要被踢下线。
//! 决策只依赖本次调用观测到的存储快照；同账号并发登录可能短暂超出
//! 最大在线数，属于已接受的弱一致窗口。

use chrono::{DateTime, Utc};

use crate::config::Config;

/// 账号当前的一个在线 Token（登录决策的输入快照）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveToken {
    pub token: String,
    pub device: String,
    pub create_time: DateTime<Utc>,
}

/// 登录决策结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LoginPlan {
    /// 复用的已有 Token；`None` 时生成新 Token
    pub reuse: Option<String>,
    /// 需要踢下线的 Token
    pub evict: Vec<String>,
}

/// 按策略矩阵顺序决定本次登录的动作
///
/// 1. 共享开启且同设备已有 Token → 复用最新的那个，不踢任何 Token
/// 2. 否则生成新 Token
/// 3. 不允许并发 → 踢掉账号现有的全部 Token
/// 4. 允许并发且设了上限 → 按签发时间先进先出，踢到不超上限为止
///
/// 设备级复用与账号级上限是相互独立的检查：复用不增加在线数，
/// 因此复用路径不会触发上限踢人。
pub(crate) fn plan_login(config: &Config, device: &str, active: &[ActiveToken]) -> LoginPlan {
    if config.is_share {
        let reuse = active
            .iter()
            .filter(|t| t.device == device)
            .max_by_key(|t| t.create_time)
            .map(|t| t.token.clone());
        if reuse.is_some() {
            return LoginPlan {
                reuse,
                evict: Vec::new(),
            };
        }
    }

    if !config.is_concurrent {
        return LoginPlan {
            reuse: None,
            evict: active.iter().map(|t| t.token.clone()).collect(),
        };
    }

    if config.max_login_count >= 0 {
        let after_login = active.len() as i64 + 1;
        let excess = after_login - config.max_login_count;
        if excess > 0 {
            let mut sorted: Vec<&ActiveToken> = active.iter().collect();
            // 稳定排序：同一时刻签发的 Token 保持观测顺序，先观测到的先被踢
            sorted.sort_by_key(|t| t.create_time);
            return LoginPlan {
                reuse: None,
                evict: sorted
                    .iter()
                    .take(excess as usize)
                    .map(|t| t.token.clone())
                    .collect(),
            };
        }
    }

    LoginPlan::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn active(token: &str, device: &str, age_secs: i64) -> ActiveToken {
        ActiveToken {
            token: token.to_string(),
            device: device.to_string(),
            create_time: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_share_reuses_same_device_token() {
        let config = Config::new().with_share(true);
        let tokens = vec![active("t1", "web", 100), active("t2", "app", 50)];

        let plan = plan_login(&config, "web", &tokens);
        assert_eq!(plan.reuse, Some("t1".to_string()));
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn test_share_reuses_newest_of_device() {
        let config = Config::new().with_share(true);
        let tokens = vec![active("t1", "web", 100), active("t2", "web", 10)];

        let plan = plan_login(&config, "web", &tokens);
        assert_eq!(plan.reuse, Some("t2".to_string()));
    }

    #[test]
    fn test_share_other_device_mints_new() {
        let config = Config::new().with_share(true).with_max_login_count(-1);
        let tokens = vec![active("t1", "web", 100)];

        let plan = plan_login(&config, "app", &tokens);
        assert_eq!(plan.reuse, None);
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn test_no_share_always_mints_new() {
        let config = Config::new().with_share(false).with_max_login_count(-1);
        let tokens = vec![active("t1", "web", 100)];

        let plan = plan_login(&config, "web", &tokens);
        assert_eq!(plan.reuse, None);
    }

    #[test]
    fn test_exclusive_evicts_everything() {
        let config = Config::new().with_share(false).with_concurrent(false);
        let tokens = vec![active("t1", "web", 100), active("t2", "app", 50)];

        let plan = plan_login(&config, "pc", &tokens);
        assert_eq!(plan.reuse, None);
        assert_eq!(plan.evict, vec!["t1".to_string(), "t2".to_string()]);
    }

    #[test]
    fn test_max_login_count_evicts_oldest_first() {
        let config = Config::new().with_share(false).with_max_login_count(2);
        let tokens = vec![active("newer", "web", 10), active("older", "app", 100)];

        let plan = plan_login(&config, "pc", &tokens);
        // 登录后将有 3 个，上限 2，按先进先出踢掉最早的一个
        assert_eq!(plan.evict, vec!["older".to_string()]);
    }

    #[test]
    fn test_max_login_count_evicts_multiple() {
        let config = Config::new().with_share(false).with_max_login_count(1);
        let tokens = vec![active("a", "d1", 300), active("b", "d2", 200), active("c", "d3", 100)];

        let plan = plan_login(&config, "d4", &tokens);
        assert_eq!(
            plan.evict,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_under_limit_no_eviction() {
        let config = Config::new().with_share(false).with_max_login_count(3);
        let tokens = vec![active("t1", "web", 100)];

        let plan = plan_login(&config, "app", &tokens);
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn test_unlimited_no_eviction() {
        let config = Config::new().with_share(false).with_max_login_count(-1);
        let tokens: Vec<ActiveToken> = (0..50).map(|i| active(&format!("t{}", i), "web", i)).collect();

        let plan = plan_login(&config, "web", &tokens);
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn test_share_reuse_skips_limit_check() {
        // 复用不增加在线数，即使已达上限也不触发踢人
        let config = Config::new().with_share(true).with_max_login_count(2);
        let tokens = vec![active("t1", "web", 100), active("t2", "app", 50)];

        let plan = plan_login(&config, "web", &tokens);
        assert_eq!(plan.reuse, Some("t1".to_string()));
        assert!(plan.evict.is_empty());
    }
}
