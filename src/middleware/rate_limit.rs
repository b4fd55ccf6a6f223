use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::error::ApiError;

/// 登录限流器
///
/// 按客户端 IP 在滑动窗口内计数，只挂在登录入口上。
/// 窗口状态是进程内唯一需要同步更新的共享可变状态，
/// DashMap 的条目级锁保证计数自增的原子性。
pub struct RateLimiter {
    window: Duration,
    max_attempts: u32,
    entries: DashMap<String, AttemptWindow>,
}

struct AttemptWindow {
    count: u32,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(window: Duration, max_attempts: u32) -> Self {
        Self {
            window,
            max_attempts,
            entries: DashMap::new(),
        }
    }

    /// 允许则计入一次尝试，拒绝时返回剩余等待秒数
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(AttemptWindow {
            count: 0,
            window_start: now,
        });

        // 窗口滚动后重新计数
        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.max_attempts {
            let retry_after = self
                .window
                .checked_sub(now.duration_since(entry.window_start))
                .unwrap_or(Duration::ZERO)
                .as_secs();
            return Err(retry_after.max(1));
        }

        entry.count += 1;
        Ok(())
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&req);

    match limiter.check(&ip) {
        Ok(()) => Ok(next.run(req).await),
        Err(retry_after) => {
            tracing::warn!(%ip, retry_after, "login rate limit exceeded");
            Err(ApiError::TooManyAttempts(retry_after))
        }
    }
}

/// 依次从代理头和连接信息推导客户端 IP
fn client_ip(req: &Request) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixth_attempt_in_window_is_rejected() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 5);

        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4").is_ok());
        }
        assert!(limiter.check("1.2.3.4").is_err());
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 5);

        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4").is_ok());
        }
        assert!(limiter.check("1.2.3.4").is_err());
        assert!(limiter.check("5.6.7.8").is_ok());
    }

    #[test]
    fn window_rollover_resets_the_count() {
        let limiter = RateLimiter::new(Duration::from_millis(20), 5);

        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4").is_ok());
        }
        assert!(limiter.check("1.2.3.4").is_err());

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("1.2.3.4").is_ok());
    }

    #[test]
    fn rejection_reports_wait_seconds() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 1);

        assert!(limiter.check("1.2.3.4").is_ok());
        let retry_after = limiter.check("1.2.3.4").unwrap_err();
        assert!(retry_after >= 1 && retry_after <= 900);
    }
}
