//! Retry - 指数退避 + 随机抖动的有界重试
//!
//! 规则：
//! - 最多重试 `max_retries` 次（总尝试次数 = max_retries + 1）
//! - 第 n 次重试前等待 `interval * 2^n + rand(0..=jitter)`
//! - 服务端返回 `Retry-After`（秒数或 HTTP 日期）时以其为准
//! - 只对 429、幂等请求的 5xx 以及连接级错误重试

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;

/// 重试策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub interval: Duration,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            interval: Duration::from_millis(500),
            jitter: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// 第 `attempt` 次重试前的等待时间（从 0 开始）
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let base = self.interval.saturating_mul(factor);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// 可判定是否需要重试的请求结果
pub trait RetryableOutcome {
    /// `idempotent` 为 true 时 5xx 也会重试
    fn should_retry(&self, idempotent: bool) -> bool;

    /// 服务端建议的等待时间
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// 状态码是否值得重试
pub fn is_retryable_status(status: StatusCode, idempotent: bool) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || (idempotent && status.is_server_error())
}

/// 传输层失败是否值得重试
///
/// 连接失败时请求尚未发出；超时的请求可能已被服务端处理，只对幂等请求重试
pub fn is_retryable_transport(connect: bool, timeout: bool, idempotent: bool) -> bool {
    connect || (idempotent && timeout)
}

/// 解析 `Retry-After`
///
/// 支持整数秒和 HTTP 日期；日期已过期时返回 None
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    (date.with_timezone(&Utc) - now).to_std().ok()
}

impl RetryableOutcome for Result<reqwest::Response, reqwest::Error> {
    fn should_retry(&self, idempotent: bool) -> bool {
        match self {
            Ok(response) => is_retryable_status(response.status(), idempotent),
            Err(e) => is_retryable_transport(e.is_connect(), e.is_timeout(), idempotent),
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        let response = self.as_ref().ok()?;
        let value = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
        parse_retry_after(value, Utc::now())
    }
}

/// 按策略执行请求
///
/// `request` 每次调用都要构造一个新的请求
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, idempotent: bool, mut request: F) -> T
where
    T: RetryableOutcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
{
    let mut attempt = 0;
    loop {
        let outcome = request().await;
        if attempt >= policy.max_retries || !outcome.should_retry(idempotent) {
            return outcome;
        }

        let delay = outcome
            .retry_after()
            .unwrap_or_else(|| policy.backoff(attempt));
        tracing::debug!(
            attempt = attempt + 1,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            "Retrying request"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
