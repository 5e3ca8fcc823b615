// Per-caller request ceiling for the chat endpoint

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovRateLimiter};

use crate::error::ApiError;
use crate::AppState;

#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimiter {
    /// Create a new keyed limiter allowing `requests_per_minute` per caller
    pub fn new(requests_per_minute: u32) -> anyhow::Result<Self> {
        let quota = Quota::per_minute(
            NonZeroU32::new(requests_per_minute)
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limit"))?,
        );

        Ok(Self::with_quota(quota))
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(GovRateLimiter::keyed(quota)),
        }
    }

    /// Take one request from the caller's budget; false once it is spent
    pub fn try_acquire(&self, caller: IpAddr) -> bool {
        self.limiter.check_key(&caller).is_ok()
    }

    /// Forget callers whose budget has fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of callers currently tracked
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }

    /// Prune on a fixed interval for as long as the runtime lives
    pub fn spawn_pruner(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                limiter.prune();
                tracing::debug!(callers = limiter.len(), "pruned rate limiter");
            }
        })
    }
}

/// Middleware rejecting callers over their budget with 429 before the
/// handler runs. Requests without peer info share one bucket.
pub async fn limit_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let caller = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.rate_limiter.try_acquire(caller) {
        tracing::warn!(%caller, "rate limit exceeded");
        return ApiError::TooManyRequests.into_response();
    }

    next.run(req).await
}
