use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use crate::rest::error::ApiError;
use crate::rest::AppState;

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    max_rps: u64,
    count: AtomicU64,
    window_start: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(max_rps: u64) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                max_rps,
                count: AtomicU64::new(0),
                window_start: Mutex::new(Instant::now()),
            }),
        }
    }

    pub async fn check(&self) -> bool {
        let mut start = self.inner.window_start.lock().await;
        if start.elapsed().as_secs() >= 1 {
            *start = Instant::now();
            self.inner.count.store(1, Ordering::Relaxed);
            return true;
        }
        let prev = self.inner.count.fetch_add(1, Ordering::Relaxed);
        prev < self.inner.max_rps
    }
}

pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    if !state.rate_limiter.check().await {
        state.metrics.inc_rate_limited();
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}
