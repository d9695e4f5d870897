use crate::error::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

/// Rate limiter keyed by caller IP address.
pub type IpRateLimiter = Arc<RateLimiter<SocketAddr, DashMapStateStore<SocketAddr>, DefaultClock>>;

/// Build an IP-keyed limiter allowing `attempts` requests per `window_seconds`.
pub fn create_ip_rate_limiter(attempts: u32, window_seconds: u64) -> IpRateLimiter {
    let attempts = attempts.max(1);
    let period = Duration::from_millis((window_seconds * 1000) / attempts as u64);
    let quota = Quota::with_period(period)
        .expect("rate limit period must be non-zero")
        .allow_burst(NonZeroU32::new(attempts).expect("attempts is clamped to >= 1"));

    Arc::new(RateLimiter::dashmap(quota))
}

/// Per-IP rate limiting.
///
/// Honors `x-forwarded-for` when present (first hop), falling back to the
/// socket address. Requests where no IP can be determined pass through with a
/// warning rather than being rejected.
pub async fn ip_rate_limit_middleware(
    State(limiter): State<IpRateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let forwarded_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<std::net::IpAddr>().ok());

    let addr = forwarded_ip.map(|ip| SocketAddr::new(ip, 0)).or_else(|| {
        request
            .extensions()
            .get::<axum::extract::ConnectInfo<SocketAddr>>()
            .map(|axum::extract::ConnectInfo(addr)| *addr)
    });

    let Some(addr) = addr else {
        tracing::warn!("could not determine caller IP for rate limiting");
        return Ok(next.run(request).await);
    };

    match limiter.check_key(&addr) {
        Ok(_) => Ok(next.run(request).await),
        Err(negative) => {
            let wait_time = negative.wait_time_from(DefaultClock::default().now());
            Err(AppError::TooManyRequests(
                "too many requests from this IP, try again later".to_string(),
                Some(wait_time.as_secs()),
            ))
        }
    }
}
