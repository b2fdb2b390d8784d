// Per-IP rate limiting for the API surface
// In-memory governor limiter keyed by client address

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    time::Duration,
};
use tracing::warn;

use crate::{app::AppState, app_config::AppConfig, utils::api_error::ApiError};

type IpLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// `max_requests` per `window` for every client IP
pub struct ApiRateLimiter {
    limiter: IpLimiter,
    clock: DefaultClock,
    trust_proxy: bool,
}

impl ApiRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let period = window
            .checked_div(burst.get())
            .filter(|p| !p.is_zero())
            .unwrap_or(Duration::from_millis(1));

        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            trust_proxy: false,
        }
    }

    /// Key clients by the hop our proxy appended to X-Forwarded-For
    pub fn behind_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// None when rate limiting is switched off
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        if !config.features.enable_rate_limiting {
            return None;
        }

        Some(
            Self::new(
                config.security.rate_limit_max_requests,
                Duration::from_secs(config.security.rate_limit_window_secs),
            )
            .behind_proxy(config.security.trust_proxy),
        )
    }

    /// `Err` carries the seconds until the client may retry
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.limiter.check_key(&ip).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            wait.as_secs().max(1)
        })
    }

    /// Drop state for clients that are back to a full quota
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

impl std::fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRateLimiter")
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Client IP for rate limiting
///
/// Without a trusted proxy only the socket address counts, since every
/// forwarding header is written by the client. Behind one proxy the rightmost
/// X-Forwarded-For entry is the address that proxy saw; hops to its left are
/// client-supplied.
pub fn client_ip(req: &Request<Body>, trust_proxy: bool) -> IpAddr {
    let socket = || {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip())
    };

    let forwarded = || {
        req.headers()
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .last()
            .and_then(|ip| ip.trim().parse().ok())
    };

    trust_proxy
        .then(forwarded)
        .flatten()
        .or_else(socket)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let ip = client_ip(&request, limiter.trust_proxy);
    match limiter.check(ip) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(%ip, path = %request.uri().path(), retry_after, "Rate limit exceeded");
            ApiError::RateLimitExceeded { retry_after }.into_response()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_applies_per_ip() {
        let limiter = ApiRateLimiter::new(2, Duration::from_secs(60));
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(a).is_ok());
        let retry_after = limiter.check(a).unwrap_err();
        assert!(retry_after >= 1 && retry_after <= 30);

        assert!(limiter.check(b).is_ok());
    }

    #[test]
    fn test_disabled_by_feature_flag() {
        let mut config = AppConfig::for_test();
        config.features.enable_rate_limiting = false;
        assert!(ApiRateLimiter::from_config(&config).is_none());

        config.features.enable_rate_limiting = true;
        assert!(ApiRateLimiter::from_config(&config).is_some());
    }

    fn request_from(socket: &str, forwarded_for: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().header("x-real-ip", "198.51.100.2");
        if let Some(xff) = forwarded_for {
            builder = builder.header("x-forwarded-for", xff);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let addr: SocketAddr = socket.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn test_client_ip_ignores_headers_without_proxy() {
        let req = request_from("192.0.2.10:5000", Some("203.0.113.7"));
        assert_eq!(client_ip(&req, false), "192.0.2.10".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_client_ip_takes_hop_appended_by_proxy() {
        // Client forged the first entry, the proxy appended the second
        let req = request_from("10.0.0.5:5000", Some("203.0.113.7, 198.51.100.40"));
        assert_eq!(client_ip(&req, true), "198.51.100.40".parse::<IpAddr>().unwrap());

        let req = request_from("10.0.0.5:5000", None);
        assert_eq!(client_ip(&req, true), "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_rotating_forwarded_for_shares_one_quota() {
        let limiter = ApiRateLimiter::new(2, Duration::from_secs(900));

        let allowed = (0..50)
            .filter(|i| {
                let req = request_from("192.0.2.10:5000", Some(&format!("10.9.0.{}", i)));
                limiter.check(client_ip(&req, limiter.trust_proxy)).is_ok()
            })
            .count();

        assert_eq!(allowed, 2);
    }
}
