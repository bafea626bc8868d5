pub mod config;
pub mod csrf;
pub mod rate_limiter;
pub mod window_sweeper;

pub use config::{GuardConfig, RateLimitRule, RoutePolicy};
pub use csrf::{CsrfGuard, CsrfRejection};
pub use rate_limiter::{RateLimiter, apply_rate_limit_headers};
pub use window_sweeper::spawn_window_sweeper;
