use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a password-login attempt and its outcome.
    fn record_login(&self, success: bool);

    /// Record a completed signup.
    fn record_signup(&self);

    /// Record a finished ceremony (`kind` is "login" or "registration").
    fn record_ceremony(&self, kind: &'static str, success: bool);

    /// Record a request rejected by the rate limiter.
    fn record_rate_limited(&self);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
