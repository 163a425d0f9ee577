use metrics::{counter, histogram};
use std::time::Instant;

fn outcome(success: bool) -> &'static str {
    // ---
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Count a password-login attempt by outcome.
pub fn increment_login(success: bool) {
    counter!("auth_logins_total", "outcome" => outcome(success)).increment(1);
}

/// Count a completed signup.
pub fn increment_signup() {
    counter!("auth_signups_total").increment(1);
}

/// Count a finished WebAuthn ceremony by kind and outcome.
pub fn increment_ceremony(kind: &'static str, success: bool) {
    counter!("auth_ceremonies_total", "kind" => kind, "outcome" => outcome(success)).increment(1);
}

/// Count a request rejected by the rate limiter.
pub fn increment_rate_limited() {
    counter!("auth_rate_limited_total").increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant) {
    let elapsed = start.elapsed();
    histogram!("http_request_duration_seconds").record(elapsed);
}
