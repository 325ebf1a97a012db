use once_cell::sync::Lazy;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

static HTTP_TIMEOUT: Lazy<Duration> = Lazy::new(|| {
    env_duration(
        "NXPING_HTTP_TIMEOUT_SECS",
        Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
    )
});

// Lab switches usually ship the self-signed NX-API certificate.
static ACCEPT_INVALID_CERTS: Lazy<bool> =
    Lazy::new(|| env_flag("NXPING_TLS_ACCEPT_INVALID_CERTS"));

static USE_MOCK_DRIVERS: Lazy<bool> = Lazy::new(|| env_flag("NXPING_USE_MOCK_DRIVERS"));

pub fn http_timeout() -> Duration {
    *HTTP_TIMEOUT
}

pub fn accept_invalid_certs() -> bool {
    *ACCEPT_INVALID_CERTS
}

pub fn use_mock_drivers() -> bool {
    *USE_MOCK_DRIVERS
}

fn env_duration(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn env_flag(var: &str) -> bool {
    std::env::var(var)
        .map(|value| parse_flag(&value))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
