//! Client configuration

use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Polling schedule for the packed-order status push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay before each poll
    pub interval: Duration,
    /// Poll ceiling
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 12,
        }
    }
}

/// Client configuration for the warehouse backend
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | PACKDESK_API_URL | http://localhost:8000/api/v1 | backend base URL |
/// | PACKDESK_TIMEOUT_SECS | 30 | request timeout |
/// | PACKDESK_CSRF_TOKEN | - | CSRF token (otherwise read from the `csrftoken` cookie) |
/// | PACKDESK_SESSION_ID | - | session cookie value |
/// | PACKDESK_SCAN_TIMEOUT_MS | 100 | barcode inactivity window |
/// | PACKDESK_POLL_INTERVAL_SECS | 5 | status push poll interval |
/// | PACKDESK_POLL_ATTEMPTS | 12 | status push poll ceiling |
/// | PACKDESK_LOOKBACK_DAYS | 14 | new-order ingestion window |
/// | PACKDESK_NOTICE_SECS | 6 | transient notice lifetime |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8000/api/v1")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// CSRF token sent on non-GET requests
    pub csrf_token: Option<String>,

    /// Session cookie value seeded into the cookie jar
    pub session_id: Option<String>,

    /// Keystroke gap that ends a scan
    pub scan_timeout: Duration,

    /// Status push polling
    pub poll: PollSettings,

    /// How many days back new-order ingestion looks
    pub lookback_days: u32,

    /// How long transient notices stay visible
    pub notice_ttl: Duration,
}

impl ClientConfig {
    /// Create a new configuration with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            csrf_token: None,
            session_id: None,
            scan_timeout: Duration::from_millis(100),
            poll: PollSettings::default(),
            lookback_days: 14,
            notice_ttl: Duration::from_secs(6),
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let base_url = lookup("PACKDESK_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let defaults = Self::new(base_url);

        Self {
            timeout: parsed("PACKDESK_TIMEOUT_SECS").unwrap_or(defaults.timeout),
            csrf_token: lookup("PACKDESK_CSRF_TOKEN").filter(|t| !t.is_empty()),
            session_id: lookup("PACKDESK_SESSION_ID").filter(|t| !t.is_empty()),
            scan_timeout: parsed("PACKDESK_SCAN_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.scan_timeout),
            poll: PollSettings {
                interval: parsed("PACKDESK_POLL_INTERVAL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.poll.interval),
                max_attempts: parsed("PACKDESK_POLL_ATTEMPTS")
                    .and_then(|n| u32::try_from(n).ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.poll.max_attempts),
            },
            lookback_days: parsed("PACKDESK_LOOKBACK_DAYS")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.lookback_days),
            notice_ttl: parsed("PACKDESK_NOTICE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.notice_ttl),
            ..defaults
        }
    }

    /// Set the CSRF token
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Set the session cookie value
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the status push polling schedule
    pub fn with_poll(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll = PollSettings {
            interval,
            max_attempts,
        };
        self
    }

    /// Set the scan inactivity window
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_env() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.scan_timeout, Duration::from_millis(100));
        assert_eq!(config.poll, PollSettings::default());
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.notice_ttl, Duration::from_secs(6));
        assert!(config.csrf_token.is_none());
    }

    #[test]
    fn test_lookup_overrides_and_ignores_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PACKDESK_API_URL", "https://wms.example.com/api/v1"),
            ("PACKDESK_POLL_ATTEMPTS", "3"),
            ("PACKDESK_POLL_INTERVAL_SECS", "not-a-number"),
            ("PACKDESK_CSRF_TOKEN", ""),
            ("PACKDESK_SESSION_ID", "abc123"),
        ]);
        let config = ClientConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://wms.example.com/api/v1");
        assert_eq!(config.poll.max_attempts, 3);
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert!(config.csrf_token.is_none());
        assert_eq!(config.session_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_zero_poll_attempts_falls_back() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "PACKDESK_POLL_ATTEMPTS").then(|| "0".to_string())
        });
        assert_eq!(config.poll.max_attempts, 12);
    }
}
