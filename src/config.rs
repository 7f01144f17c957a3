use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Provenance stamped on every queued entry. Generated when unset.
    pub session_id: Option<String>,
    pub queue: QueueConfig,
}

/// Tuning for the action queue and its scheduler.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Failed attempts before an entry becomes `failed`.
    pub max_retries: i32,
    /// Minimum age of a completed entry before it can be pruned.
    pub retention: Duration,
    /// Coalescing delay between a trigger and the pass it starts.
    pub debounce: Duration,
    /// Periodic pass interval, independent of triggers.
    pub poll_interval: Duration,
    pub prune_interval: Duration,
    /// Upper bound on one handler invocation. `None` waits forever.
    pub handler_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_retries: 3,
            retention: Duration::from_secs(24 * 60 * 60),
            debounce: Duration::from_millis(100),
            poll_interval: Duration::from_secs(30),
            prune_interval: Duration::from_secs(60 * 60),
            handler_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_or("DATABASE_URL", "sqlite://pos.db");

        let host: IpAddr = env_or("POS_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| format!("Invalid POS_HOST: {e}"))?;

        let port: u16 = env_or("POS_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid POS_PORT: {e}"))?;

        let log_level = env_or("POS_LOG_LEVEL", "info");

        let session_id = std::env::var("POS_SESSION_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let defaults = QueueConfig::default();

        let max_retries: i32 = env_or("POS_MAX_RETRIES", &defaults.max_retries.to_string())
            .parse()
            .map_err(|e| format!("Invalid POS_MAX_RETRIES: {e}"))?;
        if max_retries < 1 {
            return Err("POS_MAX_RETRIES must be at least 1".to_string());
        }

        let retention_hours: u64 = env_or("POS_RETENTION_HOURS", "24")
            .parse()
            .map_err(|e| format!("Invalid POS_RETENTION_HOURS: {e}"))?;

        let debounce_ms: u64 = env_or("POS_DEBOUNCE_MS", "100")
            .parse()
            .map_err(|e| format!("Invalid POS_DEBOUNCE_MS: {e}"))?;

        let poll_secs: u64 = env_or("POS_POLL_INTERVAL_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid POS_POLL_INTERVAL_SECS: {e}"))?;

        let prune_secs: u64 = env_or("POS_PRUNE_INTERVAL_SECS", "3600")
            .parse()
            .map_err(|e| format!("Invalid POS_PRUNE_INTERVAL_SECS: {e}"))?;

        // 0 disables the per-handler timeout.
        let timeout_secs: u64 = env_or("POS_HANDLER_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid POS_HANDLER_TIMEOUT_SECS: {e}"))?;

        Ok(Config {
            database_url,
            host,
            port,
            log_level,
            session_id,
            queue: QueueConfig {
                max_retries,
                retention: Duration::from_secs(retention_hours * 60 * 60),
                debounce: Duration::from_millis(debounce_ms),
                poll_interval: Duration::from_secs(poll_secs.max(1)),
                prune_interval: Duration::from_secs(prune_secs.max(1)),
                handler_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
