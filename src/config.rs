use crate::error::GatewayError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Redis,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(StorageBackend::Redis),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected 'redis' or 'memory', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessorEndpoint {
    pub payments_url: String,
    pub health_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage_backend: StorageBackend,
    pub redis_url: String,
    pub default_processor: ProcessorEndpoint,
    pub fallback_processor: ProcessorEndpoint,
    pub workers: usize,
    pub queue_capacity: usize,
    pub health_check_interval: Duration,
    pub health_lock_ttl: Duration,
    pub health_timeout: Duration,
    pub submit_timeout: Duration,
    pub requeue_backoff: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Every problem is collected so a broken deployment reports all of them at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();
        let mut vars = Vars {
            lookup: &lookup,
            problems: &mut problems,
        };

        let bind_addr = vars.parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 9999)));
        let storage_backend = vars.parsed("STORAGE_BACKEND", StorageBackend::Redis);
        let redis_url = vars.string("REDIS_URL", "redis://127.0.0.1:6379/");

        let default_base = vars.url("PAYMENT_PROCESSOR_URL_DEFAULT", "http://payment-processor-default:8080");
        let fallback_base = vars.url("PAYMENT_PROCESSOR_URL_FALLBACK", "http://payment-processor-fallback:8080");
        let default_health = vars
            .optional_url("HEALTH_URL_DEFAULT")
            .unwrap_or_else(|| format!("{}/payments/service-health", default_base));
        let fallback_health = vars
            .optional_url("HEALTH_URL_FALLBACK")
            .unwrap_or_else(|| format!("{}/payments/service-health", fallback_base));

        let workers = vars.positive("WORKER_POOL", 16);
        let queue_capacity = vars.positive("PAYMENT_CHAN_SIZE", 10_000);
        let health_check_interval = vars.millis("HEALTH_CHECK_INTERVAL_MS", 5_500, true);
        let health_lock_ttl = vars.millis("HEALTH_LOCK_TTL_MS", 5_000, true);
        let health_timeout = vars.millis("HEALTH_TIMEOUT_MS", 1_000, true);
        let submit_timeout = vars.millis("SUBMIT_TIMEOUT_MS", 1_500, true);
        let requeue_backoff = vars.millis("REQUEUE_BACKOFF_MS", 10, false);

        if redis_url.trim().is_empty() && storage_backend == StorageBackend::Redis {
            problems.push("REDIS_URL: must not be empty when STORAGE_BACKEND=redis".to_string());
        }

        if !problems.is_empty() {
            return Err(GatewayError::Config(problems));
        }

        Ok(Self {
            bind_addr,
            storage_backend,
            redis_url,
            default_processor: ProcessorEndpoint {
                payments_url: format!("{}/payments", default_base),
                health_url: default_health,
            },
            fallback_processor: ProcessorEndpoint {
                payments_url: format!("{}/payments", fallback_base),
                health_url: fallback_health,
            },
            workers,
            queue_capacity,
            health_check_interval,
            health_lock_ttl,
            health_timeout,
            submit_timeout,
            requeue_backoff,
        })
    }

    pub fn log_summary(&self) {
        tracing::info!(
            bind_addr = %self.bind_addr,
            storage = ?self.storage_backend,
            default_processor = %self.default_processor.payments_url,
            fallback_processor = %self.fallback_processor.payments_url,
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            health_interval_ms = self.health_check_interval.as_millis() as u64,
            submit_timeout_ms = self.submit_timeout.as_millis() as u64,
            "configuration loaded"
        );
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
    problems: &'a mut Vec<String>,
}

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn string(&mut self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&mut self, key: &str, default: T) -> T
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.raw(key) {
            None => default,
            Some(v) => match v.trim().parse::<T>() {
                Ok(parsed) => parsed,
                Err(e) => {
                    self.problems.push(format!("{}: cannot parse '{}': {}", key, v, e));
                    default
                }
            },
        }
    }

    fn positive(&mut self, key: &str, default: usize) -> usize {
        let v = self.parsed(key, default);
        if v == 0 {
            self.problems.push(format!("{}: must be greater than zero", key));
            return default;
        }
        v
    }

    fn millis(&mut self, key: &str, default: u64, non_zero: bool) -> Duration {
        let v = self.parsed(key, default);
        if non_zero && v == 0 {
            self.problems.push(format!("{}: must be greater than zero", key));
            return Duration::from_millis(default);
        }
        Duration::from_millis(v)
    }

    fn optional_url(&mut self, key: &str) -> Option<String> {
        self.raw(key)?;
        Some(self.url(key, ""))
    }

    fn url(&mut self, key: &str, default: &str) -> String {
        let v = self.string(key, default);
        let trimmed = v.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            self.problems.push(format!("{}: '{}' is not an http(s) URL", key, v));
        }
        trimmed
    }
}
