use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rolegrid_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 15_000;
const MIN_BACKEND_TIMEOUT_MS: u64 = 100;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 30 * 60;
const MIN_SESSION_IDLE_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Http {
        base_url: Url,
        api_token: Option<String>,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub backend: BackendConfig,
    pub backend_timeout: Duration,
    pub session_idle_ttl: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .map(|value| {
                value
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))
            })
            .transpose()?
            .unwrap_or(3001);

        let backend = match lookup("BACKEND_MODE")
            .unwrap_or_else(|| "http".to_owned())
            .as_str()
        {
            "http" => {
                let base_url = required_non_empty(&lookup, "BACKEND_BASE_URL")?;
                let base_url = Url::parse(base_url.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid BACKEND_BASE_URL: {error}"))
                })?;
                BackendConfig::Http {
                    base_url,
                    api_token: lookup("BACKEND_API_TOKEN").filter(|value| !value.trim().is_empty()),
                }
            }
            "memory" => BackendConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "BACKEND_MODE must be either 'http' or 'memory', got '{other}'"
                )));
            }
        };

        let timeout_ms = lookup("BACKEND_TIMEOUT_MS")
            .map(|value| {
                value.parse::<u64>().map_err(|error| {
                    AppError::Validation(format!("invalid BACKEND_TIMEOUT_MS: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_BACKEND_TIMEOUT_MS);
        if timeout_ms < MIN_BACKEND_TIMEOUT_MS {
            return Err(AppError::Validation(format!(
                "BACKEND_TIMEOUT_MS must be at least {MIN_BACKEND_TIMEOUT_MS}"
            )));
        }

        let backend_timeout = Duration::from_millis(timeout_ms);

        let idle_ttl_secs = lookup("SESSION_IDLE_TTL_SECS")
            .map(|value| {
                value.parse::<u64>().map_err(|error| {
                    AppError::Validation(format!("invalid SESSION_IDLE_TTL_SECS: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_SESSION_IDLE_TTL_SECS);
        let session_idle_ttl = Duration::from_secs(idle_ttl_secs);
        // An in-flight save must not outlive its session.
        if idle_ttl_secs < MIN_SESSION_IDLE_TTL_SECS || session_idle_ttl <= backend_timeout {
            return Err(AppError::Validation(format!(
                "SESSION_IDLE_TTL_SECS must be at least {MIN_SESSION_IDLE_TTL_SECS} and exceed BACKEND_TIMEOUT_MS"
            )));
        }

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            backend,
            backend_timeout,
            session_idle_ttl,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
