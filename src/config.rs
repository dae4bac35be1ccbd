//! Application configuration
//!
//! Loaded from a TOML file (every section optional, see [`AppConfig`]),
//! then overridden from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `JWT_SECRET` | `security.jwt_secret` |
//! | `JWT_EXPIRES_IN` | `security.jwt_expires_in` |
//! | `FRONTEND_URL` | `cors.allowed_origin` |
//! | `HOST` / `PORT` | `server.host` / `server.port` |
//! | `APP_ENV` (or `NODE_ENV`) | `server.environment` |
//! | `RATE_LIMIT_WINDOW_SECS` / `RATE_LIMIT_MAX` | `rate_limit.*` |
//! | `DATABASE_URL` | `database.url` |
//! | `LOG_LEVEL` | `logging.level` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Signing secret used when none is configured. Refused in production.
pub const DEV_JWT_SECRET: &str = "dicri-dev-secret-change-me";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DICRI_CONFIG";

/// Longest accepted token lifetime (ten years).
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 365 * 86_400);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `development` or `production`
    pub environment: String,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            environment: "development".to_string(),
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// `3600`, `30m`, `24h` or `7d`
    pub jwt_expires_in: String,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expires_in: "24h".to_string(),
            bcrypt_cost: 10,
        }
    }
}

impl SecurityConfig {
    /// Token lifetime; `None` when `jwt_expires_in` does not parse.
    pub fn token_lifetime(&self) -> Option<Duration> {
        parse_duration(&self.jwt_expires_in)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 900,
            max_requests: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/dicri".to_string(),
            max_connections: 10,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Read `path` (defaults when the file does not exist), apply
    /// environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&text)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRES_IN") {
            self.security.jwt_expires_in = v;
        }
        if let Some(v) = lookup("FRONTEND_URL") {
            self.cors.allowed_origin = v;
        }
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_env("PORT", v)?;
        }
        if let Some(v) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            self.server.environment = v;
        }
        if let Some(v) = lookup("RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit.window_secs = parse_env("RATE_LIMIT_WINDOW_SECS", v)?;
        }
        if let Some(v) = lookup("RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = parse_env("RATE_LIMIT_MAX", v)?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.rate_limit.enabled
            && (self.rate_limit.window_secs == 0 || self.rate_limit.max_requests == 0)
        {
            return Err(ConfigError::Invalid(
                "rate_limit.window_secs and rate_limit.max_requests must be non-zero".into(),
            ));
        }
        match self.security.token_lifetime() {
            Some(d) if d > MAX_TOKEN_LIFETIME => {
                return Err(ConfigError::Invalid(format!(
                    "security.jwt_expires_in: {:?} exceeds {} days",
                    self.security.jwt_expires_in,
                    MAX_TOKEN_LIFETIME.as_secs() / 86_400
                )))
            }
            Some(d) if !d.is_zero() => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "security.jwt_expires_in: cannot parse {:?}",
                    self.security.jwt_expires_in
                )))
            }
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.is_production() && self.uses_dev_secret() {
            return Err(ConfigError::Invalid(
                "JWT_SECRET must be set in production".into(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("production")
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.security.jwt_secret == DEV_JWT_SECRET
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

/// Parse `90`, `90s`, `30m`, `24h` or `7d`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().ok()?;

    let seconds = match unit.trim() {
        "" | "s" => amount,
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(3_600)?,
        "d" => amount.checked_mul(86_400)?,
        _ => return None,
    };
    Some(Duration::from_secs(seconds))
}

/// `$DICRI_CONFIG`, else `<config dir>/dicri-evidence/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .map(|dir| dir.join("dicri-evidence").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}
