//! Process-wide configuration.
//!
//! Settings are read once at startup from `SECTION__KEY` environment variables
//! and then shared read-only as `Arc<Settings>`. Loading goes through a lookup
//! closure so tests can construct a fresh configuration from a map.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use labor_infra::DataAccessOptions;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        key,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub application_name: String,
    pub application_description: String,
    pub command_timeout: Duration,
    pub max_retry_count: u32,
    pub max_retry_delay: Duration,
    /// Locale tags in preference order; never empty.
    pub supported_cultures: Vec<String>,
}

/// Documentation surface settings. The credential pair, when both halves are
/// present, arms the gate in front of `/swagger`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SwaggerSettings {
    pub enabled: bool,
    pub user_name: Option<String>,
    pub password: Option<String>,
}

impl SwaggerSettings {
    /// The shared credential, if both username and password are configured.
    pub fn credential(&self) -> Option<(&str, &str)> {
        match (self.user_name.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

impl core::fmt::Debug for SwaggerSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwaggerSettings")
            .field("enabled", &self.enabled)
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "staging" => Some(Environment::Staging),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingSettings {
    pub environment: Environment,
    pub bind_address: SocketAddr,
    /// HTTPS redirection is only active when this is set.
    pub https_port: Option<u16>,
    pub web_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub app: AppSettings,
    pub swagger: SwaggerSettings,
    pub hosting: HostingSettings,
    pub sql_connection: String,
}

const APP_NAME: &str = "APPSETTINGS__APPLICATIONNAME";
const APP_DESCRIPTION: &str = "APPSETTINGS__APPLICATIONDESCRIPTION";
const APP_COMMAND_TIMEOUT: &str = "APPSETTINGS__COMMANDTIMEOUT";
const APP_MAX_RETRY_COUNT: &str = "APPSETTINGS__MAXRETRYCOUNT";
const APP_MAX_RETRY_DELAY: &str = "APPSETTINGS__MAXRETRYDELAY";
const APP_SUPPORTED_CULTURES: &str = "APPSETTINGS__SUPPORTEDCULTURES";
const SWAGGER_ENABLED: &str = "SWAGGERSETTINGS__ENABLED";
const SWAGGER_USER_NAME: &str = "SWAGGERSETTINGS__USERNAME";
const SWAGGER_PASSWORD: &str = "SWAGGERSETTINGS__PASSWORD";
const SQL_CONNECTION: &str = "CONNECTIONSTRINGS__SQLCONNECTION";
const ENVIRONMENT: &str = "APP_ENVIRONMENT";
const BIND_ADDRESS: &str = "APP_BIND_ADDRESS";
const HTTPS_PORT: &str = "APP_HTTPS_PORT";
const WEB_ROOT: &str = "APP_WEB_ROOT";

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, SettingsError> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app = AppSettings {
            application_name: get(APP_NAME).unwrap_or_else(|| "Labor".to_string()),
            application_description: get(APP_DESCRIPTION).unwrap_or_default(),
            command_timeout: get(APP_COMMAND_TIMEOUT)
                .map(|v| parse_seconds(APP_COMMAND_TIMEOUT, &v))
                .transpose()?
                .unwrap_or(Duration::from_secs(30)),
            max_retry_count: get(APP_MAX_RETRY_COUNT)
                .map(|v| {
                    v.trim()
                        .parse::<u32>()
                        .map_err(|e| invalid(APP_MAX_RETRY_COUNT, e.to_string()))
                })
                .transpose()?
                .unwrap_or(3),
            max_retry_delay: get(APP_MAX_RETRY_DELAY)
                .map(|v| parse_duration(APP_MAX_RETRY_DELAY, &v))
                .transpose()?
                .unwrap_or(Duration::from_secs(10)),
            supported_cultures: match get(APP_SUPPORTED_CULTURES) {
                Some(v) => parse_cultures(&v)?,
                None => vec!["en".to_string()],
            },
        };

        let swagger = SwaggerSettings {
            enabled: get(SWAGGER_ENABLED)
                .map(|v| parse_bool(SWAGGER_ENABLED, &v))
                .transpose()?
                .unwrap_or(false),
            user_name: get(SWAGGER_USER_NAME),
            password: get(SWAGGER_PASSWORD),
        };

        let hosting = HostingSettings {
            environment: match get(ENVIRONMENT) {
                Some(v) => Environment::parse(&v)
                    .ok_or_else(|| invalid(ENVIRONMENT, format!("unknown environment {v:?}")))?,
                None => Environment::Production,
            },
            bind_address: get(BIND_ADDRESS)
                .map(|v| {
                    v.trim()
                        .parse::<SocketAddr>()
                        .map_err(|e| invalid(BIND_ADDRESS, e.to_string()))
                })
                .transpose()?
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080))),
            https_port: get(HTTPS_PORT)
                .map(|v| {
                    v.trim()
                        .parse::<u16>()
                        .map_err(|e| invalid(HTTPS_PORT, e.to_string()))
                })
                .transpose()?,
            web_root: get(WEB_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("wwwroot")),
        };

        let sql_connection = get(SQL_CONNECTION).ok_or(SettingsError::Missing(SQL_CONNECTION))?;

        Ok(Self {
            app,
            swagger,
            hosting,
            sql_connection,
        })
    }

    /// Parameters passed unchanged to the data-access layer.
    pub fn data_access_options(&self) -> DataAccessOptions {
        DataAccessOptions::new(
            self.app.command_timeout,
            self.app.max_retry_count,
            self.app.max_retry_delay,
        )
    }
}

fn parse_seconds(key: &'static str, value: &str) -> Result<Duration, SettingsError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| invalid(key, e.to_string()))
}

/// Accepts whole seconds (`10`) or a clock span (`00:00:10`, `1:30`).
fn parse_duration(key: &'static str, value: &str) -> Result<Duration, SettingsError> {
    let value = value.trim();
    if !value.contains(':') {
        return parse_seconds(key, value);
    }

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid(key, format!("expected hh:mm:ss, got {value:?}")));
    }
    let mut secs = 0u64;
    for part in parts {
        let n = part
            .parse::<u64>()
            .map_err(|_| invalid(key, format!("expected hh:mm:ss, got {value:?}")))?;
        secs = secs
            .checked_mul(60)
            .and_then(|s| s.checked_add(n))
            .ok_or_else(|| invalid(key, format!("duration {value:?} is too large")))?;
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(invalid(key, format!("expected a boolean, got {other:?}"))),
    }
}

fn parse_cultures(value: &str) -> Result<Vec<String>, SettingsError> {
    let cultures: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if cultures.is_empty() {
        return Err(invalid(APP_SUPPORTED_CULTURES, "at least one culture is required"));
    }
    Ok(cultures)
}
