//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::infra::postgres;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Localization configuration.
    pub i18n: I18n,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,

    /// Mode the server runs in, reported by the ping endpoint.
    #[default("debug".to_owned())]
    pub run_mode: String,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// `*` allows any origin.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Postgres configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Postgres {
    /// Primary database, serving writes.
    pub primary: Connection,

    /// Replica database, serving reads.
    pub replica: Connection,
}

impl From<Postgres> for postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres { primary, replica } = value;

        Self {
            primary: primary.into(),
            replica: replica.into(),
        }
    }
}

/// Postgres connection pool configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Connection {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum number of open connections in the pool.
    #[default(10)]
    pub max_connections: usize,

    /// Maximum time to wait for a free connection.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub wait_timeout: time::Duration,
}

impl From<Connection> for postgres::PoolConfig {
    fn from(value: Connection) -> Self {
        let Connection {
            host,
            port,
            user,
            password,
            dbname,
            max_connections,
            wait_timeout,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            pool: Some(postgres::PoolLimits {
                max_size: max_connections,
                timeouts: postgres::Timeouts {
                    wait: Some(wait_timeout),
                    ..postgres::Timeouts::default()
                },
                ..postgres::PoolLimits::default()
            }),
            ..Self::default()
        }
    }
}

/// Localization configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct I18n {
    /// Path to the JSON catalog of translated messages.
    #[default("lang.json".to_owned())]
    pub path: String,

    /// Locale used when the requested one has no translation.
    #[default("en".to_owned())]
    pub main_locale: String,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
