//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Debug, Display, Error};
use http::{
    header::{self, InvalidHeaderValue},
    HeaderValue, Method,
};
use serde::Deserialize;
use smart_default::SmartDefault;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Uploaded documents storage configuration.
    pub storage: Storage,

    /// Postgres configuration.
    pub postgres: Postgres,

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

    /// Builds the [`service::Config`] out of this [`Config`].
    #[must_use]
    pub fn service(&self) -> service::Config {
        let Service {
            jwt_secret,
            session_ttl,
            tasks: Tasks {
                clean_revoked_sessions,
            },
        } = &self.service;
        service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            session_ttl: *session_ttl,
            max_document_size: self.storage.max_document_size,
            clean_revoked_sessions:
                service::task::clean_revoked_sessions::Config {
                    interval: clean_revoked_sessions.interval,
                },
        }
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
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

impl Cors {
    /// Builds the [`CorsLayer`] allowing the web client at the configured
    /// [`Cors::origins`] to call the GraphQL API and to post registration
    /// forms.
    ///
    /// # Errors
    ///
    /// With the first origin not being a valid header value.
    pub fn layer(&self) -> Result<CorsLayer, InvalidOrigin> {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

        if self.origins.iter().any(|o| o == "*") {
            return Ok(cors.allow_origin(AllowOrigin::any()));
        }
        let origins = self
            .origins
            .iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| InvalidOrigin {
                    origin: origin.clone(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cors.allow_origin(AllowOrigin::list(origins)))
    }
}

/// [`Cors::origins`] entry which is not a valid header value.
#[derive(Debug, Display, Error)]
#[display("`{origin}` is not a valid CORS origin: {source}")]
pub struct InvalidOrigin {
    /// Configured origin.
    pub origin: String,

    /// Parsing error.
    pub source: InvalidHeaderValue,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[debug(skip)]
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Lifetime of a signed-in session.
    #[default(time::Duration::from_secs(30 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `CleanRevokedSessions` task configuration.
    pub clean_revoked_sessions: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

/// Uploaded documents storage configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Directory the uploaded documents are stored in.
    #[default(PathBuf::from("storage"))]
    pub root: PathBuf,

    /// Public base URL the stored documents are served from.
    #[default("http://localhost:8080/storage".to_owned())]
    pub public_url: String,

    /// Maximum size of a single uploaded document, in bytes.
    #[default(service::domain::Document::MAX_SIZE)]
    pub max_document_size: usize,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
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
    #[debug(skip)]
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
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

#[cfg(test)]
mod spec {
    use super::Cors;

    #[test]
    fn builds_layer_for_valid_origins() {
        let cors = Cors {
            origins: vec![
                "https://dirija.ja".to_owned(),
                "http://localhost:5173".to_owned(),
            ],
        };

        assert!(cors.layer().is_ok());
        assert!(Cors::default().layer().is_ok());
    }

    #[test]
    fn reports_invalid_origin() {
        let cors = Cors {
            origins: vec![
                "https://dirija.ja".to_owned(),
                "bad\norigin".to_owned(),
            ],
        };

        let err = cors.layer().unwrap_err();
        assert_eq!(err.origin, "bad\norigin");
    }
}
