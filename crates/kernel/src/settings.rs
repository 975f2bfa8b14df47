use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHELF";

/// HS256 keys shorter than this are rejected at startup.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay
    /// and `BOOKSHELF_<SECTION>__<KEY>` variables, then validate it.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{environment}.toml"));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // Override environment field with parsed enum variant.
        settings.environment = match environment.as_str() {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(anyhow!(
                    "unsupported environment '{}'; expected local/staging/production",
                    other
                ));
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.auth.signing_key()?;
        if self.auth.min_password_length == 0 {
            bail!("auth.min_password_length must be at least 1");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default = "ServerSettings::default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    fn default_cors_origins() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "http://localhost:3001".to_string(),
        ]
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            cors_origins: Self::default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://library.db".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info,sqlx=warn".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing key. Required.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "AuthSettings::default_min_password_length")]
    pub min_password_length: usize,
}

impl AuthSettings {
    fn default_min_password_length() -> usize {
        6
    }

    /// The configured signing key, or an error when it is missing or too short.
    pub fn signing_key(&self) -> anyhow::Result<&str> {
        let secret = self
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("auth.jwt_secret is not set; provide it via BOOKSHELF_AUTH__JWT_SECRET")
            })?;

        if secret.len() < MIN_JWT_SECRET_LEN {
            bail!(
                "auth.jwt_secret must be at least {} bytes, got {}",
                MIN_JWT_SECRET_LEN,
                secret.len()
            );
        }
        Ok(secret)
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            min_password_length: Self::default_min_password_length(),
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = Some(secret.to_string());
        settings
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_database_is_local_sqlite_file() {
        let settings = Settings::default();
        assert_eq!(settings.database.url, "sqlite://library.db");
    }

    #[test]
    fn missing_secret_fails_validation() {
        let err = Settings::default().validate().unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn blank_secret_fails_validation() {
        assert!(with_secret("   ").validate().is_err());
    }

    #[test]
    fn short_secret_fails_validation() {
        let err = with_secret("super_secret_key_12345").validate().unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn long_secret_passes_validation() {
        let settings = with_secret("0123456789abcdef0123456789abcdef");
        settings.validate().unwrap();
        assert_eq!(
            settings.auth.signing_key().unwrap(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let settings = with_secret("0123456789abcdef0123456789abcdef");
        let rendered = format!("{:?}", settings.auth);
        assert!(!rendered.contains("0123456789abcdef"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn default_password_floor_matches_client_rule() {
        assert_eq!(Settings::default().auth.min_password_length, 6);
    }
}
