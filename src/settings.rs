use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::{env, fmt, str::FromStr};
use zeroize::Zeroizing;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_minutes: i64,

    #[serde(default)]
    pub refresh_token_secret: String,

    #[serde(default = "default_refresh_expiration")]
    pub refresh_token_exp_days: i64,

    /// Where contact form notifications are delivered.
    #[serde(default)]
    pub contact_email: String,

    #[serde(default = "default_from_email")]
    pub default_from_email: String,

    /// Transactional mail HTTP endpoint. Mail is only logged when unset.
    #[serde(default)]
    pub mail_api_url: Option<String>,

    #[serde(default)]
    pub mail_api_key: Option<String>,

    #[serde(default = "default_mail_timeout")]
    pub mail_timeout_secs: u64,

    #[serde(default)]
    pub send_confirmation_copy: bool,

    #[serde(default = "default_static_url")]
    pub static_url: String,

    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_max_connections() -> u32 {
    20
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_jwt_expiration() -> i64 {
    15
}
fn default_refresh_expiration() -> i64 {
    7
}
fn default_from_email() -> String {
    "noreply@localhost".to_string()
}
fn default_mail_timeout() -> u64 {
    10
}
fn default_static_url() -> String {
    "/static/".to_string()
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Secrets are frequently injected without the config files
        config.database_url = fill_or_env(config.database_url, "APP_DATABASE_URL")?;
        config.jwt_secret = fill_or_env(config.jwt_secret, "APP_JWT_SECRET")?;
        config.refresh_token_secret = fill_or_env(config.refresh_token_secret, "APP_REFRESH_TOKEN_SECRET")?;

        if config.mail_api_key.is_none() {
            config.mail_api_key = env::var("APP_MAIL_API_KEY").ok();
        }
        if config.is_production() {
            config.secure_cookies = true;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty");
        }
        if self.jwt_secret.len() < 32 {
            errors.push("JWT_SECRET must be at least 32 characters");
        }
        if self.refresh_token_secret.len() < 32 {
            errors.push("REFRESH_TOKEN_SECRET must be at least 32 characters");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.contact_email.trim().is_empty() {
            errors.push("CONTACT_EMAIL cannot be empty");
        }
        if self.mail_timeout_secs == 0 {
            errors.push("MAIL_TIMEOUT_SECS must be greater than zero");
        }
        if self.is_production() && self.mail_api_url.is_none() {
            errors.push("MAIL_API_URL must be set in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Joins a path onto the static prefix, tolerating slashes on either side.
    pub fn static_asset(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.static_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < 32 {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("database_max_connections", &self.database_max_connections)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &self.jwt_secret.redact())
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("refresh_token_secret", &self.refresh_token_secret.redact())
            .field("refresh_token_exp_days", &self.refresh_token_exp_days)
            .field("contact_email", &self.contact_email)
            .field("default_from_email", &self.default_from_email)
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_api_key", &self.mail_api_key.as_deref().map(|k| if k.is_empty() { "[MISSING]" } else { "[REDACTED]" }))
            .field("mail_timeout_secs", &self.mail_timeout_secs)
            .field("send_confirmation_copy", &self.send_confirmation_copy)
            .field("static_url", &self.static_url)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub refresh_encoding: EncodingKey,
    pub refresh_decoding: DecodingKey,
}

impl From<&AppConfig> for JwtKeys {
    fn from(config: &AppConfig) -> Self {
        let jwt_secret = Zeroizing::new(config.jwt_secret.clone());
        let refresh_secret = Zeroizing::new(config.refresh_token_secret.clone());

        JwtKeys {
            encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("encoding", &"[REDACTED]")
            .field("decoding", &"[REDACTED]")
            .field("refresh_encoding", &"[REDACTED]")
            .field("refresh_decoding", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "Portfolio".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/portfolio".into(),
            database_max_connections: 5,
            cors_allowed_origins: vec!["https://a.example, https://b.example".into()],
            jwt_secret: "x".repeat(40),
            jwt_expiration_minutes: 15,
            refresh_token_secret: "y".repeat(40),
            refresh_token_exp_days: 7,
            contact_email: "owner@example.com".into(),
            default_from_email: "noreply@example.com".into(),
            mail_api_url: None,
            mail_api_key: Some("secret-key".into()),
            mail_timeout_secs: 5,
            send_confirmation_copy: false,
            static_url: "/static/".into(),
            secure_cookies: false,
        }
    }

    #[test]
    fn splits_comma_separated_cors_origins() {
        assert_eq!(sample().cors_origins(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn rejects_short_secrets_and_missing_contact_email() {
        let mut config = sample();
        config.jwt_secret = "short".into();
        config.contact_email = " ".into();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("JWT_SECRET"));
        assert!(err.contains("CONTACT_EMAIL"));
    }

    #[test]
    fn production_requires_mail_api_and_explicit_origins() {
        let mut config = sample();
        config.env = AppEnvironment::Production;
        config.cors_allowed_origins = vec!["*".into()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Wildcard CORS"));
        assert!(err.contains("MAIL_API_URL"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("secret-key"));
        assert!(!rendered.contains(&"x".repeat(40)));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn static_asset_joins_without_double_slashes() {
        let config = sample();
        assert_eq!(config.static_asset("/images/a.jpg"), "/static/images/a.jpg");
    }
}
