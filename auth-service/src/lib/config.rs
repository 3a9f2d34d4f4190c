use std::env;

use auth::KindSecrets;
use auth::TokenLifetimes;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Marks refresh cookies `Secure`.
    #[serde(default)]
    pub production: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub user_access_secret: String,
    pub user_refresh_secret: String,
    pub admin_access_secret: String,
    pub admin_refresh_secret: String,
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
    #[serde(default = "default_remember_me_ttl_days")]
    pub remember_me_ttl_days: i64,
    #[serde(default = "default_reset_ticket_ttl_minutes")]
    pub reset_ticket_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OtpConfig {
    #[serde(default = "default_otp_ttl_minutes")]
    pub ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// When false, messages are logged instead of sent.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default = "default_bootstrap_role")]
    pub role: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_ttl_minutes() -> i64 {
    15
}

fn default_refresh_token_ttl_days() -> i64 {
    7
}

fn default_remember_me_ttl_days() -> i64 {
    30
}

fn default_reset_ticket_ttl_minutes() -> i64 {
    10
}

fn default_otp_ttl_minutes() -> i64 {
    10
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "News Marketplace".to_string()
}

fn default_bootstrap_role() -> String {
    "super_admin".to_string()
}

impl JwtConfig {
    pub fn user_secrets(&self) -> KindSecrets<'_> {
        KindSecrets {
            access: self.user_access_secret.as_bytes(),
            refresh: self.user_refresh_secret.as_bytes(),
        }
    }

    pub fn admin_secrets(&self) -> KindSecrets<'_> {
        KindSecrets {
            access: self.admin_access_secret.as_bytes(),
            refresh: self.admin_refresh_secret.as_bytes(),
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: chrono::Duration::minutes(self.access_token_ttl_minutes),
            refresh: chrono::Duration::days(self.refresh_token_ttl_days),
            remember_me: chrono::Duration::days(self.remember_me_ttl_days),
            reset_ticket: chrono::Duration::minutes(self.reset_ticket_ttl_minutes),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__USER_ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__ADMIN_ACCESS_SECRET=... overrides jwt.admin_access_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the two principal kinds
    /// interchangeable.
    fn validate(&self) -> Result<(), ConfigError> {
        let secrets = [
            &self.jwt.user_access_secret,
            &self.jwt.user_refresh_secret,
            &self.jwt.admin_access_secret,
            &self.jwt.admin_refresh_secret,
        ];

        if secrets.iter().any(|secret| secret.len() < 32) {
            return Err(ConfigError::Message(
                "JWT secrets must be at least 32 bytes".to_string(),
            ));
        }

        for (i, a) in secrets.iter().enumerate() {
            if secrets[i + 1..].contains(a) {
                return Err(ConfigError::Message(
                    "JWT secrets must be distinct".to_string(),
                ));
            }
        }

        if self.email.enabled && (self.email.smtp_host.is_empty() || self.email.from_email.is_empty()) {
            return Err(ConfigError::Message(
                "email.smtp_host and email.from_email are required when email is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                http_port: 3000,
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/marketplace".to_string(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                user_access_secret: "user-access-secret-at-least-32-bytes!!".to_string(),
                user_refresh_secret: "user-refresh-secret-at-least-32-bytes!".to_string(),
                admin_access_secret: "admin-access-secret-at-least-32-bytes!".to_string(),
                admin_refresh_secret: "admin-refresh-secret-at-least-32-bytes".to_string(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 7,
                remember_me_ttl_days: 30,
                reset_ticket_ttl_minutes: 10,
            },
            otp: OtpConfig { ttl_minutes: 10 },
            email: EmailConfig {
                enabled: false,
                smtp_host: String::new(),
                smtp_port: 587,
                username: String::new(),
                password: String::new(),
                from_email: String::new(),
                from_name: "News Marketplace".to_string(),
            },
            bootstrap_admin: None,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut config = config();
        config.jwt.admin_access_secret = config.jwt.user_access_secret.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = config();
        config.jwt.user_refresh_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_email_needs_relay() {
        let mut config = config();
        config.email.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifetimes_from_config() {
        let lifetimes = config().jwt.lifetimes();
        assert_eq!(lifetimes, TokenLifetimes::default());
    }
}
