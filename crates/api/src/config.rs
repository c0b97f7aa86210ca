use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub limits: LimitsConfig,
    /// Organizational policy: timezone, semester layout, lockouts.
    pub fellowship: FellowshipConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    /// Email service configuration
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum records accepted in one offline sync batch.
    #[serde(default = "default_max_sync_batch")]
    pub max_sync_batch: usize,

    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,

    #[serde(default = "default_event_list_limit")]
    pub event_list_limit: i64,
}

/// Domain policy constants. These are configuration because they encode
/// organizational decisions, not incidental implementation detail.
#[derive(Debug, Clone, Deserialize)]
pub struct FellowshipConfig {
    /// Hours east of UTC for event scheduling (EAT = 3).
    #[serde(default = "default_tz_offset_hours")]
    pub tz_offset_hours: i32,

    /// Semesters per academic year.
    #[serde(default = "default_semesters_per_year")]
    pub semesters_per_year: i32,

    /// Three-letter prefix for issued fellowship numbers.
    #[serde(default = "default_number_prefix")]
    pub number_prefix: String,

    /// Failed logins before the lockout window opens.
    #[serde(default = "default_lockout_threshold")]
    pub lockout_threshold: i32,

    /// Length of the lockout window in minutes.
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,

    /// Interval of the expired-tag sweep job in minutes.
    #[serde(default = "default_tag_sweep_interval")]
    pub tag_sweep_interval_minutes: u64,
}

impl Default for FellowshipConfig {
    fn default() -> Self {
        Self {
            tz_offset_hours: default_tz_offset_hours(),
            semesters_per_year: default_semesters_per_year(),
            number_prefix: default_number_prefix(),
            lockout_threshold: default_lockout_threshold(),
            lockout_minutes: default_lockout_minutes(),
            tag_sweep_interval_minutes: default_tag_sweep_interval(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    100
}
fn default_max_sync_batch() -> usize {
    1000
}
fn default_page_size() -> i64 {
    50
}
fn default_max_page_size() -> i64 {
    200
}
fn default_event_list_limit() -> i64 {
    100
}
fn default_tz_offset_hours() -> i32 {
    3
}
fn default_semesters_per_year() -> i32 {
    2
}
fn default_number_prefix() -> String {
    "FSM".to_string()
}
fn default_lockout_threshold() -> i32 {
    5
}
fn default_lockout_minutes() -> i64 {
    15
}
fn default_tag_sweep_interval() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA private key in PEM format for signing tokens
    pub private_key: String,

    /// RSA public key in PEM format for verifying tokens
    pub public_key: String,

    /// Access token expiration in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    /// Refresh token expiration in seconds (default: 2592000 = 30 days)
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_refresh_token_expiry() -> i64 {
    2592000
}

fn default_jwt_leeway() -> u64 {
    30
}

/// Email service configuration for the welcome mail sent on approval.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether email sending is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: sendgrid, or console (for development)
    #[serde(default = "default_email_provider")]
    pub provider: String,

    /// SendGrid API key (for sendgrid provider)
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Base URL for links in email bodies
    #[serde(default)]
    pub base_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            sendgrid_api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            base_url: String::new(),
        }
    }
}

fn default_email_provider() -> String {
    "console".to_string()
}

fn default_sender_email() -> String {
    "noreply@fellowshipmanager.app".to_string()
}

fn default_sender_name() -> String {
    "Fellowship Manager".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with FM__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides, without
    /// touching the filesystem.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://test"

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 100

            [limits]

            [fellowship]

            [jwt]
            private_key = "test"
            public_key = "test"
        "#;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            defaults,
            config::FileFormat::Toml,
        ));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Sanity-check cross-field constraints at startup.
    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must be set".into());
        }
        if self.fellowship.number_prefix.len() != 3
            || !self
                .fellowship
                .number_prefix
                .chars()
                .all(|c| c.is_ascii_uppercase())
        {
            return Err("fellowship.number_prefix must be 3 uppercase letters".into());
        }
        if self.fellowship.semesters_per_year < 1 {
            return Err("fellowship.semesters_per_year must be at least 1".into());
        }
        if !(-12..=14).contains(&self.fellowship.tz_offset_hours) {
            return Err("fellowship.tz_offset_hours must be a valid UTC offset".into());
        }
        Ok(())
    }

    /// Socket address for the HTTP listener.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("invalid server.host/server.port configuration")
    }

    /// Database pool configuration for the persistence layer.
    pub fn database_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            connect_timeout_secs: self.database.connect_timeout_secs,
            idle_timeout_secs: self.database.idle_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = Config::load_for_test(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.fellowship.tz_offset_hours, 3);
        assert_eq!(config.fellowship.semesters_per_year, 2);
        assert_eq!(config.fellowship.number_prefix, "FSM");
        assert_eq!(config.limits.max_sync_batch, 1000);
        assert!(!config.email.enabled);
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::load_for_test(&[
            ("fellowship.tz_offset_hours", "0"),
            ("fellowship.number_prefix", "ABC"),
            ("server.port", "9999"),
        ])
        .unwrap();
        assert_eq!(config.fellowship.tz_offset_hours, 0);
        assert_eq!(config.fellowship.number_prefix, "ABC");
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let config = Config::load_for_test(&[("fellowship.number_prefix", "abcd")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_database_url() {
        let config = Config::load_for_test(&[("database.url", "")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let config = Config::load_for_test(&[]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[]).unwrap();
        assert_eq!(config.socket_addr().port(), 8080);
    }
}
