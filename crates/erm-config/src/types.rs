//! Core configuration types and data structures

use serde::{Deserialize, Serialize};

/// Secret used when none is configured; only suitable for local development
pub const DEVELOPMENT_JWT_SECRET: &str = "erm-development-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Token signing and password hashing
    pub auth: AuthConfig,
    /// List endpoint paging
    pub pagination: PaginationConfig,
    /// Log output
    pub logging: LoggingConfig,
    /// Background jobs
    pub scheduler: SchedulerConfig,
    /// Reference data and first administrator created at startup
    pub bootstrap: BootstrapConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
    /// bcrypt work factor (4-31)
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Whether the built-in development secret is still in use
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

/// Pagination limits for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

/// Background job configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between overdue mitigation sweeps; 0 disables the sweep
    pub overdue_sweep_interval_secs: u64,
}

/// Startup seeding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BootstrapConfig {
    pub organization_id: i64,
    /// Used only when the organization does not exist yet
    pub organization_name: String,
    pub organization_industry: String,
    /// Length of the subscription granted to a newly created organization
    pub subscription_days: u32,
    /// Categories created for the organization if missing
    pub categories: Vec<String>,
    pub admin_name: String,
    pub admin_email: String,
    /// No administrator is created when unset
    pub admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            bcrypt_cost: 10,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            overdue_sweep_interval_secs: 3600,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            organization_id: 1,
            organization_name: "Default Organization".to_string(),
            organization_industry: "General".to_string(),
            subscription_days: 365,
            categories: ["Strategic", "Operational", "Financial", "Compliance", "Technology"]
                .into_iter()
                .map(String::from)
                .collect(),
            admin_name: "Administrator".to_string(),
            admin_email: "admin@erm.local".to_string(),
            admin_password: None,
        }
    }
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&mut self) -> Result<AppConfig, crate::error::ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &AppConfig) -> Result<(), crate::error::ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &AppConfig) -> Result<(), crate::error::ConfigError>;
}
