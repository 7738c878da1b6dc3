//! ERM Configuration
//!
//! Typed configuration for the ERM API server, loaded from an optional TOML
//! file layered under `ERM__*` environment variables, then validated.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [auth]
//! jwt_secret = "..."
//! token_ttl_hours = 24
//! ```
//!
//! Any key can be overridden from the environment, e.g.
//! `ERM__SERVER__PORT=9000` or `ERM__AUTH__JWT_SECRET=...`.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{
    AppConfig, AuthConfig, BootstrapConfig, ConfigManager as ConfigManagerTrait, LoggingConfig,
    PaginationConfig, SchedulerConfig, ServerConfig,
};
