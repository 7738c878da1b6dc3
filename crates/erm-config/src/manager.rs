//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::{AppConfig, ConfigManager as ConfigManagerTrait},
};

/// Variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "ERM_CONFIG";

/// Config file looked up in the working directory when `ERM_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "erm.toml";

/// Prefix of override variables (`ERM__SERVER__PORT`)
pub const DEFAULT_ENV_PREFIX: &str = "ERM";

/// Configuration manager
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// An explicitly named file must exist
    required: bool,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    ///
    /// Reads the file named by `ERM_CONFIG`, or `./erm.toml` if present.
    pub fn new() -> Self {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::with_path(PathBuf::from(path)),
            None => Self {
                config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
                required: false,
                env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            },
        }
    }

    /// Create with custom config path; the file must exist
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            required: true,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use a different prefix for environment overrides
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl ConfigManagerTrait for ConfigManager {
    fn load_config(&mut self) -> Result<AppConfig> {
        if self.required && !self.config_path.exists() {
            return Err(ConfigError::NotFound(
                self.config_path.display().to_string(),
            ));
        }

        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bootstrap.categories")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        self.validate_config(&app_config)?;

        debug!(path = %self.config_path.display(), "Configuration loaded");
        Ok(app_config)
    }

    fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    fn validate_config(&self, config: &AppConfig) -> Result<()> {
        if config.server.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Server host cannot be empty".to_string(),
            ));
        }
        if config.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Validation(
                "JWT secret cannot be empty".to_string(),
            ));
        }
        if config.auth.token_ttl_hours <= 0 {
            return Err(ConfigError::Validation(
                "Token TTL must be greater than 0".to_string(),
            ));
        }
        if !(4..=31).contains(&config.auth.bcrypt_cost) {
            return Err(ConfigError::Validation(
                "bcrypt cost must be between 4 and 31".to_string(),
            ));
        }
        let pagination = &config.pagination;
        if pagination.max_page_size == 0 {
            return Err(ConfigError::Validation(
                "Max page size must be greater than 0".to_string(),
            ));
        }
        if pagination.default_page_size == 0
            || pagination.default_page_size > pagination.max_page_size
        {
            return Err(ConfigError::Validation(format!(
                "Default page size must be between 1 and {}",
                pagination.max_page_size
            )));
        }
        if config.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Log level cannot be empty".to_string(),
            ));
        }
        if config.bootstrap.organization_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Bootstrap organization name cannot be empty".to_string(),
            ));
        }
        if config.bootstrap.subscription_days == 0 {
            return Err(ConfigError::Validation(
                "Bootstrap subscription must last at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
