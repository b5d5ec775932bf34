//! Configuration Loader
//!
//! Layers, lowest precedence first:
//! 1. [`WorkflowConfig::default`]
//! 2. an optional configuration file (TOML, YAML or JSON, by extension)
//! 3. `SQL_VC__<SECTION>__<KEY>` environment variables
//! 4. `SQL_FOLDER_PATH` and `DATABASE_URL`

use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::WorkflowConfig;
use crate::constants::SQL_FOLDER_ENV_VAR;
use crate::error::{Result, WorkflowError};

const ENV_PREFIX: &str = "SQL_VC";
const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";

#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    /// Replaces the process environment when set
    environment: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read variables from `vars` instead of the process environment
    pub fn with_environment(mut self, vars: HashMap<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> Result<WorkflowConfig> {
        let defaults = Config::try_from(&WorkflowConfig::default())?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(WorkflowError::ConfigurationError(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(self.environment.clone()),
        );

        builder = builder
            .set_override_option(
                "sql.root_folder",
                self.var(SQL_FOLDER_ENV_VAR).filter(|v| !v.is_empty()),
            )?
            .set_override_option(
                "registry.database_url",
                self.var(DATABASE_URL_ENV_VAR).filter(|v| !v.is_empty()),
            )?;

        let config: WorkflowConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            config = %sanitized_json(&config),
            "Configuration loaded"
        );

        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.environment {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

/// JSON view of the configuration with credentials masked
pub fn sanitized_json(config: &WorkflowConfig) -> serde_json::Value {
    let mut value = serde_json::to_value(config).unwrap_or(serde_json::Value::Null);
    sanitize_json_recursive(&mut value, &["token", "password", "secret", "database_url"]);
    value
}

fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                if sensitive_patterns.iter().any(|p| key_lower.contains(p)) {
                    if !val.is_null() {
                        *val = serde_json::Value::String("[MASKED]".to_string());
                    }
                } else {
                    sanitize_json_recursive(val, sensitive_patterns);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                sanitize_json_recursive(item, sensitive_patterns);
            }
        }
        _ => {}
    }
}
