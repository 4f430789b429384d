// src/config/mod.rs

//! Layered configuration for the storefront
//!
//! Settings are merged from several layers, lowest priority first:
//! - built-in defaults
//! - a configuration file (YAML, JSON or TOML, chosen by extension)
//! - environment variables (`STOREFRONT_API__PAGE_SIZE=40`)
//! - in-memory overrides (command line flags, tests)

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{Error, ErrorKind, Result};

pub const ENV_PREFIX: &str = "STOREFRONT";
pub const DEFAULT_BASE_URL: &str = "https://next-ecommerce-api.vercel.app";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Separates nesting levels in environment variable names
const ENV_NESTING: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl ValidationError {
    fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error for '{}': {}", self.key, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn parse(self, content: &str) -> Result<Value> {
        match self {
            Self::Json => serde_json::from_str(content)
                .map_err(|e| Error::config(format!("Failed to parse JSON config: {}", e))),
            Self::Yaml => serde_yaml::from_str(content)
                .map_err(|e| Error::config(format!("Failed to parse YAML config: {}", e))),
            Self::Toml => toml::from_str(content)
                .map_err(|e| Error::config(format!("Failed to parse TOML config: {}", e))),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigSource {
    File { path: PathBuf, format: ConfigFormat },
    Environment { prefix: String },
    Memory { data: Value },
}

#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub name: String,
    pub source: ConfigSource,
    pub priority: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

impl StorefrontConfig {
    /// Checks the settings the catalog client depends on
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let base_url = self.api.base_url.trim();

        if base_url.is_empty() {
            errors.push(ValidationError::new("api.base_url", "must not be empty"));
        } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ValidationError::new(
                "api.base_url",
                format!("'{}' is not an http(s) URL", base_url),
            ));
        }

        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError::new(
                "api.page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        if self.api.timeout_ms == 0 {
            errors.push(ValidationError::new("api.timeout_ms", "must be greater than zero"));
        }

        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub debug: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "Storefront".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            debug: cfg!(debug_assertions),
        }
    }
}

/// Upstream catalog settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
    pub timeout_ms: u64,
    /// Lifetime of cached responses; 0 disables the cache
    pub cache_ttl_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_ms: 10_000,
            cache_ttl_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub console: ConsoleLogConfig,
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            console: ConsoleLogConfig::default(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleLogConfig {
    pub enabled: bool,
    pub colored: bool,
}

impl Default for ConsoleLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// Daily-rolling log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            file_prefix: "storefront.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    /// Shown in the gallery when a product has no images
    pub placeholder_image: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Storefront".to_string(),
            placeholder_image: "https://placehold.co/600x600?text=No+Image".to_string(),
        }
    }
}

/// First existing `config.{toml,yaml,json}` under the user's config directory
#[cfg(not(target_arch = "wasm32"))]
pub fn default_config_path() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("storefront");
    ["config.toml", "config.yaml", "config.json"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(target_arch = "wasm32")]
pub fn default_config_path() -> Option<PathBuf> {
    None
}

pub struct ConfigManager {
    layers: Vec<ConfigLayer>,
    merged_config: Arc<RwLock<Value>>,
    env_prefix: String,
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("layers", &self.layers.len())
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            merged_config: Arc::new(RwLock::new(Value::Object(Map::new()))),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Standard layering: `config_path` (or the default file, if any),
    /// then the environment. Loaded and validated.
    pub fn standard(config_path: Option<&Path>) -> Result<Self> {
        let mut manager = Self::new();

        match config_path {
            Some(path) => manager.add_file_layer("file", path, 10)?,
            None => {
                if let Some(path) = default_config_path() {
                    tracing::debug!(path = %path.display(), "using default config file");
                    manager.add_file_layer("file", path, 10)?;
                }
            }
        }

        let env_prefix = manager.env_prefix.clone();
        manager.add_env_layer("environment", env_prefix, 100);
        manager.load()?;

        Ok(manager)
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn add_file_layer<P: AsRef<Path>>(
        &mut self,
        name: impl Into<String>,
        path: P,
        priority: u32,
    ) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let format = ConfigFormat::from_extension(&path).ok_or_else(|| {
            Error::config(format!(
                "Unsupported configuration file format: {}",
                path.display()
            ))
        })?;

        self.push_layer(ConfigLayer {
            name: name.into(),
            source: ConfigSource::File { path, format },
            priority,
        });
        Ok(())
    }

    pub fn add_env_layer(&mut self, name: impl Into<String>, prefix: impl Into<String>, priority: u32) {
        self.push_layer(ConfigLayer {
            name: name.into(),
            source: ConfigSource::Environment {
                prefix: prefix.into(),
            },
            priority,
        });
    }

    pub fn add_memory_layer(&mut self, name: impl Into<String>, data: Value, priority: u32) {
        self.push_layer(ConfigLayer {
            name: name.into(),
            source: ConfigSource::Memory { data },
            priority,
        });
    }

    fn push_layer(&mut self, layer: ConfigLayer) {
        self.layers.push(layer);
        self.layers.sort_by_key(|l| l.priority);
    }

    /// Re-reads every layer and rebuilds the merged configuration
    pub fn load(&self) -> Result<()> {
        let mut merged = serde_json::to_value(StorefrontConfig::default())?;

        for layer in &self.layers {
            let layer_config = self.load_layer_config(layer)?;
            tracing::trace!(layer = %layer.name, priority = layer.priority, "merging config layer");
            merge_values(&mut merged, layer_config);
        }

        *self.merged_config.write() = merged;
        Ok(())
    }

    fn load_layer_config(&self, layer: &ConfigLayer) -> Result<Value> {
        match &layer.source {
            #[cfg(not(target_arch = "wasm32"))]
            ConfigSource::File { path, format } => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                format.parse(&content)
            }

            #[cfg(target_arch = "wasm32")]
            ConfigSource::File { .. } => {
                Err(Error::config("File loading not supported in web platform"))
            }

            #[cfg(not(target_arch = "wasm32"))]
            ConfigSource::Environment { prefix } => Ok(env_to_value(prefix, std::env::vars())),

            #[cfg(target_arch = "wasm32")]
            ConfigSource::Environment { .. } => Ok(Value::Object(Map::new())),

            ConfigSource::Memory { data } => Ok(data.clone()),
        }
    }

    /// Reads the value at dotted `key`, e.g. `api.page_size`
    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = get_nested_value(&self.merged_config.read(), key).ok_or_else(|| {
            Error::new(
                ErrorKind::Configuration {
                    key: Some(key.to_string()),
                    validation_errors: vec![format!("Configuration key '{}' not found", key)],
                },
                "Configuration key not found",
            )
        })?;

        serde_json::from_value(value).map_err(|e| {
            Error::new(
                ErrorKind::Configuration {
                    key: Some(key.to_string()),
                    validation_errors: vec![format!("Failed to deserialize config value: {}", e)],
                },
                format!("Failed to deserialize config value: {}", e),
            )
        })
    }

    /// Overrides the value at dotted `key` until the next [`load`](Self::load)
    pub fn set<T>(&self, key: &str, value: T) -> Result<()>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value).map_err(|e| {
            Error::new(
                ErrorKind::Configuration {
                    key: Some(key.to_string()),
                    validation_errors: vec![format!("Failed to serialize config value: {}", e)],
                },
                format!("Failed to serialize config value: {}", e),
            )
        })?;

        set_nested_value(&mut self.merged_config.write(), key, value);
        Ok(())
    }

    /// The merged configuration as typed settings
    pub fn config(&self) -> Result<StorefrontConfig> {
        serde_json::from_value(self.merged_config.read().clone()).map_err(|e| {
            Error::config(format!("Configuration has an invalid shape: {}", e))
                .source("config_manager")
        })
    }

    pub fn validate(&self) -> Result<Vec<ValidationError>> {
        Ok(self.config()?.validate())
    }

    /// The typed configuration, failing when validation reports problems
    pub fn validated_config(&self) -> Result<StorefrontConfig> {
        let config = self.config()?;
        let errors = config.validate();
        if errors.is_empty() {
            return Ok(config);
        }

        Err(Error::new(
            ErrorKind::Configuration {
                key: errors.first().map(|e| e.key.clone()),
                validation_errors: errors.iter().map(ToString::to_string).collect(),
            },
            format!("Configuration is invalid ({} problem(s))", errors.len()),
        )
        .severity(crate::error::ErrorSeverity::High)
        .source("config_manager"))
    }

    pub fn debug_config(&self) -> Value {
        self.merged_config.read().clone()
    }

    pub fn get_metadata(&self) -> Value {
        serde_json::json!({
            "layers": self.layers.iter().map(|l| {
                serde_json::json!({
                    "name": l.name,
                    "priority": l.priority,
                    "source": match &l.source {
                        ConfigSource::File { path, .. } => path.display().to_string(),
                        ConfigSource::Environment { prefix } => format!("env:{}", prefix),
                        ConfigSource::Memory { .. } => "memory".to_string(),
                    }
                })
            }).collect::<Vec<_>>(),
            "env_prefix": self.env_prefix.clone()
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a nested object from `PREFIX_SECTION__KEY=value` variables
pub fn env_to_value<I>(prefix: &str, vars: I) -> Value
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env_config = Map::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(prefix) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('_') else {
            continue;
        };

        let config_key = rest.to_lowercase();
        let nested_keys: Vec<&str> = config_key
            .split(ENV_NESTING)
            .filter(|k| !k.is_empty())
            .collect();
        set_nested_env_value(&mut env_config, &nested_keys, value);
    }

    Value::Object(env_config)
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(&key) {
                    Some(target_value) => merge_values(target_value, source_value),
                    None => {
                        target_map.insert(key, source_value);
                    }
                }
            }
        }
        (target, source) => {
            *target = source;
        }
    }
}

fn get_nested_value(config: &Value, key: &str) -> Option<Value> {
    let mut current = config;
    for k in key.split('.') {
        current = current.get(k)?;
    }
    Some(current.clone())
}

fn set_nested_value(config: &mut Value, key: &str, value: Value) {
    let keys: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut current = config;
    for k in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(k.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

fn set_nested_env_value(config: &mut Map<String, Value>, keys: &[&str], value: String) {
    let Some((first, rest)) = keys.split_first() else {
        return;
    };

    if rest.is_empty() {
        config.insert(first.to_string(), parse_env_scalar(value));
        return;
    }

    let entry = config
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(nested_map) = entry {
        set_nested_env_value(nested_map, rest, value);
    }
}

fn parse_env_scalar(value: String) -> Value {
    if let Ok(bool_val) = value.parse::<bool>() {
        Value::Bool(bool_val)
    } else if let Ok(int_val) = value.parse::<i64>() {
        Value::Number(Number::from(int_val))
    } else if let Some(number) = value.parse::<f64>().ok().and_then(Number::from_f64) {
        Value::Number(number)
    } else {
        Value::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let manager = ConfigManager::new();
        manager.load().unwrap();

        let config = manager.config().unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.api.page_size, 20);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(manager.validate().unwrap().is_empty());
    }

    #[test]
    fn test_yaml_file_layer() {
        let mut temp_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        temp_file
            .write_all(b"api:\n  base_url: \"https://shop.test\"\n  page_size: 40\napp:\n  debug: true\n")
            .unwrap();

        let mut manager = ConfigManager::new();
        manager.add_file_layer("test", temp_file.path(), 0).unwrap();
        manager.load().unwrap();

        let config = manager.config().unwrap();
        assert_eq!(config.api.base_url, "https://shop.test");
        assert_eq!(config.api.page_size, 40);
        assert_eq!(config.api.timeout_ms, 10_000);
        assert!(manager.get::<bool>("app.debug").unwrap());
    }

    #[test]
    fn test_toml_file_layer() {
        let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        temp_file
            .write_all(b"[api]\ncache_ttl_secs = 0\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n")
            .unwrap();

        let mut manager = ConfigManager::new();
        manager.add_file_layer("test", temp_file.path(), 0).unwrap();
        manager.load().unwrap();

        let config = manager.config().unwrap();
        assert_eq!(config.api.cache_ttl_secs, 0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut manager = ConfigManager::new();
        assert!(manager.add_file_layer("test", temp_file.path(), 0).is_err());
    }

    #[test]
    fn test_missing_file_fails_load() {
        let mut manager = ConfigManager::new();
        manager
            .add_file_layer("test", "/nonexistent/storefront.json", 0)
            .unwrap();
        assert!(manager.load().is_err());
    }

    #[test]
    fn test_env_to_value_nesting() {
        let value = env_to_value(
            "STOREFRONT",
            vars(&[
                ("STOREFRONT_API__PAGE_SIZE", "40"),
                ("STOREFRONT_API__BASE_URL", "http://localhost:3000"),
                ("STOREFRONT_APP__DEBUG", "false"),
                ("STOREFRONTX_API__PAGE_SIZE", "1"),
                ("PATH", "/usr/bin"),
            ]),
        );

        assert_eq!(value["api"]["page_size"], 40);
        assert_eq!(value["api"]["base_url"], "http://localhost:3000");
        assert_eq!(value["app"]["debug"], false);
        assert_eq!(value.as_object().map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_environment_layer() {
        std::env::set_var("STOREFRONT_CFGTEST_API__TIMEOUT_MS", "2500");

        let mut manager = ConfigManager::new();
        manager.add_env_layer("env", "STOREFRONT_CFGTEST", 100);
        manager.load().unwrap();

        assert_eq!(manager.get::<u64>("api.timeout_ms").unwrap(), 2500);

        std::env::remove_var("STOREFRONT_CFGTEST_API__TIMEOUT_MS");
    }

    #[test]
    fn test_layer_priority() {
        let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        temp_file
            .write_all(br#"{"api": {"page_size": 30, "timeout_ms": 5000}}"#)
            .unwrap();

        let mut manager = ConfigManager::new();
        manager.add_memory_layer("overrides", serde_json::json!({"api": {"page_size": 50}}), 200);
        manager.add_file_layer("file", temp_file.path(), 10).unwrap();
        manager.load().unwrap();

        let config = manager.config().unwrap();
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.timeout_ms, 5000);
    }

    #[test]
    fn test_set_and_get() {
        let manager = ConfigManager::new();
        manager.load().unwrap();

        manager.set("ui.title", "My Shop").unwrap();
        assert_eq!(manager.get::<String>("ui.title").unwrap(), "My Shop");
        assert!(manager.get::<String>("ui.missing").is_err());
    }

    #[test]
    fn test_validation_rules() {
        let mut config = StorefrontConfig::default();
        config.api.base_url = "ftp://catalog".to_string();
        config.api.page_size = 0;
        config.api.timeout_ms = 0;

        let keys: Vec<String> = config.validate().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["api.base_url", "api.page_size", "api.timeout_ms"]);

        config.api.base_url = "  ".to_string();
        config.api.page_size = MAX_PAGE_SIZE + 1;
        let errors = config.validate();
        assert!(errors[0].message.contains("empty"));
        assert_eq!(errors[1].key, "api.page_size");
    }

    #[test]
    fn test_validated_config_reports_problems() {
        let mut manager = ConfigManager::new();
        manager.add_memory_layer("bad", serde_json::json!({"api": {"page_size": 500}}), 1);
        manager.load().unwrap();

        let error = manager.validated_config().unwrap_err();
        match error.kind {
            ErrorKind::Configuration {
                key,
                validation_errors,
            } => {
                assert_eq!(key.as_deref(), Some("api.page_size"));
                assert_eq!(validation_errors.len(), 1);
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }
}
