//! # Configuration Module
//!
//! Provides configuration management for WikiSEO. Settings come from a
//! TOML file, environment variables and programmatic overrides, applied in
//! that order and validated once at the end.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wikiseo::core::config::ConfigBuilder;
//! use std::path::Path;
//!
//! let config = ConfigBuilder::new()
//!     .with_file(Path::new("seo.toml"))
//!     .with_env_prefix("WIKISEO_")
//!     .with_override("server", "https://wiki.example.org")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.read().site.server, "https://wiki.example.org");
//! ```
//!
//! ## File format
//!
//! ```toml
//! generators = ["breadcrumbs", "searchbox"]
//! breadcrumbs_message = """
//! * Apples @ Food>Fruit>Apples
//! """
//!
//! [site]
//! server = "//wiki.example.org"
//! article_path = "/wiki/$1"
//!
//! [[breadcrumbs]]
//! category = "Fruit"
//! path = "Food>Fruit"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{Result, SeoError};
use crate::generators::search_box::{
    DEFAULT_SEARCH_PAGE, DEFAULT_TYPE, SEARCH_PLACEHOLDER,
};
use crate::generators::{BreadcrumbMap, BreadcrumbMapping, GeneratorKind};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    /// Server and URL layout of the wiki.
    pub site: SiteConfig,

    #[serde(default = "default_generators")]
    /// Generators to run, in order.
    pub generators: Vec<GeneratorKind>,

    #[serde(default)]
    /// Explicit category to breadcrumb path mappings.
    pub breadcrumbs: Vec<BreadcrumbMapping>,

    #[serde(default)]
    /// Mappings in message format, one `* <category> @ <path>` per line.
    /// Explicit `breadcrumbs` entries win over these.
    pub breadcrumbs_message: Option<String>,
}

/// Server and URL layout used to build absolute page URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_server")]
    /// Scheme and host, e.g. `https://wiki.example.org`. A
    /// protocol-relative `//host` takes the scheme of each request.
    pub server: String,

    #[serde(default = "default_article_path")]
    /// Path of article URLs, `$1` standing for the title.
    pub article_path: String,

    #[serde(default = "default_script")]
    /// Path of the script handling URLs with a query string.
    pub script: String,

    #[serde(default = "default_search_page")]
    /// Title of the search page targeted by the search box.
    pub search_page: String,

    #[serde(default = "default_type")]
    /// `@type` of the search box payload when a page sets none.
    pub default_type: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            article_path: default_article_path(),
            script: default_script(),
            search_page: default_search_page(),
            default_type: default_type(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            generators: default_generators(),
            breadcrumbs: Vec::new(),
            breadcrumbs_message: None,
        }
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }

    /// Merges message-format and explicit mappings into one map. Explicit
    /// entries replace message entries for the same category.
    pub fn breadcrumb_map(&self) -> BreadcrumbMap {
        let mut map = self
            .breadcrumbs_message
            .as_deref()
            .map(BreadcrumbMap::from_message)
            .unwrap_or_default();
        map.extend(self.breadcrumbs.iter().cloned());
        map
    }
}

/// Builds a `Config` from a file, the environment and explicit overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: HashMap<String, TomlValue>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file to the builder.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads overrides from environment variables starting with `prefix`,
    /// e.g. `WIKISEO_SERVER` for the `server` key.
    pub fn with_env_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Overrides a single setting.
    ///
    /// Recognised keys are `server`, `article_path`, `script`,
    /// `search_page`, `default_type` and `generators` (comma separated).
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<Arc<RwLock<Config>>> {
        let mut config = if let Some(path) = self.config_file {
            load_from_file(&path)?
        } else {
            Config::default()
        };

        if let Some(prefix) = self.env_prefix {
            apply_env_overrides(&mut config, &prefix)?;
        }

        apply_overrides(&mut config, &self.overrides)?;
        validate_config(&config)?;

        Ok(Arc::new(RwLock::new(config)))
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| SeoError::io_error(path.to_path_buf(), e))?;

    toml::from_str(&content).map_err(|e| {
        SeoError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

/// Keys accepted by `apply_config_value`.
const CONFIG_KEYS: &[&str] = &[
    "server",
    "article_path",
    "script",
    "search_page",
    "default_type",
    "generators",
];

fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    for (key, value) in env::vars() {
        let Some(stripped) = key.strip_prefix(prefix) else {
            continue;
        };
        let config_key = stripped.trim_start_matches('_').to_lowercase();
        if !CONFIG_KEYS.contains(&config_key.as_str()) {
            debug!("Ignoring environment variable {}", key);
            continue;
        }
        debug!("Applying environment override {}", key);
        apply_config_value(config, &config_key, &value)?;
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    overrides: &HashMap<String, TomlValue>,
) -> Result<()> {
    for (key, value) in overrides {
        let value = match value {
            TomlValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        apply_config_value(config, key, &value)?;
    }
    Ok(())
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<()> {
    let site = &mut config.site;
    match key {
        "server" => site.server = value.to_string(),
        "article_path" => site.article_path = value.to_string(),
        "script" => site.script = value.to_string(),
        "search_page" => site.search_page = value.to_string(),
        "default_type" => site.default_type = value.to_string(),
        "generators" => {
            config.generators = value
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(str::parse::<GeneratorKind>)
                .collect::<Result<Vec<_>>>()?;
        }
        _ => {
            return Err(SeoError::config_error(
                format!("Unknown configuration key: {}", key),
                None,
            ));
        }
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    let site = &config.site;

    if site.server.trim().is_empty() {
        return Err(SeoError::config_error("server must be set", None));
    }
    if !site.article_path.contains("$1") {
        return Err(SeoError::config_error(
            format!(
                "article_path must contain `$1`, got '{}'",
                site.article_path
            ),
            None,
        ));
    }
    if !site.script.starts_with('/') {
        return Err(SeoError::config_error(
            format!("script must start with `/`, got '{}'", site.script),
            None,
        ));
    }
    for (name, value) in [
        ("server", &site.server),
        ("script", &site.script),
        ("search_page", &site.search_page),
    ] {
        if value.contains(SEARCH_PLACEHOLDER) {
            return Err(SeoError::config_error(
                format!(
                    "{} must not contain `{}`, got '{}'",
                    name, SEARCH_PLACEHOLDER, value
                ),
                None,
            ));
        }
    }

    Ok(())
}

// Default value functions
fn default_server() -> String {
    "http://localhost".to_string()
}

fn default_article_path() -> String {
    "/wiki/$1".to_string()
}

fn default_script() -> String {
    "/index.php".to_string()
}

fn default_search_page() -> String {
    DEFAULT_SEARCH_PAGE.to_string()
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

fn default_generators() -> Vec<GeneratorKind> {
    GeneratorKind::ALL.to_vec()
}

/// Tests for the configuration module.
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.site.article_path, "/wiki/$1");
        assert_eq!(config.site.search_page, "Special:Search");
        assert_eq!(config.site.default_type, "article");
        assert_eq!(config.generators, GeneratorKind::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("seo.toml");
        fs::write(
            &config_file,
            r#"
generators = ["searchbox"]

[site]
server = "//wiki.example.org"

[[breadcrumbs]]
category = "Fruit"
path = "Food>Fruit"
"#,
        )
        .unwrap();

        let config = load_from_file(&config_file).unwrap();
        assert_eq!(config.site.server, "//wiki.example.org");
        assert_eq!(config.site.script, "/index.php");
        assert_eq!(config.generators, vec![GeneratorKind::SearchBox]);
        assert_eq!(config.breadcrumbs.len(), 1);
    }

    #[test]
    fn test_unparsable_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("seo.toml");
        fs::write(&config_file, "generators = [\"opengraph\"]").unwrap();

        let err = load_from_file(&config_file).unwrap_err();
        assert!(matches!(err, SeoError::ConfigError { path: Some(_), .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigBuilder::new()
            .with_file("does/not/exist.toml")
            .build()
            .unwrap_err();
        assert!(matches!(err, SeoError::IOError { .. }));
    }

    #[test]
    fn test_breadcrumb_map_prefers_explicit_entries() {
        let config = Config {
            breadcrumbs: vec![BreadcrumbMapping {
                category: "Fruit".to_string(),
                path: "Food>Fruit".to_string(),
            }],
            breadcrumbs_message: Some(
                "* Fruit @ Plants>Fruit\n* Tools @ Things>Tools".to_string(),
            ),
            ..Config::default()
        };
        let map = config.breadcrumb_map();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.find_path(&["Fruit".to_string()]),
            Some("Food>Fruit")
        );
    }

    #[test]
    fn test_apply_overrides() {
        let config = ConfigBuilder::new()
            .with_override("server", "https://wiki.example.org")
            .with_override("generators", "breadcrumbs")
            .build()
            .unwrap();
        let config = config.read();
        assert_eq!(config.site.server, "https://wiki.example.org");
        assert_eq!(config.generators, vec![GeneratorKind::Breadcrumbs]);
    }

    #[test]
    fn test_unknown_override_key() {
        let result = ConfigBuilder::new()
            .with_override("minify", true)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_article_path() {
        let result = ConfigBuilder::new()
            .with_override("article_path", "/wiki/")
            .build();
        assert!(matches!(result, Err(SeoError::ConfigError { .. })));
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("SEOTEST_SEARCH_PAGE", "Special:Find");
        let mut config = Config::default();

        apply_env_overrides(&mut config, "SEOTEST").unwrap();
        assert_eq!(config.site.search_page, "Special:Find");
    }

    #[test]
    fn test_env_ignores_unrelated_variables() {
        env::set_var("SEOSTRAY_LOG", "debug");
        env::set_var("SEOSTRAY_SERVER", "https://stray.example.org");
        let config = ConfigBuilder::new()
            .with_env_prefix("SEOSTRAY_")
            .build()
            .unwrap();
        assert_eq!(config.read().site.server, "https://stray.example.org");
    }

    #[test]
    fn test_layers_apply_file_then_env_then_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("seo.toml");
        fs::write(
            &config_file,
            "[site]\nserver = \"https://file.example.org\"\nscript = \"/w/index.php\"\n",
        )
        .unwrap();
        env::set_var("SEOLAYER_SERVER", "https://env.example.org");
        env::set_var("SEOLAYER_SEARCH_PAGE", "Special:Find");

        let config = ConfigBuilder::new()
            .with_file(&config_file)
            .with_env_prefix("SEOLAYER_")
            .with_override("server", "https://override.example.org")
            .build()
            .unwrap();
        let config = config.read();
        assert_eq!(config.site.server, "https://override.example.org");
        assert_eq!(config.site.search_page, "Special:Find");
        assert_eq!(config.site.script, "/w/index.php");
    }

    #[test]
    fn test_search_page_with_placeholder_is_rejected() {
        let result = ConfigBuilder::new()
            .with_override("search_page", "Special:Mysearch_term")
            .build();
        assert!(matches!(result, Err(SeoError::ConfigError { .. })));
    }
}
