//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! `[engine]` table is handed to `qaforge_adapters::build_engine` as is.
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables, `QAFORGE__<SECTION>__<KEY>`
//!    (e.g. `QAFORGE__ENGINE__TTL_HOURS=2`)
//! 2. The file given with `--config`
//! 3. `./qaforge.toml`
//! 4. The per-user config file ([`AppConfig::config_path`])
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use qaforge_adapters::EngineSettings;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "qaforge.toml";

const ENV_PREFIX: &str = "QAFORGE";
const ENV_SEPARATOR: &str = "__";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generation engine settings.
    pub engine: EngineSettings,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut engine = EngineSettings::default();
        if let Some(dirs) = project_dirs() {
            engine.work_dir = dirs.cache_dir().join("work");
        }
        Self {
            engine,
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, files and the environment.
    ///
    /// `config_file` is the path passed via `--config`; it must exist when
    /// given. The per-user and local files are optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialise built-in defaults")?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(toml_file(&Self::config_path(), false))
            .add_source(toml_file(Path::new(LOCAL_CONFIG_FILE), false));

        if let Some(path) = config_file {
            builder = builder.add_source(toml_file(path, true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the per-user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `./qaforge.toml`.
    pub fn config_path() -> PathBuf {
        project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Look up a dotted key such as `engine.ttl_hours`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let root = serde_json::to_value(self).ok()?;
        key.split('.')
            .try_fold(&root, |node, segment| node.as_object()?.get(segment))
            .filter(|v| !v.is_object())
            .cloned()
    }

    /// Render as TOML, the format `init` writes.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialise configuration")
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "qaforge", "qaforge")
}

fn toml_file(path: &Path, required: bool) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml).required(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.engine.ttl_hours, 24);
        assert_eq!(cfg.engine.packs_dir, PathBuf::from("packs"));
        assert!(cfg.engine.persist_records);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(
            &path,
            "[engine]\nttl_hours = 2\nstrict_pack_mapping = true\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.engine.ttl_hours, 2);
        assert!(cfg.engine.strict_pack_mapping);
        assert_eq!(cfg.engine.sweep_interval_secs, 3600);
        assert_eq!(cfg.output.format, "json");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = PathBuf::from("/definitely/not/here/qaforge.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn get_walks_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("engine.ttl_hours"), Some(Value::from(24)));
        assert_eq!(cfg.get("output.no_color"), Some(Value::Bool(false)));
        assert_eq!(cfg.get("engine"), None);
        assert_eq!(cfg.get("engine.nope"), None);
    }

    #[test]
    fn toml_round_trips_through_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("written.toml");
        let mut cfg = AppConfig::default();
        cfg.engine.ttl_hours = 6;
        std::fs::write(&path, cfg.to_toml().unwrap()).unwrap();

        assert_eq!(AppConfig::load(Some(&path)).unwrap().engine.ttl_hours, 6);
    }
}
