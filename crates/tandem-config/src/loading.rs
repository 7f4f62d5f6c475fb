//! Config file loading.
//!
//! Sources are layered with figment, lowest priority first:
//! defaults < `tandem.config.json` < `TANDEM_*` environment variables.
//! CLI flags (mode, config path, port) are applied by the caller on top of
//! the extracted value.

use crate::error::{ConfigError, Result};
use crate::mode::BuildMode;
use crate::registry::OutputFormat;
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tandem.config.json";

/// Raw per-target configuration as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    /// Unique target identifier
    pub id: String,
    /// Crate directory, relative to the project root
    pub source_dir: PathBuf,
    /// Loading contract of the emitted artifact
    pub format: OutputFormat,
    /// Extra flags passed verbatim to the native compiler
    #[serde(default)]
    pub extra_flags: Vec<String>,
    /// Additional directories that trigger recompilation on change
    #[serde(default)]
    pub watch_paths: Vec<PathBuf>,
}

/// UI bundling pass configuration (external collaborator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Entry script handed to the bundler
    pub entry: PathBuf,
    /// Stylesheet entry, if any
    #[serde(default)]
    pub style_entry: Option<PathBuf>,
    /// Bundler command as argv; tandem appends mode-derived flags
    pub bundler: Vec<String>,
    /// Source tree whose changes trigger a UI rebundle
    #[serde(default = "default_ui_source_dir")]
    pub source_dir: PathBuf,
}

fn default_ui_source_dir() -> PathBuf {
    PathBuf::from("www")
}

/// Static asset pass-through configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetConfig {
    /// Directories copied verbatim (styles, fonts, HTML) into the output dir
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// Development-mode settings (watch + dev server).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevSettings {
    /// Dev server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Debounce window for filesystem events, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Patterns ignored by the file watcher
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,
}

fn default_port() -> u16 {
    9000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_watch_ignore() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".git".to_string(),
        "dist".to_string(),
        "target".to_string(),
        "pkg".to_string(),
        "*.log".to_string(),
        ".DS_Store".to_string(),
    ]
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            watch_ignore: default_watch_ignore(),
        }
    }
}

/// Top-level tandem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TandemConfig {
    /// Native compilation targets
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// UI bundling pass, if the project has one
    #[serde(default)]
    pub ui: Option<UiConfig>,
    /// Static asset roots
    #[serde(default)]
    pub assets: AssetConfig,
    /// Output directory for the assembled bundle
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Default build mode when the CLI does not pass one
    #[serde(default)]
    pub mode: BuildMode,
    /// Development-mode settings
    #[serde(default)]
    pub dev: DevSettings,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl TandemConfig {
    /// Load configuration from layered sources.
    ///
    /// Priority: environment variables > config file > defaults. An explicit
    /// `config_path` must exist; the default `tandem.config.json` is merged
    /// only when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit path and
    /// [`ConfigError::Invalid`] when extraction fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        let config_file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = Path::new(CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // TANDEM_DEV_PORT, TANDEM_MODE, etc. Multi-word field names need an
        // explicit mapping: a plain underscore split would turn
        // TANDEM_OUT_DIR into the nested key `out.dir`.
        figment = figment.merge(
            Env::prefixed("TANDEM_")
                .map(|key| match key.as_str() {
                    "out_dir" => "outDir".into(),
                    "dev_debounce_ms" => "dev_debounceMs".into(),
                    "dev_watch_ignore" => "dev_watchIgnore".into(),
                    other => other.to_string().into(),
                })
                .split("_"),
        );

        figment.extract().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// Default configuration values.
    pub fn default_config() -> Self {
        Self {
            targets: vec![],
            ui: None,
            assets: AssetConfig::default(),
            out_dir: default_out_dir(),
            mode: BuildMode::default(),
            dev: DevSettings::default(),
        }
    }

    /// Resolve the output directory against a project root.
    pub fn resolved_out_dir(&self, root: &Path) -> PathBuf {
        if self.out_dir.is_absolute() {
            self.out_dir.clone()
        } else {
            root.join(&self.out_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_missing_explicit_path() {
        let err = TandemConfig::load(Some(Path::new("/no/such/config.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_parses_targets() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tandem.config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "targets": [
                    {{"id": "app", "sourceDir": "client/bin/app", "format": "module"}},
                    {{"id": "worker", "sourceDir": "client/bin/native_worker", "format": "global",
                      "extraFlags": ["--no-typescript"], "watchPaths": ["client/src"]}}
                ],
                "outDir": "dist",
                "dev": {{"port": 9000, "debounceMs": 250}}
            }}"#
        )
        .unwrap();

        let config = TandemConfig::load(Some(&path)).unwrap();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].id, "app");
        assert_eq!(config.targets[0].format, OutputFormat::Module);
        assert_eq!(config.targets[1].format, OutputFormat::Global);
        assert_eq!(config.targets[1].extra_flags, vec!["--no-typescript"]);
        assert_eq!(config.dev.port, 9000);
        assert_eq!(config.dev.debounce_ms, 250);
    }

    #[test]
    fn test_defaults_applied() {
        let config = TandemConfig::default_config();
        assert_eq!(config.out_dir, PathBuf::from("dist"));
        assert_eq!(config.dev.port, 9000);
        assert_eq!(config.dev.debounce_ms, 300);
        assert_eq!(config.mode, BuildMode::Development);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_env_overrides_single_and_multi_word_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TANDEM_DEV_PORT", "9100");
            jail.set_env("TANDEM_OUT_DIR", "public");
            jail.set_env("TANDEM_DEV_DEBOUNCE_MS", "150");

            let config = TandemConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.dev.port, 9100);
            assert_eq!(config.out_dir, PathBuf::from("public"));
            assert_eq!(config.dev.debounce_ms, 150);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_json_reports_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tandem.config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = TandemConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_resolved_out_dir() {
        let config = TandemConfig::default_config();
        assert_eq!(
            config.resolved_out_dir(Path::new("/project")),
            PathBuf::from("/project/dist")
        );
    }
}
