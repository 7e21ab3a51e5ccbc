use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::templates;

/// Status of config file loading
#[derive(Debug, Clone)]
pub enum ConfigLoadStatus {
    /// Config loaded successfully from existing file
    Loaded,
    /// Created default config file (first run)
    Created,
    /// Error occurred during loading, using defaults.
    /// String is used in Debug output for logging.
    #[allow(dead_code)]
    Error(String),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where exported documents go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File path, or `-` to print the document to stdout on exit.
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./PROMPT.md".to_string(),
        }
    }
}

/// Behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// How long the "Copied" indicator stays visible after an export.
    pub copied_flash_ms: u64,
    /// Open the review checklist instead of the editor on startup.
    pub start_in_review: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            copied_flash_ms: 2000,
            start_in_review: false,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

impl Config {
    /// Expand `~` to home directory in a path string
    pub fn expand_tilde(path: &str) -> PathBuf {
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }

    /// Get the expanded output file path
    pub fn output_path(&self) -> PathBuf {
        Self::expand_tilde(&self.output.path)
    }

    /// Whether the document should be printed instead of written to a file
    pub fn output_is_stdout(&self) -> bool {
        self.output.path.trim() == "-"
    }
}

/// Partial logging configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialLoggingConfig {
    pub level: Option<String>,
}

/// Partial output configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialOutputConfig {
    pub path: Option<String>,
}

/// Partial behavior configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialBehaviorConfig {
    pub copied_flash_ms: Option<u64>,
    pub start_in_review: Option<bool>,
}

/// Project-specific configuration where every field is optional.
/// Parsed from `.promptwright` files. Fields that are `None` inherit from the global config.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialConfig {
    pub logging: PartialLoggingConfig,
    pub output: PartialOutputConfig,
    pub behavior: PartialBehaviorConfig,
}

/// Merge a global config with a project-level partial config.
/// Project values override global values where present.
pub fn merge_config(global: &Config, project: &PartialConfig) -> Config {
    Config {
        logging: LoggingConfig {
            level: project
                .logging
                .level
                .clone()
                .unwrap_or_else(|| global.logging.level.clone()),
        },
        output: OutputConfig {
            path: project
                .output
                .path
                .clone()
                .unwrap_or_else(|| global.output.path.clone()),
        },
        behavior: BehaviorConfig {
            copied_flash_ms: project
                .behavior
                .copied_flash_ms
                .unwrap_or(global.behavior.copied_flash_ms),
            start_in_review: project
                .behavior
                .start_in_review
                .unwrap_or(global.behavior.start_in_review),
        },
    }
}

/// Loaded configuration with metadata
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub project_config_path: Option<PathBuf>,
    pub status: ConfigLoadStatus,
}

/// Get the platform-appropriate config directory
fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "promptwright", "promptwright")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the full path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.promptwright in current working directory).
pub fn get_project_config_path() -> Option<PathBuf> {
    let path = std::env::current_dir().ok()?.join(".promptwright");
    if path.exists() { Some(path) } else { None }
}

/// Load a project config (.promptwright) from the given path.
fn load_project_config(path: &Path) -> Result<PartialConfig, String> {
    let contents = fs::read_to_string(path).map_err(|e| {
        warn!(path = ?path, error = %e, "project_config_read_failed");
        format!("Failed to read .promptwright: {}", e)
    })?;

    toml::from_str::<PartialConfig>(&contents).map_err(|e| {
        warn!(path = ?path, error = %e, "project_config_parse_failed");
        format!("Invalid .promptwright: {}", e)
    })
}

/// Load configuration from file, environment, and defaults
pub fn load_config() -> LoadedConfig {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return LoadedConfig {
                config: apply_env_overrides(Config::default()),
                config_path: PathBuf::from("config.toml"),
                project_config_path: None,
                status: ConfigLoadStatus::Error("Could not determine config directory".to_string()),
            };
        }
    };

    debug!("Config path: {:?}", config_path);

    let (mut config, status) = load_or_create_config(&config_path);

    let project_config_path = get_project_config_path();
    if let Some(ref project_path) = project_config_path {
        match load_project_config(project_path) {
            Ok(partial) => {
                config = merge_config(&config, &partial);
                info!(path = ?project_path, "project_config_loaded");
            }
            Err(e) => {
                warn!(path = ?project_path, error = %e, "project_config_error");
            }
        }
    }

    let config = apply_env_overrides(config);

    LoadedConfig {
        config,
        config_path,
        project_config_path,
        status,
    }
}

/// Result of a reload: always a usable config once the global file parsed.
#[derive(Debug, Clone)]
pub struct ReloadedConfig {
    pub config: Config,
    /// Set when `.promptwright` exists but could not be read or parsed.
    pub project_error: Option<String>,
}

/// Reload configuration from global and optional project config paths.
/// The global file must parse; a broken project file is reported in `project_error`
/// and the global config is used on its own.
pub fn reload_config(
    config_path: &Path,
    project_config_path: Option<&Path>,
) -> Result<ReloadedConfig, String> {
    let contents = fs::read_to_string(config_path).map_err(|e| {
        warn!(path = ?config_path, error = %e, "config_reload_read_failed");
        format!("Failed to read config: {}", e)
    })?;

    let mut config = toml::from_str::<Config>(&contents).map_err(|e| {
        warn!(path = ?config_path, error = %e, "config_reload_parse_failed");
        format!("Invalid config: {}", e)
    })?;

    // .promptwright may have been deleted since startup; that is not an error
    let mut project_error = None;
    if let Some(project_path) = project_config_path
        && project_path.exists()
    {
        match load_project_config(project_path) {
            Ok(partial) => config = merge_config(&config, &partial),
            Err(e) => {
                warn!(path = ?project_path, error = %e, "project_config_error");
                project_error = Some(e);
            }
        }
    }

    info!(path = ?config_path, "config_reloaded");
    Ok(ReloadedConfig {
        config: apply_env_overrides(config),
        project_error,
    })
}

/// Load config from file, or create default if not exists
fn load_or_create_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    match fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                info!("Loaded config from {:?}", config_path);
                (config, ConfigLoadStatus::Loaded)
            }
            Err(e) => {
                warn!(
                    "Config file malformed at {:?}: {}. Using defaults.",
                    config_path, e
                );
                (
                    Config::default(),
                    ConfigLoadStatus::Error(format!("Malformed TOML: {}", e)),
                )
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_default_config(config_path),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(
                "Permission denied reading config at {:?}. Using defaults.",
                config_path
            );
            (
                Config::default(),
                ConfigLoadStatus::Error("Permission denied reading config".to_string()),
            )
        }
        Err(e) => {
            warn!(
                "Error reading config at {:?}: {}. Using defaults.",
                config_path, e
            );
            (
                Config::default(),
                ConfigLoadStatus::Error(format!("Read error: {}", e)),
            )
        }
    }
}

/// Create the default config file
fn create_default_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    let config = Config::default();

    if let Some(parent) = config_path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!(
            "Could not create config directory {:?}: {}. Continuing without file.",
            parent, e
        );
        return (
            config,
            ConfigLoadStatus::Error(format!("Could not create config directory: {}", e)),
        );
    }

    let toml_content = match toml::to_string_pretty(&config) {
        Ok(s) => format!("{}{}", templates::CONFIG_HEADER, s),
        Err(e) => {
            warn!("Could not serialize default config: {}", e);
            return (
                config,
                ConfigLoadStatus::Error(format!("Serialization error: {}", e)),
            );
        }
    };

    match fs::write(config_path, &toml_content) {
        Ok(()) => {
            info!("Created default config at {:?}", config_path);
            (config, ConfigLoadStatus::Created)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(
                "Permission denied creating config at {:?}. Continuing without file.",
                config_path
            );
            (
                config,
                ConfigLoadStatus::Error("Permission denied creating config".to_string()),
            )
        }
        Err(e) => {
            warn!(
                "Could not write default config to {:?}: {}. Continuing without file.",
                config_path, e
            );
            (
                config,
                ConfigLoadStatus::Error(format!("Write error: {}", e)),
            )
        }
    }
}

/// Apply environment variable overrides to config
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(level) = lookup("PROMPTWRIGHT_LOG") {
        debug!("Overriding logging.level from PROMPTWRIGHT_LOG");
        config.logging.level = level;
    }

    if let Some(path) = lookup("PROMPTWRIGHT_OUTPUT") {
        debug!("Overriding output.path from PROMPTWRIGHT_OUTPUT");
        config.output.path = path;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.output.path, "./PROMPT.md");
        assert_eq!(config.behavior.copied_flash_ms, 2000);
        assert!(!config.behavior.start_in_review);
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = Config::expand_tilde("~/.config/test");
        assert!(!expanded.to_string_lossy().starts_with('~'));

        let no_tilde = Config::expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));

        let relative = Config::expand_tilde("./relative/path");
        assert_eq!(relative, PathBuf::from("./relative/path"));
    }

    #[test]
    fn test_output_is_stdout() {
        let mut config = Config::default();
        assert!(!config.output_is_stdout());
        config.output.path = " - ".to_string();
        assert!(config.output_is_stdout());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[logging]
level = "debug"

[output]
path = "~/prompts/current.md"

[behavior]
copied_flash_ms = 500
start_in_review = true
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.output.path, "~/prompts/current.md");
        assert_eq!(config.behavior.copied_flash_ms, 500);
        assert!(config.behavior.start_in_review);
    }

    #[test]
    fn test_config_partial_deserialization() {
        // Only output section specified, others should use defaults
        let toml_str = r#"
[output]
path = "-"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.path, "-");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.behavior.copied_flash_ms, 2000);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let toml_str = r#"
[output]
path = "./out.md"
unknown_key = "should be ignored"

[unknown_section]
foo = "bar"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.path, "./out.md");
    }

    #[test]
    fn test_default_config_serializes_and_reparses() {
        let text = format!(
            "{}{}",
            templates::CONFIG_HEADER,
            toml::to_string_pretty(&Config::default()).unwrap()
        );
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_empty() {
        let partial: PartialConfig = toml::from_str("").unwrap();
        assert!(partial.logging.level.is_none());
        assert!(partial.output.path.is_none());
        assert!(partial.behavior.copied_flash_ms.is_none());
        assert!(partial.behavior.start_in_review.is_none());
    }

    #[test]
    fn test_partial_config_comment_only() {
        let partial: PartialConfig = toml::from_str("# promptwright project config\n").unwrap();
        assert!(partial.output.path.is_none());
    }

    #[test]
    fn test_merge_config_no_overrides() {
        let global = Config::default();
        let merged = merge_config(&global, &PartialConfig::default());
        assert_eq!(merged, global);
    }

    #[test]
    fn test_merge_config_all_overrides() {
        let global = Config::default();
        let partial = PartialConfig {
            logging: PartialLoggingConfig {
                level: Some("trace".to_string()),
            },
            output: PartialOutputConfig {
                path: Some("./proj.md".to_string()),
            },
            behavior: PartialBehaviorConfig {
                copied_flash_ms: Some(100),
                start_in_review: Some(true),
            },
        };
        let merged = merge_config(&global, &partial);

        assert_eq!(merged.logging.level, "trace");
        assert_eq!(merged.output.path, "./proj.md");
        assert_eq!(merged.behavior.copied_flash_ms, 100);
        assert!(merged.behavior.start_in_review);
    }

    #[test]
    fn test_merge_config_partial_overrides() {
        let global = Config::default();
        let partial: PartialConfig = toml::from_str(
            r#"
[behavior]
start_in_review = true
"#,
        )
        .unwrap();
        let merged = merge_config(&global, &partial);

        // Overridden
        assert!(merged.behavior.start_in_review);

        // Inherited
        assert_eq!(merged.output.path, global.output.path);
        assert_eq!(merged.logging.level, global.logging.level);
        assert_eq!(
            merged.behavior.copied_flash_ms,
            global.behavior.copied_flash_ms
        );
    }

    #[test]
    fn test_create_default_config_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let (config, status) = create_default_config(&path);
        assert!(matches!(status, ConfigLoadStatus::Created));
        assert_eq!(config, Config::default());

        let (reloaded, status) = load_or_create_config(&path);
        assert!(matches!(status, ConfigLoadStatus::Loaded));
        assert_eq!(reloaded, Config::default());
    }

    #[test]
    fn test_load_malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output\npath = ").unwrap();

        let (config, status) = load_or_create_config(&path);
        assert!(matches!(status, ConfigLoadStatus::Error(_)));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reload_config_merges_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let project = dir.path().join(".promptwright");
        fs::write(&global, "[behavior]\ncopied_flash_ms = 750\n").unwrap();
        fs::write(&project, "[behavior]\nstart_in_review = true\n").unwrap();

        let reloaded = reload_config(&global, Some(&project)).unwrap();
        assert!(reloaded.project_error.is_none());
        assert_eq!(reloaded.config.behavior.copied_flash_ms, 750);
        assert!(reloaded.config.behavior.start_in_review);
    }

    #[test]
    fn test_reload_config_missing_project_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        fs::write(&global, "").unwrap();

        let gone = dir.path().join(".promptwright");
        let reloaded = reload_config(&global, Some(&gone)).unwrap();
        assert!(reloaded.project_error.is_none());
        assert_eq!(reloaded.config.behavior, BehaviorConfig::default());
    }

    #[test]
    fn test_reload_config_invalid_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        fs::write(&global, "[logging]\nlevel = 3\n").unwrap();

        let err = reload_config(&global, None).unwrap_err();
        assert!(err.starts_with("Invalid config"));
    }

    #[test]
    fn test_reload_config_broken_project_keeps_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let project = dir.path().join(".promptwright");
        fs::write(&global, "[behavior]\ncopied_flash_ms = 750\n").unwrap();
        fs::write(&project, "[behavior\n").unwrap();

        let reloaded = reload_config(&global, Some(&project)).unwrap();
        assert_eq!(reloaded.config.behavior.copied_flash_ms, 750);
        assert!(!reloaded.config.behavior.start_in_review);
        let err = reloaded.project_error.unwrap();
        assert!(err.starts_with("Invalid .promptwright"));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let lookup = |key: &str| match key {
            "PROMPTWRIGHT_LOG" => Some("trace".to_string()),
            "PROMPTWRIGHT_OUTPUT" => Some("-".to_string()),
            _ => None,
        };
        let config = apply_overrides_from(Config::default(), lookup);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.output.path, "-");
        assert_eq!(
            crate::export::ExportTarget::from_config(&config),
            crate::export::ExportTarget::Stdout
        );
    }

    #[test]
    fn test_overrides_absent_leave_config_alone() {
        let config = apply_overrides_from(Config::default(), |_| None);
        assert_eq!(config, Config::default());
    }
}
