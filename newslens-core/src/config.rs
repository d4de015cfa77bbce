//! Configuration system for NewsLens.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/newslens/config.toml` and/or `.newslens/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Top-level configuration for the NewsLens dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub backend: BackendConfig,
    pub ui: UiConfig,
}

/// How analysis requests are routed to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzeRoute {
    /// Text and URLs both go to `/analyze`.
    #[default]
    Unified,
    /// Text goes to `/analyze-text`, URLs to `/analyze-url`.
    Split,
}

impl std::fmt::Display for AnalyzeRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzeRoute::Unified => write!(f, "unified"),
            AnalyzeRoute::Split => write!(f, "split"),
        }
    }
}

/// Connection settings for the analysis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis service.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    pub analyze_route: AnalyzeRoute,
    /// Interval between `/health` polls in watch mode.
    pub health_poll_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            analyze_route: AnalyzeRoute::Unified,
            health_poll_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Validate this backend config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid. Problems are reported as
    /// human-readable warnings rather than errors.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match url::Url::parse(&self.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => warnings.push(format!(
                "base_url scheme '{}' is not http or https",
                url.scheme()
            )),
            Err(e) => warnings.push(format!("base_url '{}' is not a URL: {}", self.base_url, e)),
        }
        if self.request_timeout_secs == 0 {
            warnings.push("request_timeout_secs is 0; every request will time out".to_string());
        }
        if self.connect_timeout_secs == 0 {
            warnings.push("connect_timeout_secs is 0; every connection will time out".to_string());
        }
        if self.health_poll_secs == 0 {
            warnings.push("health_poll_secs is 0; using 1 second instead".to_string());
        }
        warnings
    }
}

/// Terminal rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Whether to emit ANSI colors.
    pub color: bool,
    /// Column width for wrapped paragraphs.
    pub wrap_width: usize,
    /// Whether error panels include troubleshooting hints.
    pub show_troubleshooting: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            wrap_width: 100,
            show_troubleshooting: true,
        }
    }
}

impl DashboardConfig {
    /// Validate the whole configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.backend.validate();
        if self.ui.wrap_width < 20 {
            warnings.push(format!(
                "wrap_width ({}) is very narrow; output may be hard to read",
                self.ui.wrap_width
            ));
        }
        warnings
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `NEWSLENS_`)
/// 3. Workspace-local config (`.newslens/config.toml`)
/// 4. User config (`~/.config/newslens/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&DashboardConfig>,
) -> Result<DashboardConfig> {
    let mut figment = Figment::from(Serialized::defaults(DashboardConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "newslens", "newslens") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".newslens").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // NEWSLENS_BACKEND__BASE_URL, NEWSLENS_UI__COLOR, etc.
    figment = figment.merge(Env::prefixed("NEWSLENS_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config = figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })?;
    Ok(config)
}

/// Write the default configuration to `<workspace>/.newslens/config.toml`.
///
/// Returns the file path and whether it was created. An existing file is
/// left untouched.
pub fn init_workspace_config(workspace: &Path) -> Result<(PathBuf, bool)> {
    let config_dir = workspace.join(".newslens");
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        return Ok((config_path, false));
    }

    let toml_str = toml::to_string_pretty(&DashboardConfig::default()).map_err(|e| {
        ConfigError::SerializeError {
            message: e.to_string(),
        }
    })?;
    std::fs::write(&config_path, toml_str)?;
    Ok((config_path, true))
}

/// Check whether any NewsLens configuration file exists (user-level or workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "newslens", "newslens")
        && config_dir.config_dir().join("config.toml").exists()
    {
        return true;
    }

    workspace.is_some_and(|ws| ws.join(".newslens").join("config.toml").exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewsLensError;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.backend.analyze_route, AnalyzeRoute::Unified);
        assert_eq!(config.backend.health_poll_secs, 30);
        assert!(config.ui.color);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = DashboardConfig::default();
        config.backend.analyze_route = AnalyzeRoute::Split;
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("analyze_route = \"split\""));
        let deserialized: DashboardConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.backend.analyze_route, AnalyzeRoute::Split);
        assert_eq!(deserialized.ui.wrap_width, config.ui.wrap_width);
    }

    #[test]
    fn test_load_config_with_overrides() {
        let mut overrides = DashboardConfig::default();
        overrides.backend.base_url = "http://analysis.internal:8080".to_string();
        overrides.ui.color = false;

        let config = load_config(None, Some(&overrides)).unwrap();
        assert_eq!(config.backend.base_url, "http://analysis.internal:8080");
        assert!(!config.ui.color);
    }

    #[test]
    fn test_load_config_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".newslens");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
[backend]
base_url = "http://127.0.0.1:9000"
analyze_route = "split"
"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.backend.analyze_route, AnalyzeRoute::Split);
        // Unspecified keys keep their defaults.
        assert_eq!(config.backend.request_timeout_secs, 60);
        assert_eq!(config.ui.wrap_width, 100);
        assert!(config_exists(Some(dir.path())));
    }

    #[test]
    fn test_load_config_rejects_bad_value_type() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".newslens");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[backend]\nrequest_timeout_secs = \"soon\"\n",
        )
        .unwrap();

        let err = load_config(Some(dir.path()), None).unwrap_err();
        assert!(matches!(
            err,
            NewsLensError::Config(ConfigError::ParseError { .. })
        ));
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_init_workspace_config_idempotent() {
        let dir = tempfile::tempdir().unwrap();

        let (path, created) = init_workspace_config(dir.path()).unwrap();
        assert!(created);
        assert_eq!(path, dir.path().join(".newslens").join("config.toml"));
        let parsed = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(parsed.backend.base_url, "http://localhost:5000");

        std::fs::write(&path, "[ui]\ncolor = false\n").unwrap();
        let (_, created) = init_workspace_config(dir.path()).unwrap();
        assert!(!created);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[ui]\ncolor = false\n"
        );
    }

    #[test]
    fn test_init_workspace_config_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the config directory should go.
        std::fs::write(dir.path().join(".newslens"), "").unwrap();
        let err = init_workspace_config(dir.path()).unwrap_err();
        assert!(matches!(err, NewsLensError::Io(_)));
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let mut config = DashboardConfig::default();
        config.backend.base_url = "ftp://example.com".to_string();
        config.backend.request_timeout_secs = 0;
        config.backend.health_poll_secs = 0;
        config.ui.wrap_width = 10;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("ftp"));
    }

    #[test]
    fn test_validate_unparseable_url() {
        let config = BackendConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not a URL"));
    }
}
