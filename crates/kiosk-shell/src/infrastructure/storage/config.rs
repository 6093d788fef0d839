//! TOML-based configuration for the kiosk shell.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\KioskShell\config.toml`
//! - Linux:    `~/.config/kioskshell/config.toml`
//! - macOS:    `~/Library/Application Support/KioskShell/config.toml`
//!
//! Every field carries a serde default, so the shell comes up with a working
//! configuration on first run, before any file exists.  A deployment that
//! needs nothing beyond the built-in profile URLs never writes one.
//!
//! # Deployment profiles
//!
//! The `[[states]]` array declares the logical-state catalog explicitly.
//! When it is absent, the catalog falls back to the built-in profile for the
//! configured `user_type`:
//!
//! - `ledcarewall` — the LED wall display: local splash screensaver plus the
//!   carescape, in-session, and goodbye views.
//! - `provider` — the provider workstation: a remote screensaver page and
//!   the in-session view only.
//!
//! ```toml
//! [control]
//! port = 8787
//!
//! [link]
//! upstream_url = "ws://workstation.local:9001"
//!
//! [display]
//! user_type = "ledcarewall"
//! initial_state = "screensaver"
//!
//! [[states]]
//! name = "carescape"
//! target = "https://fe-app.oneroomhealth.app/ledwallview/care"
//! exact_url = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kiosk_core::{CatalogError, StateCatalog, StateSpec};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level shell configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Local HTTP control API settings.
    #[serde(default)]
    pub control: ControlConfig,
    /// Upstream WebSocket link settings.
    #[serde(default)]
    pub link: LinkConfig,
    /// Display profile and startup state.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Explicit logical-state catalog.  Empty means "use the built-in
    /// profile for `display.user_type`".
    #[serde(default)]
    pub states: Vec<StateSpec>,
}

/// Settings for the loopback HTTP control server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlConfig {
    /// TCP port the control server binds on 127.0.0.1.
    #[serde(default = "default_control_port")]
    pub port: u16,
}

/// Settings for the upstream controller link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// `ws://` / `wss://` endpoint of the remote controller.  Absent means
    /// the link client is disabled entirely — no socket, no retry loop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
}

/// Display profile and startup state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Deployment profile: `"ledcarewall"` or `"provider"`.  Compared
    /// case-insensitively; anything other than `"provider"` gets the LED
    /// wall profile.
    #[serde(default = "default_user_type")]
    pub user_type: String,
    /// Logical state entered once the window host reports ready.
    #[serde(default = "default_initial_state")]
    pub initial_state: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_control_port() -> u16 {
    8787
}
fn default_user_type() -> String {
    "ledcarewall".to_string()
}
fn default_initial_state() -> String {
    "screensaver".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            link: LinkConfig::default(),
            display: DisplayConfig::default(),
            states: Vec::new(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            port: default_control_port(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            user_type: default_user_type(),
            initial_state: default_initial_state(),
        }
    }
}

// ── Built-in deployment profiles ──────────────────────────────────────────────

/// The built-in logical-state catalog for `user_type`.
///
/// The provider workstation carries two states; every other profile gets the
/// four-state LED wall catalog.  The screensaver is exact-URL in both.
pub fn profile_catalog(user_type: &str) -> Vec<StateSpec> {
    if user_type.eq_ignore_ascii_case("provider") {
        vec![
            StateSpec::new(
                "screensaver",
                "https://fe-app.oneroomhealth.app/wall/provider-display/screensaver",
                true,
            ),
            StateSpec::new(
                "inSession",
                "https://fe-app.oneroomhealth.app/extensionproviderview",
                false,
            ),
        ]
    } else {
        vec![
            StateSpec::new("screensaver", "splash", true),
            StateSpec::new(
                "carescape",
                "https://fe-app.oneroomhealth.app/ledwallview/care",
                false,
            ),
            StateSpec::new(
                "inSession",
                "https://fe-app.oneroomhealth.app/ledwallview/ma",
                false,
            ),
            StateSpec::new(
                "goodbye",
                "https://fe-app.oneroomhealth.app/ledwallview/endAppt",
                false,
            ),
        ]
    }
}

impl AppConfig {
    /// Builds the validated state catalog for this configuration.
    ///
    /// Uses the explicit `[[states]]` declarations when present, otherwise
    /// the built-in profile for `display.user_type`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a declared state has an unparseable
    /// target URL or a duplicated name.
    pub fn catalog(&self) -> Result<StateCatalog, CatalogError> {
        if self.states.is_empty() {
            StateCatalog::build(&profile_catalog(&self.display.user_type))
        } else {
            StateCatalog::build(&self.states)
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the app folder.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KioskShell"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kioskshell"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KioskShell")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_has_expected_port() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.control.port, 8787);
    }

    #[test]
    fn test_app_config_default_link_is_disabled() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.link.upstream_url, None);
    }

    #[test]
    fn test_app_config_default_profile_and_initial_state() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.display.user_type, "ledcarewall");
        assert_eq!(cfg.display.initial_state, "screensaver");
        assert!(cfg.states.is_empty());
    }

    // ── Built-in profiles ─────────────────────────────────────────────────────

    #[test]
    fn test_ledcarewall_profile_declares_four_states() {
        // Arrange / Act
        let catalog = AppConfig::default().catalog().expect("profile must build");

        // Assert
        assert_eq!(
            catalog.state_names(),
            vec!["screensaver", "carescape", "inSession", "goodbye"]
        );
    }

    #[test]
    fn test_ledcarewall_screensaver_is_local_splash() {
        let catalog = AppConfig::default().catalog().unwrap();
        let entry = catalog.get("screensaver").unwrap();
        assert_eq!(entry.target, kiosk_core::CatalogTarget::LocalSplash);
        assert!(entry.exact_url);
    }

    #[test]
    fn test_provider_profile_declares_two_states() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.display.user_type = "provider".to_string();

        // Act
        let catalog = cfg.catalog().expect("profile must build");

        // Assert
        assert_eq!(catalog.state_names(), vec!["screensaver", "inSession"]);
    }

    #[test]
    fn test_provider_profile_is_matched_case_insensitively() {
        let mut cfg = AppConfig::default();
        cfg.display.user_type = "Provider".to_string();
        assert_eq!(cfg.catalog().unwrap().len(), 2);
    }

    #[test]
    fn test_unrecognised_user_type_falls_back_to_ledcarewall() {
        // The catalog must exist for any profile string; the LED wall
        // catalog is the deployment default.
        let mut cfg = AppConfig::default();
        cfg.display.user_type = "somethingelse".to_string();
        assert_eq!(cfg.catalog().unwrap().len(), 4);
    }

    #[test]
    fn test_explicit_states_override_the_profile() {
        // Arrange: one declared state replaces the whole built-in catalog.
        let mut cfg = AppConfig::default();
        cfg.states
            .push(StateSpec::new("screensaver", "splash", true));

        // Act
        let catalog = cfg.catalog().unwrap();

        // Assert
        assert_eq!(catalog.state_names(), vec!["screensaver"]);
    }

    #[test]
    fn test_invalid_declared_state_fails_catalog_build() {
        let mut cfg = AppConfig::default();
        cfg.states
            .push(StateSpec::new("carescape", "not a url", false));
        assert!(cfg.catalog().is_err());
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.control.port = 9000;
        cfg.link.upstream_url = Some("ws://workstation.local:9001".to_string());
        cfg.states
            .push(StateSpec::new("carescape", "https://x/care", false));

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_absent_upstream_url_is_omitted_from_toml() {
        // Arrange: link disabled → the key must not appear at all.
        let cfg = AppConfig::default();

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");

        // Assert
        assert!(
            !toml_str.contains("upstream_url"),
            "None upstream_url must be omitted"
        );
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        // Arrange: a completely empty file is a valid configuration.
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");

        // Assert
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_toml_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[control]
port = 9999

[display]
user_type = "provider"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.control.port, 9999);
        assert_eq!(cfg.display.user_type, "provider");
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.display.initial_state, "screensaver");
        assert_eq!(cfg.link.upstream_url, None);
    }

    #[test]
    fn test_deserialize_states_array() {
        let toml_str = r#"
[[states]]
name = "screensaver"
target = "splash"
exact_url = true

[[states]]
name = "carescape"
target = "https://x/care"
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize states");

        assert_eq!(cfg.states.len(), 2);
        assert!(cfg.states[0].exact_url);
        // exact_url defaults to false when omitted.
        assert!(!cfg.states[1].exact_url);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    // ── load_config_from ──────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_returns_default_when_file_absent() {
        // Arrange: a path that cannot exist exercises the NotFound path.
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        // Act
        let cfg = load_config_from(&path).expect("absent file is not an error");

        // Assert
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_written_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("kiosk_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.control.port = 12345;
        cfg.link.upstream_url = Some("ws://10.0.0.5:9001".to_string());

        // Act – write manually, then load through the repository function.
        std::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_propagates_parse_errors() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("kiosk_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_platform_config_dir_returns_some_on_this_platform() {
        let result = platform_config_dir();
        #[cfg(target_os = "windows")]
        if std::env::var_os("APPDATA").is_some() {
            assert!(result.is_some());
        }
        #[cfg(target_os = "linux")]
        {
            let has_xdg = std::env::var_os("XDG_CONFIG_HOME").is_some();
            let has_home = std::env::var_os("HOME").is_some();
            if has_xdg || has_home {
                assert!(result.is_some());
            }
        }
        #[cfg(target_os = "macos")]
        if std::env::var_os("HOME").is_some() {
            assert!(result.is_some());
        }
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped CI environment is also acceptable.
    }
}
