//! Application configuration and persisted settings.
//!
//! Two files are involved:
//!
//! * [`Config`]: how the daemon itself runs (listen address, where the
//!   settings live, launch pacing).  Loaded once at startup from
//!   `config.json` in the config directory.
//! * [`Settings`]: the user's last-used form values (program, count,
//!   window title, cell size, style flags).  Loaded at startup and written
//!   back whenever the shell saves them.
//!
//! # Example `settings.json`
//!
//! ```json
//! {
//!   "program_path": "C:\\Games\\client.exe",
//!   "execution_count": "4",
//!   "window_title": "client",
//!   "window_width": "480",
//!   "window_height": "344",
//!   "remove_title": true,
//!   "remove_border": false,
//!   "bypass_limit": false
//! }
//! ```
//!
//! Counts and sizes are stored as strings, exactly as the form fields hold
//! them; use the typed accessors to read them.

use crate::command::{CellSize, PlacementOptions};
use crate::error::LayoutError;
use crate::launcher::DEFAULT_LAUNCH_DELAY;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub program_path: String,
    pub execution_count: String,
    pub window_title: String,
    pub window_width: String,
    pub window_height: String,
    pub remove_title: bool,
    pub remove_border: bool,
    pub bypass_limit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program_path: String::new(),
            execution_count: "1".into(),
            window_title: String::new(),
            window_width: "480".into(),
            window_height: "344".into(),
            remove_title: false,
            remove_border: false,
            bypass_limit: false,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LayoutError::PersistenceFailure(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            LayoutError::PersistenceFailure(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load settings, falling back to [`Settings::default`] as a whole if
    /// the file is missing or any part of it is unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                info!("{}, using default settings", e);
                Self::default()
            }
        }
    }

    /// Write settings to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), LayoutError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::PersistenceFailure(format!("failed to encode: {}", e)))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                LayoutError::PersistenceFailure(format!(
                    "failed to create {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        std::fs::write(path, json).map_err(|e| {
            LayoutError::PersistenceFailure(format!("failed to write {}: {}", path.display(), e))
        })
    }

    /// The default window title for a program: its file name without the
    /// extension.
    pub fn title_from_program_path(path: &str) -> Option<String> {
        // Split on both separators so Windows paths work on every host.
        let file = path.trim().rsplit(['/', '\\']).next()?;
        let stem = match file.rfind('.') {
            Some(0) | None => file,
            Some(dot) => &file[..dot],
        };
        (!stem.is_empty()).then(|| stem.to_string())
    }

    /// Fill in an empty `window_title` from `program_path`.
    pub fn with_derived_title(mut self) -> Self {
        if self.window_title.trim().is_empty() {
            if let Some(title) = Self::title_from_program_path(&self.program_path) {
                self.window_title = title;
            }
        }
        self
    }

    /// `execution_count` as a number.
    pub fn execution_count(&self) -> Result<u32, LayoutError> {
        self.execution_count.trim().parse().map_err(|_| {
            LayoutError::InvalidArgument(format!(
                "execution count {:?} is not a number",
                self.execution_count
            ))
        })
    }

    /// `window_width × window_height` as a cell size.
    pub fn cell_size(&self) -> Result<CellSize, LayoutError> {
        let parse = |name: &str, value: &str| -> Result<u32, LayoutError> {
            value.trim().parse().map_err(|_| {
                LayoutError::InvalidArgument(format!("{} {:?} is not a number", name, value))
            })
        };
        Ok(CellSize::new(
            parse("window width", &self.window_width)?,
            parse("window height", &self.window_height)?,
        ))
    }

    /// Placement flags stored in the settings.  Freeze mode is never
    /// persisted.
    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            remove_caption: self.remove_title,
            remove_border: self.remove_border,
            bypass_cell_limit: self.bypass_limit,
            freeze_current_position: false,
        }
    }
}

/// Daemon configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all values
/// fall back to their compiled-in defaults.
///
/// # Example
///
/// ```json
/// {
///   "listen": "127.0.0.1:47800",
///   "settings_path": "/home/me/.config/gridlaunch/settings.json",
///   "launch_delay_ms": 300
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Loopback address the command listener binds to.
    pub listen: String,
    /// Where [`Settings`] are persisted.  Relative paths are resolved
    /// against the config directory.
    pub settings_path: PathBuf,
    /// Pause between successive launches (ms).
    pub launch_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:47800".into(),
            settings_path: PathBuf::from("settings.json"),
            launch_delay_ms: DEFAULT_LAUNCH_DELAY.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Absolute settings path, resolving a relative one against `config_dir`.
    pub fn settings_path_in(&self, config_dir: &Path) -> PathBuf {
        if self.settings_path.is_absolute() {
            self.settings_path.clone()
        } else {
            config_dir.join(&self.settings_path)
        }
    }

    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

/// Resolve the config directory: `$XDG_CONFIG_HOME/gridlaunch`,
/// `%APPDATA%\gridlaunch`, or `~/.config/gridlaunch`.
pub fn config_dir() -> PathBuf {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(base).join("gridlaunch");
    }
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("gridlaunch");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| {
        warn!("HOME not set, using the temp directory");
        std::env::temp_dir().display().to_string()
    });
    PathBuf::from(home).join(".config").join("gridlaunch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Monotonic counter to generate unique file paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_path(name: &str) -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "gridlaunch-test-{}-{}-{}",
            std::process::id(),
            id,
            name
        ))
    }

    fn sample() -> Settings {
        Settings {
            program_path: r"C:\Games\Client\client.exe".into(),
            execution_count: "4".into(),
            window_title: "client".into(),
            window_width: "640".into(),
            window_height: "360".into(),
            remove_title: true,
            remove_border: false,
            bypass_limit: true,
        }
    }

    #[test]
    fn defaults_match_the_form_defaults() {
        let s = Settings::default();
        assert_eq!(s.execution_count, "1");
        assert_eq!(s.window_width, "480");
        assert_eq!(s.window_height, "344");
        assert!(!s.remove_title && !s.remove_border && !s.bypass_limit);
    }

    #[test]
    fn save_then_load() {
        let path = tmp_path("settings.json");
        sample().save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), sample());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tmp_path("nested");
        let path = dir.join("settings.json");
        sample().save(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_persistence_failure() {
        let err = Settings::load(&tmp_path("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        assert_eq!(
            Settings::load_or_default(&tmp_path("missing.json")),
            Settings::default()
        );
    }

    #[test]
    fn partial_file_falls_back_wholesale() {
        // One valid field is not enough: defaults replace everything.
        let path = tmp_path("partial.json");
        std::fs::write(&path, r#"{ "program_path": "/opt/client" }"#).unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = tmp_path("broken.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn typed_accessors() {
        let s = sample();
        assert_eq!(s.execution_count().unwrap(), 4);
        assert_eq!(s.cell_size().unwrap(), CellSize::new(640, 360));
        let o = s.placement_options();
        assert!(o.remove_caption && !o.remove_border && o.bypass_cell_limit);
        assert!(!o.freeze_current_position);
    }

    #[test]
    fn non_numeric_fields_are_invalid_arguments() {
        let s = Settings {
            window_width: "wide".into(),
            execution_count: "".into(),
            ..Settings::default()
        };
        assert_eq!(s.cell_size().unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            s.execution_count().unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn title_from_program_path_strips_dir_and_extension() {
        assert_eq!(
            Settings::title_from_program_path(r"C:\Games\Client\client.exe").as_deref(),
            Some("client")
        );
        assert_eq!(
            Settings::title_from_program_path("/usr/bin/some.tool.bin").as_deref(),
            Some("some.tool")
        );
        assert_eq!(
            Settings::title_from_program_path("/usr/bin/xterm").as_deref(),
            Some("xterm")
        );
        assert_eq!(Settings::title_from_program_path(""), None);
        assert_eq!(Settings::title_from_program_path("/opt/dir/"), None);
    }

    #[test]
    fn derived_title_only_fills_empty_title() {
        let s = Settings {
            program_path: "/opt/game/launcher.sh".into(),
            ..Settings::default()
        }
        .with_derived_title();
        assert_eq!(s.window_title, "launcher");

        let kept = sample().with_derived_title();
        assert_eq!(kept.window_title, "client");
    }

    #[test]
    fn deserialize_empty_config_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let d = Config::default();
        assert_eq!(cfg.listen, d.listen);
        assert_eq!(cfg.settings_path, d.settings_path);
        assert_eq!(cfg.launch_delay(), Duration::from_millis(300));
    }

    #[test]
    fn deserialize_partial_config() {
        let cfg: Config = serde_json::from_str(r#"{ "launch_delay_ms": 50 }"#).unwrap();
        assert_eq!(cfg.launch_delay_ms, 50);
        assert_eq!(cfg.listen, Config::default().listen);
    }

    #[test]
    fn unknown_config_keys_ignored() {
        let json = r#"{ "listen": "127.0.0.1:9000", "future_section": { "key": 42 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.listen, "127.0.0.1:9000");
    }

    #[test]
    fn relative_settings_path_resolves_against_config_dir() {
        let cfg = Config::default();
        let dir = Path::new("/etc/gridlaunch");
        assert_eq!(
            cfg.settings_path_in(dir),
            PathBuf::from("/etc/gridlaunch/settings.json")
        );
    }
}
