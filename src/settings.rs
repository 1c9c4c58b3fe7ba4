//! Global settings loaded from TOML, following the same OnceLock pattern as the
//! romanization table.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - `load_settings(path)` parses a settings file without touching the singleton
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

/// Read and validate a settings file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_settings_toml(&content)
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub session: SessionSettings,
    pub layout: LayoutSettings,
    pub modes: BTreeMap<String, ModeSettings>,
}

impl Settings {
    pub fn mode(&self, name: &str) -> Option<&ModeSettings> {
        self.modes.get(name)
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Keystrokes in the rolling speed window.
    pub speed_window: usize,
    pub start_key: String,
    pub abort_key: String,
    /// Accept a lone `n` for a phrase-final ん.
    #[serde(default)]
    pub single_n_at_end: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutSettings {
    pub source: String,
    pub target: String,
}

/// Difficulty mode policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModeSettings {
    pub issues: usize,
    /// Cut each drawn phrase down to a random window of this many units.
    #[serde(default)]
    pub units_per_issue: Option<usize>,
    pub clear_typed_on_miss: bool,
    /// Drop each unit's keys from the typed prefix once it is confirmed.
    #[serde(default)]
    pub clear_typed_per_unit: bool,
    pub show_keyboard: bool,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            issues: 1,
            units_per_issue: None,
            clear_typed_on_miss: false,
            clear_typed_per_unit: false,
            show_keyboard: true,
        }
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    fn invalid(field: impl Into<String>, reason: &str) -> SettingsError {
        SettingsError::InvalidValue {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must be positive",
                ));
            }
        };
    }
    macro_rules! check_non_empty {
        ($section:ident . $field:ident) => {
            if s.$section.$field.trim().is_empty() {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must not be empty",
                ));
            }
        };
    }

    check_positive_usize!(session.speed_window);
    check_non_empty!(session.start_key);
    check_non_empty!(session.abort_key);
    if s.session.start_key == s.session.abort_key {
        return Err(invalid(
            "session.abort_key",
            "must differ from session.start_key",
        ));
    }

    check_non_empty!(layout.source);
    check_non_empty!(layout.target);

    if s.modes.is_empty() {
        return Err(invalid("modes", "at least one mode is required"));
    }
    for (name, mode) in &s.modes {
        if mode.issues == 0 {
            return Err(invalid(format!("modes.{name}.issues"), "must be positive"));
        }
        if mode.units_per_issue == Some(0) {
            return Err(invalid(
                format!("modes.{name}.units_per_issue"),
                "must be positive",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[session]
speed_window = 5
start_key = "Enter"
abort_key = "Escape"

[layout]
source = "qwerty"
target = "dvorak"

[modes.practice]
issues = 3
clear_typed_on_miss = true
show_keyboard = false
"#;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.session.speed_window, 10);
        assert_eq!(s.session.start_key, "Space");
        assert_eq!(s.session.abort_key, "Escape");
        assert!(!s.session.single_n_at_end);
        assert_eq!(s.layout.source, "qwerty");
        assert_eq!(s.layout.target, "qwerty");
        let names: Vec<_> = s.mode_names().collect();
        assert_eq!(names, vec!["drill", "hard", "normal", "short"]);
        assert_eq!(s.mode("short").unwrap().units_per_issue, Some(3));
        assert!(s.mode("hard").unwrap().clear_typed_on_miss);
        assert!(s.mode("drill").unwrap().clear_typed_per_unit);
        assert!(!s.mode("normal").unwrap().clear_typed_per_unit);
        assert!(s.mode("missing").is_none());
    }

    #[test]
    fn parse_valid_custom_toml() {
        let s = parse_settings_toml(VALID).unwrap();
        assert_eq!(s.session.speed_window, 5);
        assert_eq!(s.layout.target, "dvorak");
        let mode = s.mode("practice").unwrap();
        assert_eq!(mode.issues, 3);
        assert_eq!(mode.units_per_issue, None);
        assert!(!mode.clear_typed_per_unit);
        assert!(!mode.show_keyboard);
    }

    #[test]
    fn error_zero_window() {
        let toml = VALID.replace("speed_window = 5", "speed_window = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("session.speed_window"));
    }

    #[test]
    fn error_same_start_and_abort_key() {
        let toml = VALID.replace("\"Enter\"", "\"Escape\"");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("session.abort_key"));
    }

    #[test]
    fn error_empty_key_name() {
        let toml = VALID.replace("\"Enter\"", "\"\"");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("session.start_key"));
    }

    #[test]
    fn error_zero_issues() {
        let toml = VALID.replace("issues = 3", "issues = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("modes.practice.issues"));
    }

    #[test]
    fn error_zero_units_per_issue() {
        let toml = VALID.replace("issues = 3", "issues = 3\nunits_per_issue = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("modes.practice.units_per_issue"));
    }

    #[test]
    fn error_no_modes() {
        let toml = r#"
[session]
speed_window = 5
start_key = "Enter"
abort_key = "Escape"

[layout]
source = "qwerty"
target = "qwerty"

[modes]
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("modes"));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, VALID).unwrap();
        let s = load_settings(&path).unwrap();
        assert_eq!(s.layout.target, "dvorak");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn init_custom_rejects_invalid() {
        let err = init_custom("[session]\n".to_string()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
