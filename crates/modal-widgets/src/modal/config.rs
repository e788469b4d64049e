#![forbid(unsafe_code)]

//! Stack-wide defaults.
//!
//! Loaded from TOML or built in code. Every field is optional in TOML and
//! falls back to [`ModalStackConfig::default`]; unknown keys are an error.
//!
//! ```toml
//! backdrop = "static"
//! keyboard = false
//! dismiss_key = "esc"
//! open_class = "modal-open"
//! ```

use modal_core::KeyCode;
use serde::{Deserialize, Serialize};

use super::error::ModalError;
use super::options::BackdropMode;

/// Defaults applied to every dialog plus host-facing names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModalStackConfig {
    /// Default backdrop mode.
    pub backdrop: BackdropMode,
    /// Default for whether the dismiss key dismisses the top dialog.
    pub keyboard: bool,
    /// Name of the dismiss key, parsed with [`KeyCode::from_name`].
    pub dismiss_key: String,
    /// Marker class set on the host container while any dialog is open.
    pub open_class: String,
    /// Default window chrome template.
    pub window_template_url: String,
    /// Backdrop template.
    pub backdrop_template_url: String,
}

impl Default for ModalStackConfig {
    fn default() -> Self {
        Self {
            backdrop: BackdropMode::Enabled,
            keyboard: true,
            dismiss_key: "escape".to_owned(),
            open_class: "modal-open".to_owned(),
            window_template_url: "template/modal/window.html".to_owned(),
            backdrop_template_url: "template/modal/backdrop.html".to_owned(),
        }
    }
}

impl ModalStackConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ModalError> {
        let config: Self =
            toml::from_str(source).map_err(|err| ModalError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check fields that serde cannot.
    pub fn validate(&self) -> Result<(), ModalError> {
        if KeyCode::from_name(&self.dismiss_key).is_none() {
            return Err(ModalError::Config(format!(
                "unknown dismiss_key '{}'",
                self.dismiss_key
            )));
        }
        if self.open_class.trim().is_empty() {
            return Err(ModalError::Config("open_class must not be empty".into()));
        }
        Ok(())
    }

    /// The dismiss key, falling back to Escape when the name is invalid.
    pub fn dismiss_key_code(&self) -> KeyCode {
        KeyCode::from_name(&self.dismiss_key).unwrap_or_else(|| {
            tracing::warn!(dismiss_key = %self.dismiss_key, "unknown dismiss key, using escape");
            KeyCode::Escape
        })
    }

    #[must_use]
    pub fn with_backdrop(mut self, backdrop: impl Into<BackdropMode>) -> Self {
        self.backdrop = backdrop.into();
        self
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    #[must_use]
    pub fn with_dismiss_key(mut self, name: impl Into<String>) -> Self {
        self.dismiss_key = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn defaults() {
        let config = ModalStackConfig::default();
        assert_eq!(config.backdrop, BackdropMode::Enabled);
        assert!(config.keyboard);
        assert_eq!(config.dismiss_key_code(), KeyCode::Escape);
        assert_eq!(config.open_class, "modal-open");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        let config = ModalStackConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, ModalStackConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = ModalStackConfig::from_toml_str(
            r#"
            backdrop = "static"
            keyboard = false
            dismiss_key = "q"
            window_template_url = "chrome.html"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.backdrop, BackdropMode::Static);
        assert!(!config.keyboard);
        assert_eq!(config.dismiss_key_code(), KeyCode::Char('q'));
        assert_eq!(config.window_template_url, "chrome.html");
        assert_eq!(config.open_class, "modal-open");
    }

    #[test]
    fn backdrop_bool_in_toml() {
        let config = ModalStackConfig::from_toml_str("backdrop = false").expect("valid config");
        assert_eq!(config.backdrop, BackdropMode::Disabled);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = ModalStackConfig::from_toml_str("animation = true").expect_err("unknown key");
        assert!(matches!(err, ModalError::Config(_)));
    }

    #[test]
    fn invalid_dismiss_key_is_rejected() {
        let err =
            ModalStackConfig::from_toml_str("dismiss_key = \"hyper\"").expect_err("bad key");
        assert!(matches!(err, ModalError::Config(ref msg) if msg.contains("hyper")));
    }

    #[test]
    fn builders() {
        let config = ModalStackConfig::default()
            .with_backdrop(false)
            .with_keyboard(false)
            .with_dismiss_key("enter");
        assert_eq!(config.backdrop, BackdropMode::Disabled);
        assert!(!config.keyboard);
        assert_eq!(config.dismiss_key_code(), KeyCode::Enter);
    }

    #[traced_test]
    #[test]
    fn unknown_key_in_code_falls_back_with_warning() {
        let config = ModalStackConfig::default().with_dismiss_key("hyper");
        assert_eq!(config.dismiss_key_code(), KeyCode::Escape);
        assert!(logs_contain("unknown dismiss key"));
    }
}
