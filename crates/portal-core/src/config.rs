//! Login page configuration.
//!
//! Every field has a default matching the portal's stock behavior, so a JSON
//! file only needs to name the values it overrides:
//!
//! ```
//! use portal_core::config::LoginConfig;
//!
//! let config = LoginConfig::from_json_str(r#"{ "timings": { "submit_delay_ms": 0 } }"#).unwrap();
//! assert_eq!(config.timings.submit_delay().as_millis(), 0);
//! assert_eq!(config.min_password_length, 6);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default minimum password length.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Failed attempts tolerated before a session is considered suspicious.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 3;

/// Top-level configuration for a [`FormController`](crate::FormController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Delays for every timer the controller schedules.
    pub timings: Timings,
    /// Minimum accepted password length, in characters.
    pub min_password_length: usize,
    /// Failed attempts tolerated before the session is flagged.
    pub max_failed_attempts: u32,
    /// Keys used in the durable and session stores.
    pub storage_keys: StorageKeys,
    /// Optional page features.
    pub features: Features,
    /// User-facing strings.
    pub messages: Messages,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            storage_keys: StorageKeys::default(),
            features: Features::default(),
            messages: Messages::default(),
        }
    }
}

impl LoginConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Rejects values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_password_length == 0 {
            return Err(ConfigError::Invalid(
                "min_password_length must be at least 1".into(),
            ));
        }

        let keys = &self.storage_keys;
        if keys.remembered_username.is_empty() || keys.remember_me.is_empty() {
            return Err(ConfigError::Invalid("storage keys cannot be empty".into()));
        }
        if keys.remembered_username == keys.remember_me {
            return Err(ConfigError::Invalid(
                "remembered_username and remember_me must use different keys".into(),
            ));
        }

        Ok(())
    }

    /// Sets the minimum password length.
    pub fn with_min_password_length(mut self, len: usize) -> Self {
        self.min_password_length = len;
        self
    }

    /// Enables or disables the remember-me feature.
    pub fn with_remember_me(mut self, enabled: bool) -> Self {
        self.features.remember_me = enabled;
        self
    }
}

/// Timer delays, stored in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub submit_delay_ms: u64,
    pub alert_timeout_ms: u64,
    pub alert_fade_ms: u64,
    pub shake_ms: u64,
    pub toggle_press_ms: u64,
    pub initial_focus_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            submit_delay_ms: 500,
            alert_timeout_ms: 5000,
            alert_fade_ms: 300,
            shake_ms: 500,
            toggle_press_ms: 100,
            initial_focus_delay_ms: 500,
        }
    }
}

impl Timings {
    /// Delay between the loading state and the native submission.
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// How long an alert stays before it starts fading.
    pub fn alert_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_timeout_ms)
    }

    /// Fade animation length before an alert is removed.
    pub fn alert_fade(&self) -> Duration {
        Duration::from_millis(self.alert_fade_ms)
    }

    pub fn shake(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    pub fn toggle_press(&self) -> Duration {
        Duration::from_millis(self.toggle_press_ms)
    }

    pub fn initial_focus_delay(&self) -> Duration {
        Duration::from_millis(self.initial_focus_delay_ms)
    }
}

/// Keys used in the key/value stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Durable key holding the remembered identifier.
    pub remembered_username: String,
    /// Durable key holding the `"true"` remember flag.
    pub remember_me: String,
    /// Session key holding the failed attempt counter.
    pub failed_attempts: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            remembered_username: "rememberedUsername".to_string(),
            remember_me: "rememberMe".to_string(),
            failed_attempts: "failedLoginAttempts".to_string(),
        }
    }
}

/// Optional page features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Whether the remember-me checkbox is honored.
    pub remember_me: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self { remember_me: true }
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub username_required: String,
    pub username_invalid: String,
    pub password_required: String,
    pub password_too_short: String,
    pub form_has_errors: String,
    pub robot_unchecked: String,
    pub login_success: String,
    pub login_error: String,
    pub network_error: String,
    pub unsupported_browser: String,
    pub submit_label: String,
    pub submit_loading_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            username_required: "El correo electrónico es obligatorio".to_string(),
            username_invalid: "Ingresa un correo electrónico válido".to_string(),
            password_required: "La contraseña es obligatoria".to_string(),
            password_too_short: "La contraseña debe tener al menos 6 caracteres".to_string(),
            form_has_errors: "Por favor corrige los errores en el formulario".to_string(),
            robot_unchecked: "Por favor confirma que no eres un robot".to_string(),
            login_success: "¡Login exitoso! Redirigiendo...".to_string(),
            login_error: "Error en el login. Verifica tus credenciales.".to_string(),
            network_error: "Error de conexión. Por favor verifica tu conexión a internet."
                .to_string(),
            unsupported_browser:
                "Tu navegador puede no soportar todas las funcionalidades. Considera actualizarlo."
                    .to_string(),
            submit_label: "Ingresar".to_string(),
            submit_loading_label: "Ingresando...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoginConfig::default();
        assert_eq!(config.min_password_length, 6);
        assert_eq!(config.timings.submit_delay(), Duration::from_millis(500));
        assert_eq!(config.timings.alert_timeout(), Duration::from_secs(5));
        assert_eq!(config.storage_keys.remember_me, "rememberMe");
        assert!(config.features.remember_me);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LoginConfig::from_json_str(
            r#"{ "timings": { "alert_timeout_ms": 1000 }, "features": { "remember_me": false } }"#,
        )
        .unwrap();

        assert_eq!(config.timings.alert_timeout_ms, 1000);
        assert_eq!(config.timings.alert_fade_ms, 300);
        assert!(!config.features.remember_me);
        assert_eq!(config.messages, Messages::default());
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = LoginConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LoginConfig::default());
    }

    #[test]
    fn test_rejects_zero_password_length() {
        let err = LoginConfig::from_json_str(r#"{ "min_password_length": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_colliding_keys() {
        let err = LoginConfig::from_json_str(
            r#"{ "storage_keys": { "remembered_username": "k", "remember_me": "k" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = LoginConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LoginConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("login.json");
        std::fs::write(&path, r#"{ "min_password_length": 10, "features": { "remember_me": false } }"#)
            .unwrap();

        let config = LoginConfig::load(&path).unwrap();
        assert_eq!(config.min_password_length, 10);
        assert!(!config.features.remember_me);
        assert_eq!(config.messages.submit_label, "Ingresar");
    }
}
