use std::path::PathBuf;

use serde::Deserialize;

/// Client configuration, loaded once at startup and passed into the API
/// client and the app. Replaces the web client's ambient globals
/// (window.appointmentUrls and friends) with explicit values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the rescue server.
    pub server_url: String,
    /// CSRF token attached to state-changing requests. The web client
    /// reads this from a page meta tag; here it comes from config.
    pub csrf_token: String,
    /// Optional rescue scope applied to event and reminder fetches.
    pub rescue_id: Option<i64>,
    pub urls: UrlTemplates,
}

/// Per-record URL templates for form submission. `{id}` is replaced by
/// the record id; nothing else is computed client-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UrlTemplates {
    pub dog_edit: String,
    pub dog_personality: String,
    pub appointment_add: String,
    pub appointment_edit: String,
    pub medicine_add: String,
    pub medicine_edit: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            csrf_token: String::new(),
            rescue_id: None,
            urls: UrlTemplates::default(),
        }
    }
}

impl Default for UrlTemplates {
    fn default() -> Self {
        Self {
            dog_edit: "/dogs/{id}/edit".to_string(),
            dog_personality: "/dogs/{id}/edit-personality".to_string(),
            appointment_add: "/appointments/add".to_string(),
            appointment_edit: "/appointments/{id}/edit".to_string(),
            medicine_add: "/medicines/add".to_string(),
            medicine_edit: "/medicines/{id}/edit".to_string(),
        }
    }
}

impl Config {
    /// Load from the user config dir, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(config_path()).unwrap_or_default()
    }

    fn load_from(path: Option<PathBuf>) -> Option<Self> {
        let path = path?;
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&path).ok()?;
        toml::from_str(&content).ok()
    }
}

/// Substitute a record id into a URL template.
pub fn record_url(template: &str, id: i64) -> String {
    template.replace("{id}", &id.to_string())
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rescuecal").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_url_substitutes_id() {
        let config = Config::default();
        assert_eq!(record_url(&config.urls.dog_edit, 7), "/dogs/7/edit");
        assert_eq!(
            record_url(&config.urls.dog_personality, 7),
            "/dogs/7/edit-personality"
        );
        // Templates without a placeholder pass through unchanged
        assert_eq!(record_url(&config.urls.appointment_add, 7), "/appointments/add");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("server_url = \"https://rescue.example\"").unwrap();
        assert_eq!(config.server_url, "https://rescue.example");
        assert!(config.rescue_id.is_none());
        assert_eq!(config.urls.dog_edit, "/dogs/{id}/edit");
    }
}
