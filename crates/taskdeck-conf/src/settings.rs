//! Settings sections

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use serde::{Deserialize, Serialize};
use taskdeck_di::Service;

use crate::error::SettingsError;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Root settings object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Application shell
	pub app: AppSettings,
	/// Session and login
	pub auth: AuthSettings,
	/// Store persistence and data loading
	pub store: StoreSettings,
}

/// Application shell settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
	/// Prefix of every document title, `"{prefix} - {route title}"`
	pub title_prefix: String,
	/// Route used for an empty hash and as the redirect target
	pub default_route: String,
	/// Id of the element the application mounts into
	pub mount_id: String,
}

impl Default for AppSettings {
	fn default() -> Self {
		Self {
			title_prefix: "Todo App".to_string(),
			default_route: "/".to_string(),
			mount_id: "app".to_string(),
		}
	}
}

/// Keys under which the session markers are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionKeys {
	/// Flag set to `"true"` after a successful login
	pub is_authenticated: String,
	/// Login timestamp in milliseconds since the epoch
	pub login_time: String,
}

impl Default for SessionKeys {
	fn default() -> Self {
		Self {
			is_authenticated: "todoApp_isAuthenticated".to_string(),
			login_time: "todoApp_loginTime".to_string(),
		}
	}
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
	/// The shared password
	pub password: String,
	/// Session lifetime after login
	pub session_timeout_ms: u64,
	/// Session storage keys
	pub session_keys: SessionKeys,
	/// Artificial delay before a login attempt is answered
	pub login_delay_ms: u64,
}

impl Default for AuthSettings {
	fn default() -> Self {
		Self {
			password: "admin123".to_string(),
			session_timeout_ms: DAY_MS,
			session_keys: SessionKeys::default(),
			login_delay_ms: 300,
		}
	}
}

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
	/// `localStorage` key of the persisted blob
	pub storage_key: String,
	/// URL of the initial to-do list
	pub data_url: String,
	/// Whether the store is persisted at all
	pub persist: bool,
}

impl Default for StoreSettings {
	fn default() -> Self {
		Self {
			storage_key: "todoApp_store".to_string(),
			data_url: "/data.json".to_string(),
			persist: true,
		}
	}
}

impl Settings {
	/// Parses TOML settings
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Parses JSON settings
	pub fn from_json_str(source: &str) -> Result<Self, SettingsError> {
		Ok(serde_json::from_str(source)?)
	}

	/// Loads a `.toml` or `.json` file
	#[cfg(not(target_arch = "wasm32"))]
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.display().to_string(),
			source,
		})?;
		match path.extension().and_then(|ext| ext.to_str()) {
			Some("toml") => Self::from_toml_str(&source),
			Some("json") => Self::from_json_str(&source),
			other => Err(SettingsError::UnsupportedFormat(
				other.unwrap_or_default().to_string(),
			)),
		}
	}

	/// Checks cross-field constraints
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.auth.password.is_empty() {
			return Err(SettingsError::invalid("auth.password", "must not be empty"));
		}
		if self.auth.session_timeout_ms == 0 {
			return Err(SettingsError::invalid(
				"auth.session_timeout_ms",
				"must be greater than zero",
			));
		}
		if !self.app.default_route.starts_with('/') {
			return Err(SettingsError::invalid(
				"app.default_route",
				"must start with '/'",
			));
		}
		if self.store.persist && self.store.storage_key.is_empty() {
			return Err(SettingsError::invalid(
				"store.storage_key",
				"must not be empty when persistence is enabled",
			));
		}
		Ok(())
	}

	/// Formats a document title for a route title
	pub fn page_title(&self, title: &str) -> String {
		format!("{} - {}", self.app.title_prefix, title)
	}
}

impl Service for Settings {
	fn service_name() -> &'static str {
		"Settings"
	}
}
