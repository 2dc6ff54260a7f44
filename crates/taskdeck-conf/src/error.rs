use thiserror::Error;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
	/// The TOML document could not be parsed
	#[error("Invalid TOML settings: {0}")]
	Toml(#[from] toml::de::Error),

	/// The JSON document could not be parsed
	#[error("Invalid JSON settings: {0}")]
	Json(#[from] serde_json::Error),

	/// The settings file could not be read
	#[error("Failed to read settings file '{path}': {source}")]
	Io {
		/// File path
		path: String,
		/// Underlying I/O error
		#[source]
		source: std::io::Error,
	},

	/// The file extension is neither `.toml` nor `.json`
	#[error("Unsupported settings format: {0}")]
	UnsupportedFormat(String),

	/// An environment override names an unknown section or field
	#[error("Unknown setting '{0}'")]
	UnknownKey(String),

	/// A value is out of its allowed range
	#[error("Invalid value for '{key}': {message}")]
	InvalidValue {
		/// Dotted setting path
		key: String,
		/// What is wrong with it
		message: String,
	},
}

impl SettingsError {
	pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.to_string(),
			message: message.into(),
		}
	}
}
