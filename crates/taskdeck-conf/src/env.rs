//! Environment variable overrides
//!
//! A variable named `TASKDECK_AUTH__PASSWORD` overrides `auth.password`.
//! Nested sections use further `__` separators, e.g.
//! `TASKDECK_AUTH__SESSION_KEYS__LOGIN_TIME`. Values are parsed according
//! to the type of the field they replace.

use serde_json::Value;

use crate::error::SettingsError;
use crate::settings::Settings;

/// Prefix of every override variable
pub const ENV_PREFIX: &str = "TASKDECK_";

impl Settings {
	/// Applies `TASKDECK_*` overrides from `vars`.
	///
	/// Variables without the prefix are ignored. An override naming an
	/// unknown field, or carrying a value that does not fit the field, is an
	/// error.
	pub fn with_env_overrides<I, K, V>(self, vars: I) -> Result<Self, SettingsError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut tree = serde_json::to_value(&self)?;
		let mut touched = false;

		for (name, raw) in vars {
			let Some(rest) = name.as_ref().strip_prefix(ENV_PREFIX) else {
				continue;
			};
			let path: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
			let slot = lookup_mut(&mut tree, &path)
				.ok_or_else(|| SettingsError::UnknownKey(path.join(".")))?;
			*slot = coerce(slot, raw.as_ref(), &path)?;
			touched = true;
		}

		if !touched {
			return Ok(self);
		}
		Ok(serde_json::from_value(tree)?)
	}

	/// Applies overrides from the process environment
	#[cfg(not(target_arch = "wasm32"))]
	pub fn with_process_env(self) -> Result<Self, SettingsError> {
		self.with_env_overrides(std::env::vars())
	}
}

fn lookup_mut<'a>(tree: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
	let mut node = tree;
	for segment in path {
		node = node.as_object_mut()?.get_mut(segment)?;
	}
	// Only leaves can be overridden.
	(!node.is_object()).then_some(node)
}

fn coerce(current: &Value, raw: &str, path: &[String]) -> Result<Value, SettingsError> {
	let key = path.join(".");
	match current {
		Value::Bool(_) => parse_bool(raw)
			.map(Value::Bool)
			.ok_or_else(|| SettingsError::invalid(&key, format!("expected a boolean, got '{}'", raw))),
		Value::Number(_) => raw
			.trim()
			.parse::<u64>()
			.map(Value::from)
			.map_err(|e| SettingsError::invalid(&key, e.to_string())),
		_ => Ok(Value::String(raw.to_string())),
	}
}

fn parse_bool(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}
