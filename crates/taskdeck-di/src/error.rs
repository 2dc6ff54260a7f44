//! Service registry errors

use thiserror::Error;

/// Errors raised while building or resolving services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
	/// No service of the requested type was registered
	#[error("Service not registered: {0}")]
	NotRegistered(&'static str),

	/// A service factory refused to build its service
	#[error("Failed to construct service {name}: {message}")]
	Construction {
		/// Service name
		name: &'static str,
		/// Reason given by the factory
		message: String,
	},

	/// A sibling was looked up through a weak handle after the registry was dropped
	#[error("Service registry has been dropped")]
	RegistryDropped,
}

impl ServiceError {
	/// Convenience constructor for factories
	pub fn construction(name: &'static str, message: impl Into<String>) -> Self {
		Self::Construction {
			name,
			message: message.into(),
		}
	}
}
