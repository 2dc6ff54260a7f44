//! Error types for the store and storage backends

use thiserror::Error;

/// Errors raised by key/value storage backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
	/// The backing storage area is not available (no window, private mode, ...)
	#[error("Storage is unavailable: {0}")]
	Unavailable(String),
	/// The backend refused the read or write
	#[error("Storage operation failed for key '{key}': {message}")]
	Operation {
		/// Key involved in the failed operation
		key: String,
		/// Backend specific message
		message: String,
	},
}

/// Errors raised by the typed store API.
///
/// The untyped mutation API never fails; these only surface from
/// [`Store::get_as`](crate::store::Store::get_as),
/// [`Store::set_as`](crate::store::Store::set_as) and persistence loading.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The stored value could not be decoded into the requested type
	#[error("Failed to decode store key '{key}': {source}")]
	Decode {
		/// Store key
		key: String,
		/// Underlying serde error
		#[source]
		source: serde_json::Error,
	},
	/// The value could not be encoded as JSON
	#[error("Failed to encode value for store key '{key}': {source}")]
	Encode {
		/// Store key
		key: String,
		/// Underlying serde error
		#[source]
		source: serde_json::Error,
	},
	/// The persisted blob is not valid JSON
	#[error("Persisted store is not valid JSON: {0}")]
	CorruptBlob(#[source] serde_json::Error),
	/// The persisted blob is valid JSON but not an object
	#[error("Persisted store is not a JSON object")]
	NotAnObject,
	/// The storage backend failed
	#[error(transparent)]
	Storage(#[from] StorageError),
}
