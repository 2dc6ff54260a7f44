//! Single-blob persistence for the store

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::storage::KeyValueStorage;

/// Somewhere the whole store can be written to as one JSON blob.
pub trait PersistenceBackend {
	/// Reads the blob, `Ok(None)` when nothing was saved yet
	fn load(&self) -> Result<Option<String>, StoreError>;

	/// Replaces the blob
	fn save(&self, blob: &str) -> Result<(), StoreError>;
}

/// Stores the blob under one key of a [`KeyValueStorage`].
pub struct StorageBlob {
	storage: Rc<dyn KeyValueStorage>,
	key: String,
}

impl StorageBlob {
	/// Persists under `key` in `storage`
	pub fn new(storage: Rc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
		Self {
			storage,
			key: key.into(),
		}
	}

	/// The storage key holding the blob
	pub fn key(&self) -> &str {
		&self.key
	}
}

impl PersistenceBackend for StorageBlob {
	fn load(&self) -> Result<Option<String>, StoreError> {
		Ok(self.storage.get_item(&self.key)?)
	}

	fn save(&self, blob: &str) -> Result<(), StoreError> {
		Ok(self.storage.set_item(&self.key, blob)?)
	}
}

/// Parses a persisted blob into the store's state.
pub(crate) fn decode_blob(blob: &str) -> Result<Map<String, Value>, StoreError> {
	match serde_json::from_str::<Value>(blob).map_err(StoreError::CorruptBlob)? {
		Value::Object(map) => Ok(map),
		_ => Err(StoreError::NotAnObject),
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::storage::MemoryStorage;

	#[rstest]
	#[case("{}", true)]
	#[case(r#"{"todos":[]}"#, true)]
	#[case("not json", false)]
	#[case("[1,2]", false)]
	#[case("null", false)]
	fn test_decode_blob(#[case] blob: &str, #[case] ok: bool) {
		assert_eq!(decode_blob(blob).is_ok(), ok);
	}

	#[rstest]
	fn test_storage_blob_save_and_load() {
		// Arrange
		let storage = MemoryStorage::new();
		let blob = StorageBlob::new(Rc::new(storage.clone()), "todoApp_store");

		// Act
		blob.save(r#"{"a":1}"#).unwrap();

		// Assert
		assert_eq!(blob.load().unwrap().as_deref(), Some(r#"{"a":1}"#));
		assert_eq!(
			storage.get_item("todoApp_store").unwrap().as_deref(),
			Some(r#"{"a":1}"#)
		);
	}
}
