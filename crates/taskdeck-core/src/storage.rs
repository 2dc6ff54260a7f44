//! Key/value storage backends
//!
//! [`KeyValueStorage`] mirrors the browser Web Storage interface. The store
//! persists its blob through it and the auth service keeps its session
//! markers in it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

/// A string key/value storage area.
pub trait KeyValueStorage {
	/// Reads `key`, `Ok(None)` when absent
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// Writes `value` under `key`
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

	/// Removes `key`; removing an absent key is not an error
	fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Rc<S> {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		(**self).get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		(**self).set_item(key, value)
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		(**self).remove_item(key)
	}
}

/// In-memory storage.
///
/// Clones share the same data, which lets tests keep a handle to inspect
/// what a service wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
	data: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
	/// Creates an empty storage area
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored keys
	pub fn len(&self) -> usize {
		self.data.borrow().len()
	}

	/// Whether the storage area is empty
	pub fn is_empty(&self) -> bool {
		self.data.borrow().is_empty()
	}

	/// Removes every key
	pub fn clear(&self) {
		self.data.borrow_mut().clear();
	}
}

impl KeyValueStorage for MemoryStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.data.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.data
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.data.borrow_mut().remove(key);
		Ok(())
	}
}

/// Browser `localStorage` / `sessionStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Clone)]
pub struct WebStorage {
	inner: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl WebStorage {
	/// `window.localStorage`
	pub fn local() -> Result<Self, StorageError> {
		let window = web_sys::window()
			.ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
		let inner = window
			.local_storage()
			.map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
			.ok_or_else(|| StorageError::Unavailable("localStorage".to_string()))?;
		Ok(Self { inner })
	}

	/// `window.sessionStorage`
	pub fn session() -> Result<Self, StorageError> {
		let window = web_sys::window()
			.ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
		let inner = window
			.session_storage()
			.map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
			.ok_or_else(|| StorageError::Unavailable("sessionStorage".to_string()))?;
		Ok(Self { inner })
	}

	fn op_error(key: &str, err: wasm_bindgen::JsValue) -> StorageError {
		StorageError::Operation {
			key: key.to_string(),
			message: format!("{:?}", err),
		}
	}
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStorage for WebStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.inner
			.get_item(key)
			.map_err(|e| Self::op_error(key, e))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.inner
			.set_item(key, value)
			.map_err(|e| Self::op_error(key, e))
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.inner
			.remove_item(key)
			.map_err(|e| Self::op_error(key, e))
	}
}
