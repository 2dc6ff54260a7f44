//! Keyed state store with per-key subscriptions
//!
//! The store maps string keys to arbitrary JSON values. Every mutation
//! synchronously notifies the callbacks registered for the touched key with
//! the key's current value. When a [`PersistenceBackend`] is configured the
//! whole state is rewritten as one JSON blob after every mutation.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use taskdeck_core::store::Store;
//!
//! let store = Store::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let subscription = store.subscribe("count", move |value| {
//!     sink.borrow_mut().push(value.cloned());
//! });
//!
//! store.set("count", json!(1));
//! assert_eq!(*seen.borrow(), vec![Some(json!(1))]);
//! subscription.unsubscribe();
//! ```

mod persistence;
mod subscription;

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::{debug_log, error_log, warn_log};

pub use persistence::{PersistenceBackend, StorageBlob};
pub use subscription::Subscription;

use persistence::decode_blob;
use subscription::Subscribers;

/// The application-wide keyed state container.
pub struct Store {
	state: RefCell<Map<String, Value>>,
	subscribers: Rc<RefCell<Subscribers>>,
	persistence: Option<Box<dyn PersistenceBackend>>,
}

impl Store {
	/// Creates an empty, non-persistent store
	pub fn new() -> Self {
		Self::with_state(Map::new())
	}

	/// Creates a non-persistent store seeded with `state`
	pub fn with_state(state: Map<String, Value>) -> Self {
		Self {
			state: RefCell::new(state),
			subscribers: Rc::new(RefCell::new(Subscribers::default())),
			persistence: None,
		}
	}

	/// Creates a store backed by `backend`.
	///
	/// The persisted blob is loaded once. When nothing was saved yet, or the
	/// blob cannot be read or parsed, `default` is used instead; read and
	/// parse failures are logged.
	pub fn with_persistence(
		backend: impl PersistenceBackend + 'static,
		default: Map<String, Value>,
	) -> Self {
		let state = match backend.load() {
			Ok(Some(blob)) => match decode_blob(&blob) {
				Ok(state) => state,
				Err(e) => {
					warn_log!("Discarding persisted store: {}", e);
					default
				}
			},
			Ok(None) => default,
			Err(e) => {
				error_log!("Failed to load persisted store: {}", e);
				default
			}
		};

		Self {
			state: RefCell::new(state),
			subscribers: Rc::new(RefCell::new(Subscribers::default())),
			persistence: Some(Box::new(backend)),
		}
	}

	/// Returns a copy of the value stored under `key`
	pub fn get(&self, key: &str) -> Option<Value> {
		self.state.borrow().get(key).cloned()
	}

	/// Returns the value under `key`, or `default` when absent
	pub fn get_or(&self, key: &str, default: Value) -> Value {
		self.get(key).unwrap_or(default)
	}

	/// Decodes the value under `key` into `T`
	///
	/// # Errors
	///
	/// Returns [`StoreError::Decode`] when the stored value does not match `T`.
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
		self.get(key)
			.map(|value| {
				serde_json::from_value(value).map_err(|source| StoreError::Decode {
					key: key.to_string(),
					source,
				})
			})
			.transpose()
	}

	/// Whether `key` holds a value
	pub fn has(&self, key: &str) -> bool {
		self.state.borrow().contains_key(key)
	}

	/// Every key currently held, in key order
	pub fn keys(&self) -> Vec<String> {
		self.state.borrow().keys().cloned().collect()
	}

	/// A copy of the whole state
	pub fn snapshot(&self) -> Map<String, Value> {
		self.state.borrow().clone()
	}

	/// Overwrites `key`, persists, then notifies subscribers of `key`
	pub fn set(&self, key: &str, value: Value) {
		self.state.borrow_mut().insert(key.to_string(), value);
		self.persist();
		self.notify(key);
	}

	/// Encodes `value` and stores it under `key`
	///
	/// # Errors
	///
	/// Returns [`StoreError::Encode`] when `value` cannot be represented as JSON.
	pub fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
		let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
			key: key.to_string(),
			source,
		})?;
		self.set(key, value);
		Ok(())
	}

	/// Appends `item` to the array under `key`, creating the array if needed.
	///
	/// A non-array value under `key` is left untouched and a warning is logged.
	pub fn add(&self, key: &str, item: Value) {
		{
			let mut state = self.state.borrow_mut();
			let entry = state
				.entry(key.to_string())
				.or_insert_with(|| Value::Array(Vec::new()));
			match entry {
				Value::Array(items) => items.push(item),
				_ => {
					warn_log!("Cannot add to store key '{}': value is not an array", key);
					return;
				}
			}
		}
		self.persist();
		self.notify(key);
	}

	/// Drops every array element under `key` whose `field` equals `value`.
	///
	/// Absent keys and non-array values are left alone without notifying.
	pub fn remove_by_value(&self, key: &str, field: &str, value: &Value) {
		{
			let mut state = self.state.borrow_mut();
			match state.get_mut(key) {
				Some(Value::Array(items)) => {
					items.retain(|item| item.get(field) != Some(value));
				}
				_ => return,
			}
		}
		self.persist();
		self.notify(key);
	}

	/// Deletes `key` and notifies its subscribers with no value
	pub fn remove(&self, key: &str) {
		self.state.borrow_mut().remove(key);
		self.persist();
		self.notify(key);
	}

	/// Empties the store and notifies every subscribed key with no value
	pub fn clear(&self) {
		self.state.borrow_mut().clear();
		self.persist();
		let keys = self.subscribers.borrow().keys();
		for key in keys {
			self.notify(&key);
		}
	}

	/// Registers `callback` for changes to `key`.
	///
	/// Callbacks run in registration order with the key's value at the time
	/// each one is invoked.
	pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
	where
		F: Fn(Option<&Value>) + 'static,
	{
		let id = self
			.subscribers
			.borrow_mut()
			.insert(key, Rc::new(callback));
		debug_log!("Subscribed to store key '{}' (id {})", key, id);
		Subscription::new(Rc::downgrade(&self.subscribers), key.to_string(), id)
	}

	/// Number of callbacks registered for `key`
	pub fn subscriber_count(&self, key: &str) -> usize {
		self.subscribers.borrow().count(key)
	}

	/// Invokes every callback registered for `key`
	pub fn notify(&self, key: &str) {
		let callbacks = self.subscribers.borrow().callbacks(key);
		for callback in callbacks {
			let value = self.get(key);
			callback(value.as_ref());
		}
	}

	fn persist(&self) {
		let Some(backend) = &self.persistence else {
			return;
		};
		let blob = match serde_json::to_string(&*self.state.borrow()) {
			Ok(blob) => blob,
			Err(e) => {
				error_log!("Failed to serialize store: {}", e);
				return;
			}
		};
		if let Err(e) = backend.save(&blob) {
			error_log!("Failed to persist store: {}", e);
		}
	}
}

impl Default for Store {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Store {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Store")
			.field("state", &*self.state.borrow())
			.field("persistent", &self.persistence.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use rstest::{fixture, rstest};
	use serde_json::json;

	use super::*;
	use crate::storage::{KeyValueStorage, MemoryStorage};

	#[fixture]
	fn store() -> Store {
		Store::new()
	}

	fn recorder(store: &Store, key: &str) -> (Rc<RefCell<Vec<Option<Value>>>>, Subscription) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		let sub = store.subscribe(key, move |value| sink.borrow_mut().push(value.cloned()));
		(seen, sub)
	}

	#[rstest]
	fn test_get_missing_key_is_none(store: Store) {
		assert_eq!(store.get("missing"), None);
		assert!(!store.has("missing"));
		assert_eq!(store.get_or("missing", json!([])), json!([]));
	}

	#[rstest]
	fn test_add_initializes_array_and_notifies(store: Store) {
		// Arrange
		let (seen, _sub) = recorder(&store, "todos");

		// Act
		store.add("todos", json!({"task": "X"}));

		// Assert
		assert_eq!(store.get("todos"), Some(json!([{"task": "X"}])));
		assert_eq!(*seen.borrow(), vec![Some(json!([{"task": "X"}]))]);
	}

	#[rstest]
	fn test_add_to_non_array_leaves_value(store: Store) {
		// Arrange
		store.set("count", json!(3));
		let (seen, _sub) = recorder(&store, "count");

		// Act
		store.add("count", json!(4));

		// Assert
		assert_eq!(store.get("count"), Some(json!(3)));
		assert!(seen.borrow().is_empty());
	}

	#[rstest]
	fn test_remove_by_value_filters_matching_items(store: Store) {
		// Arrange
		store.set("todos", json!([{"id": 1}, {"id": 2}, {"id": 1}]));
		let (seen, _sub) = recorder(&store, "todos");

		// Act
		store.remove_by_value("todos", "id", &json!(1));

		// Assert
		assert_eq!(store.get("todos"), Some(json!([{"id": 2}])));
		assert_eq!(seen.borrow().len(), 1);
	}

	#[rstest]
	fn test_remove_by_value_absent_key_does_not_notify(store: Store) {
		// Arrange
		let (seen, _sub) = recorder(&store, "todos");

		// Act
		store.remove_by_value("todos", "id", &json!(1));

		// Assert
		assert!(!store.has("todos"));
		assert!(seen.borrow().is_empty());
	}

	#[rstest]
	fn test_remove_notifies_with_none(store: Store) {
		// Arrange
		store.set("user", json!("ann"));
		let (seen, _sub) = recorder(&store, "user");

		// Act
		store.remove("user");

		// Assert
		assert!(!store.has("user"));
		assert_eq!(*seen.borrow(), vec![None]);
	}

	#[rstest]
	fn test_clear_notifies_every_subscribed_key(store: Store) {
		// Arrange
		store.set("a", json!(1));
		store.set("b", json!(2));
		let (seen_a, _sub_a) = recorder(&store, "a");
		let (seen_c, _sub_c) = recorder(&store, "c");

		// Act
		store.clear();

		// Assert
		assert!(store.keys().is_empty());
		assert_eq!(*seen_a.borrow(), vec![None]);
		assert_eq!(*seen_c.borrow(), vec![None]);
	}

	#[rstest]
	fn test_callbacks_run_once_in_registration_order(store: Store) {
		// Arrange
		let order = Rc::new(RefCell::new(Vec::new()));
		let subs: Vec<Subscription> = (0..3)
			.map(|i| {
				let order = Rc::clone(&order);
				store.subscribe("k", move |_| order.borrow_mut().push(i))
			})
			.collect();

		// Act
		store.set("k", json!(true));

		// Assert
		assert_eq!(*order.borrow(), vec![0, 1, 2]);
		drop(subs);
	}

	#[rstest]
	fn test_dropping_subscription_unsubscribes(store: Store) {
		// Arrange
		let (seen, sub) = recorder(&store, "k");
		assert_eq!(store.subscriber_count("k"), 1);

		// Act
		drop(sub);
		store.set("k", json!(1));

		// Assert
		assert_eq!(store.subscriber_count("k"), 0);
		assert!(seen.borrow().is_empty());
	}

	#[rstest]
	fn test_forgotten_subscription_stays_registered(store: Store) {
		// Arrange
		let (seen, sub) = recorder(&store, "k");

		// Act
		sub.forget();
		store.set("k", json!(1));

		// Assert
		assert_eq!(*seen.borrow(), vec![Some(json!(1))]);
	}

	#[rstest]
	fn test_callback_may_reenter_store() {
		// Arrange
		let store = Rc::new(Store::new());
		let inner = Rc::downgrade(&store);
		store
			.subscribe("a", move |value| {
				if let (Some(store), Some(value)) = (inner.upgrade(), value) {
					store.set("b", value.clone());
				}
			})
			.forget();

		// Act
		store.set("a", json!("copied"));

		// Assert
		assert_eq!(store.get("b"), Some(json!("copied")));
	}

	#[rstest]
	fn test_typed_helpers(store: Store) {
		// Arrange
		store.set_as("nums", &vec![1, 2, 3]).unwrap();

		// Act
		let nums: Option<Vec<u32>> = store.get_as("nums").unwrap();
		let wrong = store.get_as::<String>("nums");

		// Assert
		assert_eq!(nums, Some(vec![1, 2, 3]));
		assert!(matches!(wrong, Err(StoreError::Decode { .. })));
	}

	#[rstest]
	fn test_persistence_writes_blob_on_mutation() {
		// Arrange
		let storage = MemoryStorage::new();
		let store = Store::with_persistence(
			StorageBlob::new(Rc::new(storage.clone()), "blob"),
			Map::new(),
		);

		// Act
		store.add("todos", json!({"task": "X"}));

		// Assert
		let blob = storage.get_item("blob").unwrap().unwrap();
		let parsed: Value = serde_json::from_str(&blob).unwrap();
		assert_eq!(parsed, json!({"todos": [{"task": "X"}]}));
	}

	#[rstest]
	fn test_persistence_loads_existing_blob() {
		// Arrange
		let storage = MemoryStorage::new();
		storage.set_item("blob", r#"{"theme":"dark"}"#).unwrap();

		// Act
		let store = Store::with_persistence(
			StorageBlob::new(Rc::new(storage), "blob"),
			Map::new(),
		);

		// Assert
		assert_eq!(store.get("theme"), Some(json!("dark")));
	}

	#[rstest]
	#[case("{not json")]
	#[case("[]")]
	#[case("42")]
	fn test_unusable_blob_falls_back_to_default(#[case] blob: &str) {
		// Arrange
		let storage = MemoryStorage::new();
		storage.set_item("blob", blob).unwrap();
		let mut default = Map::new();
		default.insert("seed".to_string(), json!(true));

		// Act
		let store = Store::with_persistence(StorageBlob::new(Rc::new(storage), "blob"), default);

		// Assert
		assert_eq!(store.snapshot().len(), 1);
		assert_eq!(store.get("seed"), Some(json!(true)));
	}
}
