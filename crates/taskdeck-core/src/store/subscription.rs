//! Per-key subscriber lists and disposal tokens

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde_json::Value;

/// Callback invoked with the current value of a key (`None` when absent).
pub(crate) type Callback = Rc<dyn Fn(Option<&Value>)>;

#[derive(Default)]
pub(crate) struct Subscribers {
	next_id: u64,
	by_key: BTreeMap<String, Vec<(u64, Callback)>>,
}

impl Subscribers {
	pub(crate) fn insert(&mut self, key: &str, callback: Callback) -> u64 {
		let id = self.next_id;
		self.next_id += 1;
		self.by_key
			.entry(key.to_string())
			.or_default()
			.push((id, callback));
		id
	}

	pub(crate) fn remove(&mut self, key: &str, id: u64) -> bool {
		let Some(list) = self.by_key.get_mut(key) else {
			return false;
		};
		let before = list.len();
		list.retain(|(entry_id, _)| *entry_id != id);
		let removed = list.len() != before;
		if list.is_empty() {
			self.by_key.remove(key);
		}
		removed
	}

	/// Snapshot of the callbacks for `key`, in registration order
	pub(crate) fn callbacks(&self, key: &str) -> Vec<Callback> {
		self.by_key
			.get(key)
			.map(|list| list.iter().map(|(_, cb)| Rc::clone(cb)).collect())
			.unwrap_or_default()
	}

	pub(crate) fn keys(&self) -> Vec<String> {
		self.by_key.keys().cloned().collect()
	}

	pub(crate) fn count(&self, key: &str) -> usize {
		self.by_key.get(key).map(Vec::len).unwrap_or(0)
	}
}

/// Handle to a store subscription.
///
/// Dropping the token unsubscribes. Call [`Subscription::forget`] to keep
/// the callback registered for as long as the store lives.
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
	subscribers: Weak<RefCell<Subscribers>>,
	key: String,
	id: u64,
	active: bool,
}

impl Subscription {
	pub(crate) fn new(subscribers: Weak<RefCell<Subscribers>>, key: String, id: u64) -> Self {
		Self {
			subscribers,
			key,
			id,
			active: true,
		}
	}

	/// The subscribed store key
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Removes the callback now
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keeps the callback registered for the store's lifetime
	pub fn forget(mut self) {
		self.active = false;
	}

	fn release(&mut self) {
		if !self.active {
			return;
		}
		self.active = false;
		if let Some(subscribers) = self.subscribers.upgrade() {
			if let Ok(mut subscribers) = subscribers.try_borrow_mut() {
				subscribers.remove(&self.key, self.id);
			}
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("key", &self.key)
			.field("id", &self.id)
			.field("active", &self.active)
			.finish()
	}
}
