use std::cell::RefCell;
use std::rc::Rc;

use super::{HashListenerId, Location};

#[derive(Default)]
struct MemoryState {
	hash: String,
	history: Vec<String>,
	listeners: Vec<(HashListenerId, Rc<dyn Fn()>)>,
	next_id: HashListenerId,
}

/// An in-memory location.
///
/// Listeners run synchronously, and only when the hash actually changes,
/// matching the browser's `hashchange` semantics.
#[derive(Default)]
pub struct MemoryLocation {
	state: RefCell<MemoryState>,
}

impl MemoryLocation {
	/// Starts with an empty hash
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts at `#hash`
	pub fn with_hash(hash: impl Into<String>) -> Self {
		let location = Self::default();
		location.state.borrow_mut().hash = hash.into();
		location
	}

	/// Goes back one history entry; returns `false` at the start of history
	pub fn back(&self) -> bool {
		let previous = self.state.borrow_mut().history.pop();
		match previous {
			Some(hash) => {
				self.change(hash, false);
				true
			}
			None => false,
		}
	}

	/// Number of entries before the current one
	pub fn history_len(&self) -> usize {
		self.state.borrow().history.len()
	}

	/// Number of registered listeners
	pub fn listener_count(&self) -> usize {
		self.state.borrow().listeners.len()
	}

	fn change(&self, hash: String, push: bool) {
		let listeners = {
			let mut state = self.state.borrow_mut();
			if state.hash == hash {
				return;
			}
			let previous = std::mem::replace(&mut state.hash, hash);
			if push {
				state.history.push(previous);
			}
			state
				.listeners
				.iter()
				.map(|(_, l)| Rc::clone(l))
				.collect::<Vec<_>>()
		};
		for listener in listeners {
			listener();
		}
	}
}

impl Location for MemoryLocation {
	fn hash(&self) -> String {
		self.state.borrow().hash.clone()
	}

	fn set_hash(&self, path: &str) {
		self.change(path.to_string(), true);
	}

	fn replace_hash(&self, path: &str) {
		self.change(path.to_string(), false);
	}

	fn on_hash_change(&self, listener: Rc<dyn Fn()>) -> HashListenerId {
		let mut state = self.state.borrow_mut();
		let id = state.next_id;
		state.next_id += 1;
		state.listeners.push((id, listener));
		id
	}

	fn remove_listener(&self, id: HashListenerId) {
		self.state
			.borrow_mut()
			.listeners
			.retain(|(listener_id, _)| *listener_id != id);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use rstest::rstest;

	use super::*;

	#[rstest]
	fn test_push_and_replace_history() {
		// Arrange
		let location = MemoryLocation::with_hash("/");

		// Act
		location.set_hash("/todos");
		location.replace_hash("/about");

		// Assert
		assert_eq!(location.hash(), "/about");
		assert_eq!(location.history_len(), 1);
		assert!(location.back());
		assert_eq!(location.hash(), "/");
		assert!(!location.back());
	}

	#[rstest]
	fn test_listeners_fire_only_on_change() {
		// Arrange
		let location = MemoryLocation::with_hash("/");
		let fired = Rc::new(Cell::new(0));
		let counter = Rc::clone(&fired);
		let id = location.on_hash_change(Rc::new(move || counter.set(counter.get() + 1)));

		// Act
		location.set_hash("/");
		location.set_hash("/a");
		location.remove_listener(id);
		location.set_hash("/b");

		// Assert
		assert_eq!(fired.get(), 1);
		assert_eq!(location.listener_count(), 0);
	}
}
