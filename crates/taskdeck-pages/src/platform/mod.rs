//! Platform seams: the location hash and the browser projection
//!
//! The router talks to a [`Location`] instead of `window.location`, so the
//! same routing code runs in the browser ([`BrowserLocation`]) and in
//! native tests ([`MemoryLocation`]). The in-memory tree reaches the real
//! DOM through a [`Projection`].

mod memory;
pub mod projection;

#[cfg(target_arch = "wasm32")]
pub mod browser;

use std::rc::Rc;

pub use memory::MemoryLocation;
pub use projection::{Projection, ProjectionTarget};

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserLocation, BrowserMount};

/// Identifies a hash-change listener.
pub type HashListenerId = u64;

/// The `#fragment` part of the current URL.
pub trait Location {
	/// Current hash without the leading `#`
	fn hash(&self) -> String;

	/// Navigates to `#path`, adding a history entry
	fn set_hash(&self, path: &str);

	/// Navigates to `#path`, replacing the current history entry
	fn replace_hash(&self, path: &str);

	/// Registers a listener run whenever the hash changes
	fn on_hash_change(&self, listener: Rc<dyn Fn()>) -> HashListenerId;

	/// Removes a listener
	fn remove_listener(&self, id: HashListenerId);
}
