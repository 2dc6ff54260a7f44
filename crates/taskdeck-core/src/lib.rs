//! taskdeck core
//!
//! Shared building blocks used by every other taskdeck crate:
//!
//! - [`store`]: the process-wide keyed state container with per-key
//!   subscriptions and optional single-blob persistence
//! - [`storage`]: key/value storage backends (in-memory, browser Web Storage)
//! - [`clock`]: wall-clock abstraction used by session expiry and due dates
//! - [`auth`]: the authentication capability consumed by the router
//! - [`logging`]: console/tracing logging macros
//!
//! ## Example
//!
//! ```
//! use taskdeck_core::store::Store;
//! use serde_json::json;
//!
//! let store = Store::new();
//! store.add("todos", json!({ "task": "X" }));
//! assert_eq!(store.get("todos"), Some(json!([{ "task": "X" }])));
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod clock;
pub mod error;
pub mod logging;
pub mod storage;
pub mod store;

pub use auth::Authenticator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StorageError, StoreError};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::{PersistenceBackend, StorageBlob, Store, Subscription};

#[doc(hidden)]
pub mod __private {
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
