//! # taskdeck service registry
//!
//! Services are single shared instances looked up by type. Every service is
//! built by a factory that receives the registry built so far, and keeps a
//! [`WeakRegistry`] so it can reach any sibling (including ones registered
//! after it) once construction is complete.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use taskdeck_core::Store;
//! use taskdeck_di::{Service, ServiceRegistry, WeakRegistry};
//!
//! struct Greeter {
//!     services: WeakRegistry,
//! }
//!
//! impl Service for Greeter {
//!     fn service_name() -> &'static str {
//!         "Greeter"
//!     }
//! }
//!
//! let registry = ServiceRegistry::builder()
//!     .service(|_| Ok(Store::new()))
//!     .service(|services| Ok(Greeter { services: services.downgrade() }))
//!     .build();
//!
//! let greeter = registry.resolve::<Greeter>().unwrap();
//! assert!(greeter.services.get::<Store>().is_some());
//! ```

mod error;
mod registry;

pub use error::ServiceError;
pub use registry::{ServiceRegistry, ServiceRegistryBuilder, WeakRegistry};

use taskdeck_core::Store;

/// A value that can live in a [`ServiceRegistry`].
pub trait Service: 'static {
	/// Human readable name used in logs and error messages
	fn service_name() -> &'static str;
}

impl Service for Store {
	fn service_name() -> &'static str {
		"DataStoreService"
	}
}
