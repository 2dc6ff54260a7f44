//! taskdeck pages - component runtime and hash router
//!
//! A deliberately small UI runtime: components render an in-memory node
//! tree and are rebuilt wholesale whenever their fields, their store keys
//! or their async work change. In the browser the tree is mirrored into
//! the real DOM by [`platform::browser`]; natively it is what tests assert
//! against.
//!
//! ## Architecture
//!
//! - [`dom`]: in-memory document tree and events
//! - [`component`]: render/replace lifecycle, element builder, store bindings
//! - [`router`]: guarded hash router and route outlet
//! - [`app`]: bootstrap that wires services into root components
//! - [`platform`]: location hash and browser projection
//! - [`spawn`]: local task spawning
//! - [`callback`]: child-to-parent callbacks

#![warn(missing_docs)]

pub mod app;
pub mod callback;
pub mod component;
pub mod dom;
pub mod platform;
pub mod prelude;
pub mod router;
pub mod spawn;

pub use app::{App, create_app};
pub use callback::Callback;
pub use component::{Component, ComponentHandle, ComponentScope, Lifecycle};
pub use router::{GuardOutcome, Router};
