//! Hash-based routing
//!
//! Routes are flat paths (`/`, `/todos`, `/about`) read from the URL
//! fragment. Each route declares a page component factory and its access
//! policy; [`Router`] resolves hash changes through guards and reports
//! committed transitions to a single hook, which typically feeds a
//! [`RouterOutlet`].
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use taskdeck_pages::component::{Component, RenderCx};
//! use taskdeck_pages::dom::Node;
//! use taskdeck_pages::platform::{Location, MemoryLocation};
//! use taskdeck_pages::router::{RouteDeclaration, RouteOptions, Router};
//!
//! struct About;
//!
//! impl Component for About {
//!     fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
//!         cx.element("h1").text("About").build()
//!     }
//!
//!     fn name() -> &'static str {
//!         "About"
//!     }
//! }
//!
//! let location = Rc::new(MemoryLocation::new());
//! let router = Router::builder(location.clone()).build();
//! router
//!     .register_route(
//!         "/about",
//!         RouteDeclaration::new(|| About).with_options(RouteOptions::new().title("About")),
//!     )
//!     .unwrap();
//!
//! router.start();
//! location.set_hash("/about");
//! assert_eq!(router.current_path().as_deref(), Some("/about"));
//! ```

mod core;
mod outlet;
mod route;

pub use self::core::{Resolution, RouteChangeHook, Router, RouterBuilder, RouterError};
pub use outlet::RouterOutlet;
pub use route::{ComponentFactory, Guard, GuardOutcome, RouteDeclaration, RouteEntry, RouteOptions};
