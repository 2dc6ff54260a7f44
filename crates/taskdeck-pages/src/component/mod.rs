//! Component runtime
//!
//! A component is a typed options record plus a `render` function that
//! builds one root [`Node`]. The runtime wraps it in an instance that owns
//! the root, the service registry and the store subscriptions, and
//! re-renders the whole subtree whenever something changes:
//!
//! ```text
//! Constructed → Rendered → (Stale → Rendered)* → Detached
//! ```
//!
//! Re-rendering replaces the root node in place (same parent, same next
//! sibling). There is no diffing: child components mounted during render
//! are rebuilt every time and keep only what their options record carries.
//!
//! # Example
//!
//! ```
//! use taskdeck_pages::component::{Component, ComponentHandle, RenderCx};
//! use taskdeck_pages::dom::{Event, Node};
//!
//! struct Counter {
//!     count: u32,
//! }
//!
//! impl Component for Counter {
//!     fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
//!         cx.element("button")
//!             .on("click", |scope, _event| scope.update(|c: &mut Counter| c.count += 1))
//!             .text(format!("Clicked {} times", self.count))
//!             .build()
//!     }
//!
//!     fn name() -> &'static str {
//!         "Counter"
//!     }
//! }
//!
//! let counter = ComponentHandle::new(Counter { count: 0 });
//! counter.root().dispatch(&Event::new("click"));
//! assert_eq!(counter.root().text_content(), "Clicked 1 times");
//! ```

mod cx;
mod element;
mod instance;

use std::any::Any;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use taskdeck_di::ServiceRegistry;

pub use cx::{RenderCx, SetupCx};
pub use element::{AttrValue, Child, ElementBuilder, Handler};
pub use instance::{ComponentHandle, ComponentScope};

use crate::dom::Node;

/// Lifecycle state of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
	/// Built, first render not finished yet
	Constructed,
	/// Root node reflects the current fields
	Rendered,
	/// A re-render is in progress
	Stale,
	/// Removed from the document; re-render requests are ignored
	Detached,
}

/// Work started after the first render; the component re-renders once all
/// of its actions complete.
pub type AsyncAction<C> = Box<dyn FnOnce(ComponentScope<C>) -> LocalBoxFuture<'static, ()>>;

/// Wraps an async closure as an [`AsyncAction`]
pub fn action<C, F, Fut>(f: F) -> AsyncAction<C>
where
	C: Component,
	F: FnOnce(ComponentScope<C>) -> Fut + 'static,
	Fut: Future<Output = ()> + 'static,
{
	Box::new(move |scope| Box::pin(f(scope)))
}

/// A reusable UI unit.
pub trait Component: Sized + 'static {
	/// Builds the root node from the current fields
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node;

	/// Returns the component's name for logging.
	fn name() -> &'static str;

	/// Runs once before the first render; declare store subscriptions here
	fn setup(&mut self, _cx: &mut SetupCx<'_, Self>) {}

	/// Runs when services are injected after construction
	fn after_services_injected(&mut self, _cx: &mut SetupCx<'_, Self>) {}

	/// Async work to start after the first render
	fn async_actions(&self) -> Vec<AsyncAction<Self>> {
		Vec::new()
	}
}

/// Type-erased view of a component instance, used by parents, the router
/// outlet and the bootstrap.
pub trait AnyComponent {
	/// Current root node
	fn root(&self) -> Node;

	/// Whether a service registry has been injected
	fn has_services(&self) -> bool;

	/// Injects `services`, runs the injection hook and re-renders
	fn inject_services(&self, services: ServiceRegistry);

	/// Removes the component from the document and drops its subscriptions
	fn detach(&self);

	/// Current lifecycle state
	fn lifecycle(&self) -> Lifecycle;

	/// Name of the component type
	fn component_name(&self) -> &'static str;

	/// Re-renders the component in place
	fn rerender(&self);

	/// Upcasts for downcasting to a concrete instance
	fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Recovers a typed handle from a type-erased component
pub fn downcast<C: Component>(component: Rc<dyn AnyComponent>) -> Option<ComponentHandle<C>> {
	instance::downcast(component)
}
