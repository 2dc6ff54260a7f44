//! Route declarations and entries.

use std::rc::Rc;

use taskdeck_di::ServiceRegistry;

use crate::component::{AnyComponent, Component, ComponentHandle};

/// Result of a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	/// Continue with the next check
	Allow,
	/// Stay on the current route
	Block,
	/// Replace-navigate to the given path
	RedirectTo(String),
}

/// A guard receives the target path and the current path.
pub type Guard = Rc<dyn Fn(&str, Option<&str>) -> GuardOutcome>;

/// Builds the page component for a route.
pub type ComponentFactory = Rc<dyn Fn(&ServiceRegistry) -> Rc<dyn AnyComponent>>;

/// Access policy and metadata of a route.
#[derive(Clone, Default)]
pub struct RouteOptions {
	/// Only authenticated sessions may enter
	pub requires_auth: bool,
	/// Page title suffix
	pub title: Option<String>,
	/// Guard run after the global guards
	pub before_enter: Option<Guard>,
}

impl RouteOptions {
	/// Options with no restrictions
	pub fn new() -> Self {
		Self::default()
	}

	/// Requires an authenticated session
	pub fn requires_auth(mut self) -> Self {
		self.requires_auth = true;
		self
	}

	/// Sets the page title
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Sets the per-route guard
	pub fn before_enter<G>(mut self, guard: G) -> Self
	where
		G: Fn(&str, Option<&str>) -> GuardOutcome + 'static,
	{
		self.before_enter = Some(Rc::new(guard));
		self
	}
}

impl std::fmt::Debug for RouteOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteOptions")
			.field("requires_auth", &self.requires_auth)
			.field("title", &self.title)
			.field("has_before_enter", &self.before_enter.is_some())
			.finish()
	}
}

/// A component factory plus its options, as passed to
/// [`Router::register_route`](super::Router::register_route).
#[derive(Clone)]
pub struct RouteDeclaration {
	/// Page component factory
	pub component: ComponentFactory,
	/// Access policy and metadata
	pub options: RouteOptions,
}

impl RouteDeclaration {
	/// Declares a route whose page is built by `make` and mounted with the
	/// router's services
	pub fn new<C, F>(make: F) -> Self
	where
		C: Component,
		F: Fn() -> C + 'static,
	{
		Self {
			component: Rc::new(move |services: &ServiceRegistry| {
				ComponentHandle::with_services(make(), services.clone()).into_any()
			}),
			options: RouteOptions::default(),
		}
	}

	/// Replaces the options
	pub fn with_options(mut self, options: RouteOptions) -> Self {
		self.options = options;
		self
	}
}

impl std::fmt::Debug for RouteDeclaration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteDeclaration")
			.field("options", &self.options)
			.finish()
	}
}

/// A registered route.
#[derive(Clone)]
pub struct RouteEntry {
	path: String,
	component: ComponentFactory,
	options: RouteOptions,
}

impl RouteEntry {
	pub(super) fn new(path: String, declaration: RouteDeclaration) -> Self {
		Self {
			path,
			component: declaration.component,
			options: declaration.options,
		}
	}

	/// Route path
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Whether the route requires an authenticated session
	pub fn requires_auth(&self) -> bool {
		self.options.requires_auth
	}

	/// Page title suffix, if any
	pub fn title(&self) -> Option<&str> {
		self.options.title.as_deref().filter(|t| !t.is_empty())
	}

	pub(super) fn before_enter(&self) -> Option<Guard> {
		self.options.before_enter.clone()
	}

	/// Builds the page component
	pub fn build(&self, services: &ServiceRegistry) -> Rc<dyn AnyComponent> {
		(self.component)(services)
	}
}

impl std::fmt::Debug for RouteEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteEntry")
			.field("path", &self.path)
			.field("requires_auth", &self.options.requires_auth)
			.field("title", &self.options.title)
			.finish()
	}
}
