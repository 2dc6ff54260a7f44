//! Core Router Implementation.
//!
//! Resolution of a hash change runs in a fixed order: global guards, route
//! lookup, authentication, the per-route guard, then commit. The first
//! check that blocks or redirects ends the resolution. Redirects replace
//! the current history entry, which re-enters resolution for the new path.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use taskdeck_core::{Authenticator, debug_log, info_log, warn_log};
use taskdeck_di::Service;
use thiserror::Error;

use super::route::{Guard, GuardOutcome, RouteDeclaration, RouteEntry};
use crate::dom::Document;
use crate::platform::{HashListenerId, Location};

/// Invoked after a route is committed with `(new_path, previous_path, route)`.
pub type RouteChangeHook = Rc<dyn Fn(&str, Option<&str>, &RouteEntry)>;

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// Route paths must start with `/`.
	#[error("Invalid route path: {0}")]
	InvalidPath(String),
	/// Route not found.
	#[error("Route not found: {0}")]
	NotFound(String),
}

/// How a hash change was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// The route became current
	Committed(String),
	/// A guard blocked the transition
	Blocked,
	/// Navigation was redirected to the given path
	Redirected(String),
}

/// Builder for [`Router`].
pub struct RouterBuilder {
	location: Rc<dyn Location>,
	document: Option<Rc<Document>>,
	authenticator: Option<Rc<dyn Authenticator>>,
	default_route: String,
	title_prefix: String,
}

impl RouterBuilder {
	/// Sets the document whose title the router maintains
	pub fn document(mut self, document: Rc<Document>) -> Self {
		self.document = Some(document);
		self
	}

	/// Sets the capability consulted for routes requiring authentication
	pub fn authenticator(mut self, authenticator: Rc<dyn Authenticator>) -> Self {
		self.authenticator = Some(authenticator);
		self
	}

	/// Sets the route used for empty and unknown paths
	pub fn default_route(mut self, path: impl Into<String>) -> Self {
		self.default_route = path.into();
		self
	}

	/// Sets the text placed before route titles
	pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.title_prefix = prefix.into();
		self
	}

	/// Builds the router; call [`Router::start`] to begin listening
	pub fn build(self) -> Rc<Router> {
		Rc::new_cyclic(|this| Router {
			location: self.location,
			document: self.document,
			authenticator: self.authenticator,
			routes: RefCell::new(Vec::new()),
			guards: RefCell::new(Vec::new()),
			current: RefCell::new(None),
			default_route: RefCell::new(self.default_route),
			title_prefix: self.title_prefix,
			hook: RefCell::new(None),
			listener: Cell::new(None),
			this: this.clone(),
		})
	}
}

/// Hash router with global and per-route guards.
pub struct Router {
	location: Rc<dyn Location>,
	document: Option<Rc<Document>>,
	authenticator: Option<Rc<dyn Authenticator>>,
	routes: RefCell<Vec<RouteEntry>>,
	guards: RefCell<Vec<Guard>>,
	current: RefCell<Option<String>>,
	default_route: RefCell<String>,
	title_prefix: String,
	hook: RefCell<Option<RouteChangeHook>>,
	listener: Cell<Option<HashListenerId>>,
	this: Weak<Router>,
}

impl Router {
	/// Starts building a router over `location`
	pub fn builder(location: Rc<dyn Location>) -> RouterBuilder {
		RouterBuilder {
			location,
			document: None,
			authenticator: None,
			default_route: "/".to_string(),
			title_prefix: "Todo App".to_string(),
		}
	}

	/// Listens for hash changes and resolves the current hash
	pub fn start(&self) -> Resolution {
		if self.listener.get().is_none() {
			let this = self.this.clone();
			let id = self.location.on_hash_change(Rc::new(move || {
				if let Some(router) = this.upgrade() {
					router.handle_hash_change();
				}
			}));
			self.listener.set(Some(id));
		}
		self.handle_hash_change()
	}

	/// Stops listening for hash changes
	pub fn destroy(&self) {
		if let Some(id) = self.listener.take() {
			self.location.remove_listener(id);
			debug_log!("Router stopped listening for hash changes");
		}
	}

	/// Registers a route, replacing any route with the same path
	pub fn register_route(
		&self,
		path: &str,
		declaration: RouteDeclaration,
	) -> Result<(), RouterError> {
		if !path.starts_with('/') {
			return Err(RouterError::InvalidPath(path.to_string()));
		}
		let entry = RouteEntry::new(path.to_string(), declaration);
		let mut routes = self.routes.borrow_mut();
		match routes.iter_mut().find(|r| r.path() == path) {
			Some(existing) => {
				debug_log!("Replacing route {}", path);
				*existing = entry;
			}
			None => routes.push(entry),
		}
		Ok(())
	}

	/// Registers several routes; stops at the first invalid path
	pub fn register_routes<I, P>(&self, routes: I) -> Result<(), RouterError>
	where
		I: IntoIterator<Item = (P, RouteDeclaration)>,
		P: AsRef<str>,
	{
		for (path, declaration) in routes {
			self.register_route(path.as_ref(), declaration)?;
		}
		Ok(())
	}

	/// Appends a global guard
	pub fn add_guard<G>(&self, guard: G)
	where
		G: Fn(&str, Option<&str>) -> GuardOutcome + 'static,
	{
		self.guards.borrow_mut().push(Rc::new(guard));
	}

	/// Sets the hook invoked after every committed route change
	pub fn on_route_change<F>(&self, hook: F)
	where
		F: Fn(&str, Option<&str>, &RouteEntry) + 'static,
	{
		*self.hook.borrow_mut() = Some(Rc::new(hook));
	}

	/// Sets the route used for empty and unknown paths
	pub fn set_default_route(&self, path: impl Into<String>) {
		*self.default_route.borrow_mut() = path.into();
	}

	/// The route used for empty and unknown paths
	pub fn default_route(&self) -> String {
		self.default_route.borrow().clone()
	}

	/// The route registered for `path`
	pub fn route(&self, path: &str) -> Option<RouteEntry> {
		self.routes.borrow().iter().find(|r| r.path() == path).cloned()
	}

	/// Like [`Router::route`], as an error when missing
	pub fn try_route(&self, path: &str) -> Result<RouteEntry, RouterError> {
		self.route(path)
			.ok_or_else(|| RouterError::NotFound(path.to_string()))
	}

	/// All routes in registration order
	pub fn routes(&self) -> Vec<RouteEntry> {
		self.routes.borrow().clone()
	}

	/// Whether a route is registered for `path`
	pub fn route_exists(&self, path: &str) -> bool {
		self.routes.borrow().iter().any(|r| r.path() == path)
	}

	/// The committed path, if any
	pub fn current_path(&self) -> Option<String> {
		self.current.borrow().clone()
	}

	/// Path requested by the location hash, or the default route
	pub fn requested_path(&self) -> String {
		let hash = self.location.hash();
		if hash.is_empty() {
			self.default_route()
		} else {
			hash
		}
	}

	/// Navigates to `path`; `replace` does not add a history entry
	pub fn navigate(&self, path: &str, replace: bool) {
		debug_log!("Navigating to {} (replace: {})", path, replace);
		if replace {
			self.location.replace_hash(path);
		} else {
			self.location.set_hash(path);
		}
	}

	/// Resolves the current hash
	pub fn handle_hash_change(&self) -> Resolution {
		let new_path = self.requested_path();
		let previous = self.current_path();

		let guards = self.guards.borrow().clone();
		for guard in guards {
			if let Some(resolution) = self.apply_guard(&guard, &new_path, previous.as_deref()) {
				return resolution;
			}
		}

		let Some(route) = self.route(&new_path) else {
			let fallback = self.default_route();
			warn_log!("Unknown route {}, redirecting to {}", new_path, fallback);
			self.navigate(&fallback, true);
			return Resolution::Redirected(fallback);
		};

		if route.requires_auth() && !self.is_authenticated() {
			let fallback = self.default_route();
			info_log!("Route {} requires authentication, redirecting", new_path);
			self.navigate(&fallback, true);
			return Resolution::Redirected(fallback);
		}

		if let Some(guard) = route.before_enter()
			&& let Some(resolution) = self.apply_guard(&guard, &new_path, previous.as_deref())
		{
			return resolution;
		}

		*self.current.borrow_mut() = Some(new_path.clone());
		if let (Some(title), Some(document)) = (route.title(), &self.document) {
			document.set_title(&format!("{} - {}", self.title_prefix, title));
		}
		debug_log!("Route committed: {}", new_path);

		let hook = self.hook.borrow().clone();
		if let Some(hook) = hook {
			hook(&new_path, previous.as_deref(), &route);
		}
		Resolution::Committed(new_path)
	}

	fn apply_guard(
		&self,
		guard: &Guard,
		new_path: &str,
		previous: Option<&str>,
	) -> Option<Resolution> {
		match guard(new_path, previous) {
			GuardOutcome::Allow => None,
			GuardOutcome::Block => {
				debug_log!("Navigation to {} blocked", new_path);
				Some(Resolution::Blocked)
			}
			GuardOutcome::RedirectTo(target) => {
				self.navigate(&target, true);
				Some(Resolution::Redirected(target))
			}
		}
	}

	fn is_authenticated(&self) -> bool {
		self.authenticator
			.as_ref()
			.is_none_or(|auth| auth.is_authenticated())
	}
}

impl Drop for Router {
	fn drop(&mut self) {
		self.destroy();
	}
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.routes.borrow().len())
			.field("guards", &self.guards.borrow().len())
			.field("current", &*self.current.borrow())
			.field("default_route", &*self.default_route.borrow())
			.finish()
	}
}

impl Service for Router {
	fn service_name() -> &'static str {
		"RouterService"
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::router::route::RouteOptions;
	use crate::component::{Component, RenderCx};
	use crate::dom::Node;
	use crate::platform::MemoryLocation;

	struct Page;

	impl Component for Page {
		fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
			cx.element("main").build()
		}

		fn name() -> &'static str {
			"Page"
		}
	}

	fn router_at(hash: &str) -> (Rc<MemoryLocation>, Rc<Router>) {
		let location = Rc::new(MemoryLocation::with_hash(hash));
		let router = Router::builder(location.clone()).build();
		(location, router)
	}

	#[rstest]
	#[case::relative("todos")]
	#[case::empty("")]
	fn test_register_route_rejects_paths_without_slash(#[case] path: &str) {
		// Arrange
		let (_, router) = router_at("");

		// Act
		let result = router.register_route(path, RouteDeclaration::new(|| Page));

		// Assert
		assert_eq!(result, Err(RouterError::InvalidPath(path.to_string())));
	}

	#[rstest]
	fn test_route_queries() {
		// Arrange
		let (_, router) = router_at("");
		router
			.register_routes([
				("/", RouteDeclaration::new(|| Page)),
				(
					"/about",
					RouteDeclaration::new(|| Page).with_options(RouteOptions::new().title("About")),
				),
			])
			.unwrap();

		// Act
		let paths: Vec<String> = router.routes().iter().map(|r| r.path().to_string()).collect();

		// Assert
		assert_eq!(paths, vec!["/", "/about"]);
		assert!(router.route_exists("/about"));
		assert!(!router.route_exists("/missing"));
		assert_eq!(router.route("/about").unwrap().title(), Some("About"));
		assert_eq!(
			router.try_route("/missing").unwrap_err(),
			RouterError::NotFound("/missing".to_string())
		);
	}

	#[rstest]
	fn test_empty_hash_resolves_default_route() {
		// Arrange
		let (_, router) = router_at("");
		router.register_route("/", RouteDeclaration::new(|| Page)).unwrap();

		// Act
		let resolution = router.handle_hash_change();

		// Assert
		assert_eq!(resolution, Resolution::Committed("/".to_string()));
		assert_eq!(router.current_path().as_deref(), Some("/"));
	}

	#[rstest]
	fn test_redirecting_guard_replaces_history() {
		// Arrange
		let (location, router) = router_at("/old");
		router.register_route("/new", RouteDeclaration::new(|| Page)).unwrap();
		router.add_guard(|path, _| match path {
			"/old" => GuardOutcome::RedirectTo("/new".to_string()),
			_ => GuardOutcome::Allow,
		});

		// Act
		let resolution = router.start();

		// Assert
		assert_eq!(resolution, Resolution::Redirected("/new".to_string()));
		assert_eq!(router.current_path().as_deref(), Some("/new"));
		assert_eq!(location.history_len(), 0);
	}

	#[rstest]
	fn test_title_set_only_when_route_declares_one() {
		// Arrange
		let location = Rc::new(MemoryLocation::with_hash("/plain"));
		let document = Rc::new(Document::new());
		document.set_title("Initial");
		let router = Router::builder(location.clone())
			.document(Rc::clone(&document))
			.title_prefix("Tasks")
			.build();
		router
			.register_routes([
				("/plain", RouteDeclaration::new(|| Page)),
				(
					"/titled",
					RouteDeclaration::new(|| Page).with_options(RouteOptions::new().title("Titled")),
				),
			])
			.unwrap();

		// Act
		router.start();
		let before = document.title();
		router.navigate("/titled", false);

		// Assert
		assert_eq!(before, "Initial");
		assert_eq!(document.title(), "Tasks - Titled");
	}

	#[rstest]
	fn test_destroy_stops_listening() {
		// Arrange
		let (location, router) = router_at("/");
		router.register_route("/", RouteDeclaration::new(|| Page)).unwrap();
		router.register_route("/about", RouteDeclaration::new(|| Page)).unwrap();
		router.start();

		// Act
		router.destroy();
		location.set_hash("/about");

		// Assert
		assert_eq!(router.current_path().as_deref(), Some("/"));
		assert_eq!(location.listener_count(), 0);
	}
}
