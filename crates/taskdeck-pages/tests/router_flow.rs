//! Route resolution through guards, authentication and the outlet.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rstest::rstest;
use taskdeck_di::ServiceRegistry;
use taskdeck_pages::component::{Component, RenderCx};
use taskdeck_pages::dom::{Document, Node};
use taskdeck_pages::platform::{Location, MemoryLocation};
use taskdeck_pages::router::{
	GuardOutcome, Resolution, RouteDeclaration, RouteOptions, Router, RouterOutlet,
};

struct Page(&'static str);

impl Component for Page {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("main").text(self.0).build()
	}

	fn name() -> &'static str {
		"Page"
	}
}

type Changes = Rc<RefCell<Vec<(String, Option<String>, String)>>>;

struct Harness {
	location: Rc<MemoryLocation>,
	router: Rc<Router>,
	authenticated: Rc<Cell<bool>>,
	changes: Changes,
}

fn harness(hash: &str) -> Harness {
	let location = Rc::new(MemoryLocation::with_hash(hash));
	let authenticated = Rc::new(Cell::new(false));
	let flag = Rc::clone(&authenticated);
	let router = Router::builder(location.clone())
		.authenticator(Rc::new(move || flag.get()))
		.build();
	router
		.register_routes([
			("/", RouteDeclaration::new(|| Page("login"))),
			(
				"/todos",
				RouteDeclaration::new(|| Page("todos"))
					.with_options(RouteOptions::new().requires_auth().title("Todos")),
			),
			(
				"/about",
				RouteDeclaration::new(|| Page("about"))
					.with_options(RouteOptions::new().title("About")),
			),
		])
		.unwrap();

	let changes: Changes = Rc::new(RefCell::new(Vec::new()));
	let log = Rc::clone(&changes);
	router.on_route_change(move |new_path, previous, route| {
		log.borrow_mut().push((
			new_path.to_string(),
			previous.map(str::to_string),
			route.path().to_string(),
		));
	});

	Harness {
		location,
		router,
		authenticated,
		changes,
	}
}

#[rstest]
fn test_navigation_fires_route_change_once() {
	// Arrange
	let h = harness("/");
	h.router.add_guard(|_, _| GuardOutcome::Allow);
	h.router.start();
	h.changes.borrow_mut().clear();

	// Act
	h.router.navigate("/about", false);

	// Assert
	assert_eq!(
		*h.changes.borrow(),
		vec![("/about".to_string(), Some("/".to_string()), "/about".to_string())]
	);
	assert_eq!(h.location.history_len(), 1);
}

#[rstest]
fn test_unknown_path_lands_on_default_route() {
	// Arrange
	let h = harness("/nowhere");

	// Act
	let resolution = h.router.start();

	// Assert
	assert_eq!(resolution, Resolution::Redirected("/".to_string()));
	assert_eq!(h.router.current_path().as_deref(), Some("/"));
	assert_eq!(h.location.hash(), "/");
	assert_eq!(h.location.history_len(), 0);
}

#[rstest]
fn test_auth_required_route_never_commits_when_unauthenticated() {
	// Arrange
	let h = harness("/");
	h.router.start();

	// Act
	h.router.navigate("/todos", false);

	// Assert
	assert_eq!(h.router.current_path().as_deref(), Some("/"));
	assert!(h.changes.borrow().iter().all(|(path, _, _)| path != "/todos"));
}

#[rstest]
fn test_auth_required_route_commits_when_authenticated() {
	// Arrange
	let h = harness("/");
	h.router.start();
	h.authenticated.set(true);

	// Act
	h.router.navigate("/todos", false);

	// Assert
	assert_eq!(h.router.current_path().as_deref(), Some("/todos"));
}

#[rstest]
fn test_no_authenticator_allows_every_route() {
	// Arrange
	let location = Rc::new(MemoryLocation::with_hash("/secret"));
	let router = Router::builder(location.clone()).build();
	router
		.register_route(
			"/secret",
			RouteDeclaration::new(|| Page("secret"))
				.with_options(RouteOptions::new().requires_auth()),
		)
		.unwrap();

	// Act
	let resolution = router.start();

	// Assert
	assert_eq!(resolution, Resolution::Committed("/secret".to_string()));
}

#[rstest]
fn test_blocking_global_guard_short_circuits() {
	// Arrange
	let h = harness("/");
	h.router.start();
	let later_guard = Rc::new(Cell::new(0));
	let route_guard = Rc::new(Cell::new(0));
	let later = Rc::clone(&later_guard);
	let per_route = Rc::clone(&route_guard);
	h.router.add_guard(|path, _| {
		if path == "/about" {
			GuardOutcome::Block
		} else {
			GuardOutcome::Allow
		}
	});
	h.router.add_guard(move |_, _| {
		later.set(later.get() + 1);
		GuardOutcome::Allow
	});
	h.router
		.register_route(
			"/about",
			RouteDeclaration::new(|| Page("about")).with_options(RouteOptions::new().before_enter(
				move |_, _| {
					per_route.set(per_route.get() + 1);
					GuardOutcome::Allow
				},
			)),
		)
		.unwrap();

	// Act
	h.location.set_hash("/about");

	// Assert
	assert_eq!(h.router.current_path().as_deref(), Some("/"));
	assert_eq!(later_guard.get(), 0);
	assert_eq!(route_guard.get(), 0);
}

#[rstest]
#[case::block(GuardOutcome::Block, "/")]
#[case::redirect(GuardOutcome::RedirectTo("/".to_string()), "/")]
#[case::allow(GuardOutcome::Allow, "/about")]
fn test_before_enter_outcomes(#[case] outcome: GuardOutcome, #[case] expected: &str) {
	// Arrange
	let h = harness("/");
	h.router
		.register_route(
			"/about",
			RouteDeclaration::new(|| Page("about"))
				.with_options(RouteOptions::new().before_enter(move |_, _| outcome.clone())),
		)
		.unwrap();
	h.router.start();

	// Act
	h.router.navigate("/about", false);

	// Assert
	assert_eq!(h.router.current_path().as_deref(), Some(expected));
}

#[rstest]
fn test_set_default_route_changes_fallback() {
	// Arrange
	let h = harness("/missing");
	h.router.set_default_route("/about");

	// Act
	h.router.start();

	// Assert
	assert_eq!(h.router.current_path().as_deref(), Some("/about"));
}

#[rstest]
fn test_outlet_swaps_pages_on_route_change() {
	// Arrange
	let location = Rc::new(MemoryLocation::with_hash("/"));
	let document = Rc::new(Document::new());
	let router = Router::builder(location.clone())
		.document(Rc::clone(&document))
		.build();
	router
		.register_routes([
			("/", RouteDeclaration::new(|| Page("login"))),
			(
				"/about",
				RouteDeclaration::new(|| Page("about"))
					.with_options(RouteOptions::new().title("About")),
			),
		])
		.unwrap();
	let outlet = Rc::new(RouterOutlet::new(
		document.body().clone(),
		ServiceRegistry::new(),
	));
	let target = Rc::clone(&outlet);
	router.on_route_change(move |_, _, route| target.show(route));
	router.start();
	let first = outlet.current().unwrap();

	// Act
	location.set_hash("/about");

	// Assert
	assert_eq!(document.body().inner_html(), "<main>about</main>");
	assert_eq!(document.title(), "Todo App - About");
	assert_eq!(outlet.current_path().as_deref(), Some("/about"));
	assert_eq!(
		first.lifecycle(),
		taskdeck_pages::component::Lifecycle::Detached
	);
	assert!(outlet.current().unwrap().has_services());
}
