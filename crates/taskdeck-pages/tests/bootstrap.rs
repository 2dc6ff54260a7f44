//! Mounting root components with `create_app`.

use std::rc::Rc;

use rstest::rstest;
use serde_json::json;
use taskdeck_core::Store;
use taskdeck_di::{Service, ServiceError, ServiceRegistry};
use taskdeck_pages::app::{create_app, root};
use taskdeck_pages::component::{Component, RenderCx, SetupCx};
use taskdeck_pages::dom::Node;

struct Title;

impl Component for Title {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("h1").text("Todos").build()
	}

	fn name() -> &'static str {
		"Title"
	}
}

struct Count {
	count: usize,
}

impl Component for Count {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("p").text(self.count.to_string()).build()
	}

	fn name() -> &'static str {
		"Count"
	}

	fn setup(&mut self, cx: &mut SetupCx<'_, Self>) {
		cx.subscribe_store("todos", Vec::<serde_json::Value>::new(), |c, todos| {
			c.count = todos.len();
		});
	}
}

struct Broken;

impl Service for Broken {
	fn service_name() -> &'static str {
		"Broken"
	}
}

#[rstest]
fn test_create_app_mounts_roots_in_order_under_app_div() {
	// Arrange
	let container = Node::element("body");
	let services = ServiceRegistry::builder()
		.service(|_| Ok(Store::new()))
		.service::<Broken, _>(|_| Err(ServiceError::construction("Broken", "no backend")));

	// Act
	let app = create_app(&container, vec![root(Title), root(Count { count: 0 })], services);

	// Assert
	assert_eq!(
		container.inner_html(),
		r#"<div class="app"><h1>Todos</h1><p>0</p></div>"#
	);
	assert_eq!(app.roots().len(), 2);
	assert!(app.services().contains::<Store>());
	assert!(!app.services().contains::<Broken>());
}

#[rstest]
fn test_roots_share_the_prebuilt_registry() {
	// Arrange
	let container = Node::element("body");
	let registry = ServiceRegistry::new();
	let store: Rc<Store> = registry.insert(Store::new());

	// Act
	let app = create_app(&container, vec![root(Count { count: 0 })], registry.clone());
	store.add("todos", json!({ "task": "X" }));

	// Assert
	let count = app.root::<Count>().unwrap();
	assert_eq!(count.with(|c| c.count), 1);
	assert_eq!(app.node().find_by_tag("p").unwrap().text_content(), "1");
	assert!(count.services().unwrap().ptr_eq(&registry));
	assert!(app.root::<Title>().is_none());
}

#[rstest]
fn test_unmount_detaches_roots() {
	// Arrange
	let container = Node::element("body");
	let registry = ServiceRegistry::new();
	let store = registry.insert(Store::new());
	let app = create_app(&container, vec![root(Count { count: 0 })], registry);

	// Act
	app.unmount();

	// Assert
	assert_eq!(container.child_count(), 0);
	assert_eq!(store.subscriber_count("todos"), 0);
}
