//! Render/replace lifecycle of component instances.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use rstest::rstest;
use taskdeck_pages::component::{
	AsyncAction, Component, ComponentHandle, ComponentScope, Lifecycle, RenderCx, SetupCx, action,
};
use taskdeck_pages::dom::{Event, Node};
use taskdeck_pages::spawn::{run_until_stalled, sleep};

struct Counter {
	count: u32,
	renders: Rc<Cell<u32>>,
}

impl Component for Counter {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		self.renders.set(self.renders.get() + 1);
		cx.element("button")
			.attr("class", "counter")
			.on("click", |scope, _| scope.update(|c: &mut Counter| c.count += 1))
			.text(self.count.to_string())
			.build()
	}

	fn name() -> &'static str {
		"Counter"
	}
}

fn counter() -> (ComponentHandle<Counter>, Rc<Cell<u32>>) {
	let renders = Rc::new(Cell::new(0));
	let handle = ComponentHandle::new(Counter {
		count: 0,
		renders: Rc::clone(&renders),
	});
	(handle, renders)
}

#[rstest]
fn test_rerender_keeps_position_among_siblings() {
	// Arrange
	let parent = Node::element("div");
	let before = Node::element("span");
	let after = Node::element("span");
	let (handle, _) = counter();
	parent.append_child(&before).unwrap();
	parent.append_child(&handle.root()).unwrap();
	parent.append_child(&after).unwrap();
	let old_root = handle.root();

	// Act
	handle.on_arg_change(|c| c.count = 5);

	// Assert
	let root = handle.root();
	assert!(!root.ptr_eq(&old_root));
	assert!(old_root.parent().is_none());
	assert!(root.parent().unwrap().ptr_eq(&parent));
	assert_eq!(root.index_in_parent(), Some(1));
	assert!(root.next_sibling().unwrap().ptr_eq(&after));
	assert_eq!(root.text_content(), "5");
}

#[rstest]
fn test_rerender_as_last_child_appends() {
	// Arrange
	let parent = Node::element("div");
	parent.append_child(&Node::element("span")).unwrap();
	let (handle, _) = counter();
	parent.append_child(&handle.root()).unwrap();

	// Act
	handle.root().dispatch(&Event::new("click"));

	// Assert
	assert_eq!(handle.root().index_in_parent(), Some(1));
	assert_eq!(parent.child_count(), 2);
	assert_eq!(handle.root().text_content(), "1");
}

#[rstest]
fn test_set_reports_whether_it_applied() {
	// Arrange
	let (handle, renders) = counter();
	let scope = handle.scope();

	// Act
	let applied = scope.set(|c| c.count = 2);
	let nested = scope.with(|_| scope.set(|c| c.count = 7));
	handle.detach();
	let detached = scope.set(|c| c.count = 9);

	// Assert
	assert!(applied);
	assert_eq!(nested, Some(false));
	assert!(!detached);
	assert_eq!(handle.with(|c| c.count), 2);
	assert_eq!(renders.get(), 1);
}

#[rstest]
fn test_lifecycle_transitions() {
	// Arrange
	let (handle, renders) = counter();
	let after_construct = handle.lifecycle();

	// Act
	handle.detach();
	handle.rerender();
	handle.on_arg_change(|c| c.count = 9);

	// Assert
	assert_eq!(after_construct, Lifecycle::Rendered);
	assert_eq!(handle.lifecycle(), Lifecycle::Detached);
	assert_eq!(renders.get(), 1);
	assert_eq!(handle.with(|c| c.count), 0);
}

struct Item {
	clicks: u32,
	seen: Rc<RefCell<Vec<ComponentScope<Item>>>>,
}

impl Component for Item {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("li")
			.on("click", |scope, _| scope.update(|i: &mut Item| i.clicks += 1))
			.text(format!("clicks: {}", self.clicks))
			.build()
	}

	fn name() -> &'static str {
		"Item"
	}

	fn setup(&mut self, cx: &mut SetupCx<'_, Self>) {
		self.seen.borrow_mut().push(cx.scope());
	}
}

struct List {
	title: String,
	seen: Rc<RefCell<Vec<ComponentScope<Item>>>>,
}

impl Component for List {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("section")
			.child(cx.element("h2").text(self.title.clone()).build())
			.child(
				cx.element("ul")
					.child(cx.mount(Item {
						clicks: 0,
						seen: Rc::clone(&self.seen),
					}))
					.build(),
			)
			.build()
	}

	fn name() -> &'static str {
		"List"
	}
}

#[rstest]
fn test_parent_rerender_rebuilds_children_and_discards_their_state() {
	// Arrange
	let seen = Rc::new(RefCell::new(Vec::new()));
	let list = ComponentHandle::new(List {
		title: "Before".to_string(),
		seen: Rc::clone(&seen),
	});
	list.root().find_by_tag("li").unwrap().dispatch(&Event::new("click"));
	let clicked = list.root().find_by_tag("li").unwrap().text_content();

	// Act
	list.on_arg_change(|l| l.title = "After".to_string());

	// Assert
	assert_eq!(clicked, "clicks: 1");
	assert_eq!(list.root().find_by_tag("li").unwrap().text_content(), "clicks: 0");
	assert_eq!(list.root().find_by_tag("h2").unwrap().text_content(), "After");
	let seen = seen.borrow();
	assert_eq!(seen.len(), 2);
	assert!(!seen[0].is_active());
	assert!(seen[1].is_active());
}

#[rstest]
fn test_detaching_parent_detaches_children() {
	// Arrange
	let seen = Rc::new(RefCell::new(Vec::new()));
	let list = ComponentHandle::new(List {
		title: "List".to_string(),
		seen: Rc::clone(&seen),
	});

	// Act
	list.detach();

	// Assert
	assert!(seen.borrow().iter().all(|scope| !scope.is_active()));
}

struct Loader {
	label: String,
	renders: Rc<Cell<u32>>,
}

impl Component for Loader {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		self.renders.set(self.renders.get() + 1);
		cx.element("p").text(self.label.clone()).build()
	}

	fn name() -> &'static str {
		"Loader"
	}

	fn async_actions(&self) -> Vec<AsyncAction<Self>> {
		vec![
			action(|scope: ComponentScope<Loader>| async move {
				sleep(Duration::from_millis(10)).await;
				scope.set(|l| l.label = "loaded".to_string());
			}),
			action(|_scope: ComponentScope<Loader>| async move {
				sleep(Duration::from_millis(20)).await;
			}),
		]
	}
}

fn loader() -> (ComponentHandle<Loader>, Rc<Cell<u32>>) {
	let renders = Rc::new(Cell::new(0));
	let handle = ComponentHandle::new(Loader {
		label: "loading".to_string(),
		renders: Rc::clone(&renders),
	});
	(handle, renders)
}

#[rstest]
fn test_async_batch_forces_one_rerender() {
	// Arrange
	let (handle, renders) = loader();
	let initial = handle.root().text_content();

	// Act
	run_until_stalled();

	// Assert
	assert_eq!(initial, "loading");
	assert_eq!(handle.root().text_content(), "loaded");
	assert_eq!(renders.get(), 2);
}

#[rstest]
fn test_component_without_actions_still_rerenders_once() {
	// Arrange
	let (_handle, renders) = counter();

	// Act
	run_until_stalled();

	// Assert
	assert_eq!(renders.get(), 2);
}

#[rstest]
fn test_async_batch_after_detach_skips_rerender() {
	// Arrange
	let (handle, renders) = loader();

	// Act
	handle.detach();
	run_until_stalled();

	// Assert
	assert_eq!(renders.get(), 1);
	assert_eq!(handle.lifecycle(), Lifecycle::Detached);
}

#[rstest]
fn test_async_batch_after_drop_is_a_no_op() {
	// Arrange
	let (handle, renders) = loader();

	// Act
	drop(handle);
	run_until_stalled();

	// Assert
	assert_eq!(renders.get(), 1);
}
