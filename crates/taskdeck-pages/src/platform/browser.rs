//! Browser bindings (WASM only)
//!
//! [`BrowserLocation`] wraps `window.location` and the `hashchange` event.
//! [`BrowserMount`] projects an in-memory [`Node`] tree into a real DOM
//! container and forwards DOM events back to the in-memory listeners.
//! Mutations are batched to one [`Projection::sync`] per microtask, which
//! only touches the DOM nodes whose in-memory counterparts changed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use taskdeck_core::{debug_log, error_log, warn_log};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use super::{HashListenerId, Location, Projection, ProjectionTarget};
use crate::dom::{self, Event, Node};

type DomClosure = Closure<dyn FnMut(web_sys::Event)>;

/// `window.location` as a [`Location`].
pub struct BrowserLocation {
	window: web_sys::Window,
	listeners: RefCell<Vec<(HashListenerId, DomClosure)>>,
	next_id: Cell<HashListenerId>,
}

impl BrowserLocation {
	/// Binds to the current window
	pub fn new() -> Option<Self> {
		Some(Self {
			window: web_sys::window()?,
			listeners: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
		})
	}
}

impl Location for BrowserLocation {
	fn hash(&self) -> String {
		let hash = self.window.location().hash().unwrap_or_default();
		hash.strip_prefix('#').unwrap_or(&hash).to_string()
	}

	fn set_hash(&self, path: &str) {
		if let Err(e) = self.window.location().set_hash(path) {
			error_log!("Failed to set location hash: {:?}", e);
		}
	}

	fn replace_hash(&self, path: &str) {
		let location = self.window.location();
		let pathname = location.pathname().unwrap_or_default();
		let search = location.search().unwrap_or_default();
		if let Err(e) = location.replace(&format!("{}{}#{}", pathname, search, path)) {
			error_log!("Failed to replace location: {:?}", e);
		}
	}

	fn on_hash_change(&self, listener: Rc<dyn Fn()>) -> HashListenerId {
		let id = self.next_id.get();
		self.next_id.set(id + 1);

		let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
			listener();
		}) as Box<dyn FnMut(_)>);
		if let Err(e) = self
			.window
			.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())
		{
			error_log!("Failed to listen for hashchange: {:?}", e);
		}
		self.listeners.borrow_mut().push((id, closure));
		id
	}

	fn remove_listener(&self, id: HashListenerId) {
		let mut listeners = self.listeners.borrow_mut();
		if let Some(index) = listeners.iter().position(|(l, _)| *l == id) {
			let (_, closure) = listeners.remove(index);
			let _ = self.window.remove_event_listener_with_callback(
				"hashchange",
				closure.as_ref().unchecked_ref(),
			);
		}
	}
}

/// Writes a [`Projection`] into the browser DOM.
struct DomTarget {
	document: web_sys::Document,
}

impl ProjectionTarget for DomTarget {
	type Handle = web_sys::Node;
	type Listener = DomClosure;

	fn create_element(&self, tag: &str) -> Option<web_sys::Node> {
		match self.document.create_element(tag) {
			Ok(element) => Some(element.unchecked_into()),
			Err(e) => {
				error_log!("Failed to create <{}>: {:?}", tag, e);
				None
			}
		}
	}

	fn create_text(&self, text: &str) -> Option<web_sys::Node> {
		Some(self.document.create_text_node(text).unchecked_into())
	}

	fn create_markup(&self, markup: &str) -> Option<web_sys::Node> {
		let holder = self.create_element("span")?;
		holder.unchecked_ref::<web_sys::Element>().set_inner_html(markup);
		Some(holder)
	}

	fn set_attribute(&self, element: &web_sys::Node, name: &str, value: &str) {
		if let Some(element) = element.dyn_ref::<web_sys::Element>()
			&& let Err(e) = element.set_attribute(name, value)
		{
			warn_log!("Failed to set attribute '{}': {:?}", name, e);
		}
	}

	fn remove_attribute(&self, element: &web_sys::Node, name: &str) {
		if let Some(element) = element.dyn_ref::<web_sys::Element>() {
			let _ = element.remove_attribute(name);
		}
	}

	fn insert_before(&self, parent: &web_sys::Node, child: &web_sys::Node, reference: Option<&web_sys::Node>) {
		if let Err(e) = parent.insert_before(child, reference) {
			error_log!("Failed to insert node: {:?}", e);
		}
	}

	fn remove_child(&self, parent: &web_sys::Node, child: &web_sys::Node) {
		if child.parent_node().is_some_and(|p| p == *parent) {
			let _ = parent.remove_child(child);
		}
	}

	fn listen(&self, element: &web_sys::Node, kind: &str, source: &Node) -> Option<DomClosure> {
		let source = source.clone();
		let event_kind = kind.to_string();
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			let forwarded = translate_event(&event_kind, &event);
			source.dispatch(&forwarded);
			if forwarded.is_default_prevented() {
				event.prevent_default();
			}
		}) as Box<dyn FnMut(_)>);
		match element.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
			Ok(()) => Some(closure),
			Err(e) => {
				error_log!("Failed to listen for {}: {:?}", kind, e);
				None
			}
		}
	}

	fn unlisten(&self, element: &web_sys::Node, kind: &str, listener: DomClosure) {
		let _ = element.remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
	}
}

/// Keeps a real DOM container in sync with an in-memory tree.
pub struct BrowserMount {
	projection: RefCell<Projection<DomTarget>>,
	scheduled: Cell<bool>,
}

impl BrowserMount {
	/// Mirrors the children of `root` into the element with id `container_id`
	pub fn attach(root: Node, container_id: &str) -> Option<Rc<Self>> {
		let document = web_sys::window()?.document()?;
		let Some(container) = document.get_element_by_id(container_id) else {
			warn_log!("Mount point #{} not found", container_id);
			return None;
		};
		container.set_inner_html("");

		let mount = Rc::new(Self {
			projection: RefCell::new(Projection::new(
				DomTarget { document },
				root,
				container.unchecked_into(),
			)),
			scheduled: Cell::new(false),
		});

		let weak: Weak<Self> = Rc::downgrade(&mount);
		dom::set_mutation_hook(Some(Rc::new(move || {
			if let Some(mount) = weak.upgrade() {
				mount.schedule();
			}
		})));
		mount.render();
		Some(mount)
	}

	fn schedule(self: &Rc<Self>) {
		if self.scheduled.replace(true) {
			return;
		}
		let this = Rc::clone(self);
		wasm_bindgen_futures::spawn_local(async move {
			this.scheduled.set(false);
			this.render();
		});
	}

	/// Applies the in-memory changes since the last render to the real DOM
	pub fn render(&self) {
		match self.projection.try_borrow_mut() {
			Ok(mut projection) => projection.sync(),
			Err(_) => debug_log!("Projection busy, render skipped"),
		}
	}
}

impl Drop for BrowserMount {
	fn drop(&mut self) {
		dom::set_mutation_hook(None);
	}
}

fn translate_event(kind: &str, event: &web_sys::Event) -> Event {
	let mut forwarded = Event::new(kind);
	if let Some(target) = event.target() {
		if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
			forwarded = forwarded.with_value(input.value()).with_checked(input.checked());
		} else if let Some(area) = target.dyn_ref::<web_sys::HtmlTextAreaElement>() {
			forwarded = forwarded.with_value(area.value());
		} else if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
			forwarded = forwarded.with_value(select.value());
		}
	}
	if let Some(keyboard) = event.dyn_ref::<web_sys::KeyboardEvent>() {
		forwarded = forwarded.with_key(keyboard.key());
	}
	forwarded
}
