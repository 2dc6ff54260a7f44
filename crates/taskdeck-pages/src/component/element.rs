//! Element construction
//!
//! [`ElementBuilder`] applies the attribute and child rules of the
//! runtime: `on*` attributes carrying a [`Handler`] become listeners bound
//! to the rendering instance, absent values are omitted, presence values
//! become empty attributes, text is escaped and markup is not. Malformed
//! input is logged and skipped.

use std::rc::Rc;

use taskdeck_core::warn_log;

use super::cx::RenderCx;
use super::instance::{ComponentHandle, ComponentScope};
use super::{AnyComponent, Component, Lifecycle};
use crate::dom::{Event, Node};

/// Event handler bound to a component instance.
pub type Handler<C> = Rc<dyn Fn(&ComponentScope<C>, &Event)>;

/// Value of an element attribute.
pub enum AttrValue<C: Component> {
	/// Not set
	Absent,
	/// Set with an empty value (`disabled`, `checked`)
	Present,
	/// Set to the given text
	Literal(String),
	/// Event handler, valid on `on*` attributes only
	Handler(Handler<C>),
}

impl<C: Component> Clone for AttrValue<C> {
	fn clone(&self) -> Self {
		match self {
			Self::Absent => Self::Absent,
			Self::Present => Self::Present,
			Self::Literal(value) => Self::Literal(value.clone()),
			Self::Handler(handler) => Self::Handler(Rc::clone(handler)),
		}
	}
}

impl<C: Component> std::fmt::Debug for AttrValue<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Absent => f.write_str("Absent"),
			Self::Present => f.write_str("Present"),
			Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
			Self::Handler(_) => f.write_str("Handler(<function>)"),
		}
	}
}

impl<C: Component> From<bool> for AttrValue<C> {
	fn from(value: bool) -> Self {
		if value {
			Self::Present
		} else {
			Self::Literal("false".to_string())
		}
	}
}

impl<C: Component> From<&str> for AttrValue<C> {
	fn from(value: &str) -> Self {
		Self::Literal(value.to_string())
	}
}

impl<C: Component> From<String> for AttrValue<C> {
	fn from(value: String) -> Self {
		Self::Literal(value)
	}
}

impl<C: Component> From<&String> for AttrValue<C> {
	fn from(value: &String) -> Self {
		Self::Literal(value.clone())
	}
}

macro_rules! attr_from_number {
	($($ty:ty),*) => {
		$(
			impl<C: Component> From<$ty> for AttrValue<C> {
				fn from(value: $ty) -> Self {
					Self::Literal(value.to_string())
				}
			}
		)*
	};
}

attr_from_number!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<C: Component, T: Into<AttrValue<C>>> From<Option<T>> for AttrValue<C> {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Absent, Into::into)
	}
}

/// A child passed to an element.
pub enum Child {
	/// A component; contributes its current root node
	Component(Rc<dyn AnyComponent>),
	/// Raw markup, inserted unescaped
	Markup(String),
	/// Text, escaped on output
	Text(String),
	/// A built node, appended as-is
	Node(Node),
	/// Nothing
	Skip,
}

impl std::fmt::Debug for Child {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Component(c) => f.debug_tuple("Component").field(&c.component_name()).finish(),
			Self::Markup(m) => f.debug_tuple("Markup").field(m).finish(),
			Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
			Self::Node(n) => f.debug_tuple("Node").field(n).finish(),
			Self::Skip => f.write_str("Skip"),
		}
	}
}

impl From<&str> for Child {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for Child {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<Node> for Child {
	fn from(value: Node) -> Self {
		Self::Node(value)
	}
}

impl<K: Component> From<ComponentHandle<K>> for Child {
	fn from(value: ComponentHandle<K>) -> Self {
		Self::Component(value.into_any())
	}
}

impl<T: Into<Child>> From<Option<T>> for Child {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Skip, Into::into)
	}
}

/// Builder for one element, created by [`RenderCx::element`].
pub struct ElementBuilder<'cx, C: Component> {
	cx: &'cx RenderCx<'cx, C>,
	node: Node,
}

impl<'cx, C: Component> ElementBuilder<'cx, C> {
	pub(super) fn new(cx: &'cx RenderCx<'cx, C>, tag: &str) -> Self {
		Self {
			cx,
			node: Node::element(tag),
		}
	}

	/// Sets an attribute
	pub fn attr(self, name: &str, value: impl Into<AttrValue<C>>) -> Self {
		self.apply_attr(name, value.into());
		self
	}

	/// Sets an attribute only when `condition` holds
	pub fn attr_if(self, condition: bool, name: &str, value: impl Into<AttrValue<C>>) -> Self {
		if condition { self.attr(name, value) } else { self }
	}

	/// Attaches a listener for `event`
	pub fn on(self, event: &str, handler: impl Fn(&ComponentScope<C>, &Event) + 'static) -> Self {
		let handler: Handler<C> = Rc::new(handler);
		self.apply_attr(&format!("on{}", event), AttrValue::Handler(handler));
		self
	}

	/// Appends a child
	pub fn child(self, child: impl Into<Child>) -> Self {
		self.append(child.into());
		self
	}

	/// Appends children in order
	pub fn children<I>(self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<Child>,
	{
		for child in children {
			self.append(child.into());
		}
		self
	}

	/// Appends escaped text
	pub fn text(self, text: impl Into<String>) -> Self {
		self.child(Child::Text(text.into()))
	}

	/// Appends raw markup
	pub fn markup(self, markup: impl Into<String>) -> Self {
		self.child(Child::Markup(markup.into()))
	}

	/// Finishes the element
	pub fn build(self) -> Node {
		self.node
	}

	fn apply_attr(&self, name: &str, value: AttrValue<C>) {
		let is_event = name.len() > 2 && name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on"));
		match value {
			AttrValue::Absent => {}
			AttrValue::Handler(handler) if is_event => {
				let event = name[2..].to_lowercase();
				let scope = self.cx.scope();
				self.node.add_event_listener(&event, move |e| {
					if scope.is_active() {
						handler(&scope, e);
					}
				});
			}
			AttrValue::Handler(_) => {
				warn_log!(
					"<{}>: handler given for non-event attribute '{}', skipping",
					self.tag(),
					name
				);
			}
			_ if is_event => {
				warn_log!(
					"<{}>: event attribute '{}' needs a handler, skipping",
					self.tag(),
					name
				);
			}
			AttrValue::Present => self.node.set_attribute(name, ""),
			AttrValue::Literal(value) => self.node.set_attribute(name, value),
		}
	}

	fn append(&self, child: Child) {
		match child {
			Child::Skip => {}
			Child::Text(text) => self.append_node(&Node::text(text)),
			Child::Markup(markup) => self.append_node(&Node::markup(markup)),
			Child::Node(node) => self.append_node(&node),
			Child::Component(component) => self.append_component(component),
		}
	}

	fn append_component(&self, component: Rc<dyn AnyComponent>) {
		if component.lifecycle() == Lifecycle::Detached {
			warn_log!(
				"<{}>: child component {} is detached, skipping",
				self.tag(),
				component.component_name()
			);
			return;
		}
		if !component.has_services()
			&& let Some(services) = self.cx.services()
		{
			component.inject_services(services);
		}
		let root = component.root();
		match self.node.append_child(&root) {
			Ok(()) => self.cx.adopt(component),
			Err(e) => warn_log!(
				"<{}>: cannot append component {}: {}",
				self.tag(),
				component.component_name(),
				e
			),
		}
	}

	fn append_node(&self, node: &Node) {
		if let Err(e) = self.node.append_child(node) {
			warn_log!("<{}>: skipping child: {}", self.tag(), e);
		}
	}

	fn tag(&self) -> String {
		self.node.tag().unwrap_or_default()
	}
}
