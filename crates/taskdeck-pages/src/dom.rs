//! In-memory document tree
//!
//! Components render into [`Node`]s rather than directly into the browser
//! DOM. The tree supports the handful of operations the runtime needs
//! (append, insert-before, remove, attributes, listeners) and serializes to
//! HTML, which is what native tests assert against. In the browser the
//! tree is projected onto the real DOM by [`crate::platform::browser`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use thiserror::Error;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Errors raised by tree mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
	/// The node would become its own ancestor
	#[error("Inserting the node would create a cycle")]
	HierarchyCycle,
	/// Only elements can have children
	#[error("Node of kind {0} cannot have children")]
	NotAnElement(&'static str),
	/// The reference node is not a child of the parent
	#[error("Reference node is not a child of this node")]
	NotAChild,
}

/// Identifies a registered event listener.
pub type ListenerId = u64;

type Listener = Rc<dyn Fn(&Event)>;

thread_local! {
	static NEXT_LISTENER_ID: Cell<ListenerId> = const { Cell::new(0) };
	static MUTATION_HOOK: RefCell<Option<Rc<dyn Fn()>>> = const { RefCell::new(None) };
}

/// Installs a callback run after every tree mutation
pub fn set_mutation_hook(hook: Option<Rc<dyn Fn()>>) {
	MUTATION_HOOK.with(|slot| *slot.borrow_mut() = hook);
}

fn notify_mutation() {
	let hook = MUTATION_HOOK.with(|slot| slot.borrow().clone());
	if let Some(hook) = hook {
		hook();
	}
}

enum NodeKind {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
	},
	Text(String),
	Markup(String),
}

struct NodeData {
	kind: NodeKind,
	parent: Weak<RefCell<NodeData>>,
	children: Vec<Node>,
	listeners: Vec<(String, ListenerId, Listener)>,
}

/// A node of the document tree.
///
/// Cloning yields another handle to the same node.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
	fn from_kind(kind: NodeKind) -> Self {
		Self(Rc::new(RefCell::new(NodeData {
			kind,
			parent: Weak::new(),
			children: Vec::new(),
			listeners: Vec::new(),
		})))
	}

	/// Creates an element
	pub fn element(tag: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Element {
			tag: tag.into().to_lowercase(),
			attributes: Vec::new(),
		})
	}

	/// Creates a text node; its content is escaped when serialized
	pub fn text(content: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Text(content.into()))
	}

	/// Creates a raw markup node; its content is emitted verbatim
	pub fn markup(content: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Markup(content.into()))
	}

	/// Tag name of an element
	pub fn tag(&self) -> Option<String> {
		match &self.0.borrow().kind {
			NodeKind::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	/// Whether this node is an element
	pub fn is_element(&self) -> bool {
		matches!(self.0.borrow().kind, NodeKind::Element { .. })
	}

	/// Raw content of a markup node
	pub fn markup_content(&self) -> Option<String> {
		match &self.0.borrow().kind {
			NodeKind::Markup(content) => Some(content.clone()),
			_ => None,
		}
	}

	fn kind_name(&self) -> &'static str {
		match self.0.borrow().kind {
			NodeKind::Element { .. } => "element",
			NodeKind::Text(_) => "text",
			NodeKind::Markup(_) => "markup",
		}
	}

	/// Sets an attribute, replacing an existing value. Ignored on non-elements.
	pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
		{
			let mut data = self.0.borrow_mut();
			let NodeKind::Element { attributes, .. } = &mut data.kind else {
				return;
			};
			let value = value.into();
			match attributes.iter_mut().find(|(n, _)| n == name) {
				Some(slot) => slot.1 = value,
				None => attributes.push((name.to_string(), value)),
			}
		}
		notify_mutation();
	}

	/// Removes an attribute
	pub fn remove_attribute(&self, name: &str) {
		{
			let mut data = self.0.borrow_mut();
			if let NodeKind::Element { attributes, .. } = &mut data.kind {
				attributes.retain(|(n, _)| n != name);
			}
		}
		notify_mutation();
	}

	/// Value of an attribute
	pub fn attribute(&self, name: &str) -> Option<String> {
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes
				.iter()
				.find(|(n, _)| n == name)
				.map(|(_, v)| v.clone()),
			_ => None,
		}
	}

	/// Whether an attribute is present
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attribute(name).is_some()
	}

	/// All attributes in insertion order
	pub fn attributes(&self) -> Vec<(String, String)> {
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.clone(),
			_ => Vec::new(),
		}
	}

	/// Whether the `class` attribute contains `class`
	pub fn has_class(&self, class: &str) -> bool {
		self.attribute("class")
			.is_some_and(|value| value.split_whitespace().any(|c| c == class))
	}

	/// Registers a listener for events of `kind`
	pub fn add_event_listener<F>(&self, kind: &str, listener: F) -> ListenerId
	where
		F: Fn(&Event) + 'static,
	{
		let id = NEXT_LISTENER_ID.with(|next| {
			let id = next.get();
			next.set(id + 1);
			id
		});
		self.0
			.borrow_mut()
			.listeners
			.push((kind.to_lowercase(), id, Rc::new(listener)));
		id
	}

	/// Removes a listener
	pub fn remove_event_listener(&self, id: ListenerId) {
		self.0.borrow_mut().listeners.retain(|(_, l, _)| *l != id);
	}

	/// Event kinds with at least one listener
	pub fn listener_kinds(&self) -> Vec<String> {
		let data = self.0.borrow();
		let mut kinds: Vec<String> = Vec::new();
		for (kind, _, _) in &data.listeners {
			if !kinds.contains(kind) {
				kinds.push(kind.clone());
			}
		}
		kinds
	}

	/// Invokes every listener for the event's kind, returning how many ran
	pub fn dispatch(&self, event: &Event) -> usize {
		let listeners: Vec<Listener> = self
			.0
			.borrow()
			.listeners
			.iter()
			.filter(|(kind, _, _)| *kind == event.kind())
			.map(|(_, _, listener)| Rc::clone(listener))
			.collect();
		for listener in &listeners {
			listener(event);
		}
		listeners.len()
	}

	/// Parent node
	pub fn parent(&self) -> Option<Node> {
		self.0.borrow().parent.upgrade().map(Node)
	}

	/// Children in document order
	pub fn children(&self) -> Vec<Node> {
		self.0.borrow().children.clone()
	}

	/// Number of children
	pub fn child_count(&self) -> usize {
		self.0.borrow().children.len()
	}

	/// Index of this node within its parent
	pub fn index_in_parent(&self) -> Option<usize> {
		let parent = self.parent()?;
		let data = parent.0.borrow();
		data.children.iter().position(|c| c.ptr_eq(self))
	}

	/// The following sibling
	pub fn next_sibling(&self) -> Option<Node> {
		let parent = self.parent()?;
		let index = self.index_in_parent()?;
		let data = parent.0.borrow();
		data.children.get(index + 1).cloned()
	}

	/// Whether `other` is this node or one of its descendants
	pub fn contains(&self, other: &Node) -> bool {
		let mut cursor = Some(other.clone());
		while let Some(node) = cursor {
			if node.ptr_eq(self) {
				return true;
			}
			cursor = node.parent();
		}
		false
	}

	/// Appends `child`, moving it out of its current parent
	pub fn append_child(&self, child: &Node) -> Result<(), DomError> {
		self.insert_before(child, None)
	}

	/// Inserts `child` before `reference`, or last when `reference` is `None`
	pub fn insert_before(&self, child: &Node, reference: Option<&Node>) -> Result<(), DomError> {
		if !self.is_element() {
			return Err(DomError::NotAnElement(self.kind_name()));
		}
		if child.contains(self) {
			return Err(DomError::HierarchyCycle);
		}
		if let Some(reference) = reference
			&& !reference.parent().is_some_and(|p| p.ptr_eq(self))
		{
			return Err(DomError::NotAChild);
		}
		if reference.is_some_and(|r| r.ptr_eq(child)) {
			return Ok(());
		}

		child.detach_from_parent();
		{
			let mut data = self.0.borrow_mut();
			let index = match reference {
				Some(reference) => data
					.children
					.iter()
					.position(|c| c.ptr_eq(reference))
					.ok_or(DomError::NotAChild)?,
				None => data.children.len(),
			};
			data.children.insert(index, child.clone());
		}
		child.0.borrow_mut().parent = Rc::downgrade(&self.0);
		notify_mutation();
		Ok(())
	}

	/// Removes this node from its parent
	pub fn remove(&self) {
		if self.detach_from_parent() {
			notify_mutation();
		}
	}

	fn detach_from_parent(&self) -> bool {
		let Some(parent) = self.parent() else {
			return false;
		};
		parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(self));
		self.0.borrow_mut().parent = Weak::new();
		true
	}

	/// Removes every child
	pub fn clear_children(&self) {
		let children = std::mem::take(&mut self.0.borrow_mut().children);
		for child in &children {
			child.0.borrow_mut().parent = Weak::new();
		}
		if !children.is_empty() {
			notify_mutation();
		}
	}

	/// Whether both handles refer to the same node
	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Address of the shared node; stable while any handle is alive
	pub(crate) fn identity(&self) -> usize {
		Rc::as_ptr(&self.0) as usize
	}

	/// First node in depth-first order (including this one) matching `pred`
	pub fn find(&self, pred: impl Fn(&Node) -> bool) -> Option<Node> {
		self.find_inner(&pred)
	}

	fn find_inner(&self, pred: &dyn Fn(&Node) -> bool) -> Option<Node> {
		if pred(self) {
			return Some(self.clone());
		}
		self.children().iter().find_map(|c| c.find_inner(pred))
	}

	/// Every node in depth-first order (including this one) matching `pred`
	pub fn find_all(&self, pred: impl Fn(&Node) -> bool) -> Vec<Node> {
		let mut found = Vec::new();
		self.collect_into(&pred, &mut found);
		found
	}

	fn collect_into(&self, pred: &dyn Fn(&Node) -> bool, found: &mut Vec<Node>) {
		if pred(self) {
			found.push(self.clone());
		}
		for child in self.children() {
			child.collect_into(pred, found);
		}
	}

	/// First element with `tag`
	pub fn find_by_tag(&self, tag: &str) -> Option<Node> {
		self.find(|n| n.tag().as_deref() == Some(tag))
	}

	/// Every element with `tag`
	pub fn find_all_by_tag(&self, tag: &str) -> Vec<Node> {
		self.find_all(|n| n.tag().as_deref() == Some(tag))
	}

	/// First element whose attribute `name` equals `value`
	pub fn find_by_attr(&self, name: &str, value: &str) -> Option<Node> {
		self.find(|n| n.attribute(name).as_deref() == Some(value))
	}

	/// First element carrying `class`
	pub fn find_by_class(&self, class: &str) -> Option<Node> {
		self.find(|n| n.has_class(class))
	}

	/// Every element carrying `class`
	pub fn find_all_by_class(&self, class: &str) -> Vec<Node> {
		self.find_all(|n| n.has_class(class))
	}

	/// Concatenated text of this subtree; markup contributes its raw source
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		self.write_text(&mut out);
		out
	}

	fn write_text(&self, out: &mut String) {
		match &self.0.borrow().kind {
			NodeKind::Text(text) | NodeKind::Markup(text) => out.push_str(text),
			NodeKind::Element { .. } => {}
		}
		for child in self.children() {
			child.write_text(out);
		}
	}

	/// Serializes this node and its subtree
	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	/// Serializes the children of this node
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.children() {
			child.write_html(&mut out);
		}
		out
	}

	fn write_html(&self, out: &mut String) {
		let data = self.0.borrow();
		match &data.kind {
			NodeKind::Text(text) => out.push_str(&html_escape(text)),
			NodeKind::Markup(markup) => out.push_str(markup),
			NodeKind::Element { tag, attributes } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attributes {
					out.push(' ');
					out.push_str(name);
					if !value.is_empty() {
						out.push_str("=\"");
						out.push_str(&html_escape(value));
						out.push('"');
					}
				}
				out.push('>');
				if VOID_ELEMENTS.contains(&tag.as_str()) {
					return;
				}
				for child in &data.children {
					child.write_html(out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}
}

impl std::fmt::Debug for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.outer_html())
	}
}

/// Escapes HTML special characters in a string.
pub fn html_escape(s: &str) -> std::borrow::Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		std::borrow::Cow::Owned(escaped)
	} else {
		std::borrow::Cow::Borrowed(s)
	}
}

/// An event delivered to node listeners.
#[derive(Debug, Clone, Default)]
pub struct Event {
	kind: String,
	value: Option<String>,
	key: Option<String>,
	checked: Option<bool>,
	default_prevented: Cell<bool>,
}

impl Event {
	/// Creates an event of `kind` (`"click"`, `"input"`, ...)
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into().to_lowercase(),
			..Self::default()
		}
	}

	/// Attaches the current value of the event target
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	/// Attaches the pressed key of a keyboard event
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Attaches the checked state of a checkbox target
	pub fn with_checked(mut self, checked: bool) -> Self {
		self.checked = Some(checked);
		self
	}

	/// Event kind
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Value of the event target, if any
	pub fn value(&self) -> Option<&str> {
		self.value.as_deref()
	}

	/// Pressed key, if any
	pub fn key(&self) -> Option<&str> {
		self.key.as_deref()
	}

	/// Checked state, if any
	pub fn checked(&self) -> Option<bool> {
		self.checked
	}

	/// Marks the default action as cancelled
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	/// Whether [`Event::prevent_default`] was called
	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

/// The document: a body element plus a title.
pub struct Document {
	body: Node,
	title: RefCell<String>,
}

impl Document {
	/// Creates an empty document
	pub fn new() -> Self {
		Self {
			body: Node::element("body"),
			title: RefCell::new(String::new()),
		}
	}

	/// The body element
	pub fn body(&self) -> &Node {
		&self.body
	}

	/// Current title
	pub fn title(&self) -> String {
		self.title.borrow().clone()
	}

	/// Sets the title, mirrored to the browser document on wasm
	pub fn set_title(&self, title: &str) {
		*self.title.borrow_mut() = title.to_string();
		#[cfg(target_arch = "wasm32")]
		if let Some(document) = web_sys::window().and_then(|w| w.document()) {
			document.set_title(title);
		}
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Document {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Document")
			.field("title", &*self.title.borrow())
			.field("body", &self.body)
			.finish()
	}
}
