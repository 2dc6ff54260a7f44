//! Incremental projection of the in-memory tree onto another tree
//!
//! A [`Projection`] remembers which target node mirrors each in-memory
//! [`Node`]. [`Projection::sync`] walks the tree and only creates targets for
//! new nodes, rewrites attributes that changed and moves children whose
//! position changed. Targets of untouched nodes keep their identity, so
//! browser state such as focus, caret and scroll survives a sync, and their
//! listeners stay attached. Entries whose node left the tree are dropped.

use std::collections::HashMap;

use crate::dom::Node;

/// The tree a [`Projection`] writes to.
pub trait ProjectionTarget {
	/// A node of the target tree
	type Handle;
	/// Keeps a forwarded listener alive
	type Listener;

	fn create_element(&self, tag: &str) -> Option<Self::Handle>;

	fn create_text(&self, text: &str) -> Option<Self::Handle>;

	/// Parses raw markup into a single node
	fn create_markup(&self, markup: &str) -> Option<Self::Handle>;

	fn set_attribute(&self, element: &Self::Handle, name: &str, value: &str);

	fn remove_attribute(&self, element: &Self::Handle, name: &str);

	/// Inserts or moves `child` before `reference`, or last when `None`
	fn insert_before(&self, parent: &Self::Handle, child: &Self::Handle, reference: Option<&Self::Handle>);

	/// Removes `child`, unless it has already moved under another parent
	fn remove_child(&self, parent: &Self::Handle, child: &Self::Handle);

	/// Forwards `kind` events on `element` to the listeners of `source`
	fn listen(&self, element: &Self::Handle, kind: &str, source: &Node) -> Option<Self::Listener>;

	fn unlisten(&self, element: &Self::Handle, kind: &str, listener: Self::Listener);
}

struct Entry<T: ProjectionTarget> {
	node: Node,
	handle: T::Handle,
	attributes: Vec<(String, String)>,
	children: Vec<usize>,
	listeners: Vec<(String, T::Listener)>,
	generation: u64,
}

impl<T: ProjectionTarget> Entry<T> {
	fn new(node: Node, handle: T::Handle) -> Self {
		Self {
			node,
			handle,
			attributes: Vec::new(),
			children: Vec::new(),
			listeners: Vec::new(),
			generation: 0,
		}
	}
}

/// Mirrors the children of a root [`Node`] into a target container.
pub struct Projection<T: ProjectionTarget> {
	target: T,
	root: usize,
	entries: HashMap<usize, Entry<T>>,
	generation: u64,
}

impl<T: ProjectionTarget> Projection<T> {
	/// Projects the children of `root` into `container`.
	///
	/// The container's own attributes and listeners are left alone. Nothing
	/// is written until the first [`sync`](Self::sync).
	pub fn new(target: T, root: Node, container: T::Handle) -> Self {
		let key = root.identity();
		let mut entries = HashMap::new();
		entries.insert(key, Entry::new(root, container));
		Self {
			target,
			root: key,
			entries,
			generation: 0,
		}
	}

	pub fn target(&self) -> &T {
		&self.target
	}

	/// Number of mirrored nodes, the root included
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The target node mirroring `node`, if it was projected
	pub fn handle(&self, node: &Node) -> Option<&T::Handle> {
		self.entries.get(&node.identity()).map(|entry| &entry.handle)
	}

	/// Brings the target in line with the in-memory tree.
	pub fn sync(&mut self) {
		self.generation += 1;
		let generation = self.generation;
		let Some(root) = self.entries.get_mut(&self.root).map(|entry| {
			entry.generation = generation;
			entry.node.clone()
		}) else {
			return;
		};
		self.sync_children(&root);

		let stale: Vec<usize> = self
			.entries
			.iter()
			.filter(|(_, entry)| entry.generation != generation)
			.map(|(key, _)| *key)
			.collect();
		for key in stale {
			if let Some(entry) = self.entries.remove(&key) {
				for (kind, listener) in entry.listeners {
					self.target.unlisten(&entry.handle, &kind, listener);
				}
			}
		}
	}

	fn project(&mut self, node: &Node) -> Option<usize> {
		let key = node.identity();
		if !self.entries.contains_key(&key) {
			let handle = self.create(node)?;
			self.entries.insert(key, Entry::new(node.clone(), handle));
		}
		if let Some(entry) = self.entries.get_mut(&key) {
			entry.generation = self.generation;
		}
		if node.is_element() {
			self.sync_attributes(key, node);
			self.sync_listeners(key, node);
			self.sync_children(node);
		}
		Some(key)
	}

	fn create(&self, node: &Node) -> Option<T::Handle> {
		if let Some(markup) = node.markup_content() {
			return self.target.create_markup(&markup);
		}
		match node.tag() {
			Some(tag) => self.target.create_element(&tag),
			None => self.target.create_text(&node.text_content()),
		}
	}

	fn sync_attributes(&mut self, key: usize, node: &Node) {
		let current = node.attributes();
		let Some(entry) = self.entries.get_mut(&key) else {
			return;
		};
		if entry.attributes == current {
			return;
		}
		for (name, _) in &entry.attributes {
			if !current.iter().any(|(n, _)| n == name) {
				self.target.remove_attribute(&entry.handle, name);
			}
		}
		for (name, value) in &current {
			if !entry.attributes.iter().any(|(n, v)| n == name && v == value) {
				self.target.set_attribute(&entry.handle, name, value);
			}
		}
		entry.attributes = current;
	}

	fn sync_listeners(&mut self, key: usize, node: &Node) {
		let kinds = node.listener_kinds();
		let Some(entry) = self.entries.get_mut(&key) else {
			return;
		};
		let (kept, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut entry.listeners)
			.into_iter()
			.partition(|(kind, _)| kinds.contains(kind));
		for (kind, listener) in gone {
			self.target.unlisten(&entry.handle, &kind, listener);
		}
		entry.listeners = kept;
		for kind in kinds {
			if entry.listeners.iter().any(|(k, _)| *k == kind) {
				continue;
			}
			if let Some(listener) = self.target.listen(&entry.handle, &kind, node) {
				entry.listeners.push((kind, listener));
			}
		}
	}

	fn sync_children(&mut self, parent: &Node) {
		let parent_key = parent.identity();
		let wanted: Vec<usize> = parent
			.children()
			.iter()
			.filter_map(|child| self.project(child))
			.collect();

		let Some(entry) = self.entries.get(&parent_key) else {
			return;
		};
		if entry.children == wanted {
			return;
		}
		let parent_handle = &entry.handle;

		for key in entry.children.iter().filter(|key| !wanted.contains(key)) {
			if let Some(child) = self.entries.get(key) {
				self.target.remove_child(parent_handle, &child.handle);
			}
		}

		// Walk the wanted order, moving or inserting wherever the current
		// order disagrees.
		let mut current: Vec<usize> = entry
			.children
			.iter()
			.copied()
			.filter(|key| wanted.contains(key))
			.collect();
		for (index, key) in wanted.iter().enumerate() {
			if current.get(index) == Some(key) {
				continue;
			}
			let reference = current
				.get(index)
				.and_then(|k| self.entries.get(k))
				.map(|e| &e.handle);
			if let Some(child) = self.entries.get(key) {
				self.target.insert_before(parent_handle, &child.handle, reference);
			}
			current.retain(|k| k != key);
			current.insert(index, *key);
		}

		if let Some(entry) = self.entries.get_mut(&parent_key) {
			entry.children = wanted;
		}
	}
}
