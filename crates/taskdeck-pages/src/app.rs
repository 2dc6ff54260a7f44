//! Application bootstrap
//!
//! [`create_app`] builds the service registry, constructs the root
//! components with it and mounts them under a `div.app` appended to the
//! container.

use std::rc::Rc;

use taskdeck_core::{info_log, warn_log};
use taskdeck_di::{ServiceRegistry, ServiceRegistryBuilder};

use crate::component::{self, AnyComponent, Component, ComponentHandle, Lifecycle};
use crate::dom::Node;

/// Builds a root component once the registry exists.
pub type RootFactory = Box<dyn FnOnce(&ServiceRegistry) -> Rc<dyn AnyComponent>>;

/// Wraps a component as a [`RootFactory`]
pub fn root<C: Component>(component: C) -> RootFactory {
	Box::new(move |services| ComponentHandle::with_services(component, services.clone()).into_any())
}

/// Where the bootstrap gets its services from.
pub enum ServiceSource {
	/// Factories run in order, each seeing the registry built so far
	Builder(ServiceRegistryBuilder),
	/// An already built registry
	Registry(ServiceRegistry),
}

impl ServiceSource {
	fn into_registry(self) -> ServiceRegistry {
		match self {
			Self::Builder(builder) => builder.build(),
			Self::Registry(registry) => registry,
		}
	}
}

impl From<ServiceRegistryBuilder> for ServiceSource {
	fn from(builder: ServiceRegistryBuilder) -> Self {
		Self::Builder(builder)
	}
}

impl From<ServiceRegistry> for ServiceSource {
	fn from(registry: ServiceRegistry) -> Self {
		Self::Registry(registry)
	}
}

/// A mounted application.
pub struct App {
	node: Node,
	services: ServiceRegistry,
	roots: Vec<Rc<dyn AnyComponent>>,
}

impl App {
	/// The `div.app` element
	pub fn node(&self) -> &Node {
		&self.node
	}

	/// The shared service registry
	pub fn services(&self) -> &ServiceRegistry {
		&self.services
	}

	/// Mounted root components in order
	pub fn roots(&self) -> &[Rc<dyn AnyComponent>] {
		&self.roots
	}

	/// First mounted root of type `C`
	pub fn root<C: Component>(&self) -> Option<ComponentHandle<C>> {
		self.roots
			.iter()
			.find_map(|root| component::downcast::<C>(Rc::clone(root)))
	}

	/// Detaches every root and removes the `div.app` element
	pub fn unmount(&self) {
		for root in &self.roots {
			root.detach();
		}
		self.node.remove();
	}
}

impl std::fmt::Debug for App {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("App")
			.field("services", &self.services)
			.field(
				"roots",
				&self.roots.iter().map(|r| r.component_name()).collect::<Vec<_>>(),
			)
			.finish()
	}
}

/// Builds the services, mounts `roots` under a new `div.app` and appends
/// it to `container`.
///
/// Roots that come back detached or cannot be appended are logged and
/// skipped.
pub fn create_app(
	container: &Node,
	roots: Vec<RootFactory>,
	services: impl Into<ServiceSource>,
) -> App {
	let node = Node::element("div");
	node.set_attribute("class", "app");

	let services = services.into().into_registry();

	let mut mounted = Vec::with_capacity(roots.len());
	for factory in roots {
		let root = factory(&services);
		if root.lifecycle() == Lifecycle::Detached {
			warn_log!("Root component {} is not valid, skipping", root.component_name());
			continue;
		}
		if !root.has_services() {
			root.inject_services(services.clone());
		}
		if let Err(e) = node.append_child(&root.root()) {
			warn_log!("Cannot mount root component {}: {}", root.component_name(), e);
			continue;
		}
		mounted.push(root);
	}

	if let Err(e) = container.append_child(&node) {
		warn_log!("Cannot mount application: {}", e);
	}
	info_log!(
		"Application mounted with {} root(s) and {} service(s)",
		mounted.len(),
		services.len()
	);

	App {
		node,
		services,
		roots: mounted,
	}
}
