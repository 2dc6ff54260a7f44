use std::cell::RefCell;
use std::rc::Rc;

use taskdeck_core::{debug_log, warn_log};
use taskdeck_di::ServiceRegistry;

use super::route::RouteEntry;
use crate::component::AnyComponent;
use crate::dom::Node;

/// Hosts the page component of the current route inside a container node.
///
/// Showing a route detaches the previous page and mounts a fresh instance
/// built with the outlet's services.
pub struct RouterOutlet {
	container: Node,
	services: ServiceRegistry,
	current: RefCell<Option<(String, Rc<dyn AnyComponent>)>>,
}

impl RouterOutlet {
	/// Creates an outlet rendering into `container`
	pub fn new(container: Node, services: ServiceRegistry) -> Self {
		Self {
			container,
			services,
			current: RefCell::new(None),
		}
	}

	/// Replaces the current page with one built for `route`
	pub fn show(&self, route: &RouteEntry) {
		let previous = self.current.borrow_mut().take();
		if let Some((path, page)) = previous {
			debug_log!("Outlet: leaving {}", path);
			page.detach();
		}

		let page = route.build(&self.services);
		if let Err(e) = self.container.append_child(&page.root()) {
			warn_log!("Outlet: cannot mount page for {}: {}", route.path(), e);
			page.detach();
			return;
		}
		*self.current.borrow_mut() = Some((route.path().to_string(), page));
	}

	/// Detaches the current page
	pub fn clear(&self) {
		if let Some((_, page)) = self.current.borrow_mut().take() {
			page.detach();
		}
	}

	/// The mounted page
	pub fn current(&self) -> Option<Rc<dyn AnyComponent>> {
		self.current.borrow().as_ref().map(|(_, page)| Rc::clone(page))
	}

	/// Path of the mounted page
	pub fn current_path(&self) -> Option<String> {
		self.current.borrow().as_ref().map(|(path, _)| path.clone())
	}

	/// The container node
	pub fn container(&self) -> &Node {
		&self.container
	}
}

impl std::fmt::Debug for RouterOutlet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterOutlet")
			.field("current", &self.current_path())
			.finish()
	}
}
