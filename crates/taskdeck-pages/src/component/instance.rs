//! Component instances and their handles

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::join_all;
use taskdeck_core::{Store, Subscription, debug_log, error_log, warn_log};
use taskdeck_di::{Service, ServiceRegistry};

use super::cx::{Deferred, RenderCx, SetupCx};
use super::{AnyComponent, Component, Lifecycle};
use crate::callback::Callback;
use crate::dom::Node;
use crate::spawn::spawn_local;

type PendingUpdate<C> = Box<dyn FnOnce(&mut C)>;

pub(super) struct Instance<C: Component> {
	pub(super) state: RefCell<C>,
	root: RefCell<Node>,
	pub(super) services: RefCell<Option<ServiceRegistry>>,
	lifecycle: Cell<Lifecycle>,
	pub(super) subscriptions: RefCell<Vec<Subscription>>,
	pub(super) deferred: RefCell<Vec<Deferred<C>>>,
	children: RefCell<Vec<Rc<dyn AnyComponent>>>,
	pending: RefCell<Vec<PendingUpdate<C>>>,
	rendering: Cell<bool>,
	dirty: Cell<bool>,
	this: Weak<Instance<C>>,
}

impl<C: Component> Instance<C> {
	fn construct(component: C, services: Option<ServiceRegistry>) -> Rc<Self> {
		let instance = Rc::new_cyclic(|this| Self {
			state: RefCell::new(component),
			root: RefCell::new(Node::text("")),
			services: RefCell::new(services),
			lifecycle: Cell::new(Lifecycle::Constructed),
			subscriptions: RefCell::new(Vec::new()),
			deferred: RefCell::new(Vec::new()),
			children: RefCell::new(Vec::new()),
			pending: RefCell::new(Vec::new()),
			rendering: Cell::new(false),
			dirty: Cell::new(false),
			this: this.clone(),
		});

		instance.run_hook(|component, cx| component.setup(cx));
		instance.rerender();
		instance.spawn_async_actions();
		instance
	}

	pub(super) fn scope(&self) -> ComponentScope<C> {
		ComponentScope {
			instance: self.this.clone(),
		}
	}

	pub(super) fn store(&self) -> Option<Rc<Store>> {
		self.services.borrow().as_ref().and_then(|s| s.get::<Store>())
	}

	/// Runs `setup` or `after_services_injected`, then applies the eager
	/// store values collected by the hook.
	fn run_hook(&self, hook: impl FnOnce(&mut C, &mut SetupCx<'_, C>)) {
		let mut cx = SetupCx::new(self);
		{
			let mut state = self.state.borrow_mut();
			hook(&mut state, &mut cx);
		}
		let eager = cx.into_eager();
		if !eager.is_empty() {
			let mut state = self.state.borrow_mut();
			for apply in eager {
				apply(&mut state);
			}
		}
	}

	fn spawn_async_actions(&self) {
		let actions = self.state.borrow().async_actions();
		let scope = self.scope();
		spawn_local(async move {
			join_all(actions.into_iter().map(|action| action(scope.clone()))).await;
			match scope.instance.upgrade() {
				Some(instance) if instance.lifecycle.get() != Lifecycle::Detached => {
					instance.rerender();
				}
				Some(_) => debug_log!(
					"{}: async actions settled after detach, skipping re-render",
					C::name()
				),
				None => debug_log!("{}: async actions settled after drop", C::name()),
			}
		});
	}

	pub(super) fn update(&self, f: impl FnOnce(&mut C) + 'static) {
		if self.lifecycle.get() == Lifecycle::Detached {
			debug_log!("{}: ignoring update on detached component", C::name());
			return;
		}
		match self.state.try_borrow_mut() {
			Ok(mut state) if !self.rendering.get() => {
				f(&mut state);
				drop(state);
				self.rerender();
			}
			_ => {
				self.pending.borrow_mut().push(Box::new(f));
				self.dirty.set(true);
			}
		}
	}

	fn apply_pending(&self) {
		let pending = std::mem::take(&mut *self.pending.borrow_mut());
		if pending.is_empty() {
			return;
		}
		let mut state = self.state.borrow_mut();
		for update in pending {
			update(&mut state);
		}
	}

	fn render_pass(&self) -> (Node, Vec<Rc<dyn AnyComponent>>) {
		let cx = RenderCx::new(self);
		let node = self.state.borrow().render(&cx);
		(node, cx.into_children())
	}

	pub(super) fn rerender(&self) {
		if self.lifecycle.get() == Lifecycle::Detached {
			debug_log!("{}: ignoring re-render of detached component", C::name());
			return;
		}
		if self.rendering.get() || self.state.try_borrow_mut().is_err() {
			self.dirty.set(true);
			return;
		}

		self.rendering.set(true);
		loop {
			self.dirty.set(false);
			self.apply_pending();
			if self.lifecycle.get() != Lifecycle::Constructed {
				self.lifecycle.set(Lifecycle::Stale);
			}

			let old = self.root.borrow().clone();
			let parent = old.parent();
			let next = old.next_sibling();
			old.remove();

			let (node, children) = self.render_pass();
			if let Some(parent) = parent
				&& let Err(e) = parent.insert_before(&node, next.as_ref())
			{
				error_log!("{}: failed to reinsert root: {}", C::name(), e);
			}
			*self.root.borrow_mut() = node;

			let previous = std::mem::replace(&mut *self.children.borrow_mut(), children);
			let current = self.children.borrow().clone();
			for child in previous {
				let kept = current.iter().any(|c| same_component(c, &child));
				if !kept {
					child.detach();
				}
			}

			if self.lifecycle.get() == Lifecycle::Detached {
				break;
			}
			self.lifecycle.set(Lifecycle::Rendered);
			if !self.dirty.get() {
				break;
			}
		}
		self.rendering.set(false);
	}

	fn flush_if_dirty(&self) {
		if self.dirty.get() && !self.rendering.get() {
			self.rerender();
		}
	}
}

fn same_component(a: &Rc<dyn AnyComponent>, b: &Rc<dyn AnyComponent>) -> bool {
	std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl<C: Component> AnyComponent for Instance<C> {
	fn root(&self) -> Node {
		self.root.borrow().clone()
	}

	fn has_services(&self) -> bool {
		self.services.borrow().is_some()
	}

	fn inject_services(&self, services: ServiceRegistry) {
		if self.lifecycle.get() == Lifecycle::Detached {
			return;
		}
		*self.services.borrow_mut() = Some(services);

		if let Some(store) = self.store() {
			let deferred = std::mem::take(&mut *self.deferred.borrow_mut());
			for bind in deferred {
				let (subscription, apply) = bind(self, &store);
				self.subscriptions.borrow_mut().push(subscription);
				apply(&mut self.state.borrow_mut());
			}
		}

		self.run_hook(|component, cx| component.after_services_injected(cx));
		self.rerender();
	}

	fn detach(&self) {
		if self.lifecycle.replace(Lifecycle::Detached) == Lifecycle::Detached {
			return;
		}
		debug_log!("{}: detached", C::name());
		self.root.borrow().remove();
		self.subscriptions.borrow_mut().clear();
		self.deferred.borrow_mut().clear();
		self.pending.borrow_mut().clear();
		let children = std::mem::take(&mut *self.children.borrow_mut());
		for child in children {
			child.detach();
		}
	}

	fn lifecycle(&self) -> Lifecycle {
		self.lifecycle.get()
	}

	fn component_name(&self) -> &'static str {
		C::name()
	}

	fn rerender(&self) {
		Instance::rerender(self);
	}

	fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
		self
	}
}

pub(super) fn downcast<C: Component>(
	component: Rc<dyn AnyComponent>,
) -> Option<ComponentHandle<C>> {
	component
		.into_any_rc()
		.downcast::<Instance<C>>()
		.ok()
		.map(|instance| ComponentHandle { instance })
}

/// Owning handle to a component instance.
///
/// Cloning yields another handle to the same instance.
pub struct ComponentHandle<C: Component> {
	instance: Rc<Instance<C>>,
}

impl<C: Component> ComponentHandle<C> {
	/// Constructs and renders a component without services
	pub fn new(component: C) -> Self {
		Self {
			instance: Instance::construct(component, None),
		}
	}

	/// Constructs and renders a component with `services`
	pub fn with_services(component: C, services: ServiceRegistry) -> Self {
		Self {
			instance: Instance::construct(component, Some(services)),
		}
	}

	pub(super) fn from_services(component: C, services: Option<ServiceRegistry>) -> Self {
		Self {
			instance: Instance::construct(component, services),
		}
	}

	/// Current root node
	pub fn root(&self) -> Node {
		self.instance.root()
	}

	/// Weak handle for closures and async work
	pub fn scope(&self) -> ComponentScope<C> {
		self.instance.scope()
	}

	/// Reads the fields
	pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
		let result = f(&self.instance.state.borrow());
		self.instance.flush_if_dirty();
		result
	}

	/// Mutates the fields, then re-renders
	pub fn on_arg_change(&self, f: impl FnOnce(&mut C) + 'static) {
		self.instance.update(f);
	}

	/// Re-renders in place
	pub fn rerender(&self) {
		self.instance.rerender();
	}

	/// Injects a service registry
	pub fn inject_services(&self, services: ServiceRegistry) {
		AnyComponent::inject_services(&*self.instance, services);
	}

	/// The injected service registry
	pub fn services(&self) -> Option<ServiceRegistry> {
		self.instance.services.borrow().clone()
	}

	/// Detaches the component
	pub fn detach(&self) {
		AnyComponent::detach(&*self.instance);
	}

	/// Current lifecycle state
	pub fn lifecycle(&self) -> Lifecycle {
		self.instance.lifecycle.get()
	}

	/// Number of store subscriptions held
	pub fn subscription_count(&self) -> usize {
		self.instance.subscriptions.borrow().len()
	}

	/// Type-erased handle
	pub fn into_any(self) -> Rc<dyn AnyComponent> {
		self.instance
	}

	/// Whether both handles refer to the same instance
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.instance, &other.instance)
	}
}

impl<C: Component> Clone for ComponentHandle<C> {
	fn clone(&self) -> Self {
		Self {
			instance: Rc::clone(&self.instance),
		}
	}
}

impl<C: Component> std::fmt::Debug for ComponentHandle<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComponentHandle")
			.field("name", &C::name())
			.field("lifecycle", &self.lifecycle())
			.finish()
	}
}

/// Non-owning handle to a component instance.
///
/// Event handlers, store callbacks and async actions hold a scope; every
/// operation is a no-op once the instance is gone or detached.
pub struct ComponentScope<C: Component> {
	instance: Weak<Instance<C>>,
}

impl<C: Component> ComponentScope<C> {
	fn live(&self) -> Option<Rc<Instance<C>>> {
		self.instance
			.upgrade()
			.filter(|i| i.lifecycle.get() != Lifecycle::Detached)
	}

	/// Whether the instance exists and is not detached
	pub fn is_active(&self) -> bool {
		self.live().is_some()
	}

	/// Strong handle, if the instance still exists
	pub fn handle(&self) -> Option<ComponentHandle<C>> {
		self.instance
			.upgrade()
			.map(|instance| ComponentHandle { instance })
	}

	/// Mutates the fields, then re-renders
	pub fn update(&self, f: impl FnOnce(&mut C) + 'static) {
		if let Some(instance) = self.live() {
			instance.update(f);
		}
	}

	/// Mutates the fields without re-rendering.
	///
	/// Returns whether `f` ran. It does not run on a detached instance, nor
	/// while the fields are borrowed (from inside [`with`](Self::with) or a
	/// render); use [`update`](Self::update) there, which queues.
	pub fn set(&self, f: impl FnOnce(&mut C)) -> bool {
		let Some(instance) = self.live() else {
			return false;
		};
		match instance.state.try_borrow_mut() {
			Ok(mut state) => {
				f(&mut state);
				true
			}
			Err(_) => {
				warn_log!("{}: dropped set() while its fields are borrowed", C::name());
				false
			}
		}
	}

	/// Reads the fields
	pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
		let instance = self.instance.upgrade()?;
		let result = f(&*instance.state.try_borrow().ok()?);
		instance.flush_if_dirty();
		Some(result)
	}

	/// Re-renders in place
	pub fn rerender(&self) {
		if let Some(instance) = self.live() {
			instance.rerender();
		}
	}

	/// The injected service registry
	pub fn services(&self) -> Option<ServiceRegistry> {
		self.instance.upgrade()?.services.borrow().clone()
	}

	/// Looks up a service
	pub fn service<T: Service>(&self) -> Option<Rc<T>> {
		self.services()?.get::<T>()
	}

	/// Builds a [`Callback`] bound to this scope
	pub fn callback<A: 'static>(&self, f: impl Fn(&ComponentScope<C>, A) + 'static) -> Callback<A> {
		let scope = self.clone();
		Callback::new(move |arg| f(&scope, arg))
	}
}

impl<C: Component> Clone for ComponentScope<C> {
	fn clone(&self) -> Self {
		Self {
			instance: self.instance.clone(),
		}
	}
}

impl<C: Component> std::fmt::Debug for ComponentScope<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComponentScope")
			.field("name", &C::name())
			.field("active", &self.is_active())
			.finish()
	}
}
