use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use taskdeck_core::{Store, Subscription, warn_log};
use taskdeck_di::{Service, ServiceRegistry};

use super::element::{AttrValue, Child, ElementBuilder, Handler};
use super::instance::{ComponentHandle, ComponentScope, Instance};
use super::{AnyComponent, Component};
use crate::dom::{Event, Node};

pub(super) type Apply<C> = Box<dyn FnOnce(&mut C)>;

/// A store binding waiting for a registry to be injected.
pub(super) type Deferred<C> = Box<dyn FnOnce(&Instance<C>, &Rc<Store>) -> (Subscription, Apply<C>)>;

/// Context passed to [`Component::setup`] and
/// [`Component::after_services_injected`].
pub struct SetupCx<'a, C: Component> {
	instance: &'a Instance<C>,
	eager: Vec<Apply<C>>,
}

impl<'a, C: Component> SetupCx<'a, C> {
	pub(super) fn new(instance: &'a Instance<C>) -> Self {
		Self {
			instance,
			eager: Vec::new(),
		}
	}

	pub(super) fn into_eager(self) -> Vec<Apply<C>> {
		self.eager
	}

	/// The injected service registry
	pub fn services(&self) -> Option<ServiceRegistry> {
		self.instance.services.borrow().clone()
	}

	/// Looks up a service
	pub fn service<T: Service>(&self) -> Option<Rc<T>> {
		self.services()?.get::<T>()
	}

	/// Weak handle to the instance being set up
	pub fn scope(&self) -> ComponentScope<C> {
		self.instance.scope()
	}

	/// Binds `store_key` to the component.
	///
	/// The current value (or `default` when the key is absent or cannot be
	/// decoded as `T`) is applied before the first render. Every later write
	/// to the key applies the new value and re-renders. When no store is
	/// available yet, the default is applied and the subscription waits for
	/// [`ComponentHandle::inject_services`].
	pub fn subscribe_store<T, F>(&mut self, store_key: &str, default: T, apply: F)
	where
		T: DeserializeOwned + Clone + 'static,
		F: Fn(&mut C, T) + 'static,
	{
		let apply = Rc::new(apply);
		let key = store_key.to_string();
		let fallback = default.clone();
		let bind_apply = Rc::clone(&apply);
		let bind: Deferred<C> = Box::new(move |instance, store| {
			let scope = instance.scope();
			let listener_key = key.clone();
			let listener_default = fallback.clone();
			let listener_apply = Rc::clone(&bind_apply);
			let subscription = store.subscribe(&key, move |value| {
				let decoded = decode(&listener_key, value, &listener_default);
				let apply = Rc::clone(&listener_apply);
				scope.update(move |component| apply(component, decoded));
			});
			let current = decode(&key, store.get(&key).as_ref(), &fallback);
			let eager: Apply<C> = Box::new(move |component| bind_apply(component, current));
			(subscription, eager)
		});

		match self.instance.store() {
			Some(store) => {
				let (subscription, eager) = bind(self.instance, &store);
				self.instance.subscriptions.borrow_mut().push(subscription);
				self.eager.push(eager);
			}
			None => {
				self.eager
					.push(Box::new(move |component| apply(component, default)));
				self.instance.deferred.borrow_mut().push(bind);
			}
		}
	}
}

fn decode<T: DeserializeOwned + Clone>(key: &str, value: Option<&Value>, default: &T) -> T {
	match value {
		None | Some(Value::Null) => default.clone(),
		Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
			warn_log!("Store key '{}' has an unexpected shape: {}", key, e);
			default.clone()
		}),
	}
}

/// Context passed to [`Component::render`].
///
/// Builds elements whose handlers are bound to the rendering instance and
/// mounts child components with the instance's service registry.
pub struct RenderCx<'a, C: Component> {
	instance: &'a Instance<C>,
	children: RefCell<Vec<Rc<dyn AnyComponent>>>,
}

impl<'a, C: Component> RenderCx<'a, C> {
	pub(super) fn new(instance: &'a Instance<C>) -> Self {
		Self {
			instance,
			children: RefCell::new(Vec::new()),
		}
	}

	pub(super) fn into_children(self) -> Vec<Rc<dyn AnyComponent>> {
		self.children.into_inner()
	}

	pub(super) fn adopt(&self, child: Rc<dyn AnyComponent>) {
		let mut children = self.children.borrow_mut();
		let addr = Rc::as_ptr(&child);
		if !children.iter().any(|c| std::ptr::addr_eq(Rc::as_ptr(c), addr)) {
			children.push(child);
		}
	}

	/// The injected service registry
	pub fn services(&self) -> Option<ServiceRegistry> {
		self.instance.services.borrow().clone()
	}

	/// Looks up a service
	pub fn service<T: Service>(&self) -> Option<Rc<T>> {
		self.services()?.get::<T>()
	}

	/// Weak handle to the rendering instance
	pub fn scope(&self) -> ComponentScope<C> {
		self.instance.scope()
	}

	/// Constructs a child component with this instance's services
	pub fn mount<K: Component>(&self, component: K) -> ComponentHandle<K> {
		ComponentHandle::from_services(component, self.services())
	}

	/// Wraps an existing component as a child
	pub fn attach<K: Component>(&self, component: &ComponentHandle<K>) -> Child {
		Child::Component(component.clone().into_any())
	}

	/// Starts an element
	pub fn element(&self, tag: &str) -> ElementBuilder<'_, C> {
		ElementBuilder::new(self, tag)
	}

	/// Builds an element from an attribute list and ordered children
	pub fn create_element(
		&self,
		tag: &str,
		attributes: Vec<(&str, AttrValue<C>)>,
		children: Vec<Child>,
	) -> Node {
		let mut builder = ElementBuilder::new(self, tag);
		for (name, value) in attributes {
			builder = builder.attr(name, value);
		}
		builder.children(children).build()
	}

	/// Wraps a closure as an `on*` attribute value
	pub fn handler(&self, f: impl Fn(&ComponentScope<C>, &Event) + 'static) -> AttrValue<C> {
		let handler: Handler<C> = Rc::new(f);
		AttrValue::Handler(handler)
	}
}
