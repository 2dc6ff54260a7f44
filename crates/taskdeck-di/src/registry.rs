//! Type-keyed registry of shared service instances

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use taskdeck_core::{debug_log, warn_log};

use crate::Service;
use crate::error::ServiceError;

struct Entry {
	type_id: TypeId,
	name: &'static str,
	instance: Rc<dyn Any>,
}

#[derive(Default)]
struct RegistryInner {
	entries: RefCell<Vec<Entry>>,
}

/// The shared set of services.
///
/// Cloning is cheap and every clone refers to the same set.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
	inner: Rc<RegistryInner>,
}

impl ServiceRegistry {
	/// Creates an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts building a registry from ordered factories
	pub fn builder() -> ServiceRegistryBuilder {
		ServiceRegistryBuilder::new()
	}

	/// Registers `service`, replacing any previous instance of the same type
	pub fn insert<T: Service>(&self, service: T) -> Rc<T> {
		let service = Rc::new(service);
		self.insert_rc(Rc::clone(&service));
		service
	}

	/// Registers an already shared instance
	pub fn insert_rc<T: Service>(&self, service: Rc<T>) {
		let type_id = TypeId::of::<T>();
		let name = T::service_name();
		let mut entries = self.inner.entries.borrow_mut();
		let instance: Rc<dyn Any> = service;
		if let Some(entry) = entries.iter_mut().find(|e| e.type_id == type_id) {
			debug_log!("Replacing service {}", name);
			entry.instance = instance;
		} else {
			debug_log!("Registering service {}", name);
			entries.push(Entry {
				type_id,
				name,
				instance,
			});
		}
	}

	/// Looks up the service of type `T`
	pub fn get<T: Service>(&self) -> Option<Rc<T>> {
		let type_id = TypeId::of::<T>();
		let entries = self.inner.entries.borrow();
		entries
			.iter()
			.find(|e| e.type_id == type_id)
			.and_then(|e| Rc::clone(&e.instance).downcast::<T>().ok())
	}

	/// Looks up the service of type `T`
	///
	/// # Errors
	///
	/// Returns [`ServiceError::NotRegistered`] when no such service exists.
	pub fn resolve<T: Service>(&self) -> Result<Rc<T>, ServiceError> {
		self.get::<T>()
			.ok_or_else(|| ServiceError::NotRegistered(T::service_name()))
	}

	/// Whether a service of type `T` is registered
	pub fn contains<T: Service>(&self) -> bool {
		let type_id = TypeId::of::<T>();
		self.inner
			.entries
			.borrow()
			.iter()
			.any(|e| e.type_id == type_id)
	}

	/// Registered service names in registration order
	pub fn names(&self) -> Vec<&'static str> {
		self.inner.entries.borrow().iter().map(|e| e.name).collect()
	}

	/// Number of registered services
	pub fn len(&self) -> usize {
		self.inner.entries.borrow().len()
	}

	/// Whether no service is registered
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// A non-owning handle, for services that need their siblings
	pub fn downgrade(&self) -> WeakRegistry {
		WeakRegistry {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Whether both handles refer to the same registry
	pub fn ptr_eq(&self, other: &ServiceRegistry) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl std::fmt::Debug for ServiceRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServiceRegistry")
			.field("services", &self.names())
			.finish()
	}
}

/// Non-owning handle to a [`ServiceRegistry`].
///
/// Services hold this instead of a [`ServiceRegistry`] so that the registry
/// and its services do not keep each other alive.
#[derive(Clone, Default)]
pub struct WeakRegistry {
	inner: Weak<RegistryInner>,
}

impl WeakRegistry {
	/// Upgrades to a strong handle while the registry is alive
	pub fn upgrade(&self) -> Option<ServiceRegistry> {
		self.inner.upgrade().map(|inner| ServiceRegistry { inner })
	}

	/// Looks up a sibling service
	pub fn get<T: Service>(&self) -> Option<Rc<T>> {
		self.upgrade().and_then(|registry| registry.get::<T>())
	}

	/// Looks up a sibling service
	///
	/// # Errors
	///
	/// Returns [`ServiceError::RegistryDropped`] when the registry is gone and
	/// [`ServiceError::NotRegistered`] when the sibling does not exist.
	pub fn resolve<T: Service>(&self) -> Result<Rc<T>, ServiceError> {
		self.upgrade()
			.ok_or(ServiceError::RegistryDropped)?
			.resolve::<T>()
	}
}

impl std::fmt::Debug for WeakRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WeakRegistry")
			.field("alive", &(self.inner.strong_count() > 0))
			.finish()
	}
}

type Factory = Box<dyn FnOnce(&ServiceRegistry) -> Result<(), ServiceError>>;

/// Builds a [`ServiceRegistry`] from ordered factories.
///
/// Each factory sees the services registered before it. A factory that
/// fails is logged and skipped; the remaining factories still run.
#[derive(Default)]
pub struct ServiceRegistryBuilder {
	factories: Vec<(&'static str, Factory)>,
}

impl ServiceRegistryBuilder {
	/// Creates an empty builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a factory producing an owned service
	pub fn service<T, F>(mut self, factory: F) -> Self
	where
		T: Service,
		F: FnOnce(&ServiceRegistry) -> Result<T, ServiceError> + 'static,
	{
		self.factories.push((
			T::service_name(),
			Box::new(move |registry| {
				let service = factory(registry)?;
				registry.insert(service);
				Ok(())
			}),
		));
		self
	}

	/// Adds a factory producing a shared service
	pub fn service_rc<T, F>(mut self, factory: F) -> Self
	where
		T: Service,
		F: FnOnce(&ServiceRegistry) -> Result<Rc<T>, ServiceError> + 'static,
	{
		self.factories.push((
			T::service_name(),
			Box::new(move |registry| {
				registry.insert_rc(factory(registry)?);
				Ok(())
			}),
		));
		self
	}

	/// Adds a factory that may decline to build its service
	pub fn try_service<T, F>(mut self, factory: F) -> Self
	where
		T: Service,
		F: FnOnce(&ServiceRegistry) -> Option<T> + 'static,
	{
		self.factories.push((
			T::service_name(),
			Box::new(move |registry| {
				let service = factory(registry).ok_or_else(|| {
					ServiceError::construction(T::service_name(), "factory returned no service")
				})?;
				registry.insert(service);
				Ok(())
			}),
		));
		self
	}

	/// Adds an already constructed service
	pub fn instance<T: Service>(self, service: T) -> Self {
		self.service(move |_| Ok(service))
	}

	/// Number of queued factories
	pub fn len(&self) -> usize {
		self.factories.len()
	}

	/// Whether no factory is queued
	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}

	/// Runs the factories in order
	pub fn build(self) -> ServiceRegistry {
		let registry = ServiceRegistry::new();
		for (name, factory) in self.factories {
			if let Err(e) = factory(&registry) {
				warn_log!("Skipping invalid service {}: {}", name, e);
			}
		}
		registry
	}
}

impl std::fmt::Debug for ServiceRegistryBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let names: Vec<_> = self.factories.iter().map(|(name, _)| *name).collect();
		f.debug_struct("ServiceRegistryBuilder")
			.field("factories", &names)
			.finish()
	}
}
