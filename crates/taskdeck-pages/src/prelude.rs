//! Common imports for writing components.

pub use crate::app::{App, RootFactory, ServiceSource, create_app, root};
pub use crate::callback::Callback;
pub use crate::component::{
	AnyComponent, AsyncAction, AttrValue, Child, Component, ComponentHandle, ComponentScope,
	Lifecycle, RenderCx, SetupCx, action,
};
pub use crate::dom::{Document, Event, Node};
pub use crate::router::{
	GuardOutcome, RouteDeclaration, RouteEntry, RouteOptions, Router, RouterOutlet,
};
pub use crate::spawn::{sleep, spawn_local};
pub use taskdeck_di::{Service, ServiceRegistry, WeakRegistry};
