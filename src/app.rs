//! Application wiring
//!
//! [`build_services`] registers the services in dependency order: settings,
//! the data store, authentication, to-dos and finally the router, which is
//! handed the authentication service as its [`Authenticator`].
//! [`start`] mounts the header, the page host and the footer, connects a
//! [`RouterOutlet`] to route changes and resolves the initial hash.

use std::rc::Rc;

use serde_json::{Map, Value};
use taskdeck_auth::AuthService;
use taskdeck_conf::{Settings, SettingsError};
use taskdeck_core::{
	Authenticator, Clock, KeyValueStorage, MemoryStorage, StorageBlob, StorageError, Store,
	SystemClock, info_log,
};
use taskdeck_di::{ServiceError, ServiceRegistry, ServiceRegistryBuilder};
use taskdeck_pages::app::root;
use taskdeck_pages::dom::{Document, Node};
use taskdeck_pages::platform::{Location, MemoryLocation};
use taskdeck_pages::router::{
	GuardOutcome, RouteDeclaration, RouteOptions, Router, RouterError, RouterOutlet,
};
use taskdeck_pages::{App, create_app};
use thiserror::Error;

use crate::components::{About, Footer, Header, LoginForm, PageHost, ROUTE_KEY, TodosPage};
use crate::todos::{StaticTodoSource, TodoSource, TodosService};

/// Errors raised while starting the application.
#[derive(Debug, Error)]
pub enum AppError {
	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error(transparent)]
	Service(#[from] ServiceError),

	#[error(transparent)]
	Router(#[from] RouterError),

	#[error(transparent)]
	Storage(#[from] StorageError),

	/// A browser facility is missing
	#[error("Platform unavailable: {0}")]
	Platform(String),
}

/// What the application needs from its environment.
pub struct Platform {
	/// Source of the route hash
	pub location: Rc<dyn Location>,
	/// Backs the persisted store
	pub local_storage: Rc<dyn KeyValueStorage>,
	/// Backs the login session
	pub session_storage: Rc<dyn KeyValueStorage>,
	/// Session expiry and overdue dates
	pub clock: Rc<dyn Clock>,
	/// Initial to-do list, fetched when the store has none
	pub todo_source: Rc<dyn TodoSource>,
	/// Receives the document title and owns the body
	pub document: Rc<Document>,
}

impl Platform {
	/// In-memory platform starting at `#hash`, with an empty to-do source
	pub fn in_memory(hash: &str) -> Self {
		Self {
			location: Rc::new(MemoryLocation::with_hash(hash)),
			local_storage: Rc::new(MemoryStorage::new()),
			session_storage: Rc::new(MemoryStorage::new()),
			clock: Rc::new(SystemClock),
			todo_source: Rc::new(StaticTodoSource::new(Vec::new())),
			document: Rc::new(Document::new()),
		}
	}

	/// The browser window, its storage areas and the HTTP source at
	/// `store.data_url`
	#[cfg(target_arch = "wasm32")]
	pub fn browser(settings: &Settings) -> Result<Self, AppError> {
		use taskdeck_core::storage::WebStorage;
		use taskdeck_pages::platform::BrowserLocation;

		use crate::todos::HttpTodoSource;

		let location = BrowserLocation::new()
			.ok_or_else(|| AppError::Platform("window.location".to_string()))?;
		Ok(Self {
			location: Rc::new(location),
			local_storage: Rc::new(WebStorage::local()?),
			session_storage: Rc::new(WebStorage::session()?),
			clock: Rc::new(SystemClock),
			todo_source: Rc::new(HttpTodoSource::new(settings.store.data_url.clone())),
			document: Rc::new(Document::new()),
		})
	}
}

/// Settings file compiled into the application.
pub const BUNDLED_SETTINGS: &str = include_str!("../taskdeck.toml");

/// Parses [`BUNDLED_SETTINGS`].
pub fn bundled_settings() -> Result<Settings, AppError> {
	Ok(Settings::from_toml_str(BUNDLED_SETTINGS)?)
}

/// The bundled settings with `TASKDECK_*` overrides from `vars` applied,
/// validated.
pub fn load_settings<I, K, V>(vars: I) -> Result<Settings, AppError>
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let settings = bundled_settings()?.with_env_overrides(vars)?;
	settings.validate()?;
	Ok(settings)
}

/// The route table: login on `/`, the list and the about page behind
/// authentication.
pub fn routes() -> Vec<(&'static str, RouteDeclaration)> {
	vec![
		(
			"/",
			RouteDeclaration::new(LoginForm::new).with_options(RouteOptions::new().title("Login")),
		),
		(
			"/todos",
			RouteDeclaration::new(TodosPage::new)
				.with_options(RouteOptions::new().requires_auth().title("Todos")),
		),
		(
			"/about",
			RouteDeclaration::new(|| About)
				.with_options(RouteOptions::new().requires_auth().title("About")),
		),
	]
}

/// Queues the application services in dependency order.
pub fn build_services(settings: &Settings, platform: &Platform) -> ServiceRegistryBuilder {
	let store_settings = settings.store.clone();
	let local_storage = Rc::clone(&platform.local_storage);
	let session_storage = Rc::clone(&platform.session_storage);
	let auth_settings = settings.auth.clone();
	let app_settings = settings.app.clone();
	let auth_clock = Rc::clone(&platform.clock);
	let todos_clock = Rc::clone(&platform.clock);
	let source = Rc::clone(&platform.todo_source);
	let location = Rc::clone(&platform.location);
	let document = Rc::clone(&platform.document);

	ServiceRegistry::builder()
		.instance(settings.clone())
		.service(move |_| {
			if !store_settings.persist {
				return Ok(Store::new());
			}
			let blob = StorageBlob::new(local_storage, store_settings.storage_key);
			Ok(Store::with_persistence(blob, Map::new()))
		})
		.service(move |_| Ok(AuthService::new(session_storage, auth_settings, auth_clock)))
		.service(move |registry| Ok(TodosService::new(registry.downgrade(), source, todos_clock)))
		.service_rc(move |registry| {
			let auth = registry.resolve::<AuthService>()?;
			let router = Router::builder(location)
				.document(document)
				.authenticator(Rc::clone(&auth) as Rc<dyn Authenticator>)
				.default_route(app_settings.default_route)
				.title_prefix(app_settings.title_prefix)
				.build();
			router
				.register_routes(routes())
				.map_err(|e| ServiceError::construction("RouterService", e.to_string()))?;
			router.add_guard(move |to, _from| {
				if to == "/" && auth.is_authenticated() {
					GuardOutcome::RedirectTo("/todos".to_string())
				} else {
					GuardOutcome::Allow
				}
			});
			Ok(router)
		})
}

/// A started application.
pub struct TaskdeckApp {
	app: App,
	router: Rc<Router>,
	outlet: Rc<RouterOutlet>,
}

impl TaskdeckApp {
	/// The mounted root components
	pub fn app(&self) -> &App {
		&self.app
	}

	/// Container the application was mounted into
	pub fn node(&self) -> &Node {
		self.app.node()
	}

	/// The registry built by [`build_services`]
	pub fn services(&self) -> &ServiceRegistry {
		self.app.services()
	}

	/// The hash router; also resolvable from [`services`](Self::services)
	pub fn router(&self) -> &Rc<Router> {
		&self.router
	}

	/// Holds the page of the current route
	pub fn outlet(&self) -> &Rc<RouterOutlet> {
		&self.outlet
	}

	/// Stops routing and detaches every component
	pub fn unmount(&self) {
		self.router.destroy();
		self.outlet.clear();
		self.app.unmount();
	}
}

/// Mounts the application into `container` and resolves the current hash.
pub fn start(container: &Node, settings: Settings, platform: Platform) -> Result<TaskdeckApp, AppError> {
	settings.validate()?;
	let services = build_services(&settings, &platform).build();
	let router = services.resolve::<Router>()?;
	let store = services.resolve::<Store>()?;

	let host = PageHost::new();
	let outlet = Rc::new(RouterOutlet::new(host.container(), services.clone()));
	let app = create_app(
		container,
		vec![root(Header), root(host), root(Footer)],
		services,
	);

	let weak_outlet = Rc::downgrade(&outlet);
	router.on_route_change(move |path, _previous, route| {
		if let Some(outlet) = weak_outlet.upgrade() {
			outlet.show(route);
		}
		store.set(ROUTE_KEY, Value::String(path.to_string()));
	});
	let resolution = router.start();
	info_log!("Application started: {:?}", resolution);

	Ok(TaskdeckApp { app, router, outlet })
}

#[cfg(target_arch = "wasm32")]
mod entry {
	use std::cell::RefCell;
	use std::rc::Rc;

	use taskdeck_core::error_log;
	use taskdeck_pages::platform::BrowserMount;
	use wasm_bindgen::prelude::*;

	use super::{AppError, Platform, TaskdeckApp, bundled_settings, start};

	thread_local! {
		static RUNNING: RefCell<Option<(TaskdeckApp, Rc<BrowserMount>)>> = const { RefCell::new(None) };
	}

	fn launch() -> Result<(TaskdeckApp, Rc<BrowserMount>), AppError> {
		let settings = bundled_settings()?;
		let platform = Platform::browser(&settings)?;
		let body = platform.document.body().clone();
		let mount_id = settings.app.mount_id.clone();
		let app = start(&body, settings, platform)?;
		let mount = BrowserMount::attach(body, &mount_id)
			.ok_or_else(|| AppError::Platform(format!("#{}", mount_id)))?;
		Ok((app, mount))
	}

	#[wasm_bindgen(start)]
	pub fn main() {
		#[cfg(feature = "console_error_panic_hook")]
		console_error_panic_hook::set_once();

		match launch() {
			Ok(running) => RUNNING.with(|slot| *slot.borrow_mut() = Some(running)),
			Err(e) => error_log!("Failed to start: {}", e),
		}
	}
}
