//! # Taskdeck
//!
//! A browser to-do list built on the `taskdeck` runtime crates:
//!
//! - `taskdeck-core`: the pub-sub data store, storage backends, clock and logging
//! - `taskdeck-di`: the service registry
//! - `taskdeck-conf`: layered settings
//! - `taskdeck-auth`: the password session
//! - `taskdeck-pages`: render/replace components and the guarded hash router
//!
//! This crate holds the to-do model and service, the view components and
//! the application wiring.
//!
//! ## Quick Start
//!
//! ```
//! use taskdeck::app::{Platform, start};
//! use taskdeck_conf::Settings;
//! use taskdeck_pages::dom::Node;
//!
//! let body = Node::element("body");
//! let app = start(&body, Settings::default(), Platform::in_memory("")).unwrap();
//! assert_eq!(app.router().current_path().as_deref(), Some("/"));
//! assert!(app.node().find_by_class("login").is_some());
//! ```
//!
//! ## Feature Flags
//!
//! - `console_error_panic_hook` - forward panics to the browser console
//! - `debug-hooks` - enable `debug_log!` output

pub mod app;
pub mod components;
pub mod todos;

pub use app::{
	AppError, Platform, TaskdeckApp, build_services, bundled_settings, load_settings, routes, start,
};
pub use todos::{NewTodo, Priority, Todo, TodoFilter, TodoStats, TodoUpdate, TodosService};
