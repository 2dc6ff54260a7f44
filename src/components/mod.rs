//! View components of the to-do app.
//!
//! Every component reads what it needs from the service registry of its
//! [`RenderCx`](taskdeck_pages::component::RenderCx) or
//! [`ComponentScope`](taskdeck_pages::ComponentScope); none holds a service
//! directly.

pub mod about;
pub mod add_todo;
pub mod bulk_actions;
pub mod filter_bar;
pub mod footer;
pub mod login_form;
pub mod nav;
pub mod todo_list;
pub mod todos_page;

pub use about::About;
pub use add_todo::{AddTodo, FormErrors, TodoForm, validate};
pub use bulk_actions::BulkActions;
pub use filter_bar::{FilterBar, FilterState, SEARCH_DEBOUNCE};
pub use footer::Footer;
pub use login_form::LoginForm;
pub use nav::{Header, Nav, NavItem};
pub use todo_list::{TaskActions, TodosList};
pub use todos_page::{PageHost, TodosPage};

/// Store key holding the committed route path.
pub const ROUTE_KEY: &str = "route";
