//! To-do data: the record model, the loading source and the service that
//! wraps the `todos` store key.

pub mod model;
pub mod service;
pub mod source;

pub use model::{
	NewTodo, ParseError, Priority, Todo, TodoFilter, TodoStats, TodoUpdate, filter_todos,
};
pub use service::{TODOS_KEY, TodosService};
pub use source::{FetchError, HttpTodoSource, StaticTodoSource, TodoSource, parse_payload};
