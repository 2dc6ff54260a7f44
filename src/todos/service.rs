//! To-do operations over the `todos` store key.
//!
//! Every mutation is read-modify-write: copy the list out of the store,
//! change the copy, write it back. Subscribers of `todos` re-render on
//! each write.

use std::rc::Rc;

use serde_json::json;
use taskdeck_core::{Clock, Store, error_log, info_log, warn_log};
use taskdeck_di::{Service, WeakRegistry};

use super::model::{NewTodo, Priority, Todo, TodoFilter, TodoStats, TodoUpdate, filter_todos};
use super::source::{FetchError, TodoSource};

/// Store key holding the to-do list.
pub const TODOS_KEY: &str = "todos";

pub struct TodosService {
	services: WeakRegistry,
	source: Rc<dyn TodoSource>,
	clock: Rc<dyn Clock>,
}

impl TodosService {
	pub fn new(services: WeakRegistry, source: Rc<dyn TodoSource>, clock: Rc<dyn Clock>) -> Self {
		Self {
			services,
			source,
			clock,
		}
	}

	fn store(&self) -> Option<Rc<Store>> {
		let store = self.services.get::<Store>();
		if store.is_none() {
			warn_log!("TodosService: no DataStoreService registered");
		}
		store
	}

	/// Current list; empty when absent or undecodable
	pub fn todos(&self) -> Vec<Todo> {
		let Some(store) = self.store() else {
			return Vec::new();
		};
		match store.get_as::<Vec<Todo>>(TODOS_KEY) {
			Ok(todos) => todos.unwrap_or_default(),
			Err(e) => {
				warn_log!("Ignoring malformed to-do list: {}", e);
				Vec::new()
			}
		}
	}

	fn save(&self, todos: &[Todo]) {
		if let Some(store) = self.store()
			&& let Err(e) = store.set_as(TODOS_KEY, todos)
		{
			error_log!("Failed to save to-dos: {}", e);
		}
	}

	/// Applies `change` to every to-do selected by `select`, then saves.
	/// Returns how many were changed; nothing is written when none match.
	fn modify(&self, select: impl Fn(&Todo) -> bool, change: impl Fn(&mut Todo)) -> usize {
		let mut todos = self.todos();
		let mut changed = 0;
		for todo in todos.iter_mut().filter(|t| select(t)) {
			change(todo);
			changed += 1;
		}
		if changed > 0 {
			self.save(&todos);
		}
		changed
	}

	/// Replaces the list with the source's; on failure the store is left
	/// unchanged
	pub async fn fetch_todos(&self) -> Result<usize, FetchError> {
		match self.source.fetch().await {
			Ok(todos) => {
				info_log!("Loaded {} to-do(s)", todos.len());
				self.save(&todos);
				Ok(todos.len())
			}
			Err(e) => {
				error_log!("Error loading to-dos: {}", e);
				Err(e)
			}
		}
	}

	/// Appends a to-do with the next free id, not done
	pub fn add_todo(&self, new: NewTodo) -> Option<Todo> {
		let store = self.store()?;
		let id = self.todos().iter().map(|t| t.id).max().map_or(1, |max| max + 1);
		let todo = Todo {
			id,
			task: new.task,
			description: new.description,
			done: false,
			priority: new.priority,
			due_date: new.due_date,
		};
		match serde_json::to_value(&todo) {
			Ok(value) => {
				store.add(TODOS_KEY, value);
				Some(todo)
			}
			Err(e) => {
				error_log!("Failed to encode to-do: {}", e);
				None
			}
		}
	}

	/// Flips the done flag; `false` when no to-do has `id`
	pub fn toggle_todo_status(&self, id: u64) -> bool {
		self.modify(|t| t.id == id, |t| t.done = !t.done) > 0
	}

	/// Marks a to-do done
	pub fn mark_todo_as_done(&self, id: u64) -> bool {
		self.modify(|t| t.id == id, |t| t.done = true) > 0
	}

	/// Changes the priority of a to-do
	pub fn update_todo_priority(&self, id: u64, priority: Priority) -> bool {
		self.modify(|t| t.id == id, |t| t.priority = priority) > 0
	}

	/// Applies a partial update to a to-do
	pub fn update_todo(&self, id: u64, update: TodoUpdate) -> bool {
		let mut todos = self.todos();
		let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
			warn_log!("No to-do with id {}", id);
			return false;
		};
		update.apply(todo);
		self.save(&todos);
		true
	}

	/// Removes every to-do with `id`
	pub fn remove_todo_by_id(&self, id: u64) {
		if let Some(store) = self.store() {
			store.remove_by_value(TODOS_KEY, "id", &json!(id));
		}
	}

	/// Removes done to-dos, returning how many were removed
	pub fn clear_completed_todos(&self) -> usize {
		let todos = self.todos();
		let before = todos.len();
		let remaining: Vec<Todo> = todos.into_iter().filter(|t| !t.done).collect();
		let removed = before - remaining.len();
		if removed > 0 {
			self.save(&remaining);
		}
		removed
	}

	/// Sets every to-do's done flag to `done`
	pub fn toggle_all_todos(&self, done: bool) -> usize {
		self.modify(|t| t.done != done, |t| t.done = done)
	}

	/// Changes the priority of every active to-do
	pub fn update_active_priority(&self, priority: Priority) -> usize {
		self.modify(|t| !t.done && t.priority != priority, |t| t.priority = priority)
	}

	/// To-dos passing the status filter, the search query and the
	/// priority filter (`None` for any priority)
	pub fn get_filtered_todos(
		&self,
		filter: TodoFilter,
		search: &str,
		priority: Option<Priority>,
	) -> Vec<Todo> {
		filter_todos(&self.todos(), filter, search, priority, self.clock.today())
	}

	pub fn get_todos_stats(&self) -> TodoStats {
		TodoStats::from_todos(&self.todos(), self.clock.today())
	}

	/// Today's date according to the service clock
	pub fn today(&self) -> chrono::NaiveDate {
		self.clock.today()
	}
}

impl Service for TodosService {
	fn service_name() -> &'static str {
		"TodosService"
	}
}
