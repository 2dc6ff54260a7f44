//! The to-do cards and their per-card actions

use std::rc::Rc;

use taskdeck_core::{Clock, Store, SystemClock, debug_log};
use taskdeck_pages::prelude::*;

use crate::todos::{Priority, TODOS_KEY, Todo, TodoUpdate, TodosService, filter_todos};

use super::filter_bar::FilterState;

/// Done, reopen and remove buttons of one card.
pub struct TaskActions {
	pub todo_id: u64,
	pub done: bool,
}

impl TaskActions {
	fn todos(scope: &ComponentScope<Self>) -> Option<(u64, Rc<TodosService>)> {
		let id = scope.with(|actions| actions.todo_id)?;
		Some((id, scope.service::<TodosService>()?))
	}
}

impl Component for TaskActions {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("div")
			.attr("class", "card-footer")
			.child(
				cx.element("button")
					.attr("class", "card-footer-item done")
					.attr("disabled", self.done.then_some(true))
					.on("click", |scope, _| {
						if let Some((id, todos)) = TaskActions::todos(scope) {
							todos.mark_todo_as_done(id);
						}
					})
					.text("Mark as done")
					.build(),
			)
			.child(
				cx.element("button")
					.attr("class", "card-footer-item undone")
					.attr("disabled", (!self.done).then_some(true))
					.on("click", |scope, _| {
						if let Some((id, todos)) = TaskActions::todos(scope) {
							todos.update_todo(
								id,
								TodoUpdate {
									done: Some(false),
									..TodoUpdate::default()
								},
							);
						}
					})
					.text("Mark as not done")
					.build(),
			)
			.child(
				cx.element("button")
					.attr("class", "card-footer-item remove")
					.attr("disabled", self.done.then_some(true))
					.on("click", |scope, _| {
						if let Some((id, todos)) = TaskActions::todos(scope) {
							todos.remove_todo_by_id(id);
						}
					})
					.text("Remove task")
					.build(),
			)
			.build()
	}

	fn name() -> &'static str {
		"TaskActions"
	}
}

/// Cards of the to-dos passing the current filters.
///
/// Loads the list from the [`TodosService`] source after the first render
/// when the store has no `todos` key yet.
pub struct TodosList {
	pub filters: FilterState,
	todos: Vec<Todo>,
}

impl TodosList {
	pub fn new(filters: FilterState) -> Self {
		Self {
			filters,
			todos: Vec::new(),
		}
	}

	fn card(&self, cx: &RenderCx<'_, Self>, todo: &Todo, today: chrono::NaiveDate) -> Node {
		let priority_class = match todo.priority {
			Priority::High => "tag is-danger",
			Priority::Medium => "tag is-warning",
			Priority::Low => "tag is-success",
		};
		let due = todo.due_date.map(|due| {
			let class = if todo.is_overdue(today) {
				"due has-text-danger"
			} else {
				"due"
			};
			cx.element("p")
				.attr("class", class)
				.text(format!("Due {}", due.format("%Y-%m-%d")))
				.build()
		});

		cx.element("div")
			.attr("class", "card cell")
			.attr("data-id", todo.id)
			.attr("data-done", if todo.done { "true" } else { "false" })
			.child(
				cx.element("div")
					.attr("class", "card-content")
					.child(
						cx.element("div")
							.attr("class", "content")
							.child(cx.element("span").attr("class", priority_class).text(todo.priority.label()).build())
							.child(cx.element("h2").attr("class", "title is-5").text(todo.task.clone()).build())
							.child(
								cx.element("p")
									.attr("class", "description")
									.text(todo.description.clone())
									.build(),
							)
							.child(due)
							.build(),
					)
					.build(),
			)
			.child(cx.mount(TaskActions {
				todo_id: todo.id,
				done: todo.done,
			}))
			.build()
	}
}

impl Component for TodosList {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let FilterState {
			filter,
			search,
			priority,
		} = &self.filters;
		let (visible, today) = match cx.service::<TodosService>() {
			Some(todos) => (todos.get_filtered_todos(*filter, search, *priority), todos.today()),
			None => {
				let today = SystemClock.today();
				(filter_todos(&self.todos, *filter, search, *priority, today), today)
			}
		};

		let body = if visible.is_empty() {
			cx.element("p")
				.attr("class", "empty has-text-grey")
				.text("No tasks to show")
				.build()
		} else {
			cx.element("div")
				.attr("class", "grid")
				.children(visible.iter().map(|todo| self.card(cx, todo, today)))
				.build()
		};

		cx.element("main")
			.attr("class", "container fixed-grid has-2-cols")
			.attr("data-testid", "todo-list")
			.child(body)
			.build()
	}

	fn name() -> &'static str {
		"TodosList"
	}

	fn setup(&mut self, cx: &mut SetupCx<'_, Self>) {
		cx.subscribe_store(TODOS_KEY, Vec::<Todo>::new(), |list, todos| list.todos = todos);
	}

	fn async_actions(&self) -> Vec<AsyncAction<Self>> {
		vec![action(|scope: ComponentScope<Self>| async move {
			let Some(services) = scope.services() else {
				return;
			};
			if services.get::<Store>().is_some_and(|store| store.has(TODOS_KEY)) {
				debug_log!("To-dos already loaded, skipping fetch");
				return;
			}
			if let Some(todos) = services.get::<TodosService>() {
				let _ = todos.fetch_todos().await;
			}
		})]
	}
}
