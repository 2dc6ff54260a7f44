use taskdeck_pages::prelude::*;

use crate::todos::{Priority, TODOS_KEY, Todo, TodosService};

/// Actions applying to the whole list. Renders nothing while the list is empty.
#[derive(Debug, Default)]
pub struct BulkActions {
	todos: Vec<Todo>,
}

impl BulkActions {
	pub fn new() -> Self {
		Self::default()
	}

	fn button(
		cx: &RenderCx<'_, Self>,
		class: &str,
		label: &str,
		disabled: bool,
		run: impl Fn(&TodosService) + 'static,
	) -> Node {
		cx.element("button")
			.attr("class", format!("button is-small {}", class))
			.attr("disabled", disabled.then_some(true))
			.on("click", move |scope, _| {
				if let Some(todos) = scope.service::<TodosService>() {
					run(&todos);
				}
			})
			.text(label)
			.build()
	}
}

impl Component for BulkActions {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		if self.todos.is_empty() {
			return cx.element("div").attr("class", "bulk-actions is-empty").build();
		}
		let completed = self.todos.iter().filter(|t| t.done).count();
		let active = self.todos.len() - completed;

		let priority = cx
			.element("div")
			.attr("class", "select is-small")
			.child(
				cx.element("select")
					.attr("class", "bulk-priority")
					.attr("disabled", (active == 0).then_some(true))
					.on("change", |scope, event| {
						let Some(priority) = event.value().and_then(|v| v.parse::<Priority>().ok()) else {
							return;
						};
						if let Some(todos) = scope.service::<TodosService>() {
							todos.update_active_priority(priority);
						}
					})
					.child(
						cx.element("option")
							.attr("value", "")
							.attr("selected", true)
							.text("Set priority of open tasks")
							.build(),
					)
					.children(Priority::ALL.iter().map(|p| {
						cx.element("option")
							.attr("value", p.level())
							.text(p.label())
							.build()
					}))
					.build(),
			)
			.build();

		cx.element("div")
			.attr("class", "box bulk-actions")
			.child(
				cx.element("div")
					.attr("class", "buttons")
					.child(Self::button(cx, "mark-all-done", "Mark all as done", active == 0, |todos| {
						todos.toggle_all_todos(true);
					}))
					.child(Self::button(cx, "mark-all-open", "Mark all as open", completed == 0, |todos| {
						todos.toggle_all_todos(false);
					}))
					.child(Self::button(
						cx,
						"clear-completed is-danger",
						"Clear completed",
						completed == 0,
						|todos| {
							todos.clear_completed_todos();
						},
					))
					.build(),
			)
			.child(priority)
			.build()
	}

	fn name() -> &'static str {
		"BulkActions"
	}

	fn setup(&mut self, cx: &mut SetupCx<'_, Self>) {
		cx.subscribe_store(TODOS_KEY, Vec::<Todo>::new(), |bulk, todos| bulk.todos = todos);
	}
}
