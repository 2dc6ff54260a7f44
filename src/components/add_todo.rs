//! Form adding a to-do
//!
//! Input edits update the form state without re-rendering so the focused
//! field keeps its caret; the form re-renders on submit and when an error
//! message has to be cleared.

use chrono::NaiveDate;
use taskdeck_core::{Clock, SystemClock, debug_log};
use taskdeck_pages::prelude::*;

use crate::todos::{NewTodo, Priority, TodosService};

const MIN_TASK_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 10;

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
	pub task: String,
	pub description: String,
	/// Priority level as entered; empty means the default
	pub priority: String,
	/// `YYYY-MM-DD`; empty means no due date
	pub due_date: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
	pub task: Option<String>,
	pub description: Option<String>,
	pub due_date: Option<String>,
}

impl FormErrors {
	pub fn is_empty(&self) -> bool {
		self.task.is_none() && self.description.is_none() && self.due_date.is_none()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
	Task,
	Description,
	Priority,
	DueDate,
}

/// Checks the form against `today`.
pub fn validate(form: &TodoForm, today: NaiveDate) -> Result<NewTodo, FormErrors> {
	let mut errors = FormErrors::default();

	let task = form.task.trim();
	if task.chars().count() < MIN_TASK_LEN {
		errors.task = Some(format!("Task must be at least {} characters", MIN_TASK_LEN));
	}
	let description = form.description.trim();
	if description.chars().count() < MIN_DESCRIPTION_LEN {
		errors.description = Some(format!(
			"Description must be at least {} characters",
			MIN_DESCRIPTION_LEN
		));
	}
	let due_date = match form.due_date.trim() {
		"" => None,
		raw => match raw.parse::<NaiveDate>() {
			Ok(date) if date < today => {
				errors.due_date = Some("Due date cannot be in the past".to_string());
				None
			}
			Ok(date) => Some(date),
			Err(_) => {
				errors.due_date = Some("Due date is not a valid date".to_string());
				None
			}
		},
	};
	let priority = form.priority.parse::<Priority>().unwrap_or_default();

	if !errors.is_empty() {
		return Err(errors);
	}
	Ok(NewTodo {
		task: task.to_string(),
		description: description.to_string(),
		priority,
		due_date,
	})
}

/// The add form below the list.
#[derive(Debug, Default)]
pub struct AddTodo {
	pub form: TodoForm,
	pub errors: FormErrors,
}

impl AddTodo {
	pub fn new() -> Self {
		Self::default()
	}

	fn edit(scope: &ComponentScope<Self>, field: Field, value: String) {
		let mut had_error = false;
		scope.set(|add| {
			let error = match field {
				Field::Task => {
					add.form.task = value;
					&mut add.errors.task
				}
				Field::Description => {
					add.form.description = value;
					&mut add.errors.description
				}
				Field::DueDate => {
					add.form.due_date = value;
					&mut add.errors.due_date
				}
				Field::Priority => {
					add.form.priority = value;
					return;
				}
			};
			had_error = error.take().is_some();
		});
		if had_error {
			scope.rerender();
		}
	}

	fn submit(scope: &ComponentScope<Self>) {
		let Some(form) = scope.with(|add| add.form.clone()) else {
			return;
		};
		let todos = scope.service::<TodosService>();
		let today = todos
			.as_ref()
			.map_or_else(|| SystemClock.today(), |todos| todos.today());
		match validate(&form, today) {
			Ok(new) => {
				let added = todos.and_then(|todos| todos.add_todo(new));
				debug_log!("AddTodo: added {:?}", added.as_ref().map(|t| t.id));
				if added.is_some() {
					scope.update(|add| *add = AddTodo::default());
				}
			}
			Err(errors) => scope.update(move |add| add.errors = errors),
		}
	}

	fn field(
		cx: &RenderCx<'_, Self>,
		label: &str,
		control: Node,
		error: Option<&String>,
	) -> Node {
		cx.element("div")
			.attr("class", "field")
			.child(cx.element("label").attr("class", "label").text(label).build())
			.child(cx.element("div").attr("class", "control").child(control).build())
			.child(error.map(|message| {
				cx.element("p")
					.attr("class", "help is-danger")
					.text(message.clone())
					.build()
			}))
			.build()
	}

	fn input_class(error: Option<&String>) -> &'static str {
		if error.is_some() {
			"input is-danger"
		} else {
			"input"
		}
	}
}

impl Component for AddTodo {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let task = cx
			.element("input")
			.attr("class", Self::input_class(self.errors.task.as_ref()))
			.attr("name", "task")
			.attr("type", "text")
			.attr("placeholder", "What needs doing?")
			.attr("value", &self.form.task)
			.on("input", |scope, event| {
				AddTodo::edit(scope, Field::Task, event.value().unwrap_or_default().to_string());
			})
			.build();

		let description = cx
			.element("textarea")
			.attr(
				"class",
				if self.errors.description.is_some() {
					"textarea is-danger"
				} else {
					"textarea"
				},
			)
			.attr("name", "description")
			.on("input", |scope, event| {
				AddTodo::edit(scope, Field::Description, event.value().unwrap_or_default().to_string());
			})
			.text(self.form.description.clone())
			.build();

		let current = self.form.priority.parse::<Priority>().unwrap_or_default();
		let priority = cx
			.element("div")
			.attr("class", "select")
			.child(
				cx.element("select")
					.attr("name", "priority")
					.on("change", |scope, event| {
						AddTodo::edit(scope, Field::Priority, event.value().unwrap_or_default().to_string());
					})
					.children(Priority::ALL.iter().map(|p| {
						cx.element("option")
							.attr("value", p.level())
							.attr("selected", (*p == current).then_some(true))
							.text(p.label())
							.build()
					}))
					.build(),
			)
			.build();

		let due_date = cx
			.element("input")
			.attr("class", Self::input_class(self.errors.due_date.as_ref()))
			.attr("name", "due_date")
			.attr("type", "date")
			.attr("value", &self.form.due_date)
			.on("input", |scope, event| {
				AddTodo::edit(scope, Field::DueDate, event.value().unwrap_or_default().to_string());
			})
			.build();

		cx.element("form")
			.attr("class", "box add-todo")
			.on("submit", |scope, event| {
				event.prevent_default();
				AddTodo::submit(scope);
			})
			.child(cx.element("h3").attr("class", "title is-5").text("Add a task").build())
			.child(Self::field(cx, "Task", task, self.errors.task.as_ref()))
			.child(Self::field(cx, "Description", description, self.errors.description.as_ref()))
			.child(Self::field(cx, "Priority", priority, None))
			.child(Self::field(cx, "Due date", due_date, self.errors.due_date.as_ref()))
			.child(
				cx.element("button")
					.attr("class", "button is-primary")
					.attr("type", "submit")
					.text("Add")
					.build(),
			)
			.build()
	}

	fn name() -> &'static str {
		"AddTodo"
	}
}
