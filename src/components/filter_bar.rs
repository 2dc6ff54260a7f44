//! Status, search and priority filters above the list

use std::time::Duration;

use taskdeck_core::{Clock, SystemClock};
use taskdeck_pages::prelude::*;

use crate::todos::{Priority, TODOS_KEY, Todo, TodoFilter, TodoStats, TodosService};

/// Quiet period before a search edit is reported.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// The filters a [`FilterBar`] reports to its parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
	pub filter: TodoFilter,
	pub search: String,
	pub priority: Option<Priority>,
}

/// Filter controls with a summary of the list.
pub struct FilterBar {
	pub state: FilterState,
	pub on_change: Option<Callback<FilterState>>,
	todos: Vec<Todo>,
	search_generation: u64,
}

impl FilterBar {
	pub fn new(state: FilterState, on_change: Option<Callback<FilterState>>) -> Self {
		Self {
			state,
			on_change,
			todos: Vec::new(),
			search_generation: 0,
		}
	}

	/// Applies `change` to the state, re-renders and reports the result.
	fn change(scope: &ComponentScope<Self>, change: impl FnOnce(&mut FilterState)) {
		let Some((mut state, on_change)) = scope.with(|bar| (bar.state.clone(), bar.on_change.clone()))
		else {
			return;
		};
		change(&mut state);
		let next = state.clone();
		scope.update(move |bar| bar.state = next);
		if let Some(on_change) = on_change {
			on_change.call(state);
		}
	}

	fn stats(&self, cx: &RenderCx<'_, Self>) -> Node {
		let stats = cx.service::<TodosService>().map_or_else(
			|| TodoStats::from_todos(&self.todos, SystemClock.today()),
			|todos| todos.get_todos_stats(),
		);
		let entries = [
			("Total", stats.total.to_string()),
			("Active", stats.active.to_string()),
			("Completed", stats.completed.to_string()),
			("Overdue", stats.overdue.to_string()),
			("High priority", stats.high_priority.to_string()),
			("Done", format!("{}%", stats.completion_percentage)),
		];
		cx.element("nav")
			.attr("class", "level stats")
			.children(entries.into_iter().map(|(heading, value)| {
				cx.element("div")
					.attr("class", "level-item has-text-centered")
					.child(cx.element("p").attr("class", "heading").text(heading).build())
					.child(cx.element("p").attr("class", "title is-5").text(value).build())
					.build()
			}))
			.build()
	}
}

impl Component for FilterBar {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let buttons = cx
			.element("div")
			.attr("class", "buttons has-addons filters")
			.children(TodoFilter::ALL.iter().map(|&filter| {
				let class = if self.state.filter == filter {
					"button is-primary"
				} else {
					"button"
				};
				cx.element("button")
					.attr("class", class)
					.attr("data-filter", filter.as_str())
					.on("click", move |scope, _| {
						FilterBar::change(scope, |state| state.filter = filter);
					})
					.text(filter.label())
					.build()
			}))
			.build();

		let search = cx
			.element("input")
			.attr("class", "input search")
			.attr("type", "search")
			.attr("placeholder", "Search tasks")
			.attr("value", self.state.search.clone())
			.on("input", |scope, event| {
				let value = event.value().unwrap_or_default().to_string();
				let mut generation = 0;
				scope.set(|bar| {
					bar.state.search = value;
					bar.search_generation += 1;
					generation = bar.search_generation;
				});
				let scope = scope.clone();
				spawn_local(async move {
					sleep(SEARCH_DEBOUNCE).await;
					let pending = scope.with(|bar| {
						(bar.search_generation == generation).then(|| (bar.state.clone(), bar.on_change.clone()))
					});
					if let Some(Some((state, on_change))) = pending {
						scope.rerender();
						if let Some(on_change) = on_change {
							on_change.call(state);
						}
					}
				});
			})
			.build();

		let selected = self.state.priority.map(Priority::level);
		let priority = cx
			.element("div")
			.attr("class", "select priority-filter")
			.child(
				cx.element("select")
					.on("change", |scope, event| {
						let priority = event.value().and_then(|value| value.parse::<Priority>().ok());
						FilterBar::change(scope, |state| state.priority = priority);
					})
					.child(
						cx.element("option")
							.attr("value", "all")
							.attr("selected", selected.is_none().then_some(true))
							.text("All priorities")
							.build(),
					)
					.children(Priority::ALL.iter().map(|p| {
						cx.element("option")
							.attr("value", p.level())
							.attr("selected", (selected == Some(p.level())).then_some(true))
							.text(p.label())
							.build()
					}))
					.build(),
			)
			.build();

		cx.element("section")
			.attr("class", "box filter-bar")
			.child(self.stats(cx))
			.child(
				cx.element("div")
					.attr("class", "field is-grouped")
					.child(buttons)
					.child(search)
					.child(priority)
					.build(),
			)
			.build()
	}

	fn name() -> &'static str {
		"FilterBar"
	}

	fn setup(&mut self, cx: &mut SetupCx<'_, Self>) {
		cx.subscribe_store(TODOS_KEY, Vec::<Todo>::new(), |bar, todos| bar.todos = todos);
	}
}
