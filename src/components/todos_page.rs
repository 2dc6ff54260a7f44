use taskdeck_pages::prelude::*;

use super::add_todo::AddTodo;
use super::bulk_actions::BulkActions;
use super::filter_bar::{FilterBar, FilterState};
use super::todo_list::TodosList;

/// The `/todos` page: filters, bulk actions, the list and the add form.
///
/// Owns the filter state. The filter bar reports changes through its
/// callback; the page re-renders and rebuilds the list with the new filters.
#[derive(Debug, Default)]
pub struct TodosPage {
	pub filters: FilterState,
}

impl TodosPage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Component for TodosPage {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let on_change = cx.scope().callback(|scope, filters: FilterState| {
			scope.update(move |page| page.filters = filters);
		});

		cx.element("div")
			.attr("class", "container todos-page")
			.child(cx.mount(FilterBar::new(self.filters.clone(), Some(on_change))))
			.child(cx.mount(BulkActions::new()))
			.child(cx.mount(TodosList::new(self.filters.clone())))
			.child(cx.mount(AddTodo::new()))
			.build()
	}

	fn name() -> &'static str {
		"TodosPage"
	}
}

/// Root component holding the router outlet's container.
///
/// Always renders the same node, so pages mounted into it by the outlet
/// survive re-renders of the host.
#[derive(Debug)]
pub struct PageHost {
	container: Node,
}

impl PageHost {
	pub fn new() -> Self {
		let container = Node::element("section");
		container.set_attribute("class", "page");
		container.set_attribute("data-testid", "router-outlet");
		Self { container }
	}

	pub fn container(&self) -> Node {
		self.container.clone()
	}
}

impl Default for PageHost {
	fn default() -> Self {
		Self::new()
	}
}

impl Component for PageHost {
	fn render(&self, _cx: &RenderCx<'_, Self>) -> Node {
		self.container.clone()
	}

	fn name() -> &'static str {
		"PageHost"
	}
}
