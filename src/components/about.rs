use taskdeck_pages::prelude::*;

const FEATURES: &[(&str, &str)] = &[
	("Priorities", "Mark tasks as high, medium or low priority."),
	("Due dates", "Overdue tasks are counted and can be filtered."),
	("Search", "Find tasks by words in the title or description."),
	("Bulk actions", "Complete, reopen or reprioritize every task at once."),
	("Local storage", "Your list is kept in the browser between visits."),
];

/// The `/about` page.
#[derive(Debug, Default)]
pub struct About;

impl Component for About {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let hero = cx
			.element("div")
			.attr("class", "hero is-light")
			.child(
				cx.element("div")
					.attr("class", "hero-body has-text-centered")
					.child(cx.element("h1").attr("class", "title is-2").text("About Taskdeck").build())
					.child(
						cx.element("h2")
							.attr("class", "subtitle is-4")
							.text("A small to-do list for the browser")
							.build(),
					)
					.build(),
			)
			.build();

		let features = cx
			.element("ul")
			.attr("class", "features")
			.children(FEATURES.iter().map(|(title, body)| {
				cx.element("li")
					.child(cx.element("strong").text(*title).build())
					.text(format!(" {}", body))
					.build()
			}))
			.build();

		cx.element("div")
			.attr("class", "container about")
			.child(hero)
			.child(cx.element("section").attr("class", "section").child(features).build())
			.build()
	}

	fn name() -> &'static str {
		"About"
	}
}
