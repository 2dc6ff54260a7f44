use taskdeck_pages::prelude::*;

/// Page footer; its content is static markup.
#[derive(Debug, Default)]
pub struct Footer;

impl Component for Footer {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("footer")
			.attr("class", "footer")
			.markup(r#"<div class="container"><p>&copy; 2025 Taskdeck</p></div>"#)
			.build()
	}

	fn name() -> &'static str {
		"Footer"
	}
}
