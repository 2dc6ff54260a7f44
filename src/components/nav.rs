//! Navigation bar

use taskdeck_auth::AuthService;
use taskdeck_core::Authenticator;
use taskdeck_pages::prelude::*;

use super::ROUTE_KEY;

/// A single navigation link.
pub struct NavItem {
	pub path: String,
	pub label: String,
	pub active: bool,
	pub on_navigate: Option<Callback<String>>,
}

impl NavItem {
	pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			label: label.into(),
			active: false,
			on_navigate: None,
		}
	}
}

impl Component for NavItem {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let class = if self.active {
			"navbar-item is-active"
		} else {
			"navbar-item"
		};
		cx.element("a")
			.attr("class", class)
			.attr("href", format!("#{}", self.path))
			.on("click", |scope, event| {
				let target = scope.with(|item: &NavItem| (item.path.clone(), item.on_navigate.clone()));
				if let Some((path, Some(on_navigate))) = target {
					event.prevent_default();
					on_navigate.call(path);
				}
			})
			.child(cx.element("span").text(self.label.clone()).build())
			.build()
	}

	fn name() -> &'static str {
		"NavItem"
	}
}

const LINKS: &[(&str, &str)] = &[("/todos", "Tasks"), ("/about", "About")];

/// Top navigation with links and a logout button.
///
/// Follows the `route` store key so the active link and the logout button
/// track the committed route and session.
#[derive(Debug, Default)]
pub struct Nav {
	route: String,
}

impl Nav {
	pub fn new() -> Self {
		Self::default()
	}

	fn navigate(scope: &ComponentScope<Self>, path: &str, replace: bool) {
		match scope.service::<Router>() {
			Some(router) => router.navigate(path, replace),
			None => taskdeck_core::warn_log!("Nav: no router to navigate to {}", path),
		}
	}
}

impl Component for Nav {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let authenticated = cx
			.service::<AuthService>()
			.is_some_and(|auth| auth.is_authenticated());
		let on_navigate = cx.scope().callback(|scope, path: String| {
			Nav::navigate(scope, &path, false);
		});

		let start = cx
			.element("div")
			.attr("class", "navbar-start")
			.child(
				cx.element("a")
					.attr("class", "navbar-item brand")
					.attr("href", "#/")
					.text("Taskdeck")
					.build(),
			)
			.children(LINKS.iter().filter(|_| authenticated).map(|(path, label)| {
				cx.mount(NavItem {
					active: self.route == *path,
					on_navigate: Some(on_navigate.clone()),
					..NavItem::new(*path, *label)
				})
			}))
			.build();

		let logout = authenticated.then(|| {
			cx.element("div")
				.attr("class", "navbar-item")
				.child(
					cx.element("button")
						.attr("class", "button is-light is-small logout")
						.attr("title", "Log out")
						.on("click", |scope, _| {
							if let Some(auth) = scope.service::<AuthService>() {
								auth.logout();
							}
							Nav::navigate(scope, "/", true);
						})
						.text("Log out")
						.build(),
				)
				.build()
		});

		cx.element("div")
			.attr("class", "container mb-4")
			.child(
				cx.element("nav")
					.attr("class", "navbar")
					.child(
						cx.element("div")
							.attr("class", "navbar-menu")
							.child(start)
							.child(cx.element("div").attr("class", "navbar-end").child(logout).build())
							.build(),
					)
					.build(),
			)
			.build()
	}

	fn name() -> &'static str {
		"Nav"
	}

	fn setup(&mut self, cx: &mut SetupCx<'_, Self>) {
		cx.subscribe_store(ROUTE_KEY, String::new(), |nav, route| nav.route = route);
	}
}

/// Page header hosting the navigation.
#[derive(Debug, Default)]
pub struct Header;

impl Component for Header {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		cx.element("header").child(cx.mount(Nav::new())).build()
	}

	fn name() -> &'static str {
		"Header"
	}
}
