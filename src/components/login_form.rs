//! Password form shown on `/`

use std::time::Duration;

use taskdeck_auth::AuthService;
use taskdeck_conf::Settings;
use taskdeck_core::{info_log, warn_log};
use taskdeck_pages::prelude::*;

const DEFAULT_DELAY_MS: u64 = 300;

/// The login form.
///
/// Submitting waits `auth.login_delay_ms` before checking the password, then
/// either calls `on_success` and navigates to `redirect_to`, or shows an
/// error.
pub struct LoginForm {
	pub password: String,
	pub error: Option<String>,
	pub loading: bool,
	pub on_success: Option<Callback>,
	pub redirect_to: String,
}

impl Default for LoginForm {
	fn default() -> Self {
		Self {
			password: String::new(),
			error: None,
			loading: false,
			on_success: None,
			redirect_to: "/todos".to_string(),
		}
	}
}

impl LoginForm {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on_success(mut self, callback: impl Into<Callback>) -> Self {
		self.on_success = Some(callback.into());
		self
	}

	fn submit(scope: &ComponentScope<Self>) {
		let Some((password, loading)) = scope.with(|form| (form.password.clone(), form.loading)) else {
			return;
		};
		if loading {
			return;
		}
		if password.is_empty() {
			scope.update(|form| form.error = Some("Password is required".to_string()));
			return;
		}
		scope.update(|form| {
			form.loading = true;
			form.error = None;
		});

		let delay = scope
			.service::<Settings>()
			.map_or(DEFAULT_DELAY_MS, |settings| settings.auth.login_delay_ms);
		let scope = scope.clone();
		spawn_local(async move {
			sleep(Duration::from_millis(delay)).await;
			let Some(auth) = scope.service::<AuthService>() else {
				warn_log!("LoginForm: no AuthService registered");
				scope.update(|form| form.loading = false);
				return;
			};
			if !auth.login(&password) {
				scope.update(|form| {
					form.loading = false;
					form.error = Some("Incorrect password".to_string());
				});
				return;
			}

			info_log!("Login succeeded");
			let Some((on_success, redirect_to)) =
				scope.with(|form| (form.on_success.clone(), form.redirect_to.clone()))
			else {
				return;
			};
			scope.update(|form| {
				form.loading = false;
				form.password.clear();
			});
			if let Some(on_success) = on_success {
				on_success.call(());
			}
			if let Some(router) = scope.service::<Router>() {
				router.navigate(&redirect_to, false);
			}
		});
	}
}

impl Component for LoginForm {
	fn render(&self, cx: &RenderCx<'_, Self>) -> Node {
		let input_class = if self.error.is_some() {
			"input is-danger"
		} else {
			"input"
		};
		let password = cx
			.element("input")
			.attr("class", input_class)
			.attr("type", "password")
			.attr("name", "password")
			.attr("placeholder", "Password")
			.attr("value", &self.password)
			.attr("disabled", self.loading.then_some(true))
			.on("input", |scope, event| {
				let value = event.value().unwrap_or_default().to_string();
				scope.set(|form| form.password = value);
			})
			.on("keydown", |scope, event| {
				if event.key() == Some("Enter") {
					event.prevent_default();
					LoginForm::submit(scope);
				}
			})
			.build();

		let button_class = if self.loading {
			"button is-primary is-loading"
		} else {
			"button is-primary"
		};

		cx.element("div")
			.attr("class", "container login")
			.child(
				cx.element("div")
					.attr("class", "box")
					.child(cx.element("h1").attr("class", "title").text("Log in").build())
					.child(
						cx.element("div")
							.attr("class", "field")
							.child(cx.element("div").attr("class", "control").child(password).build())
							.child(self.error.as_ref().map(|message| {
								cx.element("p")
									.attr("class", "help is-danger")
									.text(message.clone())
									.build()
							}))
							.build(),
					)
					.child(
						cx.element("button")
							.attr("class", button_class)
							.attr("disabled", self.loading.then_some(true))
							.on("click", |scope, _| LoginForm::submit(scope))
							.text("Log in")
							.build(),
					)
					.build(),
			)
			.build()
	}

	fn name() -> &'static str {
		"LoginForm"
	}
}
