//! End-to-end flows through the mounted application on the in-memory platform

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use taskdeck::app::{AppError, Platform, TaskdeckApp, bundled_settings, load_settings, start};
use taskdeck::todos::{Priority, StaticTodoSource, Todo};
use taskdeck_conf::{Settings, SettingsError};
use taskdeck_core::storage::{KeyValueStorage, MemoryStorage};
use taskdeck_core::{Clock, ManualClock};
use taskdeck_pages::dom::{Document, Event, Node};
use taskdeck_pages::platform::{Location, MemoryLocation};
use taskdeck_pages::spawn::run_until_stalled;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);
		self.logs
			.lock()
			.unwrap()
			.push(format!("[{}] {}", event.metadata().level(), visitor.message));
	}
}

struct Harness {
	location: Rc<MemoryLocation>,
	local: Rc<MemoryStorage>,
	session: Rc<MemoryStorage>,
	clock: Rc<ManualClock>,
	document: Rc<Document>,
	body: Node,
}

impl Harness {
	fn platform(&self, todos: Vec<Todo>) -> Platform {
		Platform {
			location: self.location.clone(),
			local_storage: self.local.clone(),
			session_storage: self.session.clone(),
			clock: self.clock.clone(),
			todo_source: Rc::new(StaticTodoSource::new(todos)),
			document: self.document.clone(),
		}
	}

	fn start(&self) -> TaskdeckApp {
		start(&self.body, Settings::default(), self.platform(seed())).unwrap()
	}

	fn sign_in(&self) {
		let keys = Settings::default().auth.session_keys;
		self.session.set_item(&keys.is_authenticated, "true").unwrap();
		self.session
			.set_item(&keys.login_time, &self.clock.now_millis().to_string())
			.unwrap();
	}
}

fn todo(id: u64, task: &str, done: bool, priority: Priority) -> Todo {
	Todo {
		id,
		task: task.to_string(),
		description: format!("Details for {}", task),
		done,
		priority,
		due_date: None,
	}
}

fn seed() -> Vec<Todo> {
	vec![
		todo(1, "Buy groceries", false, Priority::High),
		todo(2, "Read a book", true, Priority::Low),
		todo(3, "Write report", false, Priority::Medium),
	]
}

#[fixture]
fn harness() -> Harness {
	Harness {
		location: Rc::new(MemoryLocation::new()),
		local: Rc::new(MemoryStorage::new()),
		session: Rc::new(MemoryStorage::new()),
		clock: Rc::new(ManualClock::at_date(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())),
		document: Rc::new(Document::new()),
		body: Node::element("body"),
	}
}

fn by_name(root: &Node, name: &str) -> Node {
	root.find_by_attr("name", name)
		.unwrap_or_else(|| panic!("no element named {}", name))
}

fn cards(root: &Node) -> Vec<Node> {
	root.find_all(|n| n.has_attribute("data-id"))
}

fn type_into(node: &Node, value: &str) {
	node.dispatch(&Event::new("input").with_value(value));
}

fn log_in(app: &TaskdeckApp, password: &str) {
	type_into(&by_name(app.node(), "password"), password);
	by_name(app.node(), "password").dispatch(&Event::new("keydown").with_key("Enter"));
	run_until_stalled();
}

#[rstest]
fn test_empty_hash_shows_login_without_navigation(harness: Harness) {
	// Act
	let app = harness.start();

	// Assert
	assert_eq!(app.router().current_path().as_deref(), Some("/"));
	assert_eq!(harness.document.title(), "Todo App - Login");
	assert!(app.node().find_by_class("login").is_some());
	assert!(app.node().find_by_class("logout").is_none());
	assert!(app.node().find_by_class("footer").is_some());
}

#[rstest]
fn test_wrong_password_shows_error(harness: Harness) {
	// Arrange
	let app = harness.start();

	// Act
	log_in(&app, "letmein");

	// Assert
	let help = app.node().find_by_class("help").unwrap();
	assert_eq!(help.text_content(), "Incorrect password");
	assert_eq!(app.router().current_path().as_deref(), Some("/"));
}

#[rstest]
fn test_empty_password_is_required(harness: Harness) {
	// Arrange
	let app = harness.start();

	// Act
	log_in(&app, "");

	// Assert
	let help = app.node().find_by_class("help").unwrap();
	assert_eq!(help.text_content(), "Password is required");
}

#[rstest]
fn test_login_loads_list_and_shows_navigation(harness: Harness) {
	// Arrange
	let app = harness.start();

	// Act
	log_in(&app, "admin123");

	// Assert
	assert_eq!(app.router().current_path().as_deref(), Some("/todos"));
	assert_eq!(harness.location.hash(), "/todos");
	assert_eq!(harness.document.title(), "Todo App - Todos");
	assert_eq!(cards(app.node()).len(), 3);
	assert!(app.node().find_by_class("logout").is_some());
	let active = app.node().find_by_class("is-active").unwrap();
	assert_eq!(active.attribute("href").as_deref(), Some("#/todos"));
}

#[rstest]
fn test_add_form_appends_and_persists(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = harness.start();
	run_until_stalled();

	// Act
	type_into(&by_name(app.node(), "task"), "Call the plumber");
	type_into(&by_name(app.node(), "description"), "Kitchen sink is leaking");
	type_into(&by_name(app.node(), "due_date"), "2025-06-20");
	app.node()
		.find_by_class("add-todo")
		.unwrap()
		.dispatch(&Event::new("submit"));

	// Assert
	let cards = cards(app.node());
	assert_eq!(cards.len(), 4);
	assert_eq!(cards[3].attribute("data-id").as_deref(), Some("4"));
	let saved = harness.local.get_item("todoApp_store").unwrap().unwrap();
	assert!(saved.contains("Call the plumber"));
	assert_eq!(by_name(app.node(), "task").attribute("value").as_deref(), Some(""));
}

#[rstest]
fn test_invalid_add_form_reports_errors(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = harness.start();
	run_until_stalled();

	// Act
	type_into(&by_name(app.node(), "task"), "Go");
	app.node()
		.find_by_class("add-todo")
		.unwrap()
		.dispatch(&Event::new("submit"));

	// Assert
	assert_eq!(cards(app.node()).len(), 3);
	let errors: Vec<String> = app
		.node()
		.find_all_by_class("help")
		.iter()
		.map(Node::text_content)
		.collect();
	assert_eq!(errors.len(), 2);
	assert!(errors[0].starts_with("Task must be"));
}

#[rstest]
#[case::completed("completed", 1)]
#[case::active("active", 2)]
#[case::all("all", 3)]
fn test_status_filter_narrows_list(harness: Harness, #[case] filter: &str, #[case] expected: usize) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = harness.start();
	run_until_stalled();

	// Act
	app.node()
		.find_by_attr("data-filter", filter)
		.unwrap()
		.dispatch(&Event::new("click"));

	// Assert
	assert_eq!(cards(app.node()).len(), expected);
	let selected = app.node().find_by_attr("data-filter", filter).unwrap();
	assert!(selected.has_class("is-primary"));
}

#[rstest]
fn test_search_applies_after_debounce(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = harness.start();
	run_until_stalled();
	let search = app.node().find_by_class("search").unwrap();

	// Act
	type_into(&search, "book");
	let before = cards(app.node()).len();
	run_until_stalled();

	// Assert
	assert_eq!(before, 3);
	let visible = cards(app.node());
	assert_eq!(visible.len(), 1);
	assert_eq!(visible[0].attribute("data-id").as_deref(), Some("2"));
}

fn stat(root: &Node, heading: &str) -> String {
	root.find_all_by_class("level-item")
		.into_iter()
		.find(|item| item.find_by_class("heading").is_some_and(|h| h.text_content() == heading))
		.and_then(|item| item.find_by_class("title"))
		.map(|value| value.text_content())
		.unwrap_or_else(|| panic!("no stat {}", heading))
}

#[rstest]
fn test_stats_and_priority_filter_follow_service_clock(harness: Harness) {
	// Arrange
	let mut todos = seed();
	todos[0].due_date = NaiveDate::from_ymd_opt(2025, 6, 10);
	todos[2].due_date = NaiveDate::from_ymd_opt(2025, 6, 20);
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = start(&harness.body, Settings::default(), harness.platform(todos)).unwrap();
	run_until_stalled();

	// Act
	let select = app.node().find_by_class("priority-filter").unwrap();
	select.children()[0].dispatch(&Event::new("change").with_value("1"));

	// Assert
	assert_eq!(stat(app.node(), "Total"), "3");
	assert_eq!(stat(app.node(), "Active"), "2");
	assert_eq!(stat(app.node(), "Overdue"), "1");
	assert_eq!(stat(app.node(), "High priority"), "1");
	assert_eq!(stat(app.node(), "Done"), "33%");
	let visible = cards(app.node());
	assert_eq!(visible.len(), 1);
	assert_eq!(visible[0].attribute("data-id").as_deref(), Some("1"));
	assert!(visible[0].find_by_class("has-text-danger").is_some());
}

#[rstest]
fn test_card_actions_update_list(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = harness.start();
	run_until_stalled();

	// Act
	let first = cards(app.node()).remove(0);
	first.find_by_class("done").unwrap().dispatch(&Event::new("click"));
	let second = cards(app.node()).remove(1);
	second.find_by_class("undone").unwrap().dispatch(&Event::new("click"));

	// Assert
	let cards = cards(app.node());
	assert_eq!(cards[0].attribute("data-done").as_deref(), Some("true"));
	assert_eq!(cards[1].attribute("data-done").as_deref(), Some("false"));
}

#[rstest]
fn test_clear_completed_removes_done_cards(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/todos");
	let app = harness.start();
	run_until_stalled();

	// Act
	app.node()
		.find_by_class("clear-completed")
		.unwrap()
		.dispatch(&Event::new("click"));

	// Assert
	assert_eq!(cards(app.node()).len(), 2);
	assert!(app.node().find_by_class("clear-completed").unwrap().has_attribute("disabled"));
}

#[rstest]
fn test_logout_returns_to_login(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/about");
	let app = harness.start();

	// Act
	app.node().find_by_class("logout").unwrap().dispatch(&Event::new("click"));

	// Assert
	assert_eq!(app.router().current_path().as_deref(), Some("/"));
	assert!(app.node().find_by_class("login").is_some());
	assert!(app.node().find_by_class("logout").is_none());
	let keys = Settings::default().auth.session_keys;
	assert_eq!(harness.session.get_item(&keys.is_authenticated).unwrap(), None);
}

#[rstest]
fn test_authenticated_visit_to_login_redirects(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.location.set_hash("/");

	// Act
	let app = harness.start();

	// Assert
	assert_eq!(app.router().current_path().as_deref(), Some("/todos"));
	assert_eq!(harness.location.hash(), "/todos");
	assert!(app.node().find_by_class("login").is_none());
}

#[rstest]
#[case::protected("/about")]
#[case::unknown("/missing")]
fn test_unauthenticated_visit_lands_on_login(harness: Harness, #[case] hash: &str) {
	// Arrange
	harness.location.set_hash(hash);

	// Act
	let app = harness.start();

	// Assert
	assert_eq!(app.router().current_path().as_deref(), Some("/"));
	assert_eq!(harness.location.hash(), "/");
	assert!(app.node().find_by_class("login").is_some());
}

#[rstest]
fn test_unknown_route_is_logged(harness: Harness) {
	// Arrange
	let logs = Arc::new(Mutex::new(Vec::new()));
	let _guard = tracing_subscriber::registry()
		.with(LogCapture { logs: logs.clone() })
		.set_default();
	harness.location.set_hash("/nowhere");

	// Act
	let _app = harness.start();

	// Assert
	let captured = logs.lock().unwrap();
	assert!(
		captured
			.iter()
			.any(|line| line.starts_with("[WARN]") && line.contains("Unknown route /nowhere")),
		"expected a warning, got {:?}",
		*captured
	);
}

#[rstest]
fn test_expired_session_is_sent_to_login(harness: Harness) {
	// Arrange
	harness.sign_in();
	harness.clock.advance(Settings::default().auth.session_timeout_ms as i64 + 1);
	harness.location.set_hash("/todos");

	// Act
	let app = harness.start();

	// Assert
	assert_eq!(app.router().current_path().as_deref(), Some("/"));
}

#[rstest]
fn test_invalid_settings_refuse_to_start(harness: Harness) {
	// Arrange
	let mut settings = Settings::default();
	settings.auth.password.clear();

	// Act
	let result = start(&harness.body, settings, harness.platform(seed()));

	// Assert
	assert!(matches!(result, Err(AppError::Settings(_))));
	assert_eq!(harness.body.child_count(), 0);
}

#[rstest]
fn test_bundled_settings_match_defaults() {
	// Act
	let settings = bundled_settings().unwrap();

	// Assert
	assert_eq!(settings, Settings::default());
}

#[rstest]
fn test_overridden_password_signs_in(harness: Harness) {
	// Arrange
	let settings = load_settings([("TASKDECK_AUTH__PASSWORD", "s3cret"), ("HOME", "/root")]).unwrap();
	let app = start(&harness.body, settings, harness.platform(seed())).unwrap();

	// Act
	log_in(&app, "admin123");
	let rejected = app.router().current_path();
	log_in(&app, "s3cret");

	// Assert
	assert_eq!(rejected.as_deref(), Some("/"));
	assert_eq!(app.router().current_path().as_deref(), Some("/todos"));
}

#[rstest]
#[case::unknown_key("TASKDECK_AUTH__PASSCODE", "x")]
#[case::empty_password("TASKDECK_AUTH__PASSWORD", "")]
#[case::not_a_number("TASKDECK_AUTH__SESSION_TIMEOUT_MS", "soon")]
fn test_bad_override_is_rejected(#[case] name: &str, #[case] value: &str) {
	// Act
	let result = load_settings([(name, value)]);

	// Assert
	assert!(
		matches!(result, Err(AppError::Settings(_))),
		"expected a settings error, got {:?}",
		result
	);
}

#[rstest]
fn test_unknown_override_names_the_key() {
	// Act
	let result = load_settings([("TASKDECK_STORE__BUCKET", "todos")]);

	// Assert
	assert!(matches!(
		result,
		Err(AppError::Settings(SettingsError::UnknownKey(key))) if key == "store.bucket"
	));
}

#[rstest]
fn test_unmount_stops_routing(harness: Harness) {
	// Arrange
	let app = harness.start();

	// Act
	app.unmount();
	harness.location.set_hash("/about");

	// Assert
	assert_eq!(harness.location.listener_count(), 0);
	assert_eq!(harness.body.child_count(), 0);
	assert_eq!(app.router().current_path().as_deref(), Some("/"));
}
