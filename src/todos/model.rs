//! To-do records as stored under the `todos` store key.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Task priority; serialized as `1` (high) to `3` (low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
	/// 1
	High,
	/// 2
	#[default]
	Medium,
	/// 3
	Low,
}

impl Priority {
	/// All priorities, highest first
	pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

	/// Numeric level
	pub fn level(self) -> u8 {
		match self {
			Self::High => 1,
			Self::Medium => 2,
			Self::Low => 3,
		}
	}

	/// Display label
	pub fn label(self) -> &'static str {
		match self {
			Self::High => "High",
			Self::Medium => "Medium",
			Self::Low => "Low",
		}
	}
}

/// Raised for priority levels outside 1..=3 and unknown filter names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// Priority level outside 1..=3
	#[error("Invalid priority: {0}")]
	Priority(String),
	/// Unknown status filter
	#[error("Invalid filter: {0}")]
	Filter(String),
}

impl TryFrom<u8> for Priority {
	type Error = ParseError;

	fn try_from(level: u8) -> Result<Self, Self::Error> {
		match level {
			1 => Ok(Self::High),
			2 => Ok(Self::Medium),
			3 => Ok(Self::Low),
			other => Err(ParseError::Priority(other.to_string())),
		}
	}
}

impl From<Priority> for u8 {
	fn from(priority: Priority) -> Self {
		priority.level()
	}
}

impl FromStr for Priority {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim()
			.parse::<u8>()
			.map_err(|_| ParseError::Priority(s.to_string()))
			.and_then(Priority::try_from)
	}
}

impl fmt::Display for Priority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.level())
	}
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
	pub id: u64,
	pub task: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub done: bool,
	#[serde(default)]
	pub priority: Priority,
	#[serde(default, deserialize_with = "optional_date")]
	pub due_date: Option<NaiveDate>,
}

impl Todo {
	/// Not done and due before `today`
	pub fn is_overdue(&self, today: NaiveDate) -> bool {
		!self.done && self.due_date.is_some_and(|due| due < today)
	}

	/// Case-insensitive match against task and description; an empty
	/// query matches everything
	pub fn matches_search(&self, query: &str) -> bool {
		let query = query.trim().to_lowercase();
		query.is_empty()
			|| self.task.to_lowercase().contains(&query)
			|| self.description.to_lowercase().contains(&query)
	}
}

/// Accepts `null`, `""` and `YYYY-MM-DD`.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Option<String> = Option::deserialize(deserializer)?;
	match raw.as_deref().map(str::trim) {
		None | Some("") => Ok(None),
		Some(date) => date
			.parse::<NaiveDate>()
			.map(Some)
			.map_err(serde::de::Error::custom),
	}
}

/// Fields of a to-do being created; the id and status are assigned on add.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTodo {
	pub task: String,
	pub description: String,
	pub priority: Priority,
	pub due_date: Option<NaiveDate>,
}

/// Partial update of a to-do; `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoUpdate {
	pub task: Option<String>,
	pub description: Option<String>,
	pub priority: Option<Priority>,
	/// `Some(None)` clears the due date
	pub due_date: Option<Option<NaiveDate>>,
	pub done: Option<bool>,
}

impl TodoUpdate {
	pub(crate) fn apply(self, todo: &mut Todo) {
		if let Some(task) = self.task {
			todo.task = task;
		}
		if let Some(description) = self.description {
			todo.description = description;
		}
		if let Some(priority) = self.priority {
			todo.priority = priority;
		}
		if let Some(due_date) = self.due_date {
			todo.due_date = due_date;
		}
		if let Some(done) = self.done {
			todo.done = done;
		}
	}
}

/// Status filter of the to-do list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoFilter {
	#[default]
	All,
	Active,
	Completed,
	Overdue,
}

impl TodoFilter {
	/// Every filter in display order
	pub const ALL: [TodoFilter; 4] = [
		TodoFilter::All,
		TodoFilter::Active,
		TodoFilter::Completed,
		TodoFilter::Overdue,
	];

	/// Whether `todo` passes the filter
	pub fn matches(self, todo: &Todo, today: NaiveDate) -> bool {
		match self {
			Self::All => true,
			Self::Active => !todo.done,
			Self::Completed => todo.done,
			Self::Overdue => todo.is_overdue(today),
		}
	}

	/// Name used in markup and settings
	pub fn as_str(self) -> &'static str {
		match self {
			Self::All => "all",
			Self::Active => "active",
			Self::Completed => "completed",
			Self::Overdue => "overdue",
		}
	}

	/// Display label
	pub fn label(self) -> &'static str {
		match self {
			Self::All => "All",
			Self::Active => "Active",
			Self::Completed => "Completed",
			Self::Overdue => "Overdue",
		}
	}
}

impl FromStr for TodoFilter {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|f| f.as_str() == s)
			.ok_or_else(|| ParseError::Filter(s.to_string()))
	}
}

/// The to-dos passing the status filter, the search query and the
/// priority filter (`None` for any priority), in list order.
pub fn filter_todos(
	todos: &[Todo],
	filter: TodoFilter,
	search: &str,
	priority: Option<Priority>,
	today: NaiveDate,
) -> Vec<Todo> {
	todos
		.iter()
		.filter(|t| filter.matches(t, today))
		.filter(|t| t.matches_search(search))
		.filter(|t| priority.is_none_or(|p| t.priority == p))
		.cloned()
		.collect()
}

/// Summary counts shown above the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TodoStats {
	pub total: usize,
	pub active: usize,
	pub completed: usize,
	pub overdue: usize,
	pub high_priority: usize,
	/// Rounded to the nearest integer; 0 when there are no to-dos
	pub completion_percentage: u8,
}

impl TodoStats {
	/// Computes the counts for `todos`
	pub fn from_todos(todos: &[Todo], today: NaiveDate) -> Self {
		let total = todos.len();
		let completed = todos.iter().filter(|t| t.done).count();
		let completion_percentage = if total == 0 {
			0
		} else {
			((completed as f64 / total as f64) * 100.0).round() as u8
		};
		Self {
			total,
			active: total - completed,
			completed,
			overdue: todos.iter().filter(|t| t.is_overdue(today)).count(),
			high_priority: todos
				.iter()
				.filter(|t| !t.done && t.priority == Priority::High)
				.count(),
			completion_percentage,
		}
	}
}
