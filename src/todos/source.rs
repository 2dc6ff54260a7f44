//! Where the initial to-do list comes from.

use futures::future::LocalBoxFuture;
use serde::Deserialize;
use thiserror::Error;

use super::model::Todo;

/// Errors raised while loading to-dos.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The request could not be sent or completed
	#[error("Network error: {0}")]
	Network(String),
	/// The server answered with a non-success status
	#[error("Server error {status}: {message}")]
	Status { status: u16, message: String },
	/// The body was not a `{ "data": [...] }` document
	#[error("Invalid payload: {0}")]
	Decode(String),
}

/// Loads the initial to-do list.
pub trait TodoSource {
	/// Fetches every to-do
	fn fetch(&self) -> LocalBoxFuture<'_, Result<Vec<Todo>, FetchError>>;
}

#[derive(Deserialize)]
struct Payload {
	data: Vec<Todo>,
}

/// Parses a `{ "data": [...] }` document
pub fn parse_payload(body: &str) -> Result<Vec<Todo>, FetchError> {
	serde_json::from_str::<Payload>(body)
		.map(|payload| payload.data)
		.map_err(|e| FetchError::Decode(e.to_string()))
}

/// Fetches `{ "data": [...] }` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTodoSource {
	url: String,
}

impl HttpTodoSource {
	/// Reads from `url` (`/data.json` by default in settings)
	pub fn new(url: impl Into<String>) -> Self {
		Self { url: url.into() }
	}

	/// Target URL
	pub fn url(&self) -> &str {
		&self.url
	}

	#[cfg(target_arch = "wasm32")]
	async fn load(&self) -> Result<Vec<Todo>, FetchError> {
		use gloo_net::http::Request;

		let response = Request::get(&self.url)
			.send()
			.await
			.map_err(|e| FetchError::Network(e.to_string()))?;

		if !response.ok() {
			return Err(FetchError::Status {
				status: response.status(),
				message: response.status_text(),
			});
		}

		let body = response
			.text()
			.await
			.map_err(|e| FetchError::Network(e.to_string()))?;
		parse_payload(&body)
	}

	#[cfg(not(target_arch = "wasm32"))]
	async fn load(&self) -> Result<Vec<Todo>, FetchError> {
		Err(FetchError::Network(format!(
			"HTTP requests to {} are not supported outside WASM",
			self.url
		)))
	}
}

impl TodoSource for HttpTodoSource {
	fn fetch(&self) -> LocalBoxFuture<'_, Result<Vec<Todo>, FetchError>> {
		Box::pin(self.load())
	}
}

/// A fixed result, for native builds and tests.
#[derive(Debug, Clone)]
pub struct StaticTodoSource {
	result: Result<Vec<Todo>, FetchError>,
}

impl StaticTodoSource {
	/// Always yields `todos`
	pub fn new(todos: Vec<Todo>) -> Self {
		Self { result: Ok(todos) }
	}

	/// Parses a `{ "data": [...] }` document once, up front
	pub fn from_json(body: &str) -> Self {
		Self {
			result: parse_payload(body),
		}
	}

	/// Always fails with `error`
	pub fn failing(error: FetchError) -> Self {
		Self { result: Err(error) }
	}
}

impl TodoSource for StaticTodoSource {
	fn fetch(&self) -> LocalBoxFuture<'_, Result<Vec<Todo>, FetchError>> {
		let result = self.result.clone();
		Box::pin(async move { result })
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use rstest::rstest;

	use super::*;

	#[rstest]
	fn test_payload_reads_data_array() {
		// Arrange
		let body = r#"{ "data": [ { "id": 1, "task": "Vacuum", "done": true } ] }"#;

		// Act
		let todos = parse_payload(body).unwrap();

		// Assert
		assert_eq!(todos.len(), 1);
		assert_eq!(todos[0].task, "Vacuum");
		assert!(todos[0].done);
	}

	#[rstest]
	#[case::bare_array(r#"[ { "id": 1, "task": "T" } ]"#)]
	#[case::not_json("<html>")]
	fn test_payload_rejects_other_shapes(#[case] body: &str) {
		assert!(matches!(parse_payload(body), Err(FetchError::Decode(_))));
	}

	#[rstest]
	fn test_static_source_replays_result() {
		// Arrange
		let source = StaticTodoSource::failing(FetchError::Network("offline".into()));

		// Act
		let first = block_on(source.fetch());
		let second = block_on(source.fetch());

		// Assert
		assert_eq!(first, Err(FetchError::Network("offline".into())));
		assert_eq!(first, second);
	}
}
