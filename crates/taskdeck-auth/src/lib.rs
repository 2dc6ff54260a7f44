//! # taskdeck session authentication
//!
//! A single shared password checked client side. A successful login stores
//! an authenticated flag and the login timestamp in session-scoped storage;
//! the session expires a fixed time after login and is cleared the next
//! time it is checked.
//!
//! ```
//! use std::rc::Rc;
//!
//! use taskdeck_auth::AuthService;
//! use taskdeck_conf::AuthSettings;
//! use taskdeck_core::{Authenticator, ManualClock, MemoryStorage};
//!
//! let clock = ManualClock::new(0);
//! let auth = AuthService::new(
//!     Rc::new(MemoryStorage::new()),
//!     AuthSettings::default(),
//!     Rc::new(clock.clone()),
//! );
//!
//! assert!(auth.login("admin123"));
//! assert!(auth.is_authenticated());
//!
//! clock.advance(24 * 60 * 60 * 1000 + 1);
//! assert!(!auth.is_authenticated());
//! ```

use std::rc::Rc;
use std::time::Duration;

use taskdeck_conf::AuthSettings;
use taskdeck_core::{Authenticator, Clock, KeyValueStorage, error_log, info_log};
use taskdeck_di::Service;

/// Session-storage backed authentication.
pub struct AuthService {
	storage: Rc<dyn KeyValueStorage>,
	settings: AuthSettings,
	clock: Rc<dyn Clock>,
}

impl AuthService {
	/// Creates the service over `storage` (session-scoped in the browser)
	pub fn new(
		storage: Rc<dyn KeyValueStorage>,
		settings: AuthSettings,
		clock: Rc<dyn Clock>,
	) -> Self {
		Self {
			storage,
			settings,
			clock,
		}
	}

	/// Checks `password` and starts a session on success.
	///
	/// An empty password is rejected without touching storage.
	pub fn login(&self, password: &str) -> bool {
		if password.is_empty() || password != self.settings.password {
			return false;
		}

		let keys = &self.settings.session_keys;
		let now = self.clock.now_millis().to_string();
		let result = self
			.storage
			.set_item(&keys.is_authenticated, "true")
			.and_then(|()| self.storage.set_item(&keys.login_time, &now));
		match result {
			Ok(()) => {
				info_log!("Session started");
				true
			}
			Err(e) => {
				error_log!("Failed to store session: {}", e);
				false
			}
		}
	}

	/// Clears the session markers
	pub fn logout(&self) {
		let keys = &self.settings.session_keys;
		for key in [&keys.is_authenticated, &keys.login_time] {
			if let Err(e) = self.storage.remove_item(key) {
				error_log!("Failed to clear session key '{}': {}", key, e);
			}
		}
	}

	/// Time left before the session expires, zero when not authenticated
	pub fn session_time_remaining(&self) -> Duration {
		match self.session_age() {
			Some(age) if self.is_authenticated() => {
				let remaining = self.timeout_ms().saturating_sub(age).max(0);
				Duration::from_millis(u64::try_from(remaining).unwrap_or(0))
			}
			_ => Duration::ZERO,
		}
	}

	/// Restarts the session clock when authenticated
	pub fn refresh_session(&self) {
		if !self.is_authenticated() {
			return;
		}
		let now = self.clock.now_millis().to_string();
		if let Err(e) = self
			.storage
			.set_item(&self.settings.session_keys.login_time, &now)
		{
			error_log!("Failed to refresh session: {}", e);
		}
	}

	fn read(&self, key: &str) -> Option<String> {
		match self.storage.get_item(key) {
			Ok(value) => value,
			Err(e) => {
				error_log!("Failed to read session key '{}': {}", key, e);
				None
			}
		}
	}

	/// Milliseconds since login.
	///
	/// `None` when the timestamp is missing, unparsable, lies in the future
	/// or is too far from now to subtract.
	fn session_age(&self) -> Option<i64> {
		let login_time = self.read(&self.settings.session_keys.login_time)?;
		let login_time = login_time.trim().parse::<i64>().ok()?;
		self.clock
			.now_millis()
			.checked_sub(login_time)
			.filter(|age| *age >= 0)
	}

	fn timeout_ms(&self) -> i64 {
		i64::try_from(self.settings.session_timeout_ms).unwrap_or(i64::MAX)
	}
}

impl Authenticator for AuthService {
	/// Whether a live session exists.
	///
	/// An expired session, or one whose timestamp cannot be read, is
	/// cleared as a side effect.
	fn is_authenticated(&self) -> bool {
		let keys = &self.settings.session_keys;
		let (Some(flag), Some(_)) = (self.read(&keys.is_authenticated), self.read(&keys.login_time))
		else {
			return false;
		};

		match self.session_age() {
			Some(age) if age <= self.timeout_ms() => flag == "true",
			_ => {
				info_log!("Session expired");
				self.logout();
				false
			}
		}
	}
}

impl Service for AuthService {
	fn service_name() -> &'static str {
		"AuthService"
	}
}

#[cfg(test)]
mod tests {
	use rstest::{fixture, rstest};
	use taskdeck_core::{ManualClock, MemoryStorage};

	use super::*;

	const DAY: i64 = 24 * 60 * 60 * 1000;

	struct Harness {
		auth: AuthService,
		storage: MemoryStorage,
		clock: ManualClock,
	}

	#[fixture]
	fn harness() -> Harness {
		let storage = MemoryStorage::new();
		let clock = ManualClock::new(1_700_000_000_000);
		let auth = AuthService::new(
			Rc::new(storage.clone()),
			AuthSettings::default(),
			Rc::new(clock.clone()),
		);
		Harness {
			auth,
			storage,
			clock,
		}
	}

	#[rstest]
	fn test_not_authenticated_initially(harness: Harness) {
		assert!(!harness.auth.is_authenticated());
		assert_eq!(harness.auth.session_time_remaining(), Duration::ZERO);
	}

	#[rstest]
	#[case("")]
	#[case("wrong")]
	#[case("ADMIN123")]
	fn test_login_rejects_bad_password(harness: Harness, #[case] password: &str) {
		// Act
		let ok = harness.auth.login(password);

		// Assert
		assert!(!ok);
		assert!(harness.storage.is_empty());
	}

	#[rstest]
	fn test_login_stores_session_markers(harness: Harness) {
		// Act
		let ok = harness.auth.login("admin123");

		// Assert
		assert!(ok);
		assert_eq!(
			harness
				.storage
				.get_item("todoApp_isAuthenticated")
				.unwrap()
				.as_deref(),
			Some("true")
		);
		assert_eq!(
			harness.storage.get_item("todoApp_loginTime").unwrap(),
			Some("1700000000000".to_string())
		);
		assert!(harness.auth.is_authenticated());
	}

	#[rstest]
	fn test_session_expires_and_is_cleared(harness: Harness) {
		// Arrange
		harness.auth.login("admin123");

		// Act
		harness.clock.advance(DAY + 1);

		// Assert
		assert!(!harness.auth.is_authenticated());
		assert!(harness.storage.is_empty());
	}

	#[rstest]
	fn test_session_valid_at_exact_timeout(harness: Harness) {
		// Arrange
		harness.auth.login("admin123");

		// Act
		harness.clock.advance(DAY);

		// Assert
		assert!(harness.auth.is_authenticated());
		assert_eq!(harness.auth.session_time_remaining(), Duration::ZERO);
	}

	#[rstest]
	fn test_session_time_remaining(harness: Harness) {
		// Arrange
		harness.auth.login("admin123");

		// Act
		harness.clock.advance(1_000);

		// Assert
		assert_eq!(
			harness.auth.session_time_remaining(),
			Duration::from_millis((DAY - 1_000) as u64)
		);
	}

	#[rstest]
	fn test_refresh_session_restarts_clock(harness: Harness) {
		// Arrange
		harness.auth.login("admin123");
		harness.clock.advance(DAY - 10);

		// Act
		harness.auth.refresh_session();
		harness.clock.advance(20);

		// Assert
		assert!(harness.auth.is_authenticated());
	}

	#[rstest]
	fn test_unparsable_login_time_logs_out(harness: Harness) {
		// Arrange
		harness
			.storage
			.set_item("todoApp_isAuthenticated", "true")
			.unwrap();
		harness
			.storage
			.set_item("todoApp_loginTime", "yesterday")
			.unwrap();

		// Act
		let authenticated = harness.auth.is_authenticated();

		// Assert
		assert!(!authenticated);
		assert!(harness.storage.is_empty());
	}

	#[rstest]
	#[case::far_past("-9223372036854775808")]
	#[case::far_future("9223372036854775807")]
	#[case::ahead_of_clock("1700000000001")]
	fn test_out_of_range_login_time_is_expired(harness: Harness, #[case] login_time: &str) {
		// Arrange
		harness
			.storage
			.set_item("todoApp_isAuthenticated", "true")
			.unwrap();
		harness
			.storage
			.set_item("todoApp_loginTime", login_time)
			.unwrap();

		// Act
		let authenticated = harness.auth.is_authenticated();

		// Assert
		assert!(!authenticated);
		assert_eq!(harness.auth.session_time_remaining(), Duration::ZERO);
		assert!(harness.storage.is_empty());
	}

	#[rstest]
	fn test_huge_timeout_does_not_wrap() {
		// Arrange
		let storage = MemoryStorage::new();
		let clock = ManualClock::new(1_700_000_000_000);
		let settings = AuthSettings {
			session_timeout_ms: u64::MAX,
			..AuthSettings::default()
		};
		let auth = AuthService::new(Rc::new(storage), settings, Rc::new(clock.clone()));
		auth.login("admin123");

		// Act
		clock.advance(DAY * 365);

		// Assert
		assert!(auth.is_authenticated());
		assert!(auth.session_time_remaining() > Duration::from_millis(DAY as u64));
	}

	#[rstest]
	fn test_logout_clears_markers(harness: Harness) {
		// Arrange
		harness.auth.login("admin123");

		// Act
		harness.auth.logout();

		// Assert
		assert!(!harness.auth.is_authenticated());
		assert!(harness.storage.is_empty());
	}
}
