//! Wall-clock abstraction
//!
//! Session expiry and overdue detection both compare against "now". Going
//! through [`Clock`] lets tests move time forward without sleeping.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock {
	/// Current time in milliseconds since the Unix epoch
	fn now_millis(&self) -> i64;

	/// Current time as a UTC timestamp
	fn now(&self) -> DateTime<Utc> {
		Utc.timestamp_millis_opt(self.now_millis())
			.single()
			.unwrap_or_default()
	}

	/// Today's date (UTC)
	fn today(&self) -> NaiveDate {
		self.now().date_naive()
	}
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		Utc::now().timestamp_millis()
	}
}

/// A manually driven clock for tests.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	millis: Rc<Cell<i64>>,
}

impl ManualClock {
	/// Creates a clock frozen at `millis`
	pub fn new(millis: i64) -> Self {
		Self {
			millis: Rc::new(Cell::new(millis)),
		}
	}

	/// Creates a clock frozen at midnight UTC of `date`
	pub fn at_date(date: NaiveDate) -> Self {
		let millis = date
			.and_hms_opt(0, 0, 0)
			.map(|dt| dt.and_utc().timestamp_millis())
			.unwrap_or_default();
		Self::new(millis)
	}

	/// Moves the clock forward by `millis`
	pub fn advance(&self, millis: i64) {
		self.millis.set(self.millis.get() + millis);
	}

	/// Sets the clock to an absolute instant
	pub fn set(&self, millis: i64) {
		self.millis.set(millis);
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> i64 {
		self.millis.get()
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	fn test_manual_clock_advance_is_shared_between_clones() {
		// Arrange
		let clock = ManualClock::new(1_000);
		let other = clock.clone();

		// Act
		clock.advance(500);

		// Assert
		assert_eq!(other.now_millis(), 1_500);
	}

	#[rstest]
	fn test_manual_clock_today() {
		// Arrange
		let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
		let clock = ManualClock::at_date(date);

		// Act
		clock.advance(60 * 60 * 1000);

		// Assert
		assert_eq!(clock.today(), date);
	}

	#[rstest]
	fn test_system_clock_is_after_2020() {
		assert!(SystemClock.now_millis() > 1_577_836_800_000);
	}
}
