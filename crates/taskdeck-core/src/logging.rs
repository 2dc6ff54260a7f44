//! Logging abstraction layer for taskdeck
//!
//! These macros work across WASM and native targets. In the browser they
//! write to the developer console; natively they emit `tracing` events so
//! that the embedding application (or a test) decides where they go.
//!
//! ## Macro Overview
//!
//! | Macro | WASM | Non-WASM |
//! |-------|------|----------|
//! | `debug_log!` | `console.debug` (`debug-hooks` + `debug_assertions`) | `tracing::debug!` (`debug-hooks`) |
//! | `info_log!` | `console.info` (`debug_assertions`) | `tracing::info!` |
//! | `warn_log!` | `console.warn` (`debug_assertions`) | `tracing::warn!` |
//! | `error_log!` | `console.error` | `tracing::error!` |
//!
//! ## Example
//!
//! ```ignore
//! use taskdeck_core::{debug_log, error_log, info_log, warn_log};
//!
//! debug_log!("Subscription count: {}", count);
//! info_log!("Component mounted");
//! warn_log!("Child is not a valid component: {}", name);
//! error_log!("Failed to persist store: {}", error);
//! ```

/// Logs a debug message (requires the `debug-hooks` feature)
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks", target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::debug_1(&format!($($arg)*).into());
	}};
}

/// Logs a debug message (requires the `debug-hooks` feature)
#[macro_export]
#[cfg(all(feature = "debug-hooks", not(target_arch = "wasm32")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::debug!($($arg)*);
	}};
}

/// No-op debug_log when the `debug-hooks` feature is off
#[macro_export]
#[cfg(any(
	not(feature = "debug-hooks"),
	all(target_arch = "wasm32", not(debug_assertions))
))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message
///
/// # Example
///
/// ```ignore
/// info_log!("Route committed: {}", path);
/// ```
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::info_1(&format!($($arg)*).into());
	}};
}

/// Logs an info message
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::info!($($arg)*);
	}};
}

/// No-op info_log in release WASM builds
#[macro_export]
#[cfg(all(not(debug_assertions), target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{}};
}

/// Logs a warning message
///
/// Used for usage mistakes that the runtime recovers from by skipping the
/// offending input.
///
/// # Example
///
/// ```ignore
/// warn_log!("Skipping detached child component {}", name);
/// ```
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::warn_1(&format!($($arg)*).into());
	}};
}

/// Logs a warning message
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::warn!($($arg)*);
	}};
}

/// No-op warn_log in release WASM builds
#[macro_export]
#[cfg(all(not(debug_assertions), target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{}};
}

/// Logs an error message
///
/// Errors are always reported, including release WASM builds.
///
/// # Example
///
/// ```ignore
/// error_log!("Error fetching todos: {}", error);
/// ```
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::error_1(&format!($($arg)*).into());
	}};
}

/// Logs an error message
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::error!($($arg)*);
	}};
}
