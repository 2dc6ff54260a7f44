//! Callback type for child-to-parent notifications.
//!
//! A parent hands a [`Callback`] to a child through the child's options
//! record; the child calls it when something the parent cares about
//! happens (a filter changed, a login succeeded).
//!
//! ## Example
//!
//! ```
//! use taskdeck_pages::Callback;
//!
//! let on_change = Callback::new(|filter: String| filter.len());
//! assert_eq!(on_change.call("active".to_string()), 6);
//! ```

use std::rc::Rc;

/// A cloneable, single-threaded callback wrapper.
///
/// ## Type Parameters
///
/// - `Args`: The argument type the callback receives (defaults to `()`)
/// - `Ret`: The return type of the callback (defaults to `()`)
pub struct Callback<Args = (), Ret = ()> {
	inner: Rc<dyn Fn(Args) -> Ret + 'static>,
}

impl<Args, Ret> Callback<Args, Ret> {
	/// Creates a new Callback from a function or closure.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Args) -> Ret + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Calls the callback with the given arguments.
	pub fn call(&self, args: Args) -> Ret {
		(self.inner)(args)
	}

	/// Whether both callbacks wrap the same function
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<Args, Ret> std::fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Callback")
			.field("inner", &"<function>")
			.finish()
	}
}

impl<F, Args, Ret> From<F> for Callback<Args, Ret>
where
	F: Fn(Args) -> Ret + 'static,
{
	fn from(f: F) -> Self {
		Self::new(f)
	}
}
