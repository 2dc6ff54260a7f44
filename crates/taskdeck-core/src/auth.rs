//! Authentication capability

/// Answers whether the current session is authenticated.
///
/// The router depends on this trait rather than on a concrete auth service,
/// so any session mechanism can drive route access checks.
pub trait Authenticator {
	/// Whether the current session is authenticated
	fn is_authenticated(&self) -> bool;
}

impl<F> Authenticator for F
where
	F: Fn() -> bool,
{
	fn is_authenticated(&self) -> bool {
		self()
	}
}
