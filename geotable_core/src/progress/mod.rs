//! Progress reporting with cooperative cancellation.
//!
//! Long-running imports and exports report their position through a
//! [`ProgressTrait`] object and poll it for cancellation at safe boundaries
//! (between features, never mid-decode). Two implementations exist: a
//! terminal [`ProgressBar`] and a silent [`ProgressDrain`] used in tests and
//! non-interactive contexts. Both are cloneable handles sharing their state,
//! so a caller can keep a clone and cancel a running operation from another
//! thread.

mod progress_bar;
mod progress_drain;

pub use progress_bar::ProgressBar;
pub use progress_drain::ProgressDrain;

/// Interface for progress indicators.
///
/// All methods take `&self`; implementations use interior mutability so the
/// handle can be shared between the operation and its caller.
pub trait ProgressTrait: Send + Sync {
	/// Starts the indicator with a message and a maximum value.
	fn init(&self, message: &str, max_value: u64);

	/// Sets the absolute position.
	fn set_position(&self, value: u64);

	/// Increments the position by `value`.
	fn inc(&self, value: u64);

	/// Completes the indicator.
	fn finish(&self);

	/// Requests cooperative cancellation of the running operation.
	fn cancel(&self);

	/// Returns true once [`cancel`](ProgressTrait::cancel) has been called.
	fn is_canceled(&self) -> bool;
}

/// Factory returning a terminal progress bar, or a silent drain in tests.
#[must_use]
pub fn get_progress_bar() -> Box<dyn ProgressTrait> {
	#[cfg(not(any(test, feature = "test")))]
	return Box::new(ProgressBar::new());
	#[cfg(any(test, feature = "test"))]
	return Box::new(ProgressDrain::new());
}
