//! A silent progress indicator that still carries the cancellation flag.
//!
//! Used in tests and non-interactive contexts: all reporting methods are
//! no-ops, but `cancel`/`is_canceled` work like the real bar so cooperative
//! cancellation stays testable.

use super::ProgressTrait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Default)]
pub struct ProgressDrain {
	canceled: Arc<AtomicBool>,
}

impl ProgressDrain {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}

impl ProgressTrait for ProgressDrain {
	fn init(&self, _message: &str, _max_value: u64) {}

	fn set_position(&self, _value: u64) {}

	fn inc(&self, _value: u64) {}

	fn finish(&self) {}

	fn cancel(&self) {
		self.canceled.store(true, Ordering::Relaxed);
	}

	fn is_canceled(&self) -> bool {
		self.canceled.load(Ordering::Relaxed)
	}
}
