//! Lightweight terminal progress bar without external dependencies.

use super::ProgressTrait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Inner {
	message: String,
	len: u64,
	pos: u64,
	finished: bool,
	last_draw: Instant,
}

impl Inner {
	fn redraw(&mut self) {
		if self.last_draw.elapsed() < Duration::from_millis(500) && !self.finished {
			return;
		}
		self.last_draw = Instant::now();

		let len = self.len.max(1); // avoid div by zero
		let pos = self.pos.min(len);
		let percent = (pos as f64 * 100.0 / len as f64).floor() as u64;
		let bar = make_bar(pos, len, 40);

		let line = format!("{}▕{bar}▏{pos}/{len} ({percent:>3}%)", self.message);
		self.write(&format!("\r\x1b[2K{line}"));
	}

	#[allow(unused_variables)]
	fn write(&self, line: &str) {
		#[cfg(not(any(test, feature = "test")))]
		{
			use std::io::Write;
			let mut output = std::io::stderr();
			let _ = write!(output, "{line}");
			let _ = output.flush();
		}
	}
}

impl Default for Inner {
	fn default() -> Self {
		Inner {
			message: String::new(),
			len: 0,
			pos: 0,
			finished: false,
			last_draw: Instant::now(),
		}
	}
}

/// A terminal progress bar handle, cloneable and thread-safe.
#[derive(Clone, Default)]
pub struct ProgressBar {
	inner: Arc<Mutex<Inner>>,
	canceled: Arc<AtomicBool>,
}

impl ProgressBar {
	#[must_use]
	pub fn new() -> ProgressBar {
		ProgressBar::default()
	}
}

impl ProgressTrait for ProgressBar {
	fn init(&self, message: &str, max_value: u64) {
		let mut inner = self.inner.lock().unwrap();
		inner.message = message.to_string();
		inner.len = max_value;
		inner.pos = 0;
		inner.finished = false;
		inner.redraw();
	}

	fn set_position(&self, value: u64) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = value.min(inner.len);
		inner.redraw();
	}

	fn inc(&self, value: u64) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = inner.pos.saturating_add(value).min(inner.len);
		inner.redraw();
	}

	fn finish(&self) {
		let mut inner = self.inner.lock().unwrap();
		inner.pos = inner.len;
		inner.finished = true;
		inner.redraw();
		inner.write("\n");
	}

	fn cancel(&self) {
		self.canceled.store(true, Ordering::Relaxed);
	}

	fn is_canceled(&self) -> bool {
		self.canceled.load(Ordering::Relaxed)
	}
}

// Sub-character precision bar with 7 partial block steps.
fn make_bar(pos: u64, len: u64, width: usize) -> String {
	let width = width.max(1);
	let frac = (pos as f64 / len.max(1) as f64).clamp(0.0, 1.0);
	let exact = frac * (width as f64);
	let whole = exact.floor() as usize;
	let rem = exact - whole as f64;

	let partials = ["█", "▉", "▊", "▋", "▌", "▍", "▎", "▏"]; // last is thinnest

	let mut s = String::with_capacity(width);
	for _ in 0..whole.min(width) {
		s.push('█');
	}
	if whole < width {
		let idx = (rem * 8.0).floor() as usize;
		if idx > 0 {
			s.push_str(partials[8 - idx.min(7)]);
		} else {
			s.push(' ');
		}
		let filled = whole + 1;
		for _ in filled..width {
			s.push(' ');
		}
	}
	s
}
