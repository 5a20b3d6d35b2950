//! One-shot gate for blocking readers until a startup step completes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct GateInner {
	open: Mutex<bool>,
	opened: Condvar,
	/// Mirrors `open` for lock-free checks. Set before waiters wake.
	released: AtomicBool,
}

/// A latch that starts closed and opens exactly once.
///
/// Opening is idempotent; waiters are released on the first open and every
/// later wait returns immediately.
#[derive(Clone)]
pub struct Gate {
	inner: Arc<GateInner>,
}

impl Default for Gate {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Gate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Gate").field("open", &self.is_open()).finish()
	}
}

impl Gate {
	/// Creates a closed gate.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(GateInner {
				open: Mutex::new(false),
				opened: Condvar::new(),
				released: AtomicBool::new(false),
			}),
		}
	}

	/// Opens the gate and wakes every waiter.
	pub fn open(&self) {
		let mut open = self.inner.open.lock();
		if !*open {
			*open = true;
			self.inner.released.store(true, Ordering::Release);
			self.inner.opened.notify_all();
		}
	}

	/// Checks the gate without taking its lock.
	///
	/// Writes made before [`Self::open`] are visible once this returns true.
	pub fn is_open(&self) -> bool {
		self.inner.released.load(Ordering::Acquire)
	}

	/// Blocks the calling thread until the gate opens.
	pub fn wait(&self) {
		if self.is_open() {
			return;
		}
		let mut open = self.inner.open.lock();
		while !*open {
			self.inner.opened.wait(&mut open);
		}
	}

	/// Blocks until the gate opens or `timeout` elapses.
	///
	/// Returns whether the gate is open.
	pub fn wait_timeout(&self, timeout: Duration) -> bool {
		if self.is_open() {
			return true;
		}
		let deadline = Instant::now() + timeout;
		let mut open = self.inner.open.lock();
		while !*open {
			if self.inner.opened.wait_until(&mut open, deadline).timed_out() {
				return *open;
			}
		}
		true
	}

	/// Returns a guard that opens this gate when dropped.
	///
	/// The guard opens the gate on every exit path, including unwinding.
	pub fn guard(&self) -> GateGuard {
		GateGuard { gate: self.clone() }
	}
}

/// Opens its [`Gate`] on drop.
#[derive(Debug)]
pub struct GateGuard {
	gate: Gate,
}

impl GateGuard {
	/// Opens the gate now.
	pub fn release(self) {
		drop(self);
	}
}

impl Drop for GateGuard {
	fn drop(&mut self) {
		self.gate.open();
	}
}
