use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Mailbox send error.
///
/// Carries the rejected message back to the caller.
pub enum MailboxSendError<T> {
	/// Mailbox is closed.
	Closed(T),
}

impl<T> MailboxSendError<T> {
	/// Returns the message that could not be delivered.
	pub fn into_inner(self) -> T {
		match self {
			Self::Closed(msg) => msg,
		}
	}
}

impl<T> fmt::Debug for MailboxSendError<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Closed(_) => f.write_str("Closed(..)"),
		}
	}
}

impl<T> fmt::Display for MailboxSendError<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Closed(_) => f.write_str("mailbox closed"),
		}
	}
}

impl<T> std::error::Error for MailboxSendError<T> {}

struct MailboxState<T> {
	queue: VecDeque<T>,
	closed: bool,
}

struct MailboxInner<T> {
	state: Mutex<MailboxState<T>>,
	notify_recv: Condvar,
}

/// Multi-producer mailbox sender.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver. Receiving blocks the calling thread.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Unbounded FIFO mailbox consumed by one actor thread.
///
/// Messages are delivered in arrival order. Closing is explicit: once closed,
/// sends fail and the receiver drains what is already queued before observing
/// the close.
pub struct Mailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Default for Mailbox<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Mailbox<T> {
	/// Creates an empty open mailbox.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(MailboxInner {
				state: Mutex::new(MailboxState {
					queue: VecDeque::new(),
					closed: false,
				}),
				notify_recv: Condvar::new(),
			}),
		}
	}

	/// Returns a sender handle.
	pub fn sender(&self) -> MailboxSender<T> {
		MailboxSender {
			inner: Arc::clone(&self.inner),
		}
	}

	/// Consumes the mailbox into its receiver.
	pub fn into_receiver(self) -> MailboxReceiver<T> {
		MailboxReceiver { inner: self.inner }
	}
}

impl<T> MailboxInner<T> {
	fn close(&self) {
		self.state.lock().closed = true;
		self.notify_recv.notify_all();
	}

	fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	fn len(&self) -> usize {
		self.state.lock().queue.len()
	}
}

impl<T> MailboxSender<T> {
	/// Enqueues one message at the back of the queue.
	pub fn send(&self, msg: T) -> Result<(), MailboxSendError<T>> {
		let mut st = self.inner.state.lock();
		if st.closed {
			return Err(MailboxSendError::Closed(msg));
		}
		st.queue.push_back(msg);
		drop(st);
		self.inner.notify_recv.notify_one();
		Ok(())
	}

	/// Closes the mailbox. Already queued messages remain receivable.
	pub fn close(&self) {
		self.inner.close();
	}

	pub fn is_closed(&self) -> bool {
		self.inner.is_closed()
	}

	/// Returns the number of queued messages.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T> MailboxReceiver<T> {
	/// Blocks until a message is available.
	///
	/// Returns `None` once the mailbox is closed and empty.
	pub fn recv(&self) -> Option<T> {
		let mut st = self.inner.state.lock();
		loop {
			if let Some(msg) = st.queue.pop_front() {
				return Some(msg);
			}
			if st.closed {
				return None;
			}
			self.inner.notify_recv.wait(&mut st);
		}
	}

	/// Returns one queued message without blocking.
	pub fn try_recv(&self) -> Option<T> {
		self.inner.state.lock().queue.pop_front()
	}

	/// Closes the mailbox and drops everything still queued.
	///
	/// Returns the number of discarded messages. Messages are dropped after the
	/// lock is released, so their destructors may touch the mailbox.
	pub fn close_and_discard(&self) -> usize {
		let discarded = {
			let mut st = self.inner.state.lock();
			st.closed = true;
			std::mem::take(&mut st.queue)
		};
		self.inner.notify_recv.notify_all();
		discarded.len()
	}
}

/// A dropped receiver closes the mailbox, so senders observe the close even
/// when the consuming thread unwinds.
impl<T> Drop for MailboxReceiver<T> {
	fn drop(&mut self) {
		self.close_and_discard();
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[test]
	fn delivers_in_fifo_order() {
		let mailbox = Mailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.into_receiver();
		for i in 0..5 {
			tx.send(i).unwrap();
		}
		let got: Vec<_> = std::iter::from_fn(|| rx.try_recv()).collect();
		assert_eq!(got, vec![0, 1, 2, 3, 4]);
	}

	#[test]
	fn closed_mailbox_rejects_and_returns_message() {
		let mailbox = Mailbox::new();
		let tx = mailbox.sender();
		tx.close();
		let err = tx.send("late").unwrap_err();
		assert_eq!(err.into_inner(), "late");
	}

	#[test]
	fn recv_drains_before_reporting_close() {
		let mailbox = Mailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.into_receiver();
		tx.send(1).unwrap();
		tx.send(2).unwrap();
		tx.close();
		assert_eq!(rx.recv(), Some(1));
		assert_eq!(rx.recv(), Some(2));
		assert_eq!(rx.recv(), None);
	}

	#[test]
	fn recv_blocks_until_sent_from_other_thread() {
		let mailbox = Mailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.into_receiver();
		let producer = std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(20));
			tx.send(7).unwrap();
		});
		assert_eq!(rx.recv(), Some(7));
		producer.join().unwrap();
	}

	#[test]
	fn close_and_discard_drops_pending() {
		let mailbox = Mailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.into_receiver();
		tx.send(1).unwrap();
		tx.send(2).unwrap();
		assert_eq!(rx.close_and_discard(), 2);
		assert!(tx.is_closed());
		assert!(tx.is_empty());
		assert_eq!(rx.recv(), None);
	}

	#[test]
	fn dropped_receiver_closes_mailbox() {
		let mailbox = Mailbox::new();
		let tx = mailbox.sender();
		tx.send(1).unwrap();
		drop(mailbox.into_receiver());
		assert!(tx.is_closed());
		assert!(tx.is_empty());
		assert!(tx.send(2).is_err());
	}
}
