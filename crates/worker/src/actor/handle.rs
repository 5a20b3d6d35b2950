use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::mailbox::{MailboxSendError, MailboxSender};
use crate::panic::panic_message;

/// How an actor thread ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorExit {
	/// A handler returned [`super::ActorFlow::Stop`].
	Stopped,
	/// The mailbox was closed and drained.
	MailboxClosed,
	/// The actor thread panicked, with the panic message when one was given.
	Panicked(Option<String>),
}

impl ActorExit {
	pub fn is_failure(&self) -> bool {
		matches!(self, Self::Panicked(_))
	}
}

/// Control handle for one spawned actor.
///
/// Dropping the handle closes the mailbox; the actor finishes the messages
/// already queued and exits without being joined.
pub struct ActorHandle<Msg, Evt> {
	name: Arc<str>,
	sender: MailboxSender<Msg>,
	events: broadcast::Sender<Evt>,
	thread: Mutex<Option<JoinHandle<ActorExit>>>,
}

impl<Msg, Evt> ActorHandle<Msg, Evt> {
	pub(super) fn new(name: Arc<str>, sender: MailboxSender<Msg>, events: broadcast::Sender<Evt>, thread: JoinHandle<ActorExit>) -> Self {
		Self {
			name,
			sender,
			events,
			thread: Mutex::new(Some(thread)),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Posts one message to the actor's mailbox.
	pub fn send(&self, msg: Msg) -> Result<(), MailboxSendError<Msg>> {
		self.sender.send(msg)
	}

	/// Returns a sender for posting from other threads.
	pub fn sender(&self) -> MailboxSender<Msg> {
		self.sender.clone()
	}

	/// Subscribes to events emitted after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<Evt> {
		self.events.subscribe()
	}

	/// Returns true once the actor thread has exited.
	pub fn is_finished(&self) -> bool {
		self.thread.lock().as_ref().is_none_or(JoinHandle::is_finished)
	}

	/// Blocks until the actor thread exits.
	///
	/// Returns `None` when the actor was already joined.
	pub fn join(&self) -> Option<ActorExit> {
		let thread = self.thread.lock().take()?;
		let exit = match thread.join() {
			Ok(exit) => exit,
			Err(payload) => ActorExit::Panicked(panic_message(payload.as_ref())),
		};
		if exit.is_failure() {
			tracing::error!(actor = %self.name, exit = ?exit, "worker.actor.failed");
		}
		Some(exit)
	}
}

impl<Msg, Evt> Drop for ActorHandle<Msg, Evt> {
	fn drop(&mut self) {
		self.sender.close();
	}
}
