//! Single-threaded actors driven by a FIFO mailbox.
//!
//! Each actor runs on its own named OS thread. Handlers run to completion one
//! message at a time, so actor state needs no locking. Handlers may block.

mod handle;

use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;

pub use handle::{ActorExit, ActorHandle};
use tokio::sync::broadcast;

use crate::mailbox::{Mailbox, MailboxSender};
use crate::panic::panic_message;
use crate::{TaskClass, spawn_named_thread};

/// Capacity of each actor's event broadcast channel.
const EVENT_BUFFER: usize = 64;

/// Continuation directive from one message handling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorFlow {
	/// Continue processing messages.
	Continue,
	/// Stop the actor. Messages still queued are discarded.
	Stop,
}

/// Actor trait executed on a dedicated worker thread.
pub trait Actor: Send + 'static {
	type Msg: Send + 'static;
	type Evt: Clone + Send + 'static;

	fn on_start(&mut self, _ctx: &mut ActorContext<Self::Msg, Self::Evt>) {}

	fn on_stop(&mut self, _ctx: &mut ActorContext<Self::Msg, Self::Evt>) {}

	fn handle(&mut self, msg: Self::Msg, ctx: &mut ActorContext<Self::Msg, Self::Evt>) -> ActorFlow;
}

/// Actor execution context: its own address and event emitter.
pub struct ActorContext<Msg, Evt> {
	name: Arc<str>,
	address: MailboxSender<Msg>,
	events: broadcast::Sender<Evt>,
}

impl<Msg, Evt> ActorContext<Msg, Evt>
where
	Msg: Send + 'static,
	Evt: Clone + Send + 'static,
{
	/// Emits one actor event to subscribers.
	pub fn emit(&self, evt: Evt) {
		let _ = self.events.send(evt);
	}

	/// Returns a sender that posts back into this actor's mailbox.
	pub fn address(&self) -> MailboxSender<Msg> {
		self.address.clone()
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

/// Builder spec for one actor.
pub struct ActorSpec<A>
where
	A: Actor,
{
	name: String,
	class: TaskClass,
	actor: A,
}

impl<A> ActorSpec<A>
where
	A: Actor,
{
	/// Creates a spec for an actor instance. `name` doubles as the thread name.
	pub fn new(name: impl Into<String>, class: TaskClass, actor: A) -> Self {
		Self {
			name: name.into(),
			class,
			actor,
		}
	}
}

/// Spawns an actor on a dedicated named thread.
///
/// The thread runs `on_start`, then handles messages in arrival order until a
/// handler returns [`ActorFlow::Stop`] or the mailbox is closed and drained,
/// then runs `on_stop`. A panicking handler also runs `on_stop` before the
/// panic propagates to [`ActorHandle::join`].
pub fn spawn_actor<A>(spec: ActorSpec<A>) -> std::io::Result<ActorHandle<A::Msg, A::Evt>>
where
	A: Actor,
{
	let ActorSpec {
		name,
		class,
		mut actor,
	} = spec;

	let name: Arc<str> = Arc::from(name);
	let mailbox = Mailbox::new();
	let sender = mailbox.sender();
	let (events, _) = broadcast::channel(EVENT_BUFFER);
	let mut ctx = ActorContext {
		name: Arc::clone(&name),
		address: mailbox.sender(),
		events: events.clone(),
	};
	let rx = mailbox.into_receiver();

	let thread = spawn_named_thread(class, name.to_string(), move || {
		tracing::debug!(actor = ctx.name(), "worker.actor.start");
		actor.on_start(&mut ctx);

		let exit = loop {
			let Some(msg) = rx.recv() else {
				break ActorExit::MailboxClosed;
			};
			match catch_unwind(AssertUnwindSafe(|| actor.handle(msg, &mut ctx))) {
				Ok(ActorFlow::Continue) => {}
				Ok(ActorFlow::Stop) => break ActorExit::Stopped,
				Err(payload) => {
					let discarded = rx.close_and_discard();
					tracing::error!(
						actor = ctx.name(),
						panic = panic_message(payload.as_ref()).as_deref().unwrap_or("<opaque>"),
						discarded,
						"worker.actor.panicked"
					);
					actor.on_stop(&mut ctx);
					resume_unwind(payload);
				}
			}
		};

		actor.on_stop(&mut ctx);
		let discarded = rx.close_and_discard();
		tracing::debug!(actor = ctx.name(), exit = ?exit, discarded, "worker.actor.stop");
		exit
	})?;

	Ok(ActorHandle::new(name, sender, events, thread))
}
