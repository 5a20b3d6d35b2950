//! Worker primitives for single-threaded actors.
//!
//! An actor owns its state exclusively and runs on one dedicated OS thread,
//! consuming a FIFO [`Mailbox`] of typed messages. Other threads interact with
//! it only by posting messages and by subscribing to the events it emits.

pub mod actor;
mod class;
pub mod gate;
pub mod mailbox;
mod panic;
mod spawn;

pub use actor::{Actor, ActorContext, ActorExit, ActorFlow, ActorHandle, ActorSpec, spawn_actor};
pub use class::TaskClass;
pub use gate::{Gate, GateGuard};
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender};
pub use panic::panic_message;
pub use spawn::spawn_named_thread;
