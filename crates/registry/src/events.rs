//! Package lifecycle events and their translation into registry messages.

use plugreg_worker::MailboxSender;

use crate::actor::RegistryMsg;

/// Lifecycle event reported by the package event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEvent {
	/// A package was installed. `replacing` is set when this is the first half of an upgrade.
	Added { package: String, replacing: bool },
	/// A package was uninstalled. `replacing` is set when this is the first half of an upgrade.
	Removed { package: String, replacing: bool },
	/// A package was upgraded in place.
	Replaced { package: String },
	/// Components of a package were enabled or disabled.
	Changed { package: String },
	/// Removable storage holding these packages was mounted or unmounted.
	StorageAvailability { packages: Vec<String>, available: bool },
}

/// Per-package work item processed by the registry actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageChange {
	Added(String),
	Removed(String),
	Changed(String),
}

impl PackageChange {
	pub fn package(&self) -> &str {
		match self {
			Self::Added(package) | Self::Removed(package) | Self::Changed(package) => package,
		}
	}

	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Added(_) => "package_added",
			Self::Removed(_) => "package_removed",
			Self::Changed(_) => "package_changed",
		}
	}
}

/// Maps one lifecycle event to the registry work it implies.
///
/// The `replacing` halves of an upgrade are dropped; the `Replaced` event that
/// follows them covers the upgrade.
pub fn translate(event: PackageEvent) -> Vec<PackageChange> {
	match event {
		PackageEvent::Added { package, replacing: false } => vec![PackageChange::Added(package)],
		PackageEvent::Removed { package, replacing: false } => vec![PackageChange::Removed(package)],
		PackageEvent::Added { replacing: true, .. } | PackageEvent::Removed { replacing: true, .. } => Vec::new(),
		PackageEvent::Replaced { package } | PackageEvent::Changed { package } => vec![PackageChange::Changed(package)],
		PackageEvent::StorageAvailability { packages, .. } => packages.into_iter().map(PackageChange::Changed).collect(),
	}
}

/// Handle returned by [`crate::PackageEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> u64 {
		self.0
	}
}

/// Forwards package events into one registry's mailbox.
#[derive(Clone)]
pub struct EventSink {
	mailbox: MailboxSender<RegistryMsg>,
}

impl EventSink {
	pub(crate) fn new(mailbox: MailboxSender<RegistryMsg>) -> Self {
		Self { mailbox }
	}

	/// Queues the work implied by `event` behind everything already queued.
	///
	/// Events arriving after the registry was destroyed are dropped.
	pub fn deliver(&self, event: PackageEvent) {
		for change in translate(event) {
			if let Err(err) = self.mailbox.send(RegistryMsg::Package(change)) {
				if let RegistryMsg::Package(change) = err.into_inner() {
					tracing::debug!(package = change.package(), kind = change.kind(), "registry.event.dropped");
				}
				return;
			}
		}
	}

	/// Whether the registry behind this sink stopped accepting events.
	pub fn is_closed(&self) -> bool {
		self.mailbox.is_closed()
	}
}

impl std::fmt::Debug for EventSink {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventSink").field("closed", &self.is_closed()).finish()
	}
}

#[cfg(test)]
mod tests {
	use plugreg_worker::Mailbox;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	fn pkg(name: &str) -> String {
		name.to_string()
	}

	#[rstest]
	#[case(PackageEvent::Added { package: pkg("a"), replacing: false }, vec![PackageChange::Added(pkg("a"))])]
	#[case(PackageEvent::Added { package: pkg("a"), replacing: true }, vec![])]
	#[case(PackageEvent::Removed { package: pkg("a"), replacing: false }, vec![PackageChange::Removed(pkg("a"))])]
	#[case(PackageEvent::Removed { package: pkg("a"), replacing: true }, vec![])]
	#[case(PackageEvent::Replaced { package: pkg("a") }, vec![PackageChange::Changed(pkg("a"))])]
	#[case(PackageEvent::Changed { package: pkg("a") }, vec![PackageChange::Changed(pkg("a"))])]
	#[case(
		PackageEvent::StorageAvailability { packages: vec![pkg("b"), pkg("a")], available: false },
		vec![PackageChange::Changed(pkg("b")), PackageChange::Changed(pkg("a"))],
	)]
	fn translation(#[case] event: PackageEvent, #[case] expected: Vec<PackageChange>) {
		assert_eq!(translate(event), expected);
	}

	#[test]
	fn sink_preserves_order() {
		let mailbox = Mailbox::new();
		let sink = EventSink::new(mailbox.sender());
		sink.deliver(PackageEvent::StorageAvailability {
			packages: vec![pkg("x"), pkg("y")],
			available: true,
		});
		sink.deliver(PackageEvent::Removed {
			package: pkg("z"),
			replacing: false,
		});

		let rx = mailbox.into_receiver();
		let mut seen = Vec::new();
		while let Some(msg) = rx.try_recv() {
			match msg {
				RegistryMsg::Package(change) => seen.push(change),
				_ => panic!("unexpected message"),
			}
		}
		assert_eq!(
			seen,
			vec![
				PackageChange::Changed(pkg("x")),
				PackageChange::Changed(pkg("y")),
				PackageChange::Removed(pkg("z")),
			]
		);
	}

	#[test]
	fn closed_sink_drops_events() {
		let mailbox = Mailbox::new();
		let sink = EventSink::new(mailbox.sender());
		let rx = mailbox.into_receiver();
		rx.close_and_discard();

		assert!(sink.is_closed());
		sink.deliver(PackageEvent::Changed { package: pkg("a") });
		assert!(rx.try_recv().is_none());
	}
}
