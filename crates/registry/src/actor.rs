//! The registry actor: sole owner and mutator of registry state.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use plugreg_model::{DiffResult, PluginCategory};
use plugreg_worker::{Actor, ActorContext, ActorFlow, GateGuard, panic_message};

use crate::config::ChangeChannel;
use crate::env::{ChangeBroadcaster, PackageEvents};
use crate::events::{EventSink, PackageChange, SubscriptionId};
use crate::index::RegistryCore;

/// Messages processed by the registry actor, in arrival order.
pub(crate) enum RegistryMsg {
	/// Run the initial load. The guard opens the load gate when dropped.
	Init { gate: GateGuard },
	Package(PackageChange),
	Destroy,
}

impl RegistryMsg {
	const fn name(&self) -> &'static str {
		match self {
			Self::Init { .. } => "init",
			Self::Package(change) => change.kind(),
			Self::Destroy => "destroy",
		}
	}
}

/// Lifecycle of a registry actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
	Unstarted,
	Initializing,
	Ready,
	Destroyed,
}

/// Emitted after every publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
	/// Snapshots of the categories marked in the result were replaced.
	Reloaded(DiffResult),
}

pub(crate) struct RegistryActor {
	core: RegistryCore,
	package_events: Arc<dyn PackageEvents>,
	broadcaster: Arc<dyn ChangeBroadcaster>,
	channel: ChangeChannel,
	state: RegistryState,
	subscription: Option<SubscriptionId>,
}

impl RegistryActor {
	pub(crate) fn new(
		core: RegistryCore,
		package_events: Arc<dyn PackageEvents>,
		broadcaster: Arc<dyn ChangeBroadcaster>,
		channel: ChangeChannel,
	) -> Self {
		Self {
			core,
			package_events,
			broadcaster,
			channel,
			state: RegistryState::Unstarted,
			subscription: None,
		}
	}

	fn init(&mut self, gate: GateGuard, ctx: &mut ActorContext<RegistryMsg, RegistryEvent>) {
		assert_eq!(self.state, RegistryState::Unstarted, "plugin registry initialized twice");
		self.state = RegistryState::Initializing;

		let core = &mut self.core;
		if let Err(payload) = catch_unwind(AssertUnwindSafe(|| core.load_all())) {
			tracing::error!(
				panic = panic_message(payload.as_ref()).as_deref().unwrap_or("<opaque>"),
				"initial plugin scan failed; starting with an empty registry"
			);
			self.core.reset();
		}

		let sink = EventSink::new(ctx.address());
		self.subscription = Some(self.package_events.subscribe(sink));
		self.state = RegistryState::Ready;
		self.notify(ctx, DiffResult::BothChanged);
		gate.release();
	}

	fn on_package(&mut self, change: PackageChange, ctx: &mut ActorContext<RegistryMsg, RegistryEvent>) {
		assert_eq!(
			self.state,
			RegistryState::Ready,
			"package change {} delivered before the initial load",
			change.kind()
		);

		let result = match &change {
			PackageChange::Added(package) => self.core.handle_package_added(package),
			PackageChange::Removed(package) => self.core.handle_package_removed(package),
			PackageChange::Changed(package) => self.core.handle_package_changed(package),
		};
		tracing::debug!(package = change.package(), kind = change.kind(), result = result.as_str(), "registry.package");

		if result.is_changed() {
			self.notify(ctx, result);
		}
	}

	fn notify(&self, ctx: &ActorContext<RegistryMsg, RegistryEvent>, result: DiffResult) {
		tracing::info!(
			result = result.as_str(),
			conditions = self.core.working(PluginCategory::Condition).len(),
			settings = self.core.working(PluginCategory::Setting).len(),
			"plugin registry reloaded"
		);
		self.broadcaster.broadcast(&self.channel);
		ctx.emit(RegistryEvent::Reloaded(result));
	}

	fn unsubscribe(&mut self) {
		if let Some(id) = self.subscription.take() {
			self.package_events.unsubscribe(id);
		}
	}
}

impl Actor for RegistryActor {
	type Msg = RegistryMsg;
	type Evt = RegistryEvent;

	fn on_stop(&mut self, _ctx: &mut ActorContext<Self::Msg, Self::Evt>) {
		self.unsubscribe();
		self.state = RegistryState::Destroyed;
	}

	fn handle(&mut self, msg: Self::Msg, ctx: &mut ActorContext<Self::Msg, Self::Evt>) -> ActorFlow {
		tracing::debug!(msg = msg.name(), state = ?self.state, "registry.recv");
		match msg {
			RegistryMsg::Init { gate } => self.init(gate, ctx),
			RegistryMsg::Package(change) => self.on_package(change, ctx),
			RegistryMsg::Destroy => {
				assert_ne!(self.state, RegistryState::Destroyed, "plugin registry destroyed twice");
				self.unsubscribe();
				self.state = RegistryState::Destroyed;
				return ActorFlow::Stop;
			}
		}
		ActorFlow::Continue
	}
}
