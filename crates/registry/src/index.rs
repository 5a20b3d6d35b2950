//! Working state of one registry and its per-message transitions.
//!
//! [`RegistryCore`] owns the two mutable working maps. It is driven by the
//! registry actor on its worker thread; every transition scans, diffs, mutates
//! the working maps and republishes the affected snapshots.

use std::sync::Arc;

use plugreg_model::{DiffResult, PluginCategory, PluginMap};

use crate::diff;
use crate::env::{Characteristics, ComponentDirectory};
use crate::scanner::Scanner;
use crate::snapshot::Snapshots;

pub struct RegistryCore {
	directory: Arc<dyn ComponentDirectory>,
	characteristics: Arc<dyn Characteristics>,
	conditions: PluginMap,
	settings: PluginMap,
	snapshots: Arc<Snapshots>,
}

impl RegistryCore {
	pub fn new(directory: Arc<dyn ComponentDirectory>, characteristics: Arc<dyn Characteristics>, snapshots: Arc<Snapshots>) -> Self {
		Self {
			directory,
			characteristics,
			conditions: PluginMap::new(),
			settings: PluginMap::new(),
			snapshots,
		}
	}

	pub fn snapshots(&self) -> &Arc<Snapshots> {
		&self.snapshots
	}

	/// Current working map of `category`.
	pub fn working(&self, category: PluginCategory) -> &PluginMap {
		match category {
			PluginCategory::Condition => &self.conditions,
			PluginCategory::Setting => &self.settings,
		}
	}

	fn working_mut(&mut self, category: PluginCategory) -> &mut PluginMap {
		match category {
			PluginCategory::Condition => &mut self.conditions,
			PluginCategory::Setting => &mut self.settings,
		}
	}

	fn scan(&self, category: PluginCategory, package: Option<&str>) -> PluginMap {
		Scanner::new(self.directory.as_ref(), self.characteristics.as_ref())
			.scan(category, package)
			.plugins
	}

	/// Replaces both working maps with a full scan and publishes them.
	pub fn load_all(&mut self) {
		for category in PluginCategory::ALL {
			let plugins = self.scan(category, None);
			*self.working_mut(category) = plugins;
		}
		self.publish(DiffResult::BothChanged);
	}

	/// Empties both working maps and publishes them.
	pub fn reset(&mut self) {
		self.conditions.clear();
		self.settings.clear();
		self.publish(DiffResult::BothChanged);
	}

	/// Merges newly scanned plugins of `package`.
	pub fn handle_package_added(&mut self, package: &str) -> DiffResult {
		self.apply(package, |working, scanned, _| diff::merge_added(working, scanned))
	}

	/// Drops plugins of `package` the scan no longer reports.
	pub fn handle_package_removed(&mut self, package: &str) -> DiffResult {
		self.apply(package, |working, scanned, _| diff::prune_removed(working, scanned, package))
	}

	/// Reconciles `package` after an upgrade or component change.
	///
	/// Both the remove and the add check run, so a renamed component is
	/// dropped and inserted in one step. Categories that relaunch on upgrade
	/// also treat a version-only change as a change and adopt the new version.
	pub fn handle_package_changed(&mut self, package: &str) -> DiffResult {
		self.apply(package, |working, scanned, published| {
			let removed = diff::prune_removed(working, scanned, package);
			let added = diff::merge_added(working, scanned);
			let upgraded = published.is_some_and(|published| diff::is_version_changed(published, scanned));
			if upgraded {
				diff::overwrite(working, scanned);
			}
			removed || added || upgraded
		})
	}

	/// Runs one per-category transition and republishes what changed.
	///
	/// `step` receives the working map, the fresh scan of `package` and, for
	/// categories that relaunch on upgrade, the currently published snapshot.
	fn apply<F>(&mut self, package: &str, mut step: F) -> DiffResult
	where
		F: FnMut(&mut PluginMap, &PluginMap, Option<&PluginMap>) -> bool,
	{
		let mut changed = [false; 2];
		for (slot, category) in PluginCategory::ALL.into_iter().enumerate() {
			let scanned = self.scan(category, Some(package));
			let published = category.relaunch_on_upgrade().then(|| self.snapshots.load(category)).flatten();
			changed[slot] = step(self.working_mut(category), &scanned, published.as_deref());
			tracing::debug!(category = %category, package, changed = changed[slot], "registry.diff");
		}

		let result = DiffResult::combine(changed[0], changed[1]);
		self.publish(result);
		result
	}

	/// Publishes the working map of every category `result` marks as changed.
	fn publish(&self, result: DiffResult) {
		for category in PluginCategory::ALL {
			if result.changed(category) {
				self.snapshots.publish(category, self.working(category));
			}
		}
	}
}

impl std::fmt::Debug for RegistryCore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegistryCore")
			.field("conditions", &self.conditions.len())
			.field("settings", &self.settings.len())
			.finish_non_exhaustive()
	}
}
