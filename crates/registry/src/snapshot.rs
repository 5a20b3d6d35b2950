//! Published, immutable per-category plugin maps.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use plugreg_model::{PluginCategory, PluginMap};

/// Atomically published snapshots, one per category.
///
/// Publishing copies the working map into a fresh allocation and swaps the
/// reference in one store. Readers holding an older `Arc` keep seeing the
/// older map.
#[derive(Default)]
pub struct Snapshots {
	conditions: ArcSwapOption<PluginMap>,
	settings: ArcSwapOption<PluginMap>,
}

impl Snapshots {
	pub fn new() -> Self {
		Self::default()
	}

	fn cell(&self, category: PluginCategory) -> &ArcSwapOption<PluginMap> {
		match category {
			PluginCategory::Condition => &self.conditions,
			PluginCategory::Setting => &self.settings,
		}
	}

	/// Latest snapshot of `category`, or `None` before the first publication.
	pub fn load(&self, category: PluginCategory) -> Option<Arc<PluginMap>> {
		self.cell(category).load_full()
	}

	/// Publishes a copy of `working` as the snapshot of `category`.
	pub fn publish(&self, category: PluginCategory, working: &PluginMap) -> Arc<PluginMap> {
		let snapshot = Arc::new(working.clone());
		self.cell(category).store(Some(Arc::clone(&snapshot)));
		tracing::trace!(category = %category, plugins = snapshot.len(), "registry.snapshot.publish");
		snapshot
	}
}

impl std::fmt::Debug for Snapshots {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let len = |category| self.load(category).map(|map| map.len());
		f.debug_struct("Snapshots")
			.field("conditions", &len(PluginCategory::Condition))
			.field("settings", &len(PluginCategory::Setting))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use plugreg_model::{ComponentKind, Plugin, PluginConfiguration};

	use super::*;

	fn plugin(editor: &str) -> Plugin {
		Plugin::new(
			PluginCategory::Setting,
			"pkg",
			editor,
			ComponentKind::Service,
			"pkg.Fire",
			1,
			PluginConfiguration::default(),
		)
		.unwrap()
	}

	#[test]
	fn unpublished_is_none() {
		let snapshots = Snapshots::new();
		assert!(snapshots.load(PluginCategory::Condition).is_none());
		assert!(snapshots.load(PluginCategory::Setting).is_none());
	}

	#[test]
	fn published_snapshot_is_detached_from_working_map() {
		let snapshots = Snapshots::new();
		let mut working = PluginMap::new();
		working.insert("pkg:a".into(), plugin("a"));

		let published = snapshots.publish(PluginCategory::Setting, &working);
		let saved = (*published).clone();

		working.insert("pkg:b".into(), plugin("b"));
		working.remove("pkg:a");

		assert_eq!(*published, saved);
		let reloaded = snapshots.load(PluginCategory::Setting).unwrap();
		assert!(Arc::ptr_eq(&published, &reloaded));
		assert!(snapshots.load(PluginCategory::Condition).is_none());
	}

	#[test]
	fn republish_replaces_reference() {
		let snapshots = Snapshots::new();
		let first = snapshots.publish(PluginCategory::Setting, &PluginMap::new());
		let second = snapshots.publish(PluginCategory::Setting, &PluginMap::new());
		assert!(!Arc::ptr_eq(&first, &second));
		assert!(Arc::ptr_eq(&second, &snapshots.load(PluginCategory::Setting).unwrap()));
	}
}
