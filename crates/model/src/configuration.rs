use std::collections::BTreeSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
	/// Compatibility quirks known for a plugin.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
	#[serde(transparent)]
	pub struct ConfigFlags: u8 {
		/// Plugin predates the current protocol and needs compatibility handling.
		const BACKWARDS_COMPATIBLE = 1 << 0;
		/// Plugin needs network connectivity to do its work.
		const REQUIRES_CONNECTIVITY = 1 << 1;
		/// Plugin toggles network connectivity as a side effect.
		const DISRUPTS_CONNECTIVITY = 1 << 2;
		/// Plugin is known to misbehave.
		const BUGGY = 1 << 3;
		/// Plugin is known to drain the battery.
		const DRAINS_BATTERY = 1 << 4;
		/// Plugin must not be offered to users.
		const BLACKLISTED = 1 << 5;
	}
}

/// Immutable compatibility configuration for one plugin.
///
/// Equality is structural over every flag and the alternatives set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PluginConfiguration {
	flags: ConfigFlags,
	/// Registry names of first-party replacements.
	alternatives: BTreeSet<String>,
}

impl PluginConfiguration {
	pub fn new(flags: ConfigFlags, alternatives: impl IntoIterator<Item = String>) -> Self {
		Self {
			flags,
			alternatives: alternatives.into_iter().collect(),
		}
	}

	pub fn flags(&self) -> ConfigFlags {
		self.flags
	}

	pub fn is_backwards_compatibility_enabled(&self) -> bool {
		self.flags.contains(ConfigFlags::BACKWARDS_COMPATIBLE)
	}

	pub fn requires_connectivity(&self) -> bool {
		self.flags.contains(ConfigFlags::REQUIRES_CONNECTIVITY)
	}

	pub fn disrupts_connectivity(&self) -> bool {
		self.flags.contains(ConfigFlags::DISRUPTS_CONNECTIVITY)
	}

	pub fn is_buggy(&self) -> bool {
		self.flags.contains(ConfigFlags::BUGGY)
	}

	pub fn drains_battery(&self) -> bool {
		self.flags.contains(ConfigFlags::DRAINS_BATTERY)
	}

	pub fn is_blacklisted(&self) -> bool {
		self.flags.contains(ConfigFlags::BLACKLISTED)
	}

	/// Registry names of built-in replacements, in sorted order.
	pub fn alternatives(&self) -> &BTreeSet<String> {
		&self.alternatives
	}
}
