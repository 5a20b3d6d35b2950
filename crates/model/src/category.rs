use std::fmt;

use serde::{Deserialize, Serialize};

/// Directory action an editor component declares for conditions.
pub const ACTION_EDIT_CONDITION: &str = "plugreg.intent.action.EDIT_CONDITION";
/// Directory action an executor component declares for conditions.
pub const ACTION_QUERY_CONDITION: &str = "plugreg.intent.action.QUERY_CONDITION";
/// Directory action an editor component declares for settings.
pub const ACTION_EDIT_SETTING: &str = "plugreg.intent.action.EDIT_SETTING";
/// Directory action an executor component declares for settings.
pub const ACTION_FIRE_SETTING: &str = "plugreg.intent.action.FIRE_SETTING";

/// The two kinds of plugin indexed by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginCategory {
	/// Plugins that evaluate a state and report it back to the host.
	Condition,
	/// Plugins that perform an action when fired.
	Setting,
}

impl PluginCategory {
	/// Every category, in registry publication order.
	pub const ALL: [Self; 2] = [Self::Condition, Self::Setting];

	/// Action matched against editor (UI entry point) components.
	pub const fn editor_action(self) -> &'static str {
		match self {
			Self::Condition => ACTION_EDIT_CONDITION,
			Self::Setting => ACTION_EDIT_SETTING,
		}
	}

	/// Action matched against executor components.
	pub const fn executor_action(self) -> &'static str {
		match self {
			Self::Condition => ACTION_QUERY_CONDITION,
			Self::Setting => ACTION_FIRE_SETTING,
		}
	}

	/// Whether an upgrade that only bumps the version code counts as a change.
	///
	/// Condition executors may hold long-running state (scheduled alarms,
	/// registered listeners) that has to be re-established after the package
	/// is replaced. Setting executors are fire-and-forget.
	pub const fn relaunch_on_upgrade(self) -> bool {
		match self {
			Self::Condition => true,
			Self::Setting => false,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Condition => "condition",
			Self::Setting => "setting",
		}
	}
}

impl fmt::Display for PluginCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
