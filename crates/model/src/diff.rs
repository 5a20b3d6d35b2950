use crate::PluginCategory;

/// Which category maps changed while handling one package event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffResult {
	NothingChanged,
	ConditionsChanged,
	SettingsChanged,
	BothChanged,
}

impl DiffResult {
	/// Combines the per-category change bits.
	pub const fn combine(conditions_changed: bool, settings_changed: bool) -> Self {
		match (conditions_changed, settings_changed) {
			(false, false) => Self::NothingChanged,
			(true, false) => Self::ConditionsChanged,
			(false, true) => Self::SettingsChanged,
			(true, true) => Self::BothChanged,
		}
	}

	/// Returns whether the given category changed.
	pub const fn changed(self, category: PluginCategory) -> bool {
		match category {
			PluginCategory::Condition => matches!(self, Self::ConditionsChanged | Self::BothChanged),
			PluginCategory::Setting => matches!(self, Self::SettingsChanged | Self::BothChanged),
		}
	}

	pub const fn is_changed(self) -> bool {
		!matches!(self, Self::NothingChanged)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NothingChanged => "nothing_changed",
			Self::ConditionsChanged => "conditions_changed",
			Self::SettingsChanged => "settings_changed",
			Self::BothChanged => "both_changed",
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(false, false, DiffResult::NothingChanged)]
	#[case(true, false, DiffResult::ConditionsChanged)]
	#[case(false, true, DiffResult::SettingsChanged)]
	#[case(true, true, DiffResult::BothChanged)]
	fn truth_table(#[case] conditions: bool, #[case] settings: bool, #[case] expected: DiffResult) {
		let result = DiffResult::combine(conditions, settings);
		assert_eq!(result, expected);
		assert_eq!(result.changed(PluginCategory::Condition), conditions);
		assert_eq!(result.changed(PluginCategory::Setting), settings);
		assert_eq!(result.is_changed(), conditions || settings);
	}
}
