use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use plugreg_model::PluginCategory;

#[derive(Parser, Debug)]
#[command(name = "plugreg")]
#[command(about = "Discover and validate plugins over a package inventory")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging (overridden by PLUGREG_LOG)
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Run the scanner once and print plugins and validation diagnostics
	Scan {
		/// Inventory TOML file describing installed packages
		#[arg(long, value_name = "FILE")]
		inventory: PathBuf,

		/// Only scan one category (both when omitted)
		#[arg(long, value_enum)]
		category: Option<CategoryArg>,

		/// Only scan one package
		#[arg(long, value_name = "NAME")]
		package: Option<String>,

		/// Print JSON instead of text
		#[arg(long)]
		json: bool,
	},
	/// Start a registry, wait for the initial load and print both maps
	Registry {
		/// Inventory TOML file describing installed packages
		#[arg(long, value_name = "FILE")]
		inventory: PathBuf,

		/// Registry configuration TOML file
		#[arg(long, value_name = "FILE")]
		config: Option<PathBuf>,

		/// Print JSON instead of text
		#[arg(long)]
		json: bool,
	},
}

/// Plugin category selector.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryArg {
	Condition,
	Setting,
}

impl From<CategoryArg> for PluginCategory {
	fn from(arg: CategoryArg) -> Self {
		match arg {
			CategoryArg::Condition => PluginCategory::Condition,
			CategoryArg::Setting => PluginCategory::Setting,
		}
	}
}
