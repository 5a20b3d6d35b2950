//! Plugin registry command-line tool.
//!
//! Scans a package inventory for condition and setting plugins, or starts a
//! live registry over it and prints the published maps.

mod cli;
mod output;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use plugreg_model::PluginCategory;
use plugreg_registry::{Inventory, PluginRegistry, Scanner};
use tracing::info;

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let rendered = match cli.command {
		Command::Scan {
			inventory,
			category,
			package,
			json,
		} => scan(&inventory, category.map(PluginCategory::from), package.as_deref(), json)?,
		Command::Registry { inventory, config, json } => registry(&inventory, config.as_deref(), json)?,
	};
	print!("{rendered}");
	if !rendered.ends_with('\n') {
		println!();
	}
	Ok(())
}

fn scan(inventory: &Path, category: Option<PluginCategory>, package: Option<&str>, json: bool) -> anyhow::Result<String> {
	let inventory = Inventory::load(inventory).with_context(|| format!("loading inventory {}", inventory.display()))?;
	let scanner = Scanner::new(&inventory.directory, &inventory.characteristics);
	let categories = match category {
		Some(category) => vec![category],
		None => PluginCategory::ALL.to_vec(),
	};

	let reports: Vec<_> = categories
		.into_iter()
		.map(|category| (category, scanner.scan(category, package)))
		.collect();
	for (category, report) in &reports {
		info!(%category, plugins = report.plugins.len(), rejected = report.fatal_count(), "scan.done");
	}

	output::render_scan(&reports, json).context("rendering scan report")
}

fn registry(inventory: &Path, config: Option<&Path>, json: bool) -> anyhow::Result<String> {
	let registry = PluginRegistry::open_inventory(inventory, config).context("starting registry")?;
	let conditions = registry.get_plugin_map(PluginCategory::Condition);
	let settings = registry.get_plugin_map(PluginCategory::Setting);
	let rendered = output::render_registry(
		registry.change_channel(),
		&[(PluginCategory::Condition, conditions.as_ref()), (PluginCategory::Setting, settings.as_ref())],
		json,
	);
	registry.destroy();
	rendered.context("rendering registry maps")
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("PLUGREG_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("plugreg_registry=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
