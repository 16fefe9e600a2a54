use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "wayfinder")]
#[command(about = "Locate yourself and route to a destination")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (overrides WAYFINDER_CONFIG and the user config)
	#[arg(long, short = 'c', global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
	/// Resolve the current position
	Locate,
	/// Route from the current position to a destination
	Route {
		/// Free-text destination, e.g. "Brandenburg Gate, Berlin"
		#[arg(required = true, num_args = 1..)]
		destination: Vec<String>,

		/// Route from the configured default origin without locating first
		#[arg(long)]
		no_locate: bool,

		/// Print the final state as JSON
		#[arg(long)]
		json: bool,
	},
	/// Read intents from stdin and print property changes
	Repl,
}
