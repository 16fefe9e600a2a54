mod app;
mod cli;
mod logging;
mod repl;

use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, warn};
use wayfinder_config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let loaded = Config::discover(cli.config.as_deref());
	let config = match &loaded {
		Ok((config, _)) => config.clone(),
		Err(_) => Config::default(),
	};
	logging::init(&config.logging, cli.verbose)?;
	match &loaded {
		Ok((_, Some(source))) if source.path().exists() => info!(path = %source.path().display(), "config.loaded"),
		Ok(_) => info!("config.defaults"),
		Err(err) => warn!(error = %err, "config.invalid"),
	}

	match cli.command {
		Command::Locate => {
			let handle = app::start(&config, false)?;
			let result = app::run_locate(&handle).await;
			let _ = handle.shutdown();
			result
		}
		Command::Route {
			destination,
			no_locate,
			json,
		} => {
			let handle = app::start(&config, false)?;
			let result = app::run_route(&handle, &destination.join(" "), !no_locate, json).await;
			let _ = handle.shutdown();
			result
		}
		Command::Repl => {
			let handle = app::start(&config, config.startup.auto_locate)?;
			repl::run(handle).await
		}
	}
}
