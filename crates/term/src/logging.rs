use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use wayfinder_config::LoggingConfig;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured level; `--verbose` raises the
/// configured level to `debug`. Logs go to stderr unless a file is
/// configured, keeping stdout for command output.
pub fn init(config: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
	let level = if verbose { "debug" } else { config.level.as_str() };
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(level))
		.with_context(|| format!("invalid log filter {level:?}"))?;

	let builder = tracing_subscriber::fmt().with_env_filter(filter);
	match &config.file {
		Some(path) => {
			let file = OpenOptions::new()
				.create(true)
				.append(true)
				.open(path)
				.with_context(|| format!("opening log file {}", path.display()))?;
			builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
		}
		None => builder.with_writer(std::io::stderr).try_init(),
	}
	.map_err(|e| anyhow::anyhow!(e))
}
