use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::sync::watch;
use tracing::info;
use wayfinder_config::Config;
use wayfinder_net::{ReqwestTransport, polite_user_agent};
use wayfinder_orchestrator::{Backends, OrchestratorHandle, Phase, Settings, Snapshot};

/// Upper bound on waiting for one operation to settle.
const OPERATION_DEADLINE: Duration = Duration::from_secs(120);

/// Builds the HTTP stack and starts the engine.
pub fn start(config: &Config, auto_locate: bool) -> anyhow::Result<OrchestratorHandle> {
	let agent = polite_user_agent(&config.services.contact_email);
	let transport = ReqwestTransport::new(&agent).context("building HTTP client")?;
	let backends = Backends::from_config(config, Arc::new(transport));
	let mut settings = Settings::from_config(config);
	if !auto_locate {
		settings.auto_locate = None;
	}
	info!(user_agent = %agent, "wayfinder.start");
	Ok(OrchestratorHandle::start(backends, settings))
}

/// Waits for the first published snapshot matching `done`, ignoring the
/// current one.
async fn next_matching(
	rx: &mut watch::Receiver<Snapshot>,
	mut done: impl FnMut(&Snapshot) -> bool,
) -> anyhow::Result<Snapshot> {
	let wait = async {
		loop {
			rx.changed().await.context("orchestrator stopped")?;
			let snapshot = rx.borrow_and_update().clone();
			if done(&snapshot) {
				return anyhow::Ok(snapshot);
			}
		}
	};
	tokio::time::timeout(OPERATION_DEADLINE, wait)
		.await
		.context("operation did not finish in time")?
}

fn settled(s: &Snapshot) -> bool {
	!s.is_busy
}

pub async fn locate(handle: &OrchestratorHandle) -> anyhow::Result<Snapshot> {
	let mut rx = handle.subscribe();
	rx.borrow_and_update();
	handle.locate()?;
	next_matching(&mut rx, settled).await
}

pub async fn route(handle: &OrchestratorHandle, destination: &str) -> anyhow::Result<Snapshot> {
	let mut rx = handle.subscribe();
	rx.borrow_and_update();
	handle.route_to(destination)?;
	next_matching(&mut rx, |s| settled(s) && (s.phase == Phase::RouteReady || s.last_error.is_some())).await
}

pub fn describe_position(s: &Snapshot) -> String {
	let source = match s.fix_source {
		Some(source) => source.as_str(),
		None => "default",
	};
	format!("{:.5}, {:.5} ({source})", s.latitude, s.longitude)
}

pub fn describe_route(s: &Snapshot) -> String {
	let minutes = (s.route_duration / 60.0).round();
	format!(
		"{:.1} km, {minutes} min, {} points",
		s.route_distance / 1000.0,
		s.route_points.len()
	)
}

pub async fn run_locate(handle: &OrchestratorHandle) -> anyhow::Result<()> {
	let snapshot = locate(handle).await?;
	if snapshot.last_error.is_some() {
		bail!("{}", snapshot.status);
	}
	println!("{}", snapshot.status);
	println!("{}", describe_position(&snapshot));
	Ok(())
}

pub async fn run_route(handle: &OrchestratorHandle, destination: &str, locate_first: bool, json: bool) -> anyhow::Result<()> {
	if locate_first {
		let located = locate(handle).await?;
		if located.last_error.is_some() {
			eprintln!("{}; routing from {}", located.status, describe_position(&located));
		}
	}
	let snapshot = route(handle, destination).await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&snapshot)?);
	}
	if snapshot.last_error.is_some() {
		bail!("{}", snapshot.status);
	}
	if !json {
		println!("{}", snapshot.status);
		println!("{}", describe_route(&snapshot));
	}
	Ok(())
}
