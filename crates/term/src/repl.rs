//! Line-oriented intent forwarding for `wayfinder repl`.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use wayfinder_orchestrator::{OrchestratorHandle, PropertyChange, ZoomInput};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
	Locate,
	/// Route now.
	Route(String),
	/// Type a destination; routed once typing pauses.
	Type(String),
	Clear,
	Zoom(ZoomInput),
	Resize(u32, u32),
	Show,
	Help,
	Quit,
}

pub const HELP: &str = "\
commands:
  locate              resolve the current position
  route <text>        route to a destination now
  type <text>         set the destination (debounced route)
  clear               clear the route
  in | out            zoom one level
  wheel <delta>       wheel delta, 120 per notch
  pinch <scale>       pinch scale factor
  resize <w> <h>      viewport size in pixels
  show                print the full state
  quit";

impl ReplCommand {
	pub fn parse(line: &str) -> Result<Self, String> {
		let line = line.trim();
		let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
		let rest = rest.trim();
		let number = |s: &str| s.parse::<f64>().map_err(|_| format!("not a number: {s:?}"));

		Ok(match word {
			"locate" => Self::Locate,
			"route" => Self::Route(rest.to_string()),
			"type" => Self::Type(rest.to_string()),
			"clear" => Self::Clear,
			"in" => Self::Zoom(ZoomInput::Step(1.0)),
			"out" => Self::Zoom(ZoomInput::Step(-1.0)),
			"wheel" => Self::Zoom(ZoomInput::Wheel(number(rest)?)),
			"pinch" => Self::Zoom(ZoomInput::Pinch(number(rest)?)),
			"resize" => {
				let mut dims = rest.split_whitespace().map(str::parse::<u32>);
				match (dims.next(), dims.next(), dims.next()) {
					(Some(Ok(w)), Some(Ok(h)), None) => Self::Resize(w, h),
					_ => return Err("usage: resize <width> <height>".to_string()),
				}
			}
			"show" => Self::Show,
			"help" | "?" => Self::Help,
			"quit" | "exit" => Self::Quit,
			"" => return Err(String::new()),
			other => return Err(format!("unknown command {other:?}, try `help`")),
		})
	}
}

/// `name = value` line for one property change.
pub fn format_change(change: &PropertyChange) -> String {
	let value = serde_json::to_value(change)
		.ok()
		.and_then(|mut v| v.get_mut("value").map(serde_json::Value::take))
		.unwrap_or(serde_json::Value::Null);
	format!("{} = {value}", change.name())
}

/// Prints changes until the engine stops.
async fn print_changes(handle: OrchestratorHandle) {
	let mut changes = handle.changes();
	drop(handle);
	loop {
		match changes.recv().await {
			Ok(change) => println!("{}", format_change(&change)),
			Err(RecvError::Lagged(n)) => debug!(skipped = n, "repl.lagged"),
			Err(RecvError::Closed) => break,
		}
	}
}

pub async fn run(handle: OrchestratorHandle) -> anyhow::Result<()> {
	let printer = tokio::spawn(print_changes(handle.clone()));
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	println!("{HELP}");

	while let Some(line) = lines.next_line().await.context("reading stdin")? {
		let command = match ReplCommand::parse(&line) {
			Ok(command) => command,
			Err(msg) if msg.is_empty() => continue,
			Err(msg) => {
				eprintln!("{msg}");
				continue;
			}
		};
		let sent = match command {
			ReplCommand::Locate => handle.locate(),
			ReplCommand::Route(text) => handle.route_to(text),
			ReplCommand::Type(text) => handle.set_destination(text),
			ReplCommand::Clear => handle.clear_route(),
			ReplCommand::Zoom(input) => handle.zoom(input),
			ReplCommand::Resize(w, h) => handle.resize(w, h),
			ReplCommand::Show => {
				println!("{}", serde_json::to_string_pretty(&handle.snapshot())?);
				Ok(())
			}
			ReplCommand::Help => {
				println!("{HELP}");
				Ok(())
			}
			ReplCommand::Quit => break,
		};
		sent?;
	}

	// Shutdown may race a stopped engine; either way we are done.
	let _ = handle.shutdown();
	drop(handle);
	let _ = printer.await;
	Ok(())
}
