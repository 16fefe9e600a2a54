//! Scripted in-memory [`Transport`] for tests.
//!
//! Replies are matched by URL substring. Each rule pops its replies in
//! order and keeps repeating the last one, so a single reply acts as a
//! fixed answer.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use url::Url;

use crate::{RawResponse, Transport, TransportError};

/// One scripted transport outcome.
#[derive(Debug, Clone)]
pub struct Reply {
	outcome: Result<RawResponse, TransportError>,
	delay: Duration,
}

impl Reply {
	/// HTTP reply with a JSON body.
	pub fn json(status: u16, body: serde_json::Value) -> Self {
		Self::raw(status, body.to_string())
	}

	/// HTTP reply with an arbitrary body.
	pub fn raw(status: u16, body: impl Into<String>) -> Self {
		Self {
			outcome: Ok(RawResponse {
				status,
				body: Bytes::from(body.into()),
				retry_after: None,
			}),
			delay: Duration::ZERO,
		}
	}

	/// Empty-bodied reply with the given status.
	pub fn status(status: u16) -> Self {
		Self::raw(status, "")
	}

	/// Transport-level failure.
	pub fn error(err: TransportError) -> Self {
		Self {
			outcome: Err(err),
			delay: Duration::ZERO,
		}
	}

	/// Delays the reply.
	pub fn after(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	/// Adds a `Retry-After` hint to an HTTP reply.
	pub fn retry_after(mut self, hint: Duration) -> Self {
		if let Ok(raw) = &mut self.outcome {
			raw.retry_after = Some(hint);
		}
		self
	}
}

struct Rule {
	pattern: String,
	replies: VecDeque<Reply>,
}

/// [`Transport`] answering from scripted rules and recording every call.
#[derive(Default)]
pub struct ScriptedTransport {
	rules: Mutex<Vec<Rule>>,
	calls: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues replies for URLs containing `pattern`.
	pub fn on(&self, pattern: &str, replies: impl IntoIterator<Item = Reply>) -> &Self {
		let mut rules = self.rules.lock();
		let replies = replies.into_iter();
		match rules.iter_mut().find(|r| r.pattern == pattern) {
			Some(rule) => rule.replies.extend(replies),
			None => rules.push(Rule {
				pattern: pattern.to_string(),
				replies: replies.collect(),
			}),
		}
		self
	}

	/// Every URL requested so far, in order.
	pub fn calls(&self) -> Vec<Url> {
		self.calls.lock().clone()
	}

	/// Number of requests whose URL contains `pattern`.
	pub fn call_count(&self, pattern: &str) -> usize {
		self.calls.lock().iter().filter(|u| u.as_str().contains(pattern)).count()
	}

	fn next_reply(&self, url: &Url) -> Option<Reply> {
		let mut rules = self.rules.lock();
		let rule = rules
			.iter_mut()
			.find(|r| !r.replies.is_empty() && url.as_str().contains(&r.pattern))?;
		if rule.replies.len() > 1 {
			rule.replies.pop_front()
		} else {
			rule.replies.front().cloned()
		}
	}
}

#[async_trait]
impl Transport for ScriptedTransport {
	async fn get(&self, url: &Url, _timeout: Duration) -> Result<RawResponse, TransportError> {
		self.calls.lock().push(url.clone());
		let Some(reply) = self.next_reply(url) else {
			return Err(TransportError::Connect(format!("no scripted reply for {url}")));
		};
		if !reply.delay.is_zero() {
			tokio::time::sleep(reply.delay).await;
		}
		reply.outcome
	}
}
