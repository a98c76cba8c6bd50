//! Adapter that provides durable per-visitor storage (a cookie jar)
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// A cookie to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
	pub name: String,
	pub value: String,
	/// `None` means a host-only cookie
	pub domain: Option<String>,
	pub path: String,
	/// `None` means a session cookie
	pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
	/// Whether this cookie is sent to `host` for a request to `path`
	pub fn matches(&self, host: &str, path: &str) -> bool {
		let domain_ok = match &self.domain {
			Some(domain) => utils::domain_matches(host, domain),
			None => true,
		};
		domain_ok && path.starts_with(self.path.as_str())
	}

	pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
		self.expires.is_some_and(|expires| expires <= now)
	}
}

#[async_trait]
pub trait CookieAdapter: Debug + Send + Sync {
	/// Hostname of the page the jar is scoped to
	fn hostname(&self) -> Option<&str>;

	/// Reads the value of a non-expired cookie visible to the current page
	async fn read_cookie(&self, name: &str) -> FdResult<Option<String>>;

	/// Writes (or replaces) a cookie
	async fn write_cookie(&self, cookie: &Cookie) -> FdResult<()>;

	/// Removes a cookie scoped to the given path and domain.
	/// Returns `true` if a cookie was actually removed.
	async fn remove_cookie(&self, name: &str, path: &str, domain: Option<&str>) -> FdResult<bool>;
}

// vim: ts=4
