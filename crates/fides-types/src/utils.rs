//! Utility functions

use chrono::{DateTime, Utc};
use std::net::IpAddr;

pub fn now() -> DateTime<Utc> {
	Utc::now()
}

/// Generates a stable visitor identifier
pub fn new_device_id() -> String {
	uuid::Uuid::new_v4().to_string()
}

/// Domain a consent cookie is scoped to so that subdomains share state.
///
/// Takes the last two labels of the hostname. IP literals and single-label
/// hosts (e.g. `localhost`) are returned as they are.
///
/// # Examples
/// - `"www.shop.example.com"` → `"example.com"`
/// - `"example.com"` → `"example.com"`
/// - `"localhost"` → `"localhost"`
pub fn registrable_domain(hostname: &str) -> String {
	let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
	if hostname.parse::<IpAddr>().is_ok() {
		return hostname;
	}

	let labels: Vec<&str> = hostname.split('.').filter(|label| !label.is_empty()).collect();
	match labels.len() {
		0 => hostname,
		1 => labels[0].to_string(),
		n => labels[n - 2..].join("."),
	}
}

/// Cookie domain matching: `host` equals `domain` or is a subdomain of it
pub fn domain_matches(host: &str, domain: &str) -> bool {
	let host = host.to_ascii_lowercase();
	let domain = domain.trim_start_matches('.').to_ascii_lowercase();
	host == domain || host.ends_with(&format!(".{}", domain))
}


// vim: ts=4
