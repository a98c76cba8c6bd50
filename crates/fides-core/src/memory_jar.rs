//! In-memory cookie jar
//!
//! Used for single page-load hosts that persist nothing, for preview
//! surfaces, and in tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::prelude::*;
use fides_types::cookie_adapter::{Cookie, CookieAdapter};

#[derive(Debug)]
pub struct MemoryCookieJar {
	hostname: Box<str>,
	cookies: Mutex<Vec<Cookie>>,
}

impl MemoryCookieJar {
	pub fn new(hostname: &str) -> Self {
		Self { hostname: hostname.to_ascii_lowercase().into(), cookies: Mutex::new(Vec::new()) }
	}

	/// First cookie with the given name, regardless of scope or expiry
	pub fn get(&self, name: &str) -> Option<Cookie> {
		self.cookies.lock().iter().find(|cookie| cookie.name == name).cloned()
	}

	/// Inserts a cookie bypassing domain checks
	pub fn insert(&self, cookie: Cookie) {
		let mut cookies = self.cookies.lock();
		cookies.retain(|c| !same_slot(c, &cookie.name, &cookie.path, cookie.domain.as_deref()));
		cookies.push(cookie);
	}

	/// Inserts a host-only session cookie with a raw value
	pub fn insert_raw(&self, name: &str, value: &str) {
		self.insert(Cookie {
			name: name.to_string(),
			value: value.to_string(),
			domain: None,
			path: "/".to_string(),
			expires: None,
		});
	}

	pub fn len(&self) -> usize {
		self.cookies.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.cookies.lock().is_empty()
	}
}

fn normalize_domain(domain: &str) -> String {
	domain.trim_start_matches('.').to_ascii_lowercase()
}

fn same_slot(cookie: &Cookie, name: &str, path: &str, domain: Option<&str>) -> bool {
	cookie.name == name
		&& cookie.path == path
		&& cookie.domain.as_deref().map(normalize_domain) == domain.map(normalize_domain)
}

#[async_trait]
impl CookieAdapter for MemoryCookieJar {
	fn hostname(&self) -> Option<&str> {
		Some(&self.hostname)
	}

	async fn read_cookie(&self, name: &str) -> FdResult<Option<String>> {
		let now = utils::now();
		let cookies = self.cookies.lock();
		Ok(cookies
			.iter()
			.find(|c| c.name == name && c.matches(&self.hostname, "/") && !c.is_expired(now))
			.map(|c| c.value.clone()))
	}

	async fn write_cookie(&self, cookie: &Cookie) -> FdResult<()> {
		if let Some(domain) = &cookie.domain
			&& !utils::domain_matches(&self.hostname, domain)
		{
			return Err(Error::ValidationError(format!(
				"cookie domain '{}' does not match host '{}'",
				domain, self.hostname
			)));
		}
		self.insert(cookie.clone());
		Ok(())
	}

	async fn remove_cookie(&self, name: &str, path: &str, domain: Option<&str>) -> FdResult<bool> {
		let mut cookies = self.cookies.lock();
		let before = cookies.len();
		cookies.retain(|c| !same_slot(c, name, path, domain));
		Ok(cookies.len() != before)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_write_read_remove() {
		let jar = MemoryCookieJar::new("www.example.com");
		let cookie = Cookie {
			name: "c".into(),
			value: "1".into(),
			domain: Some("example.com".into()),
			path: "/".into(),
			expires: None,
		};
		jar.write_cookie(&cookie).await.unwrap();
		assert_eq!(jar.read_cookie("c").await.unwrap().as_deref(), Some("1"));

		assert!(!jar.remove_cookie("c", "/", None).await.unwrap());
		assert!(jar.remove_cookie("c", "/", Some(".example.com")).await.unwrap());
		assert!(jar.read_cookie("c").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_foreign_domain_rejected() {
		let jar = MemoryCookieJar::new("www.example.com");
		let cookie = Cookie {
			name: "c".into(),
			value: "1".into(),
			domain: Some("other.com".into()),
			path: "/".into(),
			expires: None,
		};
		assert!(jar.write_cookie(&cookie).await.is_err());
		assert!(jar.is_empty());
	}

	#[tokio::test]
	async fn test_expired_cookie_is_invisible() {
		let jar = MemoryCookieJar::new("example.com");
		jar.insert(Cookie {
			name: "old".into(),
			value: "x".into(),
			domain: None,
			path: "/".into(),
			expires: Some(utils::now() - chrono::TimeDelta::seconds(1)),
		});
		assert!(jar.read_cookie("old").await.unwrap().is_none());
	}
}

// vim: ts=4
