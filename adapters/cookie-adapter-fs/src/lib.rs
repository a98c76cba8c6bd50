//! File-backed cookie jar
//!
//! Keeps the cookies of one host in a JSON file, so a non-browser host (a CLI,
//! a server-side prefetch) remembers consent across runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{create_dir_all, metadata, read, rename, write};
use tokio::sync::Mutex;

use fides_types::cookie_adapter::{Cookie, CookieAdapter};
use fides_types::prelude::*;

const JAR_FILE_SUFFIX: &str = ".cookies.json";

fn jar_file_path(base_dir: &Path, hostname: &str) -> PathBuf {
	PathBuf::from(base_dir).join(format!("{}{}", hostname, JAR_FILE_SUFFIX))
}

fn normalize_domain(domain: &str) -> String {
	domain.trim_start_matches('.').to_ascii_lowercase()
}

fn same_slot(cookie: &Cookie, name: &str, path: &str, domain: Option<&str>) -> bool {
	cookie.name == name
		&& cookie.path == path
		&& cookie.domain.as_deref().map(normalize_domain) == domain.map(normalize_domain)
}

#[derive(Debug)]
pub struct CookieAdapterFs {
	hostname: Box<str>,
	jar_file: Box<Path>,
	/// Serializes read-modify-write cycles on the jar file
	lock: Mutex<()>,
}

impl CookieAdapterFs {
	pub async fn new(base_dir: Box<Path>, hostname: &str) -> FdResult<Self> {
		let hostname = hostname.trim().to_ascii_lowercase();
		if hostname.is_empty() || hostname.contains(['/', '\\']) {
			return Err(Error::ValidationError(format!("invalid hostname '{}'", hostname)));
		}

		match metadata(&base_dir).await {
			Ok(meta) if !meta.is_dir() => {
				warn!("Cookie jar base path is not a directory: {:?}", base_dir);
				return Err(Error::StorageUnavailable);
			}
			Ok(_) => {}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => create_dir_all(&base_dir).await?,
			Err(e) => return Err(e.into()),
		}

		let jar_file = jar_file_path(&base_dir, &hostname).into_boxed_path();
		debug!("Cookie jar: {:?}", jar_file);
		Ok(Self { hostname: hostname.into(), jar_file, lock: Mutex::new(()) })
	}

	/// Path of the backing JSON file
	pub fn jar_file(&self) -> &Path {
		&self.jar_file
	}

	/// Loads the jar, dropping expired cookies. A missing file is an empty jar.
	async fn load(&self) -> FdResult<Vec<Cookie>> {
		let data = match read(&self.jar_file).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};
		let mut cookies: Vec<Cookie> = serde_json::from_slice(&data).map_err(|e| {
			warn!("Corrupt cookie jar {:?}: {}", self.jar_file, e);
			Error::Parse
		})?;
		let now = utils::now();
		cookies.retain(|cookie| !cookie.is_expired(now));
		Ok(cookies)
	}

	/// Writes the jar through a temporary file so a crash never leaves it half written
	async fn store(&self, cookies: &[Cookie]) -> FdResult<()> {
		let data = serde_json::to_vec_pretty(cookies)?;
		let tmp_path = self.jar_file.with_extension("json.tmp");
		write(&tmp_path, data).await?;
		rename(&tmp_path, &self.jar_file).await?;
		Ok(())
	}
}

#[async_trait]
impl CookieAdapter for CookieAdapterFs {
	fn hostname(&self) -> Option<&str> {
		Some(&self.hostname)
	}

	async fn read_cookie(&self, name: &str) -> FdResult<Option<String>> {
		let _guard = self.lock.lock().await;
		let cookies = self.load().await?;
		Ok(cookies
			.into_iter()
			.find(|cookie| cookie.name == name && cookie.matches(&self.hostname, "/"))
			.map(|cookie| cookie.value))
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

		let _guard = self.lock.lock().await;
		let mut cookies = self.load().await?;
		cookies.retain(|c| !same_slot(c, &cookie.name, &cookie.path, cookie.domain.as_deref()));
		cookies.push(cookie.clone());
		self.store(&cookies).await?;
		debug!("Cookie written: {}", cookie.name);
		Ok(())
	}

	async fn remove_cookie(&self, name: &str, path: &str, domain: Option<&str>) -> FdResult<bool> {
		let _guard = self.lock.lock().await;
		let mut cookies = self.load().await?;
		let before = cookies.len();
		cookies.retain(|c| !same_slot(c, name, path, domain));
		if cookies.len() == before {
			return Ok(false);
		}
		self.store(&cookies).await?;
		debug!("Cookie removed: {}", name);
		Ok(true)
	}
}

// vim: ts=4
