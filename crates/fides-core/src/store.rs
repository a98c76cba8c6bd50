//! Local state store: the versioned consent record in durable per-visitor storage.
//!
//! The record lives in a single cookie (`fides_consent`) scoped to the
//! registrable domain, so every subdomain of a site shares it. When no cookie
//! adapter is configured (a non-browser context) every operation is a no-op.

use chrono::TimeDelta;
use serde::Deserialize;
use std::sync::Arc;

use crate::prelude::*;
use fides_types::consent::{ConsentMap, ConsentRecord, FidesMeta, Identity, TcfConsent};
use fides_types::cookie_adapter::{Cookie, CookieAdapter};
use fides_types::experience::CookieRef;

pub const CONSENT_COOKIE_NAME: &str = "fides_consent";
pub const CONSENT_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Where a loaded record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
	/// Parsed from a current-schema cookie
	Stored,
	/// Migrated from a bare legacy consent map
	Legacy,
	/// No cookie yet, first visit
	Fresh,
	/// The cookie could not be read or parsed; a fresh record was built
	Unreadable(String),
	/// No durable storage in this context
	Unavailable,
}

#[derive(Debug, Clone)]
pub struct Loaded {
	pub record: ConsentRecord,
	pub source: LoadSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
	Written,
	Unavailable,
	Failed(String),
}

/// Stored shape, every part optional so partially written cookies still load
#[derive(Deserialize)]
struct StoredRecord {
	consent: Option<ConsentMap>,
	identity: Option<Identity>,
	fides_meta: Option<FidesMeta>,
	tcf_consent: Option<TcfConsent>,
	tcf_version_hash: Option<String>,
	fides_string: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConsentStore {
	adapter: Option<Arc<dyn CookieAdapter>>,
}

impl ConsentStore {
	pub fn new(adapter: Option<Arc<dyn CookieAdapter>>) -> Self {
		Self { adapter }
	}

	/// Domain cookies are written to, `None` for host-only cookies
	fn cookie_domain(&self) -> Option<String> {
		self.adapter.as_ref()?.hostname().map(utils::registrable_domain)
	}

	/// Reads the stored record, falling back to a fresh default record.
	///
	/// `defaults` only fill keys the stored consent map does not have.
	pub async fn load(&self, defaults: &ConsentMap) -> Loaded {
		let Some(adapter) = &self.adapter else {
			debug!("No cookie storage available, using a fresh consent record");
			return Loaded {
				record: ConsentRecord::new_default(defaults),
				source: LoadSource::Unavailable,
			};
		};

		let raw = match adapter.read_cookie(CONSENT_COOKIE_NAME).await {
			Ok(Some(raw)) => raw,
			Ok(None) => {
				debug!("No consent cookie found, first visit");
				return Loaded {
					record: ConsentRecord::new_default(defaults),
					source: LoadSource::Fresh,
				};
			}
			Err(e) => {
				warn!(error = %e, "Failed to read consent cookie");
				return Loaded {
					record: ConsentRecord::new_default(defaults),
					source: LoadSource::Unreadable(e.to_string()),
				};
			}
		};

		match parse_record(&raw, defaults) {
			Ok(loaded) => loaded,
			Err(reason) => {
				warn!(reason = %reason, "Discarding unparsable consent cookie");
				Loaded {
					record: ConsentRecord::new_default(defaults),
					source: LoadSource::Unreadable(reason),
				}
			}
		}
	}

	/// Stamps `updated_at` and writes the record.
	///
	/// The stamp always moves forward, even if the clock did not.
	pub async fn save(&self, record: &mut ConsentRecord) -> PersistOutcome {
		let now = utils::now();
		record.fides_meta.updated_at = Some(match record.fides_meta.updated_at {
			Some(prev) if prev >= now => prev + TimeDelta::milliseconds(1),
			_ => now,
		});

		let Some(adapter) = &self.adapter else {
			debug!("No cookie storage available, consent record not persisted");
			return PersistOutcome::Unavailable;
		};

		let value = match serde_json::to_string(record) {
			Ok(value) => value,
			Err(e) => return PersistOutcome::Failed(e.to_string()),
		};
		let cookie = Cookie {
			name: CONSENT_COOKIE_NAME.to_string(),
			value,
			domain: self.cookie_domain(),
			path: "/".to_string(),
			expires: Some(now + TimeDelta::days(CONSENT_COOKIE_MAX_AGE_DAYS)),
		};

		match adapter.write_cookie(&cookie).await {
			Ok(()) => {
				debug!(domain = ?cookie.domain, "Consent cookie saved");
				PersistOutcome::Written
			}
			Err(e) => {
				error!(error = %e, "Failed to write consent cookie");
				PersistOutcome::Failed(e.to_string())
			}
		}
	}

	/// Removes third-party cookies declared by notices the visitor opted out of.
	///
	/// Cookies without a declared domain are removed both host-only and at the
	/// registrable domain. Returns the names of the cookies actually removed.
	pub async fn clear_associated_cookies(&self, cookies: &[CookieRef]) -> Vec<String> {
		let Some(adapter) = &self.adapter else {
			return Vec::new();
		};

		let fallback_domain = self.cookie_domain();
		let mut removed = Vec::new();
		for cookie in cookies {
			let path = cookie.path.as_deref().unwrap_or("/");
			let domains: Vec<Option<&str>> = match &cookie.domain {
				Some(domain) => vec![Some(domain.as_str())],
				None => vec![None, fallback_domain.as_deref()],
			};

			let mut any = false;
			for domain in domains {
				match adapter.remove_cookie(&cookie.name, path, domain).await {
					Ok(true) => any = true,
					Ok(false) => {}
					Err(e) => warn!(cookie = %cookie.name, error = %e, "Failed to remove cookie"),
				}
			}
			if any {
				debug!(cookie = %cookie.name, "Removed cookie after opt-out");
				removed.push(cookie.name.clone());
			}
		}
		removed
	}
}

/// Parses a stored cookie value: a current-schema record or a legacy bare map
fn parse_record(raw: &str, defaults: &ConsentMap) -> Result<Loaded, String> {
	let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
	let obj = value.as_object().ok_or("consent cookie is not a JSON object")?;

	// a legacy map may itself have a notice named "consent", but only as a boolean
	let wrapped = obj.contains_key("fides_meta")
		|| obj.contains_key("identity")
		|| obj.get("consent").is_some_and(serde_json::Value::is_object);
	if wrapped {
		let stored: StoredRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
		let mut record = ConsentRecord::new_default(&ConsentMap::new());
		if let Some(consent) = stored.consent {
			record.consent = consent;
		}
		if let Some(identity) = stored.identity {
			record.identity = identity;
		}
		if let Some(meta) = stored.fides_meta {
			record.fides_meta = meta;
		}
		record.tcf_consent = stored.tcf_consent.unwrap_or_default();
		record.tcf_version_hash = stored.tcf_version_hash;
		record.fides_string = stored.fides_string;
		record.fill_defaults(defaults);
		return Ok(Loaded { record, source: LoadSource::Stored });
	}

	let legacy: ConsentMap = serde_json::from_value(value).map_err(|e| e.to_string())?;
	debug!("Migrating legacy consent cookie with {} entries", legacy.len());
	let mut record = ConsentRecord::new_default(&ConsentMap::new());
	record.consent = legacy;
	record.fill_defaults(defaults);
	Ok(Loaded { record, source: LoadSource::Legacy })
}


// vim: ts=4
