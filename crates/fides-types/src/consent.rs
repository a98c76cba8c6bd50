//! The persisted per-visitor consent record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ConsentMethod;
use crate::utils;

/// Schema version written into `fides_meta.version`
pub const CONSENT_RECORD_VERSION: &str = "0.9.0";

/// notice key -> consent
pub type ConsentMap = BTreeMap<String, bool>;

/// TCF id -> consent, keyed by the id's string form
pub type TcfPreferenceMap = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub fides_user_device_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FidesMeta {
	pub version: String,
	#[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<DateTime<Utc>>,
	#[serde(rename = "consentMethod", default, skip_serializing_if = "Option::is_none")]
	pub consent_method: Option<ConsentMethod>,
}

/// Opaque per-purpose/vendor booleans of the TCF flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcfConsent {
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub purpose_consent_preferences: TcfPreferenceMap,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub purpose_legitimate_interests_preferences: TcfPreferenceMap,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub special_feature_preferences: TcfPreferenceMap,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub vendor_consent_preferences: TcfPreferenceMap,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub vendor_legitimate_interests_preferences: TcfPreferenceMap,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub system_consent_preferences: TcfPreferenceMap,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub system_legitimate_interests_preferences: TcfPreferenceMap,
}

impl TcfConsent {
	pub fn is_empty(&self) -> bool {
		self == &TcfConsent::default()
	}
}

/// The durable per-visitor state stored in the `fides_consent` cookie.
///
/// `fides_meta.created_at` is set when the record is first constructed and
/// never touched afterwards. `fides_meta.updated_at` is only stamped by the
/// local store when a save is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
	#[serde(default)]
	pub consent: ConsentMap,
	pub identity: Identity,
	pub fides_meta: FidesMeta,
	#[serde(default, skip_serializing_if = "TcfConsent::is_empty")]
	pub tcf_consent: TcfConsent,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tcf_version_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fides_string: Option<String>,
}

impl ConsentRecord {
	/// Construct a first-visit record with a fresh device id
	pub fn new_default(defaults: &ConsentMap) -> Self {
		Self {
			consent: defaults.clone(),
			identity: Identity { fides_user_device_id: utils::new_device_id() },
			fides_meta: FidesMeta {
				version: CONSENT_RECORD_VERSION.to_string(),
				created_at: Some(utils::now()),
				updated_at: None,
				consent_method: None,
			},
			tcf_consent: TcfConsent::default(),
			tcf_version_hash: None,
			fides_string: None,
		}
	}

	/// Fill keys missing from the consent map. Existing entries are never replaced.
	pub fn fill_defaults(&mut self, defaults: &ConsentMap) {
		for (key, value) in defaults {
			self.consent.entry(key.clone()).or_insert(*value);
		}
	}

	pub fn device_id(&self) -> &str {
		&self.identity.fides_user_device_id
	}
}


// vim: ts=4
