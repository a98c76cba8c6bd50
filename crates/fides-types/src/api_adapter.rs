//! Remote API payloads and the pluggable fetch/save integration points.
//!
//! A host can replace the default network calls with its own
//! implementations of [`ExperienceFetcher`] and [`PreferenceSaver`]. Errors
//! returned by these are caught by the engine and degrade exactly like
//! network errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::consent::ConsentRecord;
use crate::experience::{PrivacyExperience, TcfId};
use crate::prelude::*;
use crate::types::{ConsentMethod, ServingComponent, UserConsentPreference};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserIdentity {
	pub fides_user_device_id: String,
}

/// One saved notice decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePreference {
	pub privacy_notice_history_id: String,
	pub preference: UserConsentPreference,
}

/// One saved TCF decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcfPreference {
	pub id: String,
	pub preference: UserConsentPreference,
}

/// Body of `PATCH /privacy-preferences`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyPreferencesRequest {
	pub browser_identity: BrowserIdentity,
	pub preferences: Vec<NoticePreference>,
	pub privacy_experience_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_geography: Option<String>,
	pub method: ConsentMethod,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub served_notice_history_id: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub purpose_consent_preferences: Vec<TcfPreference>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub vendor_consent_preferences: Vec<TcfPreference>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fides_string: Option<String>,
}

/// Body of `PATCH /notices-served`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticesServedRequest {
	pub browser_identity: BrowserIdentity,
	pub privacy_experience_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_geography: Option<String>,
	pub acknowledge_mode: bool,
	pub privacy_notice_history_ids: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tcf_purpose_consents: Vec<TcfId>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tcf_purpose_legitimate_interests: Vec<TcfId>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tcf_special_features: Vec<TcfId>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tcf_vendor_consents: Vec<TcfId>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tcf_vendor_legitimate_interests: Vec<TcfId>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tcf_system_consents: Vec<TcfId>,
	pub serving_component: ServingComponent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedNotice {
	pub served_notice_history_id: String,
}

/// Response of `PATCH /notices-served`: older deployments answer with a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NoticesServedResponse {
	List(Vec<ServedNotice>),
	Single(ServedNotice),
}

impl NoticesServedResponse {
	pub fn served_notice_history_id(&self) -> Option<&str> {
		match self {
			NoticesServedResponse::List(list) => {
				list.first().map(|served| served.served_notice_history_id.as_str())
			}
			NoticesServedResponse::Single(served) => Some(&served.served_notice_history_id),
		}
	}
}

/// Response of the geolocation API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geolocation {
	pub country: Option<String>,
	pub region: Option<String>,
	/// ISO 3166-2 style, e.g. `US-CA`
	pub location: Option<String>,
	pub ip: Option<String>,
}

impl Geolocation {
	/// Region key used by the experience API, e.g. `us_ca`
	///
	/// Prefers a well-formed `location`, falls back to `country` + `region`,
	/// then to `country` alone.
	pub fn region_string(&self) -> Option<String> {
		if let Some(location) = &self.location {
			let mut parts = location.split(['-', '_']);
			if let (Some(country), Some(region), None) = (parts.next(), parts.next(), parts.next())
				&& valid_code(country)
				&& valid_code(region)
			{
				return Some(format!("{}_{}", country, region).to_lowercase());
			}
		}

		let country = self.country.as_deref().filter(|c| valid_code(c));
		let region = self.region.as_deref().filter(|r| valid_code(r));
		match (country, region) {
			(Some(country), Some(region)) => Some(format!("{}_{}", country, region).to_lowercase()),
			(Some(country), None) => Some(country.to_lowercase()),
			_ => None,
		}
	}
}

fn valid_code(code: &str) -> bool {
	!code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Replaces the default experience request
#[async_trait]
pub trait ExperienceFetcher: Debug + Send + Sync {
	async fn fetch_experience(
		&self,
		region: &str,
		fides_user_device_id: &str,
	) -> FdResult<Option<PrivacyExperience>>;
}

/// Replaces the default remote preferences save
#[async_trait]
pub trait PreferenceSaver: Debug + Send + Sync {
	async fn save_preferences(
		&self,
		method: ConsentMethod,
		record: &ConsentRecord,
		experience: &PrivacyExperience,
	) -> FdResult<()>;
}


// vim: ts=4
