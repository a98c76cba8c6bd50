//! Privacy notices and experiences as declared by the server.
//!
//! An experience is parsed into a tagged union over its `component` at the
//! boundary. Anything that does not parse into one of the known variants is
//! rejected there and treated as "no experience" by the resolver.

use serde::{Deserialize, Serialize};

use crate::types::{ConsentMechanism, UserConsentPreference};

/// A cookie a notice declares, removed when the visitor opts out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRef {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyNotice {
	pub id: String,
	pub notice_key: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub consent_mechanism: ConsentMechanism,
	pub default_preference: UserConsentPreference,
	#[serde(default)]
	pub has_gpc_flag: bool,
	#[serde(default)]
	pub cookies: Vec<CookieRef>,
	/// Immutable id of this notice version, used for the audit trail
	pub privacy_notice_history_id: String,
	#[serde(default)]
	pub disabled: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub framework: Option<String>,
}

/// Copy and labels of the consent UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
	pub id: Option<String>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub accept_button_label: Option<String>,
	pub reject_button_label: Option<String>,
	pub save_button_label: Option<String>,
	pub acknowledge_button_label: Option<String>,
	pub privacy_preferences_link_label: Option<String>,
	pub privacy_policy_link_label: Option<String>,
	pub privacy_policy_url: Option<String>,
	pub dismissable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceMeta {
	/// Changes whenever the TCF vocabulary the visitor must acknowledge changes
	pub version_hash: Option<String>,
	pub accept_all_fides_string: Option<String>,
	pub reject_all_fides_string: Option<String>,
}

/// Purpose ids are integers, vendor and system ids are strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TcfId {
	Int(u64),
	Str(String),
}

impl std::fmt::Display for TcfId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			TcfId::Int(id) => write!(f, "{}", id),
			TcfId::Str(id) => write!(f, "{}", id),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcfRecord {
	pub id: TcfId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_preference: Option<UserConsentPreference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcfLists {
	pub tcf_purpose_consents: Vec<TcfRecord>,
	pub tcf_purpose_legitimate_interests: Vec<TcfRecord>,
	pub tcf_special_purposes: Vec<TcfRecord>,
	pub tcf_features: Vec<TcfRecord>,
	pub tcf_special_features: Vec<TcfRecord>,
	pub tcf_vendor_consents: Vec<TcfRecord>,
	pub tcf_vendor_legitimate_interests: Vec<TcfRecord>,
	pub tcf_system_consents: Vec<TcfRecord>,
	pub tcf_system_legitimate_interests: Vec<TcfRecord>,
}

impl TcfLists {
	/// True if no purpose, feature, vendor or system list carries anything
	pub fn is_empty(&self) -> bool {
		self.tcf_purpose_consents.is_empty()
			&& self.tcf_purpose_legitimate_interests.is_empty()
			&& self.tcf_special_purposes.is_empty()
			&& self.tcf_features.is_empty()
			&& self.tcf_special_features.is_empty()
			&& self.tcf_vendor_consents.is_empty()
			&& self.tcf_vendor_legitimate_interests.is_empty()
			&& self.tcf_system_consents.is_empty()
			&& self.tcf_system_legitimate_interests.is_empty()
	}
}

/// Component-specific part of an experience
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum ExperienceKind {
	Overlay {
		#[serde(default)]
		privacy_notices: Vec<PrivacyNotice>,
	},
	PrivacyCenter {
		#[serde(default)]
		privacy_notices: Vec<PrivacyNotice>,
	},
	TcfOverlay(TcfLists),
}

/// The set of notices/purposes applicable to a visitor's region and surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyExperience {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub experience_config: Option<ExperienceConfig>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<ExperienceMeta>,
	#[serde(flatten)]
	pub kind: ExperienceKind,
}

impl PrivacyExperience {
	/// Privacy notices of the experience; TCF experiences carry none
	pub fn privacy_notices(&self) -> &[PrivacyNotice] {
		match &self.kind {
			ExperienceKind::Overlay { privacy_notices }
			| ExperienceKind::PrivacyCenter { privacy_notices } => privacy_notices,
			ExperienceKind::TcfOverlay(_) => &[],
		}
	}

	pub fn tcf_lists(&self) -> Option<&TcfLists> {
		match &self.kind {
			ExperienceKind::TcfOverlay(lists) => Some(lists),
			_ => None,
		}
	}

	pub fn is_tcf(&self) -> bool {
		matches!(self.kind, ExperienceKind::TcfOverlay(_))
	}

	pub fn version_hash(&self) -> Option<&str> {
		self.meta.as_ref().and_then(|meta| meta.version_hash.as_deref())
	}

	pub fn find_notice(&self, notice_key: &str) -> Option<&PrivacyNotice> {
		self.privacy_notices().iter().find(|notice| notice.notice_key == notice_key)
	}
}


// vim: ts=4
