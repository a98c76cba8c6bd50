//! Small vocabulary types used throughout the engine.

use serde::{Deserialize, Serialize};

/// How a notice collects consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentMechanism {
	OptIn,
	OptOut,
	/// Cannot be refused, only acknowledged
	NoticeOnly,
}

/// A resolved (or default) preference for a single notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserConsentPreference {
	OptIn,
	OptOut,
	Acknowledge,
}

impl UserConsentPreference {
	/// Boolean stored in the consent map. Acknowledgement counts as consent.
	pub fn as_consent(self) -> bool {
		!matches!(self, UserConsentPreference::OptOut)
	}

	pub fn from_consent(consent: bool) -> Self {
		if consent { UserConsentPreference::OptIn } else { UserConsentPreference::OptOut }
	}
}

impl std::fmt::Display for UserConsentPreference {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			UserConsentPreference::OptIn => write!(f, "opt_in"),
			UserConsentPreference::OptOut => write!(f, "opt_out"),
			UserConsentPreference::Acknowledge => write!(f, "acknowledge"),
		}
	}
}

/// Outcome of applying the global privacy control signal to a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpcStatus {
	#[default]
	None,
	/// The signal forced the decision down to opt-out
	Applied,
	/// The visitor explicitly opted in although the signal is present
	Overridden,
}

/// How a consent decision was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentMethod {
	Button,
	Reject,
	Accept,
	Save,
	Dismiss,
	Gpc,
	/// Set programmatically by the host page
	Api,
	Acknowledge,
}

impl std::fmt::Display for ConsentMethod {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ConsentMethod::Button => "button",
			ConsentMethod::Reject => "reject",
			ConsentMethod::Accept => "accept",
			ConsentMethod::Save => "save",
			ConsentMethod::Dismiss => "dismiss",
			ConsentMethod::Gpc => "gpc",
			ConsentMethod::Api => "api",
			ConsentMethod::Acknowledge => "acknowledge",
		};
		write!(f, "{}", s)
	}
}

/// The UI surface that served notices or triggered an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingComponent {
	Overlay,
	Banner,
	PrivacyCenter,
	TcfOverlay,
	TcfBanner,
}

// vim: ts=4
