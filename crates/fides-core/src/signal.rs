//! Signal context: ambient regulatory signals for the current page load

use serde::{Deserialize, Serialize};

use crate::options::FidesOptions;
use fides_types::signal::SignalSource;

/// Query-string parameter that can stand in for the browser signal
pub const GPC_QUERY_PARAM: &str = "globalPrivacyControl";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentContext {
	/// `None` when no signal is present at all
	pub global_privacy_control: Option<bool>,
}

impl ConsentContext {
	pub fn gpc_enabled(&self) -> bool {
		self.global_privacy_control == Some(true)
	}
}

/// Resolves the global privacy control signal. Pure; call it whenever needed.
///
/// The first defined source wins:
/// 1. consent-string mode suppresses the signal (`Some(false)`)
/// 2. the browser-reported flag
/// 3. the `globalPrivacyControl=true|false` query parameter
/// 4. otherwise no signal
pub fn resolve(opts: &FidesOptions, source: &dyn SignalSource) -> ConsentContext {
	if opts.consent_string_mode() {
		return ConsentContext { global_privacy_control: Some(false) };
	}

	if let Some(gpc) = source.global_privacy_control() {
		return ConsentContext { global_privacy_control: Some(gpc) };
	}

	let from_query = source.page_url().and_then(|url| {
		url.query_pairs().find(|(key, _)| key == GPC_QUERY_PARAM).and_then(|(_, value)| {
			match value.as_ref() {
				"true" => Some(true),
				"false" => Some(false),
				_ => None,
			}
		})
	});

	ConsentContext { global_privacy_control: from_query }
}


// vim: ts=4
