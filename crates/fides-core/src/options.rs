//! Engine configuration
//!
//! Options come from the host's config object (JSON) and can be overridden
//! per page load through `fides_*` query-string parameters.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::prelude::*;
use fides_types::consent::ConsentMap;
use fides_types::experience::PrivacyExperience;

pub const DEFAULT_EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FidesOptions {
	/// Verbose decision logging
	pub debug: bool,
	/// Base URL of the consent API, e.g. `https://consent.example.com/api/v1`
	pub fides_api_url: String,
	pub geolocation_api_url: Option<String>,
	pub is_geolocation_enabled: bool,
	/// Pre-resolved region (skips geolocation)
	pub region: Option<String>,
	/// Pre-fetched experience (skips the experience request)
	pub experience: Option<PrivacyExperience>,
	/// Skip the remote preferences save and the notices-served call
	pub fides_disable_save_api: bool,
	pub fides_disable_notices_served_api: bool,
	pub fides_disable_banner: bool,
	/// The consent UI is embedded in the page instead of overlaid, so no
	/// banner is shown
	pub fides_embed: bool,
	/// Pre-supplied standardized consent string
	pub fides_string: Option<String>,
	/// Standardized consent-string (TCF) mode
	pub tcf_enabled: bool,
	/// Whether the default regulation applies in TCF mode. When off, a TCF
	/// experience is resolved but not rendered.
	pub fides_tcf_gdpr_applies: bool,
	/// Demo mode: no persistence, no remote calls, no cookie removal
	pub fides_preview: bool,
	/// Save signal-applied opt-outs automatically during initialization
	pub auto_apply_signal: bool,
	/// Notice defaults used to fill gaps in the stored consent map
	pub consent_defaults: ConsentMap,
	/// Capacity of the lifecycle event channel
	pub event_buffer: usize,
}

impl Default for FidesOptions {
	fn default() -> Self {
		Self {
			debug: false,
			fides_api_url: String::new(),
			geolocation_api_url: None,
			is_geolocation_enabled: false,
			region: None,
			experience: None,
			fides_disable_save_api: false,
			fides_disable_notices_served_api: false,
			fides_disable_banner: false,
			fides_embed: false,
			fides_string: None,
			tcf_enabled: false,
			fides_tcf_gdpr_applies: true,
			fides_preview: false,
			auto_apply_signal: true,
			consent_defaults: ConsentMap::new(),
			event_buffer: DEFAULT_EVENT_BUFFER,
		}
	}
}

impl FidesOptions {
	/// Parses a JSON config object
	pub fn from_json(json: &str) -> FdResult<Self> {
		let opts: FidesOptions = serde_json::from_str(json).map_err(|e| {
			Error::ValidationError(format!("invalid options: {}", e))
		})?;
		opts.validate()?;
		Ok(opts)
	}

	pub fn validate(&self) -> FdResult<()> {
		if !self.fides_api_url.is_empty() {
			Url::parse(&self.fides_api_url)?;
		}
		if let Some(geo_url) = &self.geolocation_api_url {
			Url::parse(geo_url)?;
		}
		if self.event_buffer == 0 {
			return Err(Error::ValidationError("event_buffer must be positive".into()));
		}
		Ok(())
	}

	/// Whether the standardized consent-string flow owns signal precedence
	pub fn consent_string_mode(&self) -> bool {
		self.tcf_enabled || self.fides_string.is_some()
	}

	/// Remote calls are off in preview mode or when the save API is disabled
	pub fn remote_save_enabled(&self) -> bool {
		!self.fides_preview && !self.fides_disable_save_api
	}

	pub fn notices_served_enabled(&self) -> bool {
		self.remote_save_enabled() && !self.fides_disable_notices_served_api
	}

	/// Applies `fides_*` query-string overrides from the page URL.
	///
	/// Returns the names of the options that were overridden.
	pub fn apply_overrides(&mut self, url: &Url) -> Vec<&'static str> {
		let mut applied = Vec::new();

		for (key, value) in url.query_pairs() {
			let (name, target) = match key.as_ref() {
				"fides_disable_save_api" => {
					("fides_disable_save_api", &mut self.fides_disable_save_api)
				}
				"fides_disable_notices_served_api" => (
					"fides_disable_notices_served_api",
					&mut self.fides_disable_notices_served_api,
				),
				"fides_disable_banner" => ("fides_disable_banner", &mut self.fides_disable_banner),
				"fides_embed" => ("fides_embed", &mut self.fides_embed),
				"fides_tcf_gdpr_applies" => {
					("fides_tcf_gdpr_applies", &mut self.fides_tcf_gdpr_applies)
				}
				"fides_preview" => ("fides_preview", &mut self.fides_preview),
				"fides_string" => {
					if !value.is_empty() {
						self.fides_string = Some(value.into_owned());
						applied.push("fides_string");
					}
					continue;
				}
				_ => continue,
			};

			match parse_bool(&value) {
				Some(flag) => {
					*target = flag;
					applied.push(name);
				}
				None => warn!(option = %key, value = %value, "Ignoring malformed option override"),
			}
		}

		if !applied.is_empty() {
			debug!("Applied option overrides: {:?}", applied);
		}
		applied
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value {
		"true" => Some(true),
		"false" => Some(false),
		_ => None,
	}
}


// vim: ts=4
