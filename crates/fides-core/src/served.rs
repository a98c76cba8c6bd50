//! Notices-served audit call, made when a consent surface is shown

use crate::events::{EventExtra, FidesEventType};
use crate::prelude::*;
use fides_types::api_adapter::{BrowserIdentity, NoticesServedRequest};
use fides_types::experience::{PrivacyExperience, TcfId, TcfRecord};
use fides_types::types::{ConsentMechanism, ServingComponent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServedOutcome {
	/// Recorded; the id is attached to the next save
	Recorded(String),
	/// Recorded, but the API returned no id
	RecordedWithoutId,
	Disabled,
	Preview,
	NoExperience,
	Failed(String),
}

fn ids(records: &[TcfRecord]) -> Vec<TcfId> {
	records.iter().map(|record| record.id.clone()).collect()
}

/// Builds the audit payload for the notices of an experience
pub fn served_request(
	experience: &PrivacyExperience,
	fides_user_device_id: &str,
	user_geography: Option<String>,
	serving_component: ServingComponent,
) -> NoticesServedRequest {
	let notices = experience.privacy_notices();
	let tcf = experience.tcf_lists();
	NoticesServedRequest {
		browser_identity: BrowserIdentity { fides_user_device_id: fides_user_device_id.to_string() },
		privacy_experience_id: experience.id.clone(),
		user_geography,
		acknowledge_mode: !notices.is_empty()
			&& notices.iter().all(|n| n.consent_mechanism == ConsentMechanism::NoticeOnly),
		privacy_notice_history_ids: notices
			.iter()
			.map(|n| n.privacy_notice_history_id.clone())
			.collect(),
		tcf_purpose_consents: tcf.map(|t| ids(&t.tcf_purpose_consents)).unwrap_or_default(),
		tcf_purpose_legitimate_interests: tcf
			.map(|t| ids(&t.tcf_purpose_legitimate_interests))
			.unwrap_or_default(),
		tcf_special_features: tcf.map(|t| ids(&t.tcf_special_features)).unwrap_or_default(),
		tcf_vendor_consents: tcf.map(|t| ids(&t.tcf_vendor_consents)).unwrap_or_default(),
		tcf_vendor_legitimate_interests: tcf
			.map(|t| ids(&t.tcf_vendor_legitimate_interests))
			.unwrap_or_default(),
		tcf_system_consents: tcf.map(|t| ids(&t.tcf_system_consents)).unwrap_or_default(),
		serving_component,
	}
}

/// Reports the notices of the current experience as served
pub async fn notices_served(app: &App, serving_component: ServingComponent) -> ServedOutcome {
	let opts = app.options();
	if opts.fides_preview {
		return ServedOutcome::Preview;
	}
	if !opts.notices_served_enabled() || opts.fides_api_url.is_empty() {
		return ServedOutcome::Disabled;
	}
	let Some(experience) = app.experience() else {
		return ServedOutcome::NoExperience;
	};

	let request =
		served_request(&experience, app.record().device_id(), app.region(), serving_component);
	match app.api.patch_notices_served(&opts.fides_api_url, &request).await {
		Ok(response) => match response.served_notice_history_id() {
			Some(id) => {
				debug!(served_notice_history_id = %id, "Notices served recorded");
				app.set_served_notice_history_id(id.to_string());
				ServedOutcome::Recorded(id.to_string())
			}
			None => ServedOutcome::RecordedWithoutId,
		},
		Err(e) => {
			warn!(error = %e, "Failed to record notices served");
			ServedOutcome::Failed(e.to_string())
		}
	}
}

/// A consent surface was shown: announce it, then record the served notices
pub async fn show_surface(app: &App, serving_component: ServingComponent) -> ServedOutcome {
	app.emit(FidesEventType::FidesUIShown, EventExtra::component(serving_component));
	notices_served(app, serving_component).await
}


// vim: ts=4
