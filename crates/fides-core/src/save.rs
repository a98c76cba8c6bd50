//! Save orchestrator
//!
//! Applies a set of decisions to the in-memory record, persists it locally,
//! syncs it to the consent API, removes cookies of refused notices and
//! announces the change. Local persistence never depends on the remote
//! outcome.

use crate::events::{EventExtra, FidesEventType};
use crate::prelude::*;
use crate::reconcile::ConsentPreference;
use crate::store::PersistOutcome;
use fides_types::api_adapter::{
	BrowserIdentity, NoticePreference, PrivacyPreferencesRequest, TcfPreference,
};
use fides_types::consent::{ConsentMap, ConsentRecord, TcfConsent, TcfPreferenceMap};
use fides_types::experience::{CookieRef, PrivacyExperience};
use fides_types::types::{ConsentMethod, ServingComponent, UserConsentPreference};

#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
	pub serving_component: Option<ServingComponent>,
	/// Defaults to the id returned by the last notices-served call
	pub served_notice_history_id: Option<String>,
	/// TCF decisions, only recorded for TCF experiences
	pub tcf: Option<TcfConsent>,
	pub fides_string: Option<String>,
}

/// Result of the remote half of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
	Synced,
	/// The save API is disabled or not configured
	Disabled,
	Preview,
	Failed(String),
}

#[derive(Debug, Clone)]
pub struct SaveReport {
	pub record: ConsentRecord,
	/// `None` when persistence was skipped in preview mode
	pub persisted: Option<PersistOutcome>,
	pub remote: SyncOutcome,
	pub cleared_cookies: Vec<String>,
	/// Subscribers the `FidesUpdated` event reached
	pub delivered: usize,
}

/// Consent map entries for a set of decisions
pub fn consent_map(preferences: &[ConsentPreference]) -> ConsentMap {
	preferences
		.iter()
		.map(|pref| (pref.notice_key().to_string(), pref.preference.as_consent()))
		.collect()
}

/// Saves a set of decisions. Never fails; see the outcomes in the report.
pub async fn save(
	app: &App,
	preferences: &[ConsentPreference],
	experience: &PrivacyExperience,
	method: ConsentMethod,
	save_opts: SaveOptions,
) -> SaveReport {
	let opts = app.options();
	info!(method = %method, experience = %experience.id, "Saving consent preferences");

	// merge onto the current record, a concurrent save may have changed it
	let mut record = {
		let mut current = app.record_mut();
		current.consent.extend(consent_map(preferences));
		current.fides_meta.consent_method = Some(method);
		if experience.is_tcf() {
			current.tcf_version_hash = experience.version_hash().map(str::to_string);
			if let Some(tcf) = &save_opts.tcf {
				current.tcf_consent = tcf.clone();
			}
			if let Some(fides_string) = &save_opts.fides_string {
				current.fides_string = Some(fides_string.clone());
			}
		}
		current.clone()
	};

	let persisted = if opts.fides_preview {
		debug!("Preview mode, consent record not persisted");
		None
	} else {
		let outcome = app.store.save(&mut record).await;
		let mut current = app.record_mut();
		if current.fides_meta.updated_at < record.fides_meta.updated_at {
			current.fides_meta.updated_at = record.fides_meta.updated_at;
		}
		Some(outcome)
	};

	let remote = if opts.fides_preview {
		SyncOutcome::Preview
	} else if opts.fides_disable_save_api {
		SyncOutcome::Disabled
	} else {
		sync_remote(app, preferences, experience, method, &record, &save_opts).await
	};

	let cleared_cookies = if opts.fides_preview {
		Vec::new()
	} else {
		let refused: Vec<CookieRef> = preferences
			.iter()
			.filter(|pref| pref.preference == UserConsentPreference::OptOut)
			.flat_map(|pref| pref.notice.cookies.iter().cloned())
			.collect();
		app.store.clear_associated_cookies(&refused).await
	};

	app.set_preferences(preferences.to_vec());
	let delivered = app.events.emit(
		FidesEventType::FidesUpdated,
		&record,
		EventExtra {
			serving_component: save_opts.serving_component,
			consent_method: Some(method),
			saved: Some(persisted == Some(PersistOutcome::Written)),
			..Default::default()
		},
	);

	SaveReport { record, persisted, remote, cleared_cookies, delivered }
}

/// Saves against the experience resolved for this page load
pub async fn save_current(
	app: &App,
	preferences: &[ConsentPreference],
	method: ConsentMethod,
	save_opts: SaveOptions,
) -> FdResult<SaveReport> {
	let experience = app.experience().ok_or(Error::NotFound)?;
	Ok(save(app, preferences, &experience, method, save_opts).await)
}

async fn sync_remote(
	app: &App,
	preferences: &[ConsentPreference],
	experience: &PrivacyExperience,
	method: ConsentMethod,
	record: &ConsentRecord,
	save_opts: &SaveOptions,
) -> SyncOutcome {
	if let Some(saver) = &app.preference_saver {
		return match saver.save_preferences(method, record, experience).await {
			Ok(()) => SyncOutcome::Synced,
			Err(e) => {
				warn!(error = %e, "Custom preference saver failed");
				SyncOutcome::Failed(e.to_string())
			}
		};
	}

	let api_url = app.options().fides_api_url;
	if api_url.is_empty() {
		debug!("No consent API configured, skipping remote save");
		return SyncOutcome::Disabled;
	}

	let request = PrivacyPreferencesRequest {
		browser_identity: BrowserIdentity {
			fides_user_device_id: record.device_id().to_string(),
		},
		preferences: preferences
			.iter()
			.map(|pref| NoticePreference {
				privacy_notice_history_id: pref.notice.privacy_notice_history_id.clone(),
				preference: pref.preference,
			})
			.collect(),
		privacy_experience_id: experience.id.clone(),
		user_geography: app.region(),
		method,
		served_notice_history_id: save_opts
			.served_notice_history_id
			.clone()
			.or_else(|| app.served_notice_history_id()),
		purpose_consent_preferences: tcf_preferences(&record.tcf_consent.purpose_consent_preferences),
		vendor_consent_preferences: tcf_preferences(&record.tcf_consent.vendor_consent_preferences),
		fides_string: record.fides_string.clone(),
	};

	match app.api.patch_privacy_preferences(&api_url, &request).await {
		Ok(()) => {
			debug!("Consent preferences synced");
			SyncOutcome::Synced
		}
		Err(e) => {
			warn!(error = %e, "Failed to sync consent preferences, kept locally");
			SyncOutcome::Failed(e.to_string())
		}
	}
}

fn tcf_preferences(map: &TcfPreferenceMap) -> Vec<TcfPreference> {
	map.iter()
		.map(|(id, consent)| TcfPreference {
			id: id.clone(),
			preference: UserConsentPreference::from_consent(*consent),
		})
		.collect()
}


// vim: ts=4
