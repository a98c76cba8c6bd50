//! Reusable experiences and stored records

use serde_json::{Value, json};

use fides_core::store::CONSENT_COOKIE_NAME;
use fides_core::MemoryCookieJar;

pub fn notice(key: &str, mechanism: &str, default: &str, gpc: bool) -> Value {
	json!({
		"id": format!("pn-{}", key),
		"notice_key": key,
		"name": key,
		"consent_mechanism": mechanism,
		"default_preference": default,
		"has_gpc_flag": gpc,
		"cookies": [],
		"privacy_notice_history_id": format!("pnh-{}", key),
		"disabled": false
	})
}

pub fn notice_with_cookie(key: &str, mechanism: &str, default: &str, cookie: &str) -> Value {
	let mut notice = notice(key, mechanism, default, false);
	notice["cookies"] = json!([{ "name": cookie }]);
	notice
}

pub fn overlay_experience(notices: Vec<Value>) -> Value {
	json!({
		"id": "pri-exp-1",
		"region": "us_ca",
		"component": "overlay",
		"experience_config": {
			"id": "cfg-1",
			"title": "Manage your consent",
			"accept_button_label": "Accept all",
			"reject_button_label": "Reject all"
		},
		"privacy_notices": notices
	})
}

/// Experience as the API pages it
pub fn experience_page(experience: Value) -> Value {
	json!({ "items": [experience], "total": 1, "page": 1, "size": 50 })
}

pub fn tcf_experience(version_hash: &str) -> Value {
	json!({
		"id": "pri-exp-tcf",
		"region": "eea",
		"component": "tcf_overlay",
		"experience_config": { "title": "We value your privacy" },
		"meta": {
			"version_hash": version_hash,
			"accept_all_fides_string": "CP.accept",
			"reject_all_fides_string": "CP.reject"
		},
		"tcf_purpose_consents": [{ "id": 1, "name": "Store and/or access information on a device" }],
		"tcf_vendor_consents": [{ "id": "gvl.2", "name": "Captify" }]
	})
}

/// Writes a current-schema consent cookie with the given consent map
pub fn store_record(jar: &MemoryCookieJar, consent: Value) {
	let record = json!({
		"consent": consent,
		"identity": { "fides_user_device_id": "dev-stored" },
		"fides_meta": {
			"version": "0.9.0",
			"createdAt": "2025-01-01T00:00:00Z",
			"updatedAt": "2025-01-02T00:00:00Z",
			"consentMethod": "save"
		}
	});
	jar.insert_raw(CONSENT_COOKIE_NAME, &record.to_string());
}

// vim: ts=4
