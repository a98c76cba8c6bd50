//! Preference reconciler
//!
//! Merges the stored consent map, notice defaults and the global privacy
//! control signal into one effective decision per notice. Reconciliation is
//! pure: it never touches the record. Only an explicit save changes it.

use serde::{Deserialize, Serialize};

use crate::signal::ConsentContext;
use fides_types::consent::ConsentRecord;
use fides_types::experience::PrivacyNotice;
use fides_types::types::{ConsentMechanism, GpcStatus, UserConsentPreference};

/// Effective decision for one notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPreference {
	pub notice: PrivacyNotice,
	pub preference: UserConsentPreference,
	pub gpc_status: GpcStatus,
}

impl ConsentPreference {
	pub fn new(notice: PrivacyNotice, preference: UserConsentPreference) -> Self {
		Self { notice, preference, gpc_status: GpcStatus::None }
	}

	pub fn notice_key(&self) -> &str {
		&self.notice.notice_key
	}
}

/// Resolves the decision for every notice, in notice order.
///
/// Precedence: `notice_only` is always acknowledged; otherwise an explicit
/// stored entry beats the notice default. A flagged notice is then forced to
/// opt-out while the signal is on. The status records whether the signal
/// changed the decision (`Applied`) or contradicts an explicit stored opt-in
/// (`Overridden`).
pub fn reconcile(
	notices: &[PrivacyNotice],
	record: &ConsentRecord,
	context: &ConsentContext,
) -> Vec<ConsentPreference> {
	notices.iter().map(|notice| reconcile_notice(notice, record, context)).collect()
}

fn reconcile_notice(
	notice: &PrivacyNotice,
	record: &ConsentRecord,
	context: &ConsentContext,
) -> ConsentPreference {
	if notice.consent_mechanism == ConsentMechanism::NoticeOnly {
		return ConsentPreference::new(notice.clone(), UserConsentPreference::Acknowledge);
	}

	let stored = record.consent.get(&notice.notice_key).copied();
	let prior = match stored {
		Some(consent) => UserConsentPreference::from_consent(consent),
		None => match notice.default_preference {
			// an acknowledge default on a refusable notice counts as consent
			UserConsentPreference::Acknowledge => UserConsentPreference::OptIn,
			default => default,
		},
	};

	if !(notice.has_gpc_flag && context.gpc_enabled()) {
		return ConsentPreference::new(notice.clone(), prior);
	}

	let gpc_status = match (stored, prior) {
		(Some(true), _) => GpcStatus::Overridden,
		(_, UserConsentPreference::OptOut) => GpcStatus::None,
		_ => GpcStatus::Applied,
	};
	ConsentPreference {
		notice: notice.clone(),
		preference: UserConsentPreference::OptOut,
		gpc_status,
	}
}

/// Preferences to save automatically when the signal was applied at load.
///
/// Returns `None` unless the signal was applied to at least one notice the
/// visitor has no stored entry for. In the returned set, notices flagged
/// `Overridden` keep the visitor's stored opt-in, so an explicit choice is
/// never changed without a save the visitor made.
pub fn signal_auto_save_preferences(
	preferences: &[ConsentPreference],
	record: &ConsentRecord,
) -> Option<Vec<ConsentPreference>> {
	let applies = preferences.iter().any(|pref| {
		pref.gpc_status == GpcStatus::Applied && !record.consent.contains_key(pref.notice_key())
	});
	if !applies {
		return None;
	}

	Some(
		preferences
			.iter()
			.map(|pref| match pref.gpc_status {
				GpcStatus::Overridden => ConsentPreference {
					preference: UserConsentPreference::OptIn,
					..pref.clone()
				},
				_ => pref.clone(),
			})
			.collect(),
	)
}


// vim: ts=4
