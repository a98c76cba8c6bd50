//! Experience resolver
//!
//! Finds the privacy experience for the visitor's region, decides whether it
//! can be rendered, and whether the stored consent is stale against it.

use std::sync::Arc;

use crate::prelude::*;
use fides_types::consent::ConsentRecord;
use fides_types::experience::{ExperienceKind, PrivacyExperience};

/// Why no experience is available for this page load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
	NoRegion,
	NotFound,
	Network,
	Status(u16),
	Malformed,
	/// A custom fetcher failed
	Integration,
}

#[derive(Debug, Clone)]
pub enum ExperienceOutcome {
	Resolved(Arc<PrivacyExperience>),
	Empty(EmptyReason),
}

impl ExperienceOutcome {
	pub fn experience(&self) -> Option<&Arc<PrivacyExperience>> {
		match self {
			ExperienceOutcome::Resolved(experience) => Some(experience),
			ExperienceOutcome::Empty(_) => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotRenderable {
	NoExperience,
	/// Privacy center experiences are rendered by the privacy center itself
	PrivacyCenter,
	NoNotices,
	EmptyTcfLists,
	MissingConfig,
	/// TCF experience while the default regulation is switched off
	GdprNotApplicable,
}

impl std::fmt::Display for NotRenderable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			NotRenderable::NoExperience => write!(f, "no experience"),
			NotRenderable::PrivacyCenter => write!(f, "privacy center component"),
			NotRenderable::NoNotices => write!(f, "overlay without privacy notices"),
			NotRenderable::EmptyTcfLists => write!(f, "TCF overlay without purposes or vendors"),
			NotRenderable::MissingConfig => write!(f, "missing experience config"),
			NotRenderable::GdprNotApplicable => write!(f, "GDPR does not apply"),
		}
	}
}

/// Resolves the experience for a region and caches it on the context.
///
/// Order: the experience cached for this page load, a pre-supplied
/// experience, a custom fetcher, then the consent API. Never fails; every
/// failure is an `Empty` outcome.
pub async fn resolve(app: &App, region: Option<&str>) -> ExperienceOutcome {
	if let Some(experience) = app.experience() {
		return ExperienceOutcome::Resolved(experience);
	}

	let outcome = fetch(app, region).await;
	match &outcome {
		ExperienceOutcome::Resolved(experience) => {
			debug!(experience = %experience.id, region = ?experience.region, "Experience resolved");
			app.set_experience(experience.clone());
		}
		ExperienceOutcome::Empty(reason) => {
			info!(reason = ?reason, "No experience for this page load");
		}
	}
	outcome
}

async fn fetch(app: &App, region: Option<&str>) -> ExperienceOutcome {
	let opts = app.options();
	if let Some(experience) = opts.experience {
		debug!("Using pre-supplied experience");
		return ExperienceOutcome::Resolved(Arc::new(experience));
	}

	let Some(region) = region else {
		return ExperienceOutcome::Empty(EmptyReason::NoRegion);
	};
	let device_id = app.record().identity.fides_user_device_id;

	if let Some(fetcher) = &app.experience_fetcher {
		return match fetcher.fetch_experience(region, &device_id).await {
			Ok(Some(experience)) => ExperienceOutcome::Resolved(Arc::new(experience)),
			Ok(None) => ExperienceOutcome::Empty(EmptyReason::NotFound),
			Err(e) => {
				warn!(region = %region, error = %e, "Custom experience fetcher failed");
				ExperienceOutcome::Empty(EmptyReason::Integration)
			}
		};
	}

	if opts.fides_api_url.is_empty() {
		warn!("No consent API configured, cannot fetch an experience");
		return ExperienceOutcome::Empty(EmptyReason::NotFound);
	}

	match app.api.fetch_experience(&opts.fides_api_url, region, &device_id).await {
		Ok(Some(experience)) => ExperienceOutcome::Resolved(Arc::new(experience)),
		Ok(None) => ExperienceOutcome::Empty(EmptyReason::NotFound),
		Err(Error::Status(status)) => ExperienceOutcome::Empty(EmptyReason::Status(status)),
		Err(Error::Parse) => ExperienceOutcome::Empty(EmptyReason::Malformed),
		Err(e) => {
			warn!(region = %region, error = %e, "Experience request failed");
			ExperienceOutcome::Empty(EmptyReason::Network)
		}
	}
}

/// Whether the widget can render a consent surface for this experience
pub fn is_renderable(experience: &PrivacyExperience) -> Result<(), NotRenderable> {
	let result = match &experience.kind {
		ExperienceKind::PrivacyCenter { .. } => Err(NotRenderable::PrivacyCenter),
		ExperienceKind::Overlay { privacy_notices } if privacy_notices.is_empty() => {
			Err(NotRenderable::NoNotices)
		}
		ExperienceKind::TcfOverlay(lists) if lists.is_empty() => Err(NotRenderable::EmptyTcfLists),
		_ if experience.experience_config.is_none() => Err(NotRenderable::MissingConfig),
		_ => Ok(()),
	};
	if let Err(reason) = &result {
		debug!(experience = %experience.id, reason = %reason, "Experience is not renderable");
	}
	result
}

/// Whether the stored consent is stale against the experience, so the
/// consent surface should be shown again
pub fn needs_resurface(experience: &PrivacyExperience, record: &ConsentRecord) -> bool {
	match &experience.kind {
		ExperienceKind::TcfOverlay(_) => match (&record.tcf_version_hash, experience.version_hash()) {
			(None, _) => true,
			(Some(stored), current) => Some(stored.as_str()) != current,
		},
		ExperienceKind::Overlay { privacy_notices }
		| ExperienceKind::PrivacyCenter { privacy_notices } => privacy_notices
			.iter()
			.any(|notice| !record.consent.contains_key(&notice.notice_key)),
	}
}


// vim: ts=4
