//! Initialization: one pass from stored state to a render decision

use std::sync::Arc;

use crate::events::{EventExtra, FidesEventType};
use crate::experience::{self, ExperienceOutcome, NotRenderable};
use crate::prelude::*;
use crate::reconcile::{self, ConsentPreference};
use crate::save::{self, SaveOptions, SaveReport};
use crate::signal::ConsentContext;
use crate::store::LoadSource;
use fides_types::consent::ConsentRecord;
use fides_types::types::ConsentMethod;

#[derive(Debug, Clone)]
pub struct InitOutcome {
	pub record: ConsentRecord,
	pub load_source: LoadSource,
	pub region: Option<String>,
	pub experience: ExperienceOutcome,
	pub preferences: Vec<ConsentPreference>,
	pub context: ConsentContext,
	/// The stored consent is stale against the experience
	pub resurface: bool,
	pub show_banner: bool,
	pub render: Result<(), NotRenderable>,
	/// The consent surface is embedded in the page instead of shown as a banner
	pub embed: bool,
	/// The automatic save made for the global privacy control signal, if any
	pub signal_save: Option<SaveReport>,
}

/// Runs initialization. Only a repeated call is an error; everything else
/// degrades to an outcome without an experience.
pub async fn initialize(app: &App) -> FdResult<InitOutcome> {
	let guard = app.begin_init()?;

	if let Some(url) = app.signal_source.page_url().cloned() {
		app.options_mut().apply_overrides(&url);
	}
	let opts = app.options();

	let loaded = app.store.load(&opts.consent_defaults).await;
	debug!(source = ?loaded.source, "Consent record loaded");
	*app.record_mut() = loaded.record;

	let region = resolve_region(app).await;
	app.set_region(region.clone());

	let experience = experience::resolve(app, region.as_deref()).await;
	let context = app.context();

	let mut outcome = InitOutcome {
		record: app.record(),
		load_source: loaded.source,
		region,
		experience: experience.clone(),
		preferences: Vec::new(),
		context,
		resurface: false,
		show_banner: false,
		render: Err(NotRenderable::NoExperience),
		embed: opts.fides_embed,
		signal_save: None,
	};

	if let ExperienceOutcome::Resolved(exp) = experience {
		outcome.render = experience::is_renderable(&exp);
		if outcome.render.is_ok() && exp.is_tcf() && !opts.fides_tcf_gdpr_applies {
			info!("TCF experience resolved but GDPR does not apply, not rendering");
			outcome.render = Err(NotRenderable::GdprNotApplicable);
		}

		let record = app.record();
		let preferences = reconcile::reconcile(exp.privacy_notices(), &record, &context);
		outcome.resurface = experience::needs_resurface(&exp, &record);
		app.set_preferences(preferences.clone());

		if opts.auto_apply_signal
			&& outcome.render.is_ok()
			&& let Some(auto) = reconcile::signal_auto_save_preferences(&preferences, &record)
		{
			info!("Applying the global privacy control signal");
			outcome.signal_save = Some(
				save::save(app, &auto, &exp, ConsentMethod::Gpc, SaveOptions::default()).await,
			);
		}

		outcome.preferences = preferences;
		// an embedded surface is part of the page, there is no banner to show
		outcome.show_banner = outcome.render.is_ok()
			&& outcome.resurface
			&& !opts.fides_disable_banner
			&& !opts.fides_embed;
	}

	outcome.record = app.record();
	guard.finish();

	info!(
		region = ?outcome.region,
		show_banner = outcome.show_banner,
		resurface = outcome.resurface,
		"Fides initialized"
	);
	app.events.emit(FidesEventType::FidesInitialized, &outcome.record, EventExtra::default());
	Ok(outcome)
}

/// Pre-supplied region, else the geolocation API when enabled
async fn resolve_region(app: &App) -> Option<String> {
	let opts = app.options();
	if let Some(region) = opts.region.filter(|r| !r.is_empty()) {
		return Some(region);
	}
	if !opts.is_geolocation_enabled {
		debug!("Geolocation disabled and no region supplied");
		return None;
	}
	let Some(url) = opts.geolocation_api_url else {
		warn!("Geolocation enabled without a geolocation API URL");
		return None;
	};

	match app.api.fetch_geolocation(&url).await {
		Ok(geo) => {
			let region = geo.region_string();
			if region.is_none() {
				warn!(geolocation = ?geo, "Geolocation response has no usable region");
			}
			region
		}
		Err(e) => {
			warn!(error = %e, "Geolocation request failed");
			None
		}
	}
}


// vim: ts=4
