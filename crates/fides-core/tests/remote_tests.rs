//! Remote API interactions: request shapes, geolocation, notices served,
//! and the pluggable fetch/save functions

mod common;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use common::*;
use fides_core::{
	Adapters, EmptyReason, ExperienceOutcome, FidesOptions, FidesState, MemoryCookieJar,
	SaveOptions, ServedOutcome, SyncOutcome, initialize, save_current, show_surface,
};
use fides_types::api_adapter::{ExperienceFetcher, PreferenceSaver};
use fides_types::consent::ConsentRecord;
use fides_types::error::{Error, FdResult};
use fides_types::experience::PrivacyExperience;
use fides_types::types::{ConsentMethod, ServingComponent};

#[tokio::test]
async fn test_experience_request_query() {
	let stub = start_stub(StubConfig::with_experience(overlay_experience(vec![notice(
		"ads", "opt_out", "opt_in", false,
	)])))
	.await;
	let (app, _jar) = build_app(api_options(&stub), None);

	initialize(&app).await.expect("init");

	let queries = stub.experience_queries();
	assert_eq!(queries.len(), 1);
	let query = &queries[0];
	assert_eq!(query["region"], "us_ca");
	assert_eq!(query["component"], "overlay");
	assert_eq!(query["show_disabled"], "false");
	assert_eq!(query["include_meta"], "true");
	assert_eq!(query["fides_user_device_id"], app.record().device_id());
}

#[tokio::test]
async fn test_region_from_geolocation() {
	let stub = start_stub(StubConfig::with_experience(overlay_experience(vec![notice(
		"ads", "opt_out", "opt_in", false,
	)])))
	.await;
	let opts = FidesOptions {
		region: None,
		is_geolocation_enabled: true,
		geolocation_api_url: Some(stub.geolocation_url()),
		..api_options(&stub)
	};
	let (app, _jar) = build_app(opts, None);

	let outcome = initialize(&app).await.expect("init");

	assert_eq!(outcome.region.as_deref(), Some("us_ca"));
	assert_eq!(*stub.state.geolocation_hits.lock(), 1);
	assert_eq!(stub.experience_queries()[0]["region"], "us_ca");
}

#[tokio::test]
async fn test_no_region_without_geolocation() {
	let stub = start_stub(StubConfig::default()).await;
	let opts = FidesOptions { region: None, ..api_options(&stub) };
	let (app, _jar) = build_app(opts, None);

	let outcome = initialize(&app).await.expect("init");

	assert!(matches!(outcome.experience, ExperienceOutcome::Empty(EmptyReason::NoRegion)));
	assert!(stub.experience_queries().is_empty());
	assert_eq!(*stub.state.geolocation_hits.lock(), 0);
}

#[tokio::test]
async fn test_served_notice_id_is_attached_to_save() {
	let stub = start_stub(StubConfig::with_experience(overlay_experience(vec![
		notice("ads", "opt_out", "opt_in", false),
		notice("essential", "notice_only", "acknowledge", false),
	])))
	.await;
	let (app, _jar) = build_app(api_options(&stub), None);
	let outcome = initialize(&app).await.expect("init");
	let mut rx = app.subscribe();

	let served = show_surface(&app, ServingComponent::Banner).await;
	assert_eq!(served, ServedOutcome::Recorded("ser_1".into()));
	assert_eq!(app.served_notice_history_id().as_deref(), Some("ser_1"));
	assert_eq!(rx.recv().await.expect("event").typ, fides_core::FidesEventType::FidesUIShown);

	let body = &stub.served()[0];
	assert_eq!(body["serving_component"], "banner");
	assert_eq!(body["acknowledge_mode"], false);
	assert_eq!(body["privacy_notice_history_ids"], serde_json::json!(["pnh-ads", "pnh-essential"]));
	assert_eq!(body["browser_identity"]["fides_user_device_id"], app.record().device_id());

	let report = save_current(
		&app,
		&outcome.preferences,
		ConsentMethod::Accept,
		SaveOptions { serving_component: Some(ServingComponent::Banner), ..Default::default() },
	)
	.await
	.expect("save");
	assert_eq!(report.remote, SyncOutcome::Synced);

	let saved = &stub.preferences()[0];
	assert_eq!(saved["served_notice_history_id"], "ser_1");
	assert_eq!(saved["privacy_experience_id"], "pri-exp-1");
	assert_eq!(saved["user_geography"], "us_ca");
	assert_eq!(saved["method"], "accept");
	assert_eq!(saved["preferences"][1]["preference"], "acknowledge");
}

#[tokio::test]
async fn test_served_single_object_response() {
	let stub = start_stub(StubConfig {
		served_body: serde_json::json!({ "served_notice_history_id": "ser_single" }),
		..StubConfig::with_experience(overlay_experience(vec![notice(
			"ads", "opt_out", "opt_in", false,
		)]))
	})
	.await;
	let (app, _jar) = build_app(api_options(&stub), None);
	initialize(&app).await.expect("init");

	assert_eq!(
		show_surface(&app, ServingComponent::Overlay).await,
		ServedOutcome::Recorded("ser_single".into())
	);
}

#[tokio::test]
async fn test_notices_served_can_be_disabled() {
	let stub = start_stub(StubConfig::with_experience(overlay_experience(vec![notice(
		"ads", "opt_out", "opt_in", false,
	)])))
	.await;
	let opts = FidesOptions { fides_disable_notices_served_api: true, ..api_options(&stub) };
	let (app, _jar) = build_app(opts, None);
	let outcome = initialize(&app).await.expect("init");

	assert_eq!(show_surface(&app, ServingComponent::Banner).await, ServedOutcome::Disabled);
	let report = save_current(&app, &outcome.preferences, ConsentMethod::Accept, SaveOptions::default())
		.await
		.expect("save");

	assert_eq!(report.remote, SyncOutcome::Synced);
	assert!(stub.served().is_empty());
	assert!(stub.preferences()[0].get("served_notice_history_id").is_none());
}

#[tokio::test]
async fn test_save_api_disabled() {
	let stub = start_stub(StubConfig::with_experience(overlay_experience(vec![notice(
		"ads", "opt_out", "opt_in", false,
	)])))
	.await;
	let opts = FidesOptions { fides_disable_save_api: true, ..api_options(&stub) };
	let (app, _jar) = build_app(opts, None);
	let outcome = initialize(&app).await.expect("init");

	let report = save_current(&app, &outcome.preferences, ConsentMethod::Accept, SaveOptions::default())
		.await
		.expect("save");

	assert_eq!(report.remote, SyncOutcome::Disabled);
	assert_eq!(show_surface(&app, ServingComponent::Banner).await, ServedOutcome::Disabled);
	assert!(stub.preferences().is_empty());
}

#[derive(Debug)]
struct FixedFetcher(Option<serde_json::Value>);

#[async_trait]
impl ExperienceFetcher for FixedFetcher {
	async fn fetch_experience(
		&self,
		_region: &str,
		_fides_user_device_id: &str,
	) -> FdResult<Option<PrivacyExperience>> {
		match &self.0 {
			Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
			None => Err(Error::Integration("backend unavailable".into())),
		}
	}
}

#[derive(Debug, Default)]
struct RecordingSaver {
	calls: Mutex<Vec<(ConsentMethod, ConsentRecord)>>,
}

#[async_trait]
impl PreferenceSaver for RecordingSaver {
	async fn save_preferences(
		&self,
		method: ConsentMethod,
		record: &ConsentRecord,
		_experience: &PrivacyExperience,
	) -> FdResult<()> {
		self.calls.lock().push((method, record.clone()));
		Ok(())
	}
}

fn app_with_integrations(
	fetcher: FixedFetcher,
	saver: Arc<RecordingSaver>,
) -> fides_core::App {
	init_tracing();
	let opts = FidesOptions { region: Some("fr".into()), ..Default::default() };
	FidesState::new(
		opts,
		Adapters {
			cookie_adapter: Some(Arc::new(MemoryCookieJar::new(TEST_HOST))),
			experience_fetcher: Some(Arc::new(fetcher)),
			preference_saver: Some(saver),
			..Default::default()
		},
	)
	.expect("app")
}

#[tokio::test]
async fn test_custom_fetcher_and_saver() {
	let saver = Arc::new(RecordingSaver::default());
	let app = app_with_integrations(
		FixedFetcher(Some(overlay_experience(vec![notice("ads", "opt_out", "opt_in", false)]))),
		saver.clone(),
	);

	let outcome = initialize(&app).await.expect("init");
	assert!(outcome.experience.experience().is_some());

	let report = save_current(&app, &outcome.preferences, ConsentMethod::Api, SaveOptions::default())
		.await
		.expect("save");
	assert_eq!(report.remote, SyncOutcome::Synced);

	let calls = saver.calls.lock();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].0, ConsentMethod::Api);
	assert_eq!(calls[0].1.consent.get("ads"), Some(&true));
}

#[tokio::test]
async fn test_failing_fetcher_degrades() {
	let app = app_with_integrations(FixedFetcher(None), Arc::new(RecordingSaver::default()));
	let outcome = initialize(&app).await.expect("init");
	assert!(matches!(outcome.experience, ExperienceOutcome::Empty(EmptyReason::Integration)));
}

// vim: ts=4
