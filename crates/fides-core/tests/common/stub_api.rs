//! Stub consent API
//!
//! Serves the experience, preferences, notices-served and geolocation
//! endpoints from canned responses and records every request it receives.

use axum::Router;
use axum::extract::{Json, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StubConfig {
	pub experience_status: u16,
	/// Raw body, so malformed JSON can be served
	pub experience_body: String,
	pub experience_delay: Duration,
	pub preferences_status: u16,
	pub served_body: Value,
	pub geolocation: Value,
}

impl Default for StubConfig {
	fn default() -> Self {
		Self {
			experience_status: 200,
			experience_body: json!({ "items": [] }).to_string(),
			experience_delay: Duration::ZERO,
			preferences_status: 200,
			served_body: json!([{ "served_notice_history_id": "ser_1" }]),
			geolocation: json!({ "country": "US", "location": "US-CA", "region": "CA" }),
		}
	}
}

impl StubConfig {
	pub fn with_experience(experience: Value) -> Self {
		Self { experience_body: experience.to_string(), ..Default::default() }
	}
}

#[derive(Debug, Default)]
pub struct StubState {
	pub config: Mutex<StubConfig>,
	pub experience_queries: Mutex<Vec<HashMap<String, String>>>,
	pub preferences: Mutex<Vec<Value>>,
	pub served: Mutex<Vec<Value>>,
	pub geolocation_hits: Mutex<usize>,
}

pub struct StubApi {
	pub base: String,
	pub state: Arc<StubState>,
}

impl StubApi {
	pub fn api_url(&self) -> String {
		format!("{}/api/v1", self.base)
	}

	pub fn geolocation_url(&self) -> String {
		format!("{}/geolocation", self.base)
	}

	pub fn preferences(&self) -> Vec<Value> {
		self.state.preferences.lock().clone()
	}

	pub fn served(&self) -> Vec<Value> {
		self.state.served.lock().clone()
	}

	pub fn experience_queries(&self) -> Vec<HashMap<String, String>> {
		self.state.experience_queries.lock().clone()
	}
}

fn json_response(status: u16, body: String) -> Response {
	let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	(status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn get_experience(
	State(state): State<Arc<StubState>>,
	Query(query): Query<HashMap<String, String>>,
) -> Response {
	state.experience_queries.lock().push(query);
	let (status, body, delay) = {
		let config = state.config.lock();
		(config.experience_status, config.experience_body.clone(), config.experience_delay)
	};
	if !delay.is_zero() {
		tokio::time::sleep(delay).await;
	}
	json_response(status, body)
}

async fn patch_preferences(
	State(state): State<Arc<StubState>>,
	Json(body): Json<Value>,
) -> Response {
	state.preferences.lock().push(body);
	let status = state.config.lock().preferences_status;
	json_response(status, json!({ "ok": status < 400 }).to_string())
}

async fn patch_served(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
	state.served.lock().push(body);
	let response = state.config.lock().served_body.clone();
	json_response(200, response.to_string())
}

async fn get_geolocation(State(state): State<Arc<StubState>>) -> Response {
	*state.geolocation_hits.lock() += 1;
	let body = state.config.lock().geolocation.clone();
	json_response(200, body.to_string())
}

/// Starts the stub on `127.0.0.1:0`
pub async fn start_stub(config: StubConfig) -> StubApi {
	let state = Arc::new(StubState { config: Mutex::new(config), ..Default::default() });
	let router = Router::new()
		.route("/api/v1/privacy-experience", get(get_experience))
		.route("/api/v1/privacy-preferences", patch(patch_preferences))
		.route("/api/v1/notices-served", patch(patch_served))
		.route("/geolocation", get(get_geolocation))
		.with_state(state.clone());

	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub api");
	let addr = listener.local_addr().expect("stub api address");
	tokio::spawn(async move {
		let _ = axum::serve(listener, router).await;
	});

	StubApi { base: format!("http://{}", addr), state }
}

// vim: ts=4
