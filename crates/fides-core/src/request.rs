//! HTTP client for the consent API and the geolocation API

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::prelude::*;
use fides_types::api_adapter::{
	Geolocation, NoticesServedRequest, NoticesServedResponse, PrivacyPreferencesRequest,
};
use fides_types::experience::PrivacyExperience;

/// Fixed query of the experience request
#[derive(Debug, Serialize)]
struct ExperienceQuery<'a> {
	show_disabled: bool,
	region: &'a str,
	component: &'a str,
	has_notices: bool,
	has_config: bool,
	systems_applicable: bool,
	include_gvl: bool,
	include_meta: bool,
	fides_user_device_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct FidesApi {
	client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl Default for FidesApi {
	fn default() -> Self {
		Self::new()
	}
}

impl FidesApi {
	pub fn new() -> Self {
		let connector = HttpsConnectorBuilder::new()
			.with_webpki_roots()
			.https_or_http()
			.enable_http1()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);
		Self { client }
	}

	/// Sends a request and returns the body of a successful response
	async fn send(&self, method: hyper::Method, uri: &str, body: Option<Vec<u8>>) -> FdResult<Bytes> {
		let mut builder = hyper::Request::builder()
			.method(method.clone())
			.uri(uri)
			.header(hyper::header::ACCEPT, "application/json");
		if body.is_some() {
			builder = builder.header(hyper::header::CONTENT_TYPE, "application/json");
		}
		let request = builder
			.body(Full::new(Bytes::from(body.unwrap_or_default())))
			.map_err(|e| Error::ValidationError(format!("invalid request: {}", e)))?;

		let response = self.client.request(request).await.map_err(|e| {
			warn!(%method, uri = %uri, error = %e, "Request failed");
			Error::Network(e.to_string())
		})?;

		let status = response.status();
		let bytes = response
			.into_body()
			.collect()
			.await
			.map_err(|e| Error::Network(e.to_string()))?
			.to_bytes();

		if !status.is_success() {
			warn!(%method, uri = %uri, status = status.as_u16(), "Request returned an error status");
			return Err(Error::Status(status.as_u16()));
		}
		Ok(bytes)
	}

	async fn get_json<Res: DeserializeOwned>(&self, uri: &str) -> FdResult<Res> {
		let bytes = self.send(hyper::Method::GET, uri, None).await?;
		serde_json::from_slice(&bytes).map_err(|e| {
			warn!(uri = %uri, error = %e, "Failed to deserialize response");
			Error::Parse
		})
	}

	async fn patch_json(&self, uri: &str, data: &impl Serialize) -> FdResult<Bytes> {
		let body = serde_json::to_vec(data)?;
		self.send(hyper::Method::PATCH, uri, Some(body)).await
	}

	/// `GET {api}/privacy-experience` for a region.
	///
	/// Accepts a page (`{"items": [...]}`, first item used) or a single
	/// experience. Returns `Ok(None)` for an empty page and `Error::Parse` for
	/// any other body.
	pub async fn fetch_experience(
		&self,
		api_url: &str,
		region: &str,
		fides_user_device_id: &str,
	) -> FdResult<Option<PrivacyExperience>> {
		let query = serde_urlencoded::to_string(ExperienceQuery {
			show_disabled: false,
			region,
			component: "overlay",
			has_notices: true,
			has_config: true,
			systems_applicable: true,
			include_gvl: true,
			include_meta: true,
			fides_user_device_id,
		})
		.map_err(|e| Error::Internal(e.to_string()))?;
		let uri = format!("{}/privacy-experience?{}", api_url.trim_end_matches('/'), query);

		debug!(region = %region, "Fetching privacy experience");
		let body: serde_json::Value = self.get_json(&uri).await?;
		parse_experience_body(body)
	}

	/// `PATCH {api}/privacy-preferences`
	pub async fn patch_privacy_preferences(
		&self,
		api_url: &str,
		request: &PrivacyPreferencesRequest,
	) -> FdResult<()> {
		let uri = format!("{}/privacy-preferences", api_url.trim_end_matches('/'));
		self.patch_json(&uri, request).await?;
		Ok(())
	}

	/// `PATCH {api}/notices-served`
	pub async fn patch_notices_served(
		&self,
		api_url: &str,
		request: &NoticesServedRequest,
	) -> FdResult<NoticesServedResponse> {
		let uri = format!("{}/notices-served", api_url.trim_end_matches('/'));
		let bytes = self.patch_json(&uri, request).await?;
		Ok(serde_json::from_slice(&bytes)?)
	}

	pub async fn fetch_geolocation(&self, geolocation_api_url: &str) -> FdResult<Geolocation> {
		self.get_json(geolocation_api_url).await
	}
}

fn parse_experience_body(body: serde_json::Value) -> FdResult<Option<PrivacyExperience>> {
	let item = match body {
		serde_json::Value::Object(mut obj) if obj.contains_key("items") => {
			match obj.remove("items") {
				Some(serde_json::Value::Array(items)) => match items.into_iter().next() {
					Some(item) => item,
					None => return Ok(None),
				},
				_ => return Err(Error::Parse),
			}
		}
		other => other,
	};

	serde_json::from_value(item).map(Some).map_err(|e| {
		warn!(error = %e, "Experience does not match a known component");
		Error::Parse
	})
}


// vim: ts=4
