//! Common test utilities and helpers
//!
//! Shared infrastructure for the integration tests: a stub consent API served
//! by axum on a random local port, fixtures, and app builders.

#![allow(dead_code)]

pub mod fixtures;
pub mod stub_api;

pub use fixtures::*;
pub use stub_api::*;

use std::sync::Arc;

use fides_core::{Adapters, App, FidesOptions, FidesState, MemoryCookieJar};
use fides_types::signal::PageSignals;
use url::Url;

pub const TEST_HOST: &str = "www.example.com";

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Builds an app on a fresh in-memory cookie jar
pub fn build_app(opts: FidesOptions, gpc: Option<bool>) -> (App, Arc<MemoryCookieJar>) {
	build_app_with_jar(opts, gpc, None, Arc::new(MemoryCookieJar::new(TEST_HOST)))
}

pub fn build_app_with_jar(
	opts: FidesOptions,
	gpc: Option<bool>,
	page_url: Option<&str>,
	jar: Arc<MemoryCookieJar>,
) -> (App, Arc<MemoryCookieJar>) {
	init_tracing();
	let url = page_url.and_then(|url| Url::parse(url).ok());
	let app = FidesState::new(
		opts,
		Adapters {
			cookie_adapter: Some(jar.clone()),
			signal_source: Some(Arc::new(PageSignals::new(gpc, url))),
			..Default::default()
		},
	)
	.expect("valid options");
	(app, jar)
}

/// Options pointing at a running stub API
pub fn api_options(stub: &StubApi) -> FidesOptions {
	FidesOptions {
		fides_api_url: stub.api_url(),
		region: Some("us_ca".into()),
		..Default::default()
	}
}

// vim: ts=4
