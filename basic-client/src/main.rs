//! Runs the consent engine for one page load from the command line.
//!
//! Usage: `fides-basic-client [accept|reject]`
//!
//! Configuration comes from `FIDES_CONFIG` (a JSON options file), then the
//! `FIDES_API_URL`, `FIDES_REGION`, `FIDES_DATA_DIR`, `FIDES_HOST`,
//! `FIDES_PAGE_URL` and `FIDES_GPC` environment variables. Cookies are kept in
//! `FIDES_DATA_DIR`, so consecutive runs behave like consecutive page loads.

use std::{env, path, sync::Arc};

use fides_cookie_adapter_fs::CookieAdapterFs;
use fides_core::{
	Adapters, ConsentPreference, FidesOptions, FidesState, SaveOptions, initialize, save_current,
};
use fides_types::error::{Error, FdResult};
use fides_types::signal::PageSignals;
use fides_types::types::{ConsentMechanism, ConsentMethod, UserConsentPreference};
use tracing::{info, warn};
use url::Url;

pub struct Config {
	pub config_file: Option<path::PathBuf>,
	pub data_dir: path::PathBuf,
	pub host: String,
	pub page_url: Option<Url>,
	pub gpc: Option<bool>,
}

impl Config {
	fn from_env() -> FdResult<Self> {
		let page_url = env::var("FIDES_PAGE_URL").ok().map(|url| Url::parse(&url)).transpose()?;
		let host = env::var("FIDES_HOST").ok().or_else(|| {
			page_url.as_ref().and_then(|url| url.host_str()).map(str::to_string)
		});
		let gpc = match env::var("FIDES_GPC").ok().as_deref() {
			None | Some("") => None,
			Some("true" | "1") => Some(true),
			Some("false" | "0") => Some(false),
			Some(other) => {
				return Err(Error::ValidationError(format!("FIDES_GPC: unexpected '{}'", other)));
			}
		};

		Ok(Config {
			config_file: env::var("FIDES_CONFIG").ok().map(path::PathBuf::from),
			data_dir: path::PathBuf::from(
				env::var("FIDES_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
			),
			host: host.unwrap_or_else(|| "localhost".to_string()),
			page_url,
			gpc,
		})
	}
}

async fn load_options(config: &Config) -> FdResult<FidesOptions> {
	let mut opts = match &config.config_file {
		Some(file) => FidesOptions::from_json(&tokio::fs::read_to_string(file).await?)?,
		None => FidesOptions::default(),
	};
	if let Ok(api_url) = env::var("FIDES_API_URL") {
		opts.fides_api_url = api_url;
	}
	if let Ok(region) = env::var("FIDES_REGION") {
		opts.region = Some(region);
	}
	opts.validate()?;
	Ok(opts)
}

/// Accept-all or reject-all over the reconciled preferences
fn decide(preferences: &[ConsentPreference], accept: bool) -> Vec<ConsentPreference> {
	preferences
		.iter()
		.map(|pref| {
			let preference = match (pref.notice.consent_mechanism, accept) {
				(ConsentMechanism::NoticeOnly, _) => UserConsentPreference::Acknowledge,
				(_, true) => UserConsentPreference::OptIn,
				(_, false) => UserConsentPreference::OptOut,
			};
			ConsentPreference { preference, ..pref.clone() }
		})
		.collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> FdResult<()> {
	let config = Config::from_env()?;
	let opts = load_options(&config).await?;

	let default_level = if opts.debug { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
		)
		.with_target(false)
		.init();

	let action = match env::args().nth(1).as_deref() {
		None => None,
		Some("accept") => Some(ConsentMethod::Accept),
		Some("reject") => Some(ConsentMethod::Reject),
		Some(other) => {
			return Err(Error::ValidationError(format!(
				"unknown action '{}', expected accept or reject",
				other
			)));
		}
	};

	let cookie_adapter =
		CookieAdapterFs::new(config.data_dir.clone().into_boxed_path(), &config.host).await?;
	let app = FidesState::new(
		opts,
		Adapters {
			cookie_adapter: Some(Arc::new(cookie_adapter)),
			signal_source: Some(Arc::new(PageSignals::new(config.gpc, config.page_url.clone()))),
			..Default::default()
		},
	)?;

	let outcome = initialize(&app).await?;
	info!(
		region = ?outcome.region,
		experience = ?outcome.experience.experience().map(|e| e.id.clone()),
		resurface = outcome.resurface,
		show_banner = outcome.show_banner,
		"Page load resolved"
	);
	if let Err(reason) = &outcome.render {
		warn!(reason = %reason, "No consent surface would be rendered");
	}
	for pref in &outcome.preferences {
		info!(
			notice = %pref.notice.notice_key,
			preference = %pref.preference,
			gpc = ?pref.gpc_status,
			"Preference"
		);
	}

	if let Some(method) = action {
		let decisions = decide(&outcome.preferences, method == ConsentMethod::Accept);
		let report = save_current(&app, &decisions, method, SaveOptions::default()).await?;
		info!(
			persisted = ?report.persisted,
			remote = ?report.remote,
			cleared = ?report.cleared_cookies,
			"Consent saved"
		);
	}

	let record = serde_json::to_string_pretty(&app.get_state().record)?;
	println!("{}", record);
	Ok(())
}


// vim: ts=4
