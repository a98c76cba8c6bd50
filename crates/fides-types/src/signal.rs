//! Source of ambient browser signals for the current page load

use std::fmt::Debug;
use url::Url;

/// Injected view of the host page: the browser-reported global privacy
/// control flag and the page URL (for query-string overrides).
pub trait SignalSource: Debug + Send + Sync {
	/// `navigator.globalPrivacyControl` or equivalent, if the host reports one
	fn global_privacy_control(&self) -> Option<bool>;

	fn page_url(&self) -> Option<&Url>;
}

/// A fixed set of signals, for hosts that know them up front and for tests
#[derive(Debug, Clone, Default)]
pub struct PageSignals {
	pub global_privacy_control: Option<bool>,
	pub url: Option<Url>,
}

impl PageSignals {
	pub fn new(global_privacy_control: Option<bool>, url: Option<Url>) -> Self {
		Self { global_privacy_control, url }
	}
}

impl SignalSource for PageSignals {
	fn global_privacy_control(&self) -> Option<bool> {
		self.global_privacy_control
	}

	fn page_url(&self) -> Option<&Url> {
		self.url.as_ref()
	}
}

// vim: ts=4
