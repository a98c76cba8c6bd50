//! Engine state: one context per page load

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::broadcast;

use crate::events::{EventBus, EventExtra, FidesEvent, FidesEventType};
use crate::options::FidesOptions;
use crate::prelude::*;
use crate::reconcile::ConsentPreference;
use crate::request::FidesApi;
use crate::signal::{self, ConsentContext};
use crate::store::ConsentStore;
use fides_types::api_adapter::{ExperienceFetcher, PreferenceSaver};
use fides_types::consent::ConsentRecord;
use fides_types::cookie_adapter::CookieAdapter;
use fides_types::experience::PrivacyExperience;
use fides_types::signal::{PageSignals, SignalSource};
use fides_types::types::ServingComponent;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const INIT_IDLE: u8 = 0;
const INIT_IN_FLIGHT: u8 = 1;
const INIT_DONE: u8 = 2;

/// Host integrations. Everything is optional: without a cookie adapter the
/// engine persists nothing, without a signal source no signal is present.
#[derive(Debug, Default)]
pub struct Adapters {
	pub cookie_adapter: Option<Arc<dyn CookieAdapter>>,
	pub signal_source: Option<Arc<dyn SignalSource>>,
	pub experience_fetcher: Option<Arc<dyn ExperienceFetcher>>,
	pub preference_saver: Option<Arc<dyn PreferenceSaver>>,
}

pub struct FidesState {
	pub store: ConsentStore,
	pub signal_source: Arc<dyn SignalSource>,
	pub experience_fetcher: Option<Arc<dyn ExperienceFetcher>>,
	pub preference_saver: Option<Arc<dyn PreferenceSaver>>,
	pub api: FidesApi,
	pub events: EventBus,

	opts: RwLock<FidesOptions>,
	record: RwLock<ConsentRecord>,
	region: RwLock<Option<String>>,
	experience: RwLock<Option<Arc<PrivacyExperience>>>,
	preferences: RwLock<Vec<ConsentPreference>>,
	served_notice_history_id: RwLock<Option<String>>,
	init_state: AtomicU8,
}

pub type App = Arc<FidesState>;

/// Holds the in-flight init state; an abandoned initialization can be retried
pub(crate) struct InitGuard<'a> {
	state: &'a AtomicU8,
	finished: bool,
}

impl InitGuard<'_> {
	pub(crate) fn finish(mut self) {
		self.state.store(INIT_DONE, Ordering::Release);
		self.finished = true;
	}
}

impl Drop for InitGuard<'_> {
	fn drop(&mut self) {
		if !self.finished {
			warn!("Initialization abandoned, resetting the init guard");
			self.state.store(INIT_IDLE, Ordering::Release);
		}
	}
}

/// Read-only view returned by [`FidesState::get_state`]
#[derive(Debug, Clone)]
pub struct StateSnapshot {
	pub record: ConsentRecord,
	pub region: Option<String>,
	pub experience: Option<Arc<PrivacyExperience>>,
	pub preferences: Vec<ConsentPreference>,
	pub context: ConsentContext,
	pub initialized: bool,
}

impl std::fmt::Debug for FidesState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FidesState")
			.field("store", &self.store)
			.field("region", &*self.region.read())
			.field("init_state", &self.init_state.load(Ordering::Acquire))
			.finish_non_exhaustive()
	}
}

impl FidesState {
	pub fn new(opts: FidesOptions, adapters: Adapters) -> FdResult<App> {
		opts.validate()?;

		let record = ConsentRecord::new_default(&opts.consent_defaults);
		let signal_source = adapters
			.signal_source
			.unwrap_or_else(|| Arc::new(PageSignals::default()) as Arc<dyn SignalSource>);

		info!(version = VERSION, "Fides engine created");
		Ok(Arc::new(Self {
			store: ConsentStore::new(adapters.cookie_adapter),
			signal_source,
			experience_fetcher: adapters.experience_fetcher,
			preference_saver: adapters.preference_saver,
			api: FidesApi::new(),
			events: EventBus::new(opts.event_buffer),
			opts: RwLock::new(opts),
			record: RwLock::new(record),
			region: RwLock::new(None),
			experience: RwLock::new(None),
			preferences: RwLock::new(Vec::new()),
			served_notice_history_id: RwLock::new(None),
			init_state: AtomicU8::new(INIT_IDLE),
		}))
	}

	/// Snapshot of the current options (query overrides included once initialized)
	pub fn options(&self) -> FidesOptions {
		self.opts.read().clone()
	}

	pub(crate) fn options_mut(&self) -> parking_lot::RwLockWriteGuard<'_, FidesOptions> {
		self.opts.write()
	}

	pub fn record(&self) -> ConsentRecord {
		self.record.read().clone()
	}

	/// Write access to the in-memory record. Never hold it across an await.
	pub(crate) fn record_mut(&self) -> parking_lot::RwLockWriteGuard<'_, ConsentRecord> {
		self.record.write()
	}

	pub fn region(&self) -> Option<String> {
		self.region.read().clone()
	}

	pub(crate) fn set_region(&self, region: Option<String>) {
		*self.region.write() = region;
	}

	/// The experience resolved for this page load
	pub fn experience(&self) -> Option<Arc<PrivacyExperience>> {
		self.experience.read().clone()
	}

	pub(crate) fn set_experience(&self, experience: Arc<PrivacyExperience>) {
		*self.experience.write() = Some(experience);
	}

	pub fn preferences(&self) -> Vec<ConsentPreference> {
		self.preferences.read().clone()
	}

	pub(crate) fn set_preferences(&self, preferences: Vec<ConsentPreference>) {
		*self.preferences.write() = preferences;
	}

	pub fn served_notice_history_id(&self) -> Option<String> {
		self.served_notice_history_id.read().clone()
	}

	pub(crate) fn set_served_notice_history_id(&self, id: String) {
		*self.served_notice_history_id.write() = Some(id);
	}

	/// Current signal context, recomputed on every call
	pub fn context(&self) -> ConsentContext {
		signal::resolve(&self.opts.read(), self.signal_source.as_ref())
	}

	pub fn is_initialized(&self) -> bool {
		self.init_state.load(Ordering::Acquire) == INIT_DONE
	}

	/// Moves the init guard from idle to in-flight. Dropping the returned
	/// guard before [`InitGuard::finish`] resets it to idle.
	pub(crate) fn begin_init(&self) -> FdResult<InitGuard<'_>> {
		match self.init_state.compare_exchange(
			INIT_IDLE,
			INIT_IN_FLIGHT,
			Ordering::AcqRel,
			Ordering::Acquire,
		) {
			Ok(_) => Ok(InitGuard { state: &self.init_state, finished: false }),
			Err(INIT_IN_FLIGHT) => Err(Error::InitInProgress),
			Err(_) => Err(Error::AlreadyInitialized),
		}
	}

	pub fn get_state(&self) -> StateSnapshot {
		StateSnapshot {
			record: self.record(),
			region: self.region(),
			experience: self.experience(),
			preferences: self.preferences(),
			context: self.context(),
			initialized: self.is_initialized(),
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<FidesEvent> {
		self.events.subscribe()
	}

	/// Emits an event carrying the current record
	pub fn emit(&self, typ: FidesEventType, extra: EventExtra) -> usize {
		let record = self.record();
		self.events.emit(typ, &record, extra)
	}

	/// The visitor changed a toggle without saving
	pub fn selection_changed(
		&self,
		serving_component: ServingComponent,
		preferences: Vec<ConsentPreference>,
	) -> usize {
		self.emit(
			FidesEventType::FidesUIChanged,
			EventExtra {
				serving_component: Some(serving_component),
				preferences,
				..Default::default()
			},
		)
	}

	/// The modal was closed, `saved` tells whether it closed through a save
	pub fn close_modal(&self, serving_component: ServingComponent, saved: bool) -> usize {
		self.emit(
			FidesEventType::FidesModalClosed,
			EventExtra { saved: Some(saved), ..EventExtra::component(serving_component) },
		)
	}
}


// vim: ts=4
