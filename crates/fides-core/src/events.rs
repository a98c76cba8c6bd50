//! Lifecycle events
//!
//! Typed publish/subscribe over a broadcast channel. Emitting never blocks
//! and never fails: with no subscribers the event is simply dropped, and a
//! subscriber that falls behind loses the oldest events.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::options::DEFAULT_EVENT_BUFFER;
use crate::prelude::*;
use crate::reconcile::ConsentPreference;
use fides_types::consent::ConsentRecord;
use fides_types::types::{ConsentMethod, ServingComponent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FidesEventType {
	/// Initialization finished, with or without an experience
	FidesInitialized,
	/// A save changed the consent record
	FidesUpdated,
	FidesUIShown,
	/// The visitor toggled a preference without saving yet
	FidesUIChanged,
	FidesModalClosed,
}

impl std::fmt::Display for FidesEventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			FidesEventType::FidesInitialized => "FidesInitialized",
			FidesEventType::FidesUpdated => "FidesUpdated",
			FidesEventType::FidesUIShown => "FidesUIShown",
			FidesEventType::FidesUIChanged => "FidesUIChanged",
			FidesEventType::FidesModalClosed => "FidesModalClosed",
		};
		write!(f, "{}", s)
	}
}

/// Event details beyond the record snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventExtra {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub serving_component: Option<ServingComponent>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub consent_method: Option<ConsentMethod>,
	/// Whether the record was persisted locally
	#[serde(skip_serializing_if = "Option::is_none")]
	pub saved: Option<bool>,
	/// Pending selection, for `FidesUIChanged`
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub preferences: Vec<ConsentPreference>,
}

impl EventExtra {
	pub fn component(serving_component: ServingComponent) -> Self {
		Self { serving_component: Some(serving_component), ..Default::default() }
	}

	pub fn method(consent_method: ConsentMethod) -> Self {
		Self { consent_method: Some(consent_method), ..Default::default() }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct FidesEvent {
	#[serde(rename = "type")]
	pub typ: FidesEventType,
	pub record: ConsentRecord,
	pub extra: EventExtra,
}

#[derive(Debug)]
pub struct EventBus {
	sender: broadcast::Sender<FidesEvent>,
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_EVENT_BUFFER)
	}
}

impl EventBus {
	/// `buffer` is the number of events a slow subscriber may lag behind
	pub fn new(buffer: usize) -> Self {
		let (sender, _) = broadcast::channel(buffer.max(1));
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<FidesEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event, returns the number of subscribers it reached
	pub fn emit(&self, typ: FidesEventType, record: &ConsentRecord, extra: EventExtra) -> usize {
		let event = FidesEvent { typ, record: record.clone(), extra };
		match self.sender.send(event) {
			Ok(count) => {
				debug!(event = %typ, receivers = count, "Event emitted");
				count
			}
			Err(_) => {
				debug!(event = %typ, "Event emitted without subscribers");
				0
			}
		}
	}
}


// vim: ts=4
