//! Consent resolution and synchronization engine.
//!
//! Decides, for an anonymous visitor, what their current consent state is,
//! reconciles it against the privacy experience the server declares for their
//! region, applies the global privacy control signal, and keeps local storage
//! and the consent API in sync. The host is reached only through the adapter
//! traits in `fides-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod events;
pub mod experience;
pub mod init;
pub mod memory_jar;
pub mod options;
pub mod prelude;
pub mod reconcile;
pub mod request;
pub mod save;
pub mod served;
pub mod signal;
pub mod store;

// Re-export commonly used types
pub use app::{Adapters, App, FidesState, StateSnapshot};
pub use events::{EventBus, EventExtra, FidesEvent, FidesEventType};
pub use experience::{EmptyReason, ExperienceOutcome, NotRenderable};
pub use init::{InitOutcome, initialize};
pub use memory_jar::MemoryCookieJar;
pub use options::FidesOptions;
pub use reconcile::ConsentPreference;
pub use save::{SaveOptions, SaveReport, SyncOutcome, save, save_current};
pub use served::{ServedOutcome, notices_served, show_surface};
pub use signal::ConsentContext;

// vim: ts=4
