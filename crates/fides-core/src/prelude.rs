pub use crate::app::{App, FidesState};
pub use fides_types::error::{Error, FdResult};
pub use fides_types::utils;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
