pub use crate::error::{Error, FdResult};
pub use crate::utils;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
