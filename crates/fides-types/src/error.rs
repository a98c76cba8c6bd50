//! Error type shared by the engine and its adapters

pub type FdResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	Parse,
	ValidationError(String),
	/// No durable storage in this execution context
	StorageUnavailable,
	/// Transport-level failure (connection refused, TLS, broken body)
	Network(String),
	/// Non-success HTTP status
	Status(u16),
	/// A caller-supplied fetch/save function failed
	Integration(String),
	InitInProgress,
	AlreadyInitialized,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("JSON error: {}", err);
		Self::Parse
	}
}

impl From<url::ParseError> for Error {
	fn from(err: url::ParseError) -> Self {
		Self::ValidationError(format!("invalid URL: {}", err))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Parse => write!(f, "parse error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::StorageUnavailable => write!(f, "no durable storage available"),
			Error::Network(msg) => write!(f, "network error: {}", msg),
			Error::Status(status) => write!(f, "HTTP status {}", status),
			Error::Integration(msg) => write!(f, "integration error: {}", msg),
			Error::InitInProgress => write!(f, "initialization already in progress"),
			Error::AlreadyInitialized => write!(f, "already initialized"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

// vim: ts=4
