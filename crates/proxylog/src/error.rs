/// Error taxonomy for the request logging subsystem. Every public operation
/// in this crate returns one of these variants; nothing is swallowed.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// The requested record does not exist. Not an exceptional condition:
	/// API layers are expected to map this to a null result.
	#[error("not found")]
	NotFound,

	/// A textual ID (see [`crate::service::Service::resolve_id`]) failed to parse.
	#[error("invalid id: {0}")]
	InvalidId(String),

	/// A request's stored method does not match a recognized HTTP method token.
	/// Raised only when projecting a record out to a caller, never at ingestion.
	#[error("invalid method: {0}")]
	InvalidMethod(String),

	/// The backing store failed. Wraps the underlying cause together with the
	/// name of the operation that triggered it.
	#[error("storage error during {operation}: {source}")]
	Storage {
		operation: &'static str,
		#[source]
		source: anyhow::Error,
	},

	/// The filter string could not be parsed.
	#[error("invalid filter: {0}")]
	FilterParse(String),

	/// A scope rule's regular expression failed to compile.
	#[error("invalid scope rule: {0}")]
	Scope(String),

	/// The operation's cancellation token fired before the work committed.
	#[error("operation cancelled")]
	Cancelled,
}

impl Error {
	pub(crate) fn storage(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
		Error::Storage {
			operation,
			source: source.into(),
		}
	}
}
