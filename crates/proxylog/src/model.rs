use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::Error;

/// Opaque 64-bit id assigned by the store on insert. Stable for the life of
/// the record; never reused.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, serde::Serialize)]
pub struct RequestId(pub i64);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, serde::Serialize)]
pub struct ResponseId(pub i64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl fmt::Display for ResponseId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Default for RequestId {
	fn default() -> Self {
		RequestId(0)
	}
}

impl Default for ResponseId {
	fn default() -> Self {
		ResponseId(0)
	}
}

impl FromStr for RequestId {
	type Err = Error;

	/// The textual form chosen for the API boundary is the decimal rendering
	/// of the internal integer id; see the "opaque id" open question in
	/// DESIGN.md for why a UUID-shaped token was not used instead.
	fn from_str(s: &str) -> Result<Self, Error> {
		s.parse::<i64>()
			.map(RequestId)
			.map_err(|_| Error::InvalidId(s.to_string()))
	}
}

/// One of the recognized HTTP method tokens. Storage keeps the raw method
/// string observed on the wire; this type only matters at the API boundary,
/// where an unrecognized token is surfaced as [`Error::InvalidMethod`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize)]
pub enum Method {
	Get,
	Head,
	Post,
	Put,
	Delete,
	Connect,
	Options,
	Trace,
	Patch,
}

impl Method {
	pub fn as_str(&self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Head => "HEAD",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
			Method::Connect => "CONNECT",
			Method::Options => "OPTIONS",
			Method::Trace => "TRACE",
			Method::Patch => "PATCH",
		}
	}
}

impl TryFrom<&str> for Method {
	type Error = Error;

	fn try_from(s: &str) -> Result<Self, Error> {
		Ok(match s {
			"GET" => Method::Get,
			"HEAD" => Method::Head,
			"POST" => Method::Post,
			"PUT" => Method::Put,
			"DELETE" => Method::Delete,
			"CONNECT" => Method::Connect,
			"OPTIONS" => Method::Options,
			"TRACE" => Method::Trace,
			"PATCH" => Method::Patch,
			other => return Err(Error::InvalidMethod(other.to_string())),
		})
	}
}

/// A single header row. Belongs to exactly one of a Request or a Response;
/// which parent it belongs to is implicit in where it's stored (see
/// [`crate::repository::Repository`]), not carried on this type.
#[derive(Clone, Eq, PartialEq, Debug, serde::Serialize)]
pub struct Header {
	pub key: String,
	pub value: String,
}

/// An ordered multi-map of headers: the same key may repeat, and insertion
/// order within a key is preserved. Represented as a flat, ordered list
/// rather than a `HashMap<String, Vec<String>>` so that cross-key ordering
/// (as observed on the wire) round-trips too.
pub type Headers = Vec<Header>;

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Request {
	pub id: RequestId,
	pub method: String,
	pub url: String,
	pub proto: String,
	pub headers: Headers,
	pub body: Vec<u8>,
	pub timestamp: DateTime<Utc>,
	pub response: Option<Response>,
}

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Response {
	pub id: ResponseId,
	pub request_id: RequestId,
	pub proto: String,
	pub status_code: i64,
	pub status_reason: String,
	pub headers: Headers,
	pub body: Vec<u8>,
	pub timestamp: DateTime<Utc>,
}

/// Fields supplied by the proxy hot path when it first observes a request;
/// the store assigns `id` and stamps `timestamp`.
#[derive(Clone, Debug)]
pub struct NewRequest {
	pub method: String,
	pub url: String,
	pub proto: String,
	pub headers: Headers,
	pub body: Vec<u8>,
}

/// Fields supplied when the matching response arrives. `status_reason` is
/// derived by the repository from `status_line`, not supplied directly,
/// mirroring how the wire only gives you the whole status line.
#[derive(Clone, Debug)]
pub struct NewResponse {
	pub proto: String,
	pub status_code: i64,
	pub status_line: String,
	pub headers: Headers,
	pub body: Vec<u8>,
}

/// Derives the status reason phrase from an HTTP status line by stripping
/// the three-digit code and the single separating space, i.e. everything
/// from index 4 onward. Empty if the line is shorter than that.
pub fn status_reason_from_line(status_line: &str) -> String {
	status_line.get(4..).unwrap_or_default().to_string()
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
