//! The field-selection tree a caller (GraphQL resolver, REST handler, test
//! harness) hands to the [`crate::service::Service`] to describe which
//! fields it actually needs populated. Kept as plain data so the planner
//! never has to know anything about its caller's protocol.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseFields {
	pub request_id: bool,
	pub proto: bool,
	pub status_code: bool,
	pub status_reason: bool,
	pub body: bool,
	pub timestamp: bool,
	pub headers: bool,
}

impl ResponseFields {
	pub fn all() -> Self {
		Self {
			request_id: true,
			proto: true,
			status_code: true,
			status_reason: true,
			body: true,
			timestamp: true,
			headers: true,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
	pub proto: bool,
	pub url: bool,
	pub method: bool,
	pub body: bool,
	pub timestamp: bool,
	pub headers: bool,
	pub response: Option<ResponseFields>,
}

impl FieldSet {
	/// Every request field, every response field, both header lists.
	pub fn all() -> Self {
		Self {
			proto: true,
			url: true,
			method: true,
			body: true,
			timestamp: true,
			headers: true,
			response: Some(ResponseFields::all()),
		}
	}

	/// No fields beyond the id that is always populated.
	pub fn none() -> Self {
		Self::default()
	}

	pub fn union(mut self, other: &FieldSet) -> Self {
		self.proto |= other.proto;
		self.url |= other.url;
		self.method |= other.method;
		self.body |= other.body;
		self.timestamp |= other.timestamp;
		self.headers |= other.headers;
		self.response = match (self.response, &other.response) {
			(Some(mut a), Some(b)) => {
				a.request_id |= b.request_id;
				a.proto |= b.proto;
				a.status_code |= b.status_code;
				a.status_reason |= b.status_reason;
				a.body |= b.body;
				a.timestamp |= b.timestamp;
				a.headers |= b.headers;
				Some(a)
			},
			(a, b) => a.or_else(|| b.clone()),
		};
		self
	}
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
