//! Translates a [`FieldSet`] into the column set, join, and header
//! follow-up queries the repository needs to run. See §4.2 of the design
//! notes for the mapping table this mirrors.

use crate::projection::FieldSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryPlan {
	/// SQL select fragments for `requests`/`responses` columns, in the order
	/// they'll appear in the row. `req.id` (and `res.id`, if joined) are not
	/// included here — the repository always selects those first.
	pub request_columns: Vec<&'static str>,
	pub response_columns: Vec<&'static str>,
	pub join_response: bool,
	pub fetch_request_headers: bool,
	pub fetch_response_headers: bool,
}

impl QueryPlan {
	/// `true` only when the projection needs nothing but the always-present id.
	pub fn is_id_only(&self) -> bool {
		self.request_columns.is_empty() && !self.join_response && !self.fetch_request_headers
	}
}

pub fn plan(fields: &FieldSet) -> QueryPlan {
	let mut request_columns = Vec::new();
	if fields.proto {
		request_columns.push("req.proto AS req_proto");
	}
	if fields.url {
		request_columns.push("req.url");
	}
	if fields.method {
		request_columns.push("req.method");
	}
	if fields.body {
		request_columns.push("req.body AS req_body");
	}
	if fields.timestamp {
		request_columns.push("req.timestamp AS req_timestamp");
	}

	let mut response_columns = Vec::new();
	// `request.response` selected (regardless of nested fields) joins the
	// response table; selecting any nested response field implies the same.
	let join_response = fields.response.is_some();
	let mut fetch_response_headers = false;
	if let Some(res_fields) = &fields.response {
		if res_fields.request_id {
			response_columns.push("res.req_id AS res_req_id");
		}
		if res_fields.proto {
			response_columns.push("res.proto AS res_proto");
		}
		if res_fields.status_code {
			response_columns.push("res.status_code");
		}
		if res_fields.status_reason {
			response_columns.push("res.status_reason");
		}
		if res_fields.body {
			response_columns.push("res.body AS res_body");
		}
		if res_fields.timestamp {
			response_columns.push("res.timestamp AS res_timestamp");
		}
		fetch_response_headers = res_fields.headers;
	}

	QueryPlan {
		request_columns,
		response_columns,
		join_response,
		fetch_request_headers: fields.headers,
		fetch_response_headers,
	}
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
