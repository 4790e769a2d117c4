//! The stateful façade a caller (GraphQL resolver, REST handler, the proxy's
//! own hot path) drives to log and query traffic. Owns the [`Repository`]
//! and the [`Scope`]; every other module in this crate is stateless.

use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::filter;
use crate::model::{Method, NewRequest, NewResponse, Request, RequestId};
use crate::projection::FieldSet;
use crate::repository::Repository;
use crate::scope::Scope;

/// Validates `req.method` as a real [`Method`], but only when `fields` is
/// what the caller actually asked to see — not the filter-widened set used
/// internally to evaluate a predicate. A method the caller never requested
/// is never even looked at, matching the "raised only when projecting a
/// record to the API layer" rule.
fn validate_requested_method(fields: &FieldSet, req: &Request) -> Result<(), Error> {
	if fields.method {
		Method::try_from(req.method.as_str())?;
	}
	Ok(())
}

pub struct Service {
	repository: Repository,
	scope: Scope,
}

impl Service {
	pub fn new(repository: Repository, scope: Scope) -> Self {
		Self { repository, scope }
	}

	/// Records an observed request, unless `scope` excludes it. An
	/// out-of-scope request is silently dropped — no row is written, and
	/// there is never a `LogResponse` call to pair with it.
	pub async fn log_request(
		&self,
		req: NewRequest,
		timestamp: chrono::DateTime<chrono::Utc>,
		cancel: CancellationToken,
	) -> Result<Option<RequestId>, Error> {
		if !self.scope.in_scope(&req.url, &req.headers, &req.body) {
			tracing::debug!(url = %req.url, "request out of scope, not logging");
			return Ok(None);
		}
		let stored = self.repository.add_request(req, timestamp, cancel).await?;
		Ok(Some(stored.id))
	}

	/// Records the response half of a pair. If `request_id` was never logged
	/// (dropped as out of scope, or simply unknown) this surfaces as
	/// [`Error::NotFound`] via the store's foreign key check, not panics.
	pub async fn log_response(
		&self,
		request_id: RequestId,
		res: NewResponse,
		timestamp: chrono::DateTime<chrono::Utc>,
		cancel: CancellationToken,
	) -> Result<(), Error> {
		self
			.repository
			.add_response(request_id, res, timestamp, cancel)
			.await?;
		Ok(())
	}

	pub async fn find_request_by_id(
		&self,
		id: RequestId,
		fields: FieldSet,
		cancel: CancellationToken,
	) -> Result<Request, Error> {
		let req = self.repository.find_by_id(id, fields.clone(), cancel).await?;
		validate_requested_method(&fields, &req)?;
		Ok(req)
	}

	/// Parses `filter_expr`, widens `fields` to cover whatever the filter
	/// reads, fetches the widened projection from the store, then evaluates
	/// the filter in-memory over those rows.
	pub async fn find_all_requests(
		&self,
		filter_expr: &str,
		fields: FieldSet,
		cancel: CancellationToken,
	) -> Result<Vec<Request>, Error> {
		let predicate = filter::parse(filter_expr)?;
		let widened = fields.clone().union(&predicate.required_fields());
		let all = self.repository.find_all(widened, cancel).await?;
		let mut out = Vec::new();
		for req in all.into_iter().filter(|r| predicate.matches(r)) {
			validate_requested_method(&fields, &req)?;
			out.push(req);
		}
		Ok(out)
	}

	/// Parses a caller-supplied textual id into a [`RequestId`]. The textual
	/// form is the decimal rendering of the internal id (see the "opaque id"
	/// open question in DESIGN.md).
	pub fn resolve_id(&self, text: &str) -> Result<RequestId, Error> {
		text.parse()
	}
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
