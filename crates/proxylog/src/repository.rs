//! Durable, projection-aware storage for [`Request`]/[`Response`] pairs.
//!
//! Three relations back this: `requests`, `responses` (cascading on delete
//! of the parent request), and `headers` (a side-table belonging to exactly
//! one of the two, also cascading). See the module-level design notes for
//! why header fetches are a deliberate N+1: most callers never ask for
//! headers, and when they do, the projection may ask for only a subset.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::model::{
	Header, Headers, NewRequest, NewResponse, Request, RequestId, Response, ResponseId,
	status_reason_from_line,
};
use crate::planner::{self, QueryPlan};
use crate::projection::FieldSet;

pub(crate) fn init_schema(conn: &Connection) -> Result<(), Error> {
	conn
		.execute_batch(
			"
			CREATE TABLE IF NOT EXISTS requests (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				proto TEXT NOT NULL,
				url TEXT NOT NULL,
				method TEXT NOT NULL,
				body BLOB NOT NULL,
				timestamp TEXT NOT NULL
			);

			CREATE TABLE IF NOT EXISTS responses (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				req_id INTEGER NOT NULL UNIQUE REFERENCES requests(id) ON DELETE CASCADE,
				proto TEXT NOT NULL,
				status_code INTEGER NOT NULL,
				status_reason TEXT NOT NULL,
				body BLOB NOT NULL,
				timestamp TEXT NOT NULL
			);

			CREATE TABLE IF NOT EXISTS headers (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				req_id INTEGER REFERENCES requests(id) ON DELETE CASCADE,
				res_id INTEGER REFERENCES responses(id) ON DELETE CASCADE,
				key TEXT NOT NULL,
				value TEXT NOT NULL,
				CHECK (
					(req_id IS NOT NULL AND res_id IS NULL) OR
					(req_id IS NULL AND res_id IS NOT NULL)
				)
			);
			CREATE INDEX IF NOT EXISTS idx_headers_req_id ON headers(req_id);
			CREATE INDEX IF NOT EXISTS idx_headers_res_id ON headers(res_id);
			",
		)
		.map_err(|e| Error::storage("create schema", e))
}

pub struct Repository {
	pool: crate::pool::Pool,
}

impl Repository {
	/// Opens (creating if absent) the single-file store at `path` with a
	/// pool of `pool_size` connections.
	pub fn open(path: &Path, pool_size: usize) -> Result<Self, Error> {
		Ok(Self {
			pool: crate::pool::Pool::open(path, pool_size)?,
		})
	}

	#[cfg(test)]
	pub fn open_in_memory() -> Result<Self, Error> {
		Ok(Self {
			pool: crate::pool::Pool::open_in_memory()?,
		})
	}

	pub async fn add_request(
		&self,
		req: NewRequest,
		timestamp: DateTime<Utc>,
		cancel: CancellationToken,
	) -> Result<Request, Error> {
		self
			.pool
			.with_connection("add_request", cancel, move |conn, cancel| {
				insert_request(conn, req, timestamp, cancel)
			})
			.await
	}

	pub async fn add_response(
		&self,
		request_id: RequestId,
		res: NewResponse,
		timestamp: DateTime<Utc>,
		cancel: CancellationToken,
	) -> Result<Response, Error> {
		self
			.pool
			.with_connection("add_response", cancel, move |conn, cancel| {
				insert_response(conn, request_id, res, timestamp, cancel)
			})
			.await
	}

	pub async fn find_by_id(
		&self,
		id: RequestId,
		fields: FieldSet,
		cancel: CancellationToken,
	) -> Result<Request, Error> {
		self
			.pool
			.with_connection("find_by_id", cancel, move |conn, _cancel| {
				find_by_id(conn, id, &fields)
			})
			.await
	}

	/// Returns every request matching `filter`, most recent first. `filter`
	/// has already been parsed into a predicate by the caller; this method
	/// only needs to know which extra fields that predicate reads, so it can
	/// widen the projection before evaluating it in-memory.
	pub async fn find_all(
		&self,
		fields: FieldSet,
		cancel: CancellationToken,
	) -> Result<Vec<Request>, Error> {
		self
			.pool
			.with_connection("find_all", cancel, move |conn, _cancel| {
				find_all(conn, &fields)
			})
			.await
	}
}

fn insert_request(
	conn: &mut Connection,
	req: NewRequest,
	timestamp: DateTime<Utc>,
	cancel: &CancellationToken,
) -> Result<Request, Error> {
	let tx = conn
		.transaction()
		.map_err(|e| Error::storage("add_request", e))?;

	tx
		.execute(
			"INSERT INTO requests (proto, url, method, body, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
			params![
				req.proto,
				req.url,
				req.method,
				req.body,
				proxylog_core::time::to_storage_string(timestamp)
			],
		)
		.map_err(|e| Error::storage("add_request", e))?;
	let id = RequestId(tx.last_insert_rowid());

	insert_headers(&tx, HeaderParent::Request(id), &req.headers)?;

	if cancel.is_cancelled() {
		// Dropping `tx` without committing rolls the whole insert back.
		return Err(Error::Cancelled);
	}
	tx.commit().map_err(|e| Error::storage("add_request", e))?;

	Ok(Request {
		id,
		method: req.method,
		url: req.url,
		proto: req.proto,
		headers: req.headers,
		body: req.body,
		timestamp,
		response: None,
	})
}

fn insert_response(
	conn: &mut Connection,
	request_id: RequestId,
	res: NewResponse,
	timestamp: DateTime<Utc>,
	cancel: &CancellationToken,
) -> Result<Response, Error> {
	let status_reason = status_reason_from_line(&res.status_line);
	let tx = conn
		.transaction()
		.map_err(|e| Error::storage("add_response", e))?;

	tx
		.execute(
			"INSERT INTO responses (req_id, proto, status_code, status_reason, body, timestamp)
			 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
			params![
				request_id.0,
				res.proto,
				res.status_code,
				status_reason,
				res.body,
				proxylog_core::time::to_storage_string(timestamp)
			],
		)
		.map_err(|e| Error::storage("add_response", e))?;
	let id = ResponseId(tx.last_insert_rowid());

	insert_headers(&tx, HeaderParent::Response(id), &res.headers)?;

	if cancel.is_cancelled() {
		return Err(Error::Cancelled);
	}
	tx.commit().map_err(|e| Error::storage("add_response", e))?;

	Ok(Response {
		id,
		request_id,
		proto: res.proto,
		status_code: res.status_code,
		status_reason,
		headers: res.headers,
		body: res.body,
		timestamp,
	})
}

enum HeaderParent {
	Request(RequestId),
	Response(ResponseId),
}

fn insert_headers(tx: &Transaction, parent: HeaderParent, headers: &Headers) -> Result<(), Error> {
	let mut stmt = match parent {
		HeaderParent::Request(_) => tx.prepare("INSERT INTO headers (req_id, key, value) VALUES (?1, ?2, ?3)"),
		HeaderParent::Response(_) => tx.prepare("INSERT INTO headers (res_id, key, value) VALUES (?1, ?2, ?3)"),
	}
	.map_err(|e| Error::storage("add_headers", e))?;

	let parent_id = match parent {
		HeaderParent::Request(id) => id.0,
		HeaderParent::Response(id) => id.0,
	};
	for h in headers {
		stmt
			.execute(params![parent_id, h.key, h.value])
			.map_err(|e| Error::storage("add_headers", e))?;
	}
	Ok(())
}

fn base_select(plan: &QueryPlan) -> String {
	let mut cols = vec!["req.id AS req_id".to_string()];
	if plan.join_response {
		cols.push("res.id AS res_id".to_string());
	}
	cols.extend(plan.request_columns.iter().map(|c| c.to_string()));
	cols.extend(plan.response_columns.iter().map(|c| c.to_string()));

	let from = if plan.join_response {
		"FROM requests req LEFT JOIN responses res ON req.id = res.req_id"
	} else {
		"FROM requests req"
	};
	format!("SELECT {} {}", cols.join(", "), from)
}

fn find_by_id(conn: &Connection, id: RequestId, fields: &FieldSet) -> Result<Request, Error> {
	let plan = planner::plan(fields);
	let sql = format!("{} WHERE req.id = ?1", base_select(&plan));
	let mut stmt = conn
		.prepare(&sql)
		.map_err(|e| Error::storage("find_by_id", e))?;
	let found = stmt
		.query_row(params![id.0], |row| row_to_request(row, &plan))
		.optional()
		.map_err(|e| Error::storage("find_by_id", e))?;

	let mut req = found.ok_or(Error::NotFound)?;
	let mut headers = HeaderFetcher::prepare(conn, &plan)?;
	headers.attach(&mut req)?;
	Ok(req)
}

fn find_all(conn: &Connection, fields: &FieldSet) -> Result<Vec<Request>, Error> {
	let plan = planner::plan(fields);
	let sql = format!("{} ORDER BY req.id DESC", base_select(&plan));
	let mut stmt = conn
		.prepare(&sql)
		.map_err(|e| Error::storage("find_all", e))?;
	let rows = stmt
		.query_map(params![], |row| row_to_request(row, &plan))
		.map_err(|e| Error::storage("find_all", e))?;

	// Prepared once and reused across every row, rather than per row: see
	// `HeaderFetcher`.
	let mut headers = HeaderFetcher::prepare(conn, &plan)?;
	let mut out = Vec::new();
	for row in rows {
		let mut req = row.map_err(|e| Error::storage("find_all", e))?;
		headers.attach(&mut req)?;
		out.push(req);
	}
	Ok(out)
}

/// Builds a `Request` (with a partial `Response` if joined) from one row.
/// Fields the plan didn't select are left at their type's default, per the
/// projection contract: `id` is always populated, everything else may be
/// zero/absent.
fn row_to_request(row: &Row<'_>, plan: &QueryPlan) -> rusqlite::Result<Request> {
	let id = RequestId(row.get("req_id")?);

	let mut req = Request {
		id,
		..Request::default()
	};
	if !plan.request_columns.is_empty() {
		if let Some(v) = opt_col::<String>(row, "req_proto")? {
			req.proto = v;
		}
		if let Some(v) = opt_col::<String>(row, "url")? {
			req.url = v;
		}
		if let Some(v) = opt_col::<String>(row, "method")? {
			req.method = v;
		}
		if let Some(v) = opt_col::<Vec<u8>>(row, "req_body")? {
			req.body = v;
		}
		if let Some(v) = opt_col::<String>(row, "req_timestamp")? {
			req.timestamp = proxylog_core::time::from_storage_string(&v).unwrap_or_default();
		}
	}

	if plan.join_response {
		let res_id: Option<i64> = row.get("res_id")?;
		if let Some(res_id) = res_id {
			let mut res = Response {
				id: ResponseId(res_id),
				request_id: id,
				..Response::default()
			};
			if let Some(v) = opt_col::<i64>(row, "res_req_id")? {
				res.request_id = RequestId(v);
			}
			if let Some(v) = opt_col::<String>(row, "res_proto")? {
				res.proto = v;
			}
			if let Some(v) = opt_col::<i64>(row, "status_code")? {
				res.status_code = v;
			}
			if let Some(v) = opt_col::<String>(row, "status_reason")? {
				res.status_reason = v;
			}
			if let Some(v) = opt_col::<Vec<u8>>(row, "res_body")? {
				res.body = v;
			}
			if let Some(v) = opt_col::<String>(row, "res_timestamp")? {
				res.timestamp = proxylog_core::time::from_storage_string(&v).unwrap_or_default();
			}
			req.response = Some(res);
		}
	}

	Ok(req)
}

/// Reads a column if it was actually selected; returns `None` rather than
/// erroring when the planner decided not to include it.
fn opt_col<T: rusqlite::types::FromSql>(row: &Row<'_>, name: &str) -> rusqlite::Result<Option<T>> {
	match row.get::<_, T>(name) {
		Ok(v) => Ok(Some(v)),
		Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
		Err(e) => Err(e),
	}
}

/// Holds the (at most two) header-fetch statements a projection needs,
/// prepared once up front and reused across every row — `find_all` runs one
/// query per returned row, not one `prepare()` per row.
struct HeaderFetcher<'conn> {
	request_stmt: Option<rusqlite::Statement<'conn>>,
	response_stmt: Option<rusqlite::Statement<'conn>>,
}

impl<'conn> HeaderFetcher<'conn> {
	fn prepare(conn: &'conn Connection, plan: &QueryPlan) -> Result<Self, Error> {
		let request_stmt = if plan.fetch_request_headers {
			Some(prepare_header_stmt(conn, "req_id")?)
		} else {
			None
		};
		let response_stmt = if plan.fetch_response_headers {
			Some(prepare_header_stmt(conn, "res_id")?)
		} else {
			None
		};
		Ok(Self {
			request_stmt,
			response_stmt,
		})
	}

	fn attach(&mut self, req: &mut Request) -> Result<(), Error> {
		if let Some(stmt) = self.request_stmt.as_mut() {
			req.headers = run_header_query(stmt, req.id.0)?;
		}
		if let Some(stmt) = self.response_stmt.as_mut() {
			if let Some(res) = req.response.as_mut() {
				res.headers = run_header_query(stmt, res.id.0)?;
			}
		}
		Ok(())
	}
}

fn prepare_header_stmt<'conn>(
	conn: &'conn Connection,
	column: &str,
) -> Result<rusqlite::Statement<'conn>, Error> {
	let sql = format!("SELECT key, value FROM headers WHERE {column} = ?1 ORDER BY id ASC");
	conn
		.prepare(&sql)
		.map_err(|e| Error::storage("fetch_headers", e))
}

fn run_header_query(stmt: &mut rusqlite::Statement, parent_id: i64) -> Result<Headers, Error> {
	let rows = stmt
		.query_map(params![parent_id], |row| {
			Ok(Header {
				key: row.get(0)?,
				value: row.get(1)?,
			})
		})
		.map_err(|e| Error::storage("fetch_headers", e))?;
	rows
		.collect::<Result<Vec<_>, _>>()
		.map_err(|e| Error::storage("fetch_headers", e))
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
