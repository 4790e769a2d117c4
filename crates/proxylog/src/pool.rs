//! A small fixed-size pool of [`rusqlite::Connection`]s.
//!
//! SQLite only ever allows one writer at a time regardless of how many
//! connections are open, so this pool exists to let concurrent *readers*
//! avoid queuing behind each other, not to parallelize writes. Every
//! operation acquires a connection for the duration of one transaction and
//! releases it on completion or error, matching the shared-resource model
//! in the design notes.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::error::Error;

pub struct Pool {
	connections: Arc<Mutex<Vec<rusqlite::Connection>>>,
	semaphore: Arc<tokio::sync::Semaphore>,
}

impl Pool {
	/// Opens `size` connections against the file at `path`, creating the
	/// containing directory (mode 0755) if needed. Foreign key enforcement is
	/// turned on per-connection, since SQLite does not persist that setting.
	pub fn open(path: &Path, size: usize) -> Result<Self, Error> {
		if let Some(dir) = path.parent() {
			if !dir.as_os_str().is_empty() && !dir.exists() {
				std::fs::create_dir_all(dir).map_err(|e| Error::storage("open store directory", e))?;
				#[cfg(unix)]
				{
					use std::os::unix::fs::PermissionsExt;
					let perms = std::fs::Permissions::from_mode(0o755);
					std::fs::set_permissions(dir, perms)
						.map_err(|e| Error::storage("set store directory permissions", e))?;
				}
			}
		}

		let mut connections = Vec::with_capacity(size);
		for _ in 0..size.max(1) {
			let conn =
				rusqlite::Connection::open(path).map_err(|e| Error::storage("open connection", e))?;
			conn
				.execute_batch("PRAGMA foreign_keys = ON;")
				.map_err(|e| Error::storage("enable foreign keys", e))?;
			crate::repository::init_schema(&conn)?;
			connections.push(conn);
		}

		Ok(Self {
			semaphore: Arc::new(tokio::sync::Semaphore::new(connections.len())),
			connections: Arc::new(Mutex::new(connections)),
		})
	}

	/// In-memory pool, for tests: a single connection shared under the same
	/// acquire/release discipline as the on-disk pool.
	#[cfg(test)]
	pub fn open_in_memory() -> Result<Self, Error> {
		let conn =
			rusqlite::Connection::open_in_memory().map_err(|e| Error::storage("open connection", e))?;
		conn
			.execute_batch("PRAGMA foreign_keys = ON;")
			.map_err(|e| Error::storage("enable foreign keys", e))?;
		crate::repository::init_schema(&conn)?;
		Ok(Self {
			semaphore: Arc::new(tokio::sync::Semaphore::new(1)),
			connections: Arc::new(Mutex::new(vec![conn])),
		})
	}

	/// Runs `f` against a checked-out connection on a blocking thread.
	///
	/// Waiting for a free connection races against `cancel`, so a saturated
	/// pool fails fast with [`Error::Cancelled`] instead of queuing the
	/// caller indefinitely. `f` is handed the cancellation token so it can
	/// check it immediately before committing; cancellation after commit is
	/// a no-op by construction (the closure has already returned by then).
	pub async fn with_connection<F, T>(
		&self,
		operation: &'static str,
		cancel: CancellationToken,
		f: F,
	) -> Result<T, Error>
	where
		F: FnOnce(&mut rusqlite::Connection, &CancellationToken) -> Result<T, Error> + Send + 'static,
		T: Send + 'static,
	{
		if cancel.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let _permit = tokio::select! {
			permit = self.semaphore.clone().acquire_owned() => permit.expect("pool semaphore is never closed"),
			_ = cancel.cancelled() => return Err(Error::Cancelled),
		};
		let connections = self.connections.clone();

		let result = tokio::task::spawn_blocking(move || {
			let mut conn = connections
				.lock()
				.unwrap()
				.pop()
				.expect("permit guarantees a free connection");
			let result = f(&mut conn, &cancel);
			connections.lock().unwrap().push(conn);
			result
		})
		.await;

		match result {
			Ok(inner) => inner,
			Err(join_err) => Err(Error::storage(operation, anyhow::anyhow!(join_err))),
		}
	}
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
