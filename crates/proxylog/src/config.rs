//! On-disk configuration for the logging subsystem: where the store lives,
//! how big its connection pool is, and which scope rules gate ingestion.
//! Follows the raw-then-resolved split used elsewhere in this codebase:
//! [`RawConfig`] is exactly what a user may write in YAML, [`Config`] is
//! what the rest of the crate actually wants to hold onto.

use std::path::PathBuf;

use crate::error::Error;
use crate::scope::{RawCheck, Scope};

const DEFAULT_POOL_SIZE: usize = 4;
const DEFAULT_STORE_PATH: &str = "proxylog.sqlite3";

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawConfig {
	store_path: Option<PathBuf>,
	pool_size: Option<usize>,
	#[serde(default)]
	scope: Vec<Vec<RawCheck>>,
	logging: Option<proxylog_core::logging::RawLogging>,
}

pub struct Config {
	pub store_path: PathBuf,
	pub pool_size: usize,
	pub scope: Scope,
	pub logging: proxylog_core::logging::Config,
}

impl TryFrom<RawConfig> for Config {
	type Error = Error;

	fn try_from(raw: RawConfig) -> Result<Self, Error> {
		Ok(Config {
			store_path: raw.store_path.unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
			pool_size: raw.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
			scope: crate::scope::compile(raw.scope)?,
			logging: raw.logging.unwrap_or_default().into(),
		})
	}
}

/// Loads and resolves configuration from a YAML file at `path`. Absent or
/// empty input resolves to all-default `Config`, matching the "works with
/// zero configuration" expectation for a single-binary tool.
pub fn load(path: &std::path::Path) -> anyhow::Result<Config> {
	let raw = match std::fs::read_to_string(path) {
		Ok(text) => serde_yaml::from_str(&text)?,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
		Err(e) => return Err(e.into()),
	};
	Config::try_from(raw).map_err(anyhow::Error::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
