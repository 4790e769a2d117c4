use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// User-facing logging configuration, as it appears in the proxy's config file.
#[derive(serde::Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawLogging {
	/// `tracing_subscriber` `EnvFilter` directive, e.g. "proxylog=debug,info".
	filter: Option<String>,
	/// Emit structured JSON instead of the human-readable format.
	#[serde(default)]
	json: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
	pub filter: String,
	pub json: bool,
}

impl From<RawLogging> for Config {
	fn from(raw: RawLogging) -> Self {
		Self {
			filter: raw.filter.unwrap_or_else(|| "info".to_string()),
			json: raw.json,
		}
	}
}

/// Installs the global `tracing` subscriber. Call once at process startup.
///
/// Returns an error if a global subscriber is already set; this is a programmer
/// error (double init), not a runtime condition callers should retry.
pub fn init(cfg: &Config) -> anyhow::Result<()> {
	let filter = EnvFilter::try_new(&cfg.filter).unwrap_or_else(|_| EnvFilter::new("info"));

	let registry = tracing_subscriber::registry().with(filter);

	if cfg.json {
		registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_span_events(FmtSpan::CLOSE)
					.with_writer(io::stderr),
			)
			.try_init()?;
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
			.try_init()?;
	}
	Ok(())
}
