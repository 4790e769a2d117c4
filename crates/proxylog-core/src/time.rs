use chrono::{DateTime, SecondsFormat, Utc};

/// Captures the current instant at microsecond resolution, matching the
/// precision the store persists.
pub fn now() -> DateTime<Utc> {
	let now = Utc::now();
	// Truncate to microseconds so round-tripping through storage (which only
	// keeps microsecond precision) never produces a value that looks "changed".
	DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

/// Renders a timestamp the way it is persisted: ISO-8601 with a fixed
/// microsecond fraction and an explicit UTC offset.
pub fn to_storage_string(ts: DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a timestamp previously produced by [`to_storage_string`].
pub fn from_storage_string(s: &str) -> Option<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(s)
		.ok()
		.map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
