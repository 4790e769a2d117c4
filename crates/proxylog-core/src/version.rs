/// Build metadata surfaced in logs at startup, mirroring the version string
/// baked into `Cargo.toml` rather than a VCS describe (kept simple on purpose).
#[derive(Clone, Debug)]
pub struct BuildInfo {
	pub version: &'static str,
}

impl BuildInfo {
	pub fn new() -> Self {
		Self {
			version: env!("CARGO_PKG_VERSION"),
		}
	}
}

impl Default for BuildInfo {
	fn default() -> Self {
		Self::new()
	}
}
