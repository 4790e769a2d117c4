//! Decides whether an observed request is worth logging at all. Stateless
//! and pure: given a [`Scope`] and a request's fields, `in_scope` never
//! touches storage.

use regex::Regex;

use crate::error::Error;
use crate::model::Headers;

/// One field-pattern check, always expressed as a regular expression.
#[derive(Debug)]
pub enum Check {
	Url(Regex),
	Header { name: Regex, value: Regex },
	Body(Regex),
}

impl Check {
	fn matches(&self, url: &str, headers: &Headers, body: &[u8]) -> bool {
		match self {
			Check::Url(re) => re.is_match(url),
			Check::Header { name, value } => headers
				.iter()
				.any(|h| name.is_match(&h.key) && value.is_match(&h.value)),
			Check::Body(re) => {
				let text = String::from_utf8_lossy(body);
				re.is_match(&text)
			},
		}
	}
}

/// A disjunction of checks: the rule matches if any one of them does.
#[derive(Debug, Default)]
pub struct Rule(pub Vec<Check>);

impl Rule {
	fn matches(&self, url: &str, headers: &Headers, body: &[u8]) -> bool {
		self.0.iter().any(|c| c.matches(url, headers, body))
	}
}

/// An ordered list of rules. A request is in scope if any rule matches; an
/// empty scope matches everything.
#[derive(Debug, Default)]
pub struct Scope(pub Vec<Rule>);

impl Scope {
	pub fn empty() -> Self {
		Scope(Vec::new())
	}

	pub fn in_scope(&self, url: &str, headers: &Headers, body: &[u8]) -> bool {
		self.0.is_empty() || self.0.iter().any(|r| r.matches(url, headers, body))
	}
}

/// Textual scope rule definitions, as they'd be loaded from a config file.
/// Each raw check's pattern is compiled lazily by [`compile`] so that a bad
/// regex surfaces as a single [`Error::Scope`] naming the offending pattern.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawCheck {
	Url(String),
	Header { name: String, value: String },
	Body(String),
}

pub fn compile(rules: Vec<Vec<RawCheck>>) -> Result<Scope, Error> {
	let mut out = Vec::with_capacity(rules.len());
	for raw_rule in rules {
		let mut checks = Vec::with_capacity(raw_rule.len());
		for raw in raw_rule {
			checks.push(compile_check(raw)?);
		}
		out.push(Rule(checks));
	}
	Ok(Scope(out))
}

fn compile_check(raw: RawCheck) -> Result<Check, Error> {
	Ok(match raw {
		RawCheck::Url(pattern) => Check::Url(compile_regex(&pattern)?),
		RawCheck::Header { name, value } => Check::Header {
			name: compile_regex(&name)?,
			value: compile_regex(&value)?,
		},
		RawCheck::Body(pattern) => Check::Body(compile_regex(&pattern)?),
	})
}

fn compile_regex(pattern: &str) -> Result<Regex, Error> {
	Regex::new(pattern).map_err(|e| Error::Scope(format!("{pattern}: {e}")))
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
