//! Parses the free-form search string used to narrow `FindAll` results.
//!
//! Grammar (frozen; see the "filter grammar" open question in DESIGN.md):
//!
//! ```text
//! filter     := clause (whitespace clause)*
//! clause     := field ':' term | term
//! field      := "method" | "url" | "proto" | "body" | "header"
//! term       := bare-word | '"' ... '"'
//! ```
//!
//! A bare `term` with no `field:` prefix matches against `url`. A `header:`
//! clause's term is either `key` (matches any header with that key) or
//! `key=value` (matches a header with that key whose value contains
//! `value`). Every clause must match (implicit AND); an empty string always
//! matches. All comparisons are case-insensitive substring matches.
//! Filtering runs in-memory over rows the repository already returned, not
//! pushed down to SQL.

use crate::error::Error;
use crate::model::Request;
use crate::projection::FieldSet;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Field {
	Method,
	Url,
	Proto,
	Body,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Clause {
	Field { field: Field, needle: String },
	Header { key: String, needle: Option<String> },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter(Vec<Clause>);

impl Filter {
	pub fn matches(&self, req: &Request) -> bool {
		self.0.iter().all(|c| clause_matches(c, req))
	}

	/// Fields this filter reads, so the caller can widen its projection
	/// before fetching rows to evaluate the filter against.
	pub fn required_fields(&self) -> FieldSet {
		let mut fields = FieldSet::none();
		for clause in &self.0 {
			match clause {
				Clause::Field { field, .. } => match field {
					Field::Method => fields.method = true,
					Field::Url => fields.url = true,
					Field::Proto => fields.proto = true,
					Field::Body => fields.body = true,
				},
				Clause::Header { .. } => fields.headers = true,
			}
		}
		fields
	}
}

fn clause_matches(clause: &Clause, req: &Request) -> bool {
	match clause {
		Clause::Field { field, needle } => {
			let haystack = match field {
				Field::Method => &req.method,
				Field::Url => &req.url,
				Field::Proto => &req.proto,
				Field::Body => return String::from_utf8_lossy(&req.body)
					.to_lowercase()
					.contains(needle),
			};
			haystack.to_lowercase().contains(needle)
		},
		Clause::Header { key, needle } => req.headers.iter().any(|h| {
			h.key.eq_ignore_ascii_case(key)
				&& needle
					.as_ref()
					.is_none_or(|n| h.value.to_lowercase().contains(n))
		}),
	}
}

pub fn parse(input: &str) -> Result<Filter, Error> {
	let tokens = tokenize(input)?;
	let mut clauses = Vec::with_capacity(tokens.len());
	for token in tokens {
		clauses.push(parse_clause(&token)?);
	}
	Ok(Filter(clauses))
}

fn parse_clause(token: &str) -> Result<Clause, Error> {
	let Some((field, rest)) = token.split_once(':') else {
		return Ok(Clause::Field {
			field: Field::Url,
			needle: token.to_lowercase(),
		});
	};

	match field {
		"method" => Ok(Clause::Field {
			field: Field::Method,
			needle: rest.to_lowercase(),
		}),
		"url" => Ok(Clause::Field {
			field: Field::Url,
			needle: rest.to_lowercase(),
		}),
		"proto" => Ok(Clause::Field {
			field: Field::Proto,
			needle: rest.to_lowercase(),
		}),
		"body" => Ok(Clause::Field {
			field: Field::Body,
			needle: rest.to_lowercase(),
		}),
		"header" => match rest.split_once('=') {
			Some((key, value)) => Ok(Clause::Header {
				key: key.to_string(),
				needle: Some(value.to_lowercase()),
			}),
			None => Ok(Clause::Header {
				key: rest.to_string(),
				needle: None,
			}),
		},
		other => Err(Error::FilterParse(format!("unrecognized field '{other}'"))),
	}
}

/// Splits on whitespace, treating a double-quoted span as one token so
/// terms containing spaces (e.g. `url:"/has space"`) survive intact.
fn tokenize(input: &str) -> Result<Vec<String>, Error> {
	let mut tokens = Vec::new();
	let mut chars = input.chars().peekable();
	let mut current = String::new();
	let mut in_quotes = false;

	while let Some(c) = chars.next() {
		match c {
			'"' => in_quotes = !in_quotes,
			c if c.is_whitespace() && !in_quotes => {
				if !current.is_empty() {
					tokens.push(std::mem::take(&mut current));
				}
			},
			c => current.push(c),
		}
	}
	if in_quotes {
		return Err(Error::FilterParse("unterminated quote".to_string()));
	}
	if !current.is_empty() {
		tokens.push(current);
	}
	Ok(tokens)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
