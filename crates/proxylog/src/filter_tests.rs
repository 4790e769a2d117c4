use super::*;
use crate::model::Header;

fn req(url: &str, method: &str, body: &str, headers: Vec<Header>) -> Request {
	Request {
		url: url.to_string(),
		method: method.to_string(),
		body: body.as_bytes().to_vec(),
		headers,
		..Request::default()
	}
}

#[test]
fn empty_filter_matches_everything() {
	let filter = parse("").unwrap();
	assert!(filter.matches(&req("http://x.test/", "GET", "", vec![])));
}

#[test]
fn bare_token_matches_url_substring_case_insensitively() {
	let filter = parse("Admin").unwrap();
	assert!(filter.matches(&req("http://x.test/ADMIN/panel", "GET", "", vec![])));
	assert!(!filter.matches(&req("http://x.test/other", "GET", "", vec![])));
}

#[test]
fn method_field_matches() {
	let filter = parse("method:post").unwrap();
	assert!(filter.matches(&req("http://x.test/", "POST", "", vec![])));
	assert!(!filter.matches(&req("http://x.test/", "GET", "", vec![])));
}

#[test]
fn body_field_matches_substring() {
	let filter = parse("body:needle").unwrap();
	assert!(filter.matches(&req("http://x.test/", "GET", "has a needle in it", vec![])));
	assert!(!filter.matches(&req("http://x.test/", "GET", "nothing", vec![])));
}

#[test]
fn header_presence_clause_ignores_value() {
	let filter = parse("header:X-Trace").unwrap();
	let with = req(
		"http://x.test/",
		"GET",
		"",
		vec![Header {
			key: "x-trace".to_string(),
			value: "anything".to_string(),
		}],
	);
	assert!(filter.matches(&with));
	assert!(!filter.matches(&req("http://x.test/", "GET", "", vec![])));
}

#[test]
fn header_key_value_clause_matches_value_substring() {
	let filter = parse("header:Content-Type=json").unwrap();
	let matching = req(
		"http://x.test/",
		"GET",
		"",
		vec![Header {
			key: "Content-Type".to_string(),
			value: "application/json".to_string(),
		}],
	);
	let other = req(
		"http://x.test/",
		"GET",
		"",
		vec![Header {
			key: "Content-Type".to_string(),
			value: "text/plain".to_string(),
		}],
	);
	assert!(filter.matches(&matching));
	assert!(!filter.matches(&other));
}

#[test]
fn multiple_clauses_are_conjunctive() {
	let filter = parse("method:get url:admin").unwrap();
	assert!(filter.matches(&req("http://x.test/admin", "GET", "", vec![])));
	assert!(!filter.matches(&req("http://x.test/admin", "POST", "", vec![])));
	assert!(!filter.matches(&req("http://x.test/other", "GET", "", vec![])));
}

#[test]
fn quoted_term_preserves_internal_space() {
	let filter = parse(r#"url:"/has space""#).unwrap();
	assert!(filter.matches(&req("http://x.test/has space", "GET", "", vec![])));
}

#[test]
fn unterminated_quote_is_a_parse_error() {
	let err = parse(r#"url:"unterminated"#).unwrap_err();
	assert!(matches!(err, Error::FilterParse(_)));
}

#[test]
fn unknown_field_is_a_parse_error() {
	let err = parse("bogus:value").unwrap_err();
	assert!(matches!(err, Error::FilterParse(_)));
}

#[test]
fn required_fields_reflects_clauses_used() {
	let filter = parse("method:get header:X-Trace").unwrap();
	let fields = filter.required_fields();
	assert!(fields.method);
	assert!(fields.headers);
	assert!(!fields.url);
	assert!(!fields.body);
}
