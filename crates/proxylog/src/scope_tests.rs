use super::*;
use crate::model::Header;

#[test]
fn empty_scope_matches_everything() {
	let scope = Scope::empty();
	assert!(scope.in_scope("http://anything.test/", &[], b""));
}

#[test]
fn url_rule_restricts_to_matching_host() {
	let scope = compile(vec![vec![RawCheck::Url(r"^http://x\.test/".to_string())]]).unwrap();
	assert!(scope.in_scope("http://x.test/a", &[], b""));
	assert!(!scope.in_scope("http://y.test/", &[], b""));
}

#[test]
fn rule_checks_are_disjunctive() {
	let scope = compile(vec![vec![
		RawCheck::Url("never-matches".to_string()),
		RawCheck::Body("needle".to_string()),
	]])
	.unwrap();
	assert!(scope.in_scope("http://x.test/", &[], b"...needle..."));
}

#[test]
fn header_check_matches_name_and_value() {
	let scope = compile(vec![vec![RawCheck::Header {
		name: "^X-Test$".to_string(),
		value: "^yes$".to_string(),
	}]])
	.unwrap();
	let headers = vec![Header {
		key: "X-Test".to_string(),
		value: "yes".to_string(),
	}];
	assert!(scope.in_scope("http://x.test/", &headers, b""));
	assert!(!scope.in_scope("http://x.test/", &[], b""));
}

#[test]
fn invalid_regex_surfaces_scope_error() {
	let err = compile(vec![vec![RawCheck::Url("(".to_string())]]).unwrap_err();
	assert!(matches!(err, Error::Scope(_)));
}
