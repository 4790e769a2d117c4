use super::*;
use crate::projection::ResponseFields;

#[test]
fn no_response_field_skips_join() {
	let p = plan(&FieldSet {
		url: true,
		..FieldSet::none()
	});
	assert!(!p.join_response);
	assert!(p.response_columns.is_empty());
}

#[test]
fn any_response_field_joins_exactly_once() {
	let p = plan(&FieldSet {
		response: Some(ResponseFields {
			status_code: true,
			..ResponseFields::default()
		}),
		..FieldSet::none()
	});
	assert!(p.join_response);
	assert_eq!(p.response_columns, vec!["status_code"]);
}

#[test]
fn request_headers_selected_sets_fetch_flag() {
	let p = plan(&FieldSet {
		headers: true,
		..FieldSet::none()
	});
	assert!(p.fetch_request_headers);
	assert!(!p.fetch_response_headers);
}

#[test]
fn response_headers_selected_joins_and_sets_fetch_flag() {
	let p = plan(&FieldSet {
		response: Some(ResponseFields {
			headers: true,
			..ResponseFields::default()
		}),
		..FieldSet::none()
	});
	assert!(p.join_response);
	assert!(p.fetch_response_headers);
}

#[test]
fn empty_projection_is_id_only() {
	let p = plan(&FieldSet::none());
	assert!(p.is_id_only());
}

#[test]
fn full_projection_selects_every_mapped_column() {
	let p = plan(&FieldSet::all());
	assert_eq!(
		p.request_columns,
		vec![
			"req.proto AS req_proto",
			"req.url",
			"req.method",
			"req.body AS req_body",
			"req.timestamp AS req_timestamp",
		]
	);
	assert_eq!(
		p.response_columns,
		vec![
			"res.req_id AS res_req_id",
			"res.proto AS res_proto",
			"status_code",
			"status_reason",
			"res.body AS res_body",
			"res.timestamp AS res_timestamp",
		]
	);
	assert!(p.join_response);
	assert!(p.fetch_request_headers);
	assert!(p.fetch_response_headers);
}
