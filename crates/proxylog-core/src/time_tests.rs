use super::*;

#[test]
fn round_trips_through_storage_string() {
	let ts = now();
	let rendered = to_storage_string(ts);
	let parsed = from_storage_string(&rendered).expect("valid timestamp");
	assert_eq!(ts, parsed);
}

#[test]
fn rejects_garbage() {
	assert!(from_storage_string("not a timestamp").is_none());
}
