use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn id(s: &str) -> QueryId {
	QueryId::from(s)
}

#[test]
fn about_reply_is_delivered_once_and_forgotten() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("q1"), QueryKind::About).unwrap();
	assert!(c.is_pending(&id("q1")));

	let out = c.resolve(&id("q1"), json!(["Ppcmd_string", "nat"])).unwrap();
	assert_eq!(
		out,
		vec![Delivery::AboutResult {
			id: id("q1"),
			payload: json!(["Ppcmd_string", "nat"]),
		}]
	);
	assert!(c.is_empty());
	assert!(matches!(c.resolve(&id("q1"), json!(null)), Err(Error::UnmatchedResolution(_))));
}

#[test]
fn replies_never_cross_ids() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("A"), QueryKind::Search).unwrap();
	c.begin(id("B"), QueryKind::Search).unwrap();

	let b = c.resolve(&id("B"), json!("hB")).unwrap();
	let a = c.resolve(&id("A"), json!("hA")).unwrap();
	assert_eq!(b, vec![Delivery::SearchLaunched { id: id("B"), payload: json!("hB") }]);
	assert_eq!(a, vec![Delivery::SearchLaunched { id: id("A"), payload: json!("hA") }]);

	let pushed = c.push(&id("A"), json!({"id": "A", "name": "x"})).unwrap();
	assert_eq!(pushed.len(), 1);
	assert_eq!(pushed[0].id(), &id("A"));
}

#[test]
fn early_pushes_follow_the_handshake() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("s"), QueryKind::Search).unwrap();

	assert!(c.push(&id("s"), json!(1)).unwrap().is_empty());
	assert!(c.push(&id("s"), json!(2)).unwrap().is_empty());

	let out = c.resolve(&id("s"), json!("ok")).unwrap();
	assert_eq!(
		out,
		vec![
			Delivery::SearchLaunched { id: id("s"), payload: json!("ok") },
			Delivery::SearchResult { id: id("s"), payload: json!(1) },
			Delivery::SearchResult { id: id("s"), payload: json!(2) },
		]
	);
}

#[test]
fn launched_search_keeps_receiving_pushes() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("s"), QueryKind::Search).unwrap();
	c.resolve(&id("s"), json!(null)).unwrap();

	for n in 0..3 {
		let out = c.push(&id("s"), json!(n)).unwrap();
		assert_eq!(out, vec![Delivery::SearchResult { id: id("s"), payload: json!(n) }]);
	}
	assert!(c.contains(&id("s")));
	assert!(!c.is_pending(&id("s")));
}

#[test]
fn duplicate_while_awaiting_is_rejected() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("q"), QueryKind::About).unwrap();
	assert!(matches!(c.begin(id("q"), QueryKind::About), Err(Error::DuplicateRequest(_))));
	assert_eq!(c.len(), 1);
}

#[test]
fn rebegin_retires_launched_search() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("s"), QueryKind::Search).unwrap();
	c.resolve(&id("s"), json!("first")).unwrap();

	c.begin(id("s"), QueryKind::Search).unwrap();
	assert!(c.is_pending(&id("s")));
	// Pushes now wait for the new handshake.
	assert!(c.push(&id("s"), json!("late")).unwrap().is_empty());
}

#[test]
fn retention_retires_oldest_launched_search() {
	let mut c = RequestCorrelator::new(2);
	for name in ["a", "b", "c"] {
		c.begin(id(name), QueryKind::Search).unwrap();
		c.resolve(&id(name), json!(null)).unwrap();
	}

	assert!(!c.contains(&id("a")));
	assert!(matches!(c.push(&id("a"), json!(0)), Err(Error::UnmatchedResolution(_))));
	assert_eq!(c.push(&id("b"), json!(0)).unwrap().len(), 1);
	assert_eq!(c.push(&id("c"), json!(0)).unwrap().len(), 1);
}

#[test]
fn zero_retention_still_keeps_latest_search() {
	let mut c = RequestCorrelator::new(0);
	c.begin(id("s"), QueryKind::Search).unwrap();
	c.resolve(&id("s"), json!(null)).unwrap();
	assert_eq!(c.push(&id("s"), json!(1)).unwrap().len(), 1);
}

#[test]
fn unknown_ids_are_unmatched() {
	let mut c = RequestCorrelator::new(4);
	assert!(matches!(c.resolve(&id("zz"), json!(null)), Err(Error::UnmatchedResolution(_))));
	assert!(matches!(c.push(&id("zz"), json!(null)), Err(Error::UnmatchedResolution(_))));
	assert!(matches!(c.fail(&id("zz")), Err(Error::UnmatchedResolution(_))));
}

#[test]
fn push_for_about_is_unmatched() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("q"), QueryKind::About).unwrap();
	assert!(matches!(c.push(&id("q"), json!(null)), Err(Error::UnmatchedResolution(_))));
	assert!(c.is_pending(&id("q")));
}

#[test]
fn fail_removes_slot() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("q"), QueryKind::Search).unwrap();
	c.push(&id("q"), json!(1)).unwrap();
	c.fail(&id("q")).unwrap();

	assert!(c.is_empty());
	assert!(matches!(c.resolve(&id("q"), json!(null)), Err(Error::UnmatchedResolution(_))));
	c.begin(id("q"), QueryKind::Search).unwrap();
}

#[test]
fn clear_drops_everything() {
	let mut c = RequestCorrelator::new(4);
	c.begin(id("a"), QueryKind::About).unwrap();
	c.begin(id("s"), QueryKind::Search).unwrap();
	c.resolve(&id("s"), json!(null)).unwrap();
	c.clear();
	assert!(c.is_empty());
}
