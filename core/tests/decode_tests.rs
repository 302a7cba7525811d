use std::time::Duration;

use export_view_core::session::source_hash;
use export_view_core::{CoreError, DecodeWorker, Session, ViewerConfig};

#[test]
fn worker_result_feeds_session() {
    let worker = DecodeWorker::default();
    let bytes = br#"{"name": "W", "messages": [{"id": 1, "text": "hi"}]}"#.to_vec();
    let hash = source_hash(&bytes);
    let job = worker.submit(bytes);
    let response = job.wait_timeout(Duration::from_secs(10)).expect("current");

    let mut s = Session::new(ViewerConfig::default()).expect("session");
    let loaded = s.apply_decoded(hash.clone(), response).expect("apply");
    assert_eq!(loaded.source_hash, hash);
    assert_eq!(loaded.chat.display_name, "W");
}

#[test]
fn worker_failure_surfaces_decode_error() {
    let worker = DecodeWorker::default();
    let response = worker.submit(b"\xff\xfe not json".to_vec()).wait().expect("current");
    assert!(!response.success);

    let mut s = Session::new(ViewerConfig::default()).expect("session");
    let err = s.apply_decoded(String::new(), response).expect_err("failure");
    assert!(matches!(err, CoreError::Decode(_)));
    assert!(err.to_string().starts_with("decode error:"));
    assert!(s.loaded().is_none());
}

#[test]
fn newest_submission_wins() {
    let worker = DecodeWorker::default();
    let stale = worker.submit(br#"{"messages": []}"#.to_vec());
    let middle = worker.submit(br#"{"messages": [{"id": 1}]}"#.to_vec());
    let latest = worker.submit(br#"{"messages": [{"id": 1}, {"id": 2}]}"#.to_vec());
    assert_eq!(latest.generation(), 3);
    assert!(stale.wait().is_none());
    assert!(middle.wait_timeout(Duration::from_secs(10)).is_none());

    let response = latest.wait().expect("latest");
    let payload = response.payload.expect("payload");
    assert_eq!(payload["messages"].as_array().map(Vec::len), Some(2));
}
