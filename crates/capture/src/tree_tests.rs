// SPDX-License-Identifier: MIT

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::capture::CaptureOptions;
use crate::event::{TestAction, TestEvent};

fn ev(action: TestAction, test: &str) -> TestEvent {
    TestEvent {
        time: None,
        action,
        package: "pkg".to_string(),
        test: test.to_string(),
        elapsed: 0.0,
        output: String::new(),
    }
}

fn out(test: &str, text: &str) -> TestEvent {
    TestEvent {
        output: text.to_string(),
        ..ev(TestAction::Output, test)
    }
}

/// start pkg, run TestA, run TestA/Sub, with some interleaved output
fn sample_capture() -> TestCapture {
    let mut capture = TestCapture::new(CaptureOptions::default());
    for event in [
        ev(TestAction::Start, ""),
        ev(TestAction::Run, "TestA"),
        out("TestA", "hello\n"),
        ev(TestAction::Run, "TestA/Sub"),
        out("TestA/Sub", "world\n"),
        out("TestA", "again\n"),
    ] {
        capture.apply(&event).unwrap();
    }
    capture
}

#[test]
fn test_names_and_hierarchy() {
    let capture = sample_capture();

    let root = capture.find("pkg").unwrap();
    assert_eq!(root.full_name(), "pkg");
    assert_eq!(root.name(), "pkg");
    assert!(root.is_root());

    let sub = capture.find("TestA/Sub").unwrap();
    assert_eq!(sub.name(), "Sub");
    assert_eq!(sub.package(), "pkg");
    assert!(!sub.is_root());

    let parent = capture.get(sub.parent().unwrap()).unwrap();
    assert_eq!(parent.full_name(), "TestA");
    let grandparent = capture.get(parent.parent().unwrap()).unwrap();
    assert_eq!(grandparent.full_name(), "pkg");
    assert!(grandparent.parent().is_none());
}

#[test]
fn test_capture_is_debuggable() {
    // Callers (and test assertions) format captures with {:?}
    let rendered = format!("{:?}", sample_capture());
    assert!(rendered.contains("TestCapture"));
    assert!(rendered.contains("TestA/Sub"));
}

#[test]
fn test_indices_strictly_increase_in_creation_order() {
    let capture = sample_capture();

    let indices: Vec<usize> = ["pkg", "TestA", "TestA/Sub"]
        .iter()
        .map(|name| capture.find(name).unwrap().index())
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_children_keep_insertion_order() {
    let mut capture = TestCapture::new(CaptureOptions::default());
    capture.apply(&ev(TestAction::Start, "")).unwrap();
    for name in ["TestC", "TestA", "TestB"] {
        capture.apply(&ev(TestAction::Run, name)).unwrap();
    }

    let root = capture.find("pkg").unwrap();
    let names: Vec<&str> = root
        .children()
        .iter()
        .map(|id| capture.get(*id).unwrap().name())
        .collect();
    assert_eq!(names, vec!["TestC", "TestA", "TestB"]);
}

#[test]
fn test_own_output_excludes_descendants() {
    let capture = sample_capture();

    let own: Vec<&str> = capture
        .find("TestA")
        .unwrap()
        .output()
        .iter()
        .map(|o| o.text.as_str())
        .collect();
    assert_eq!(own, vec!["hello\n", "again\n"]);
}

#[test]
fn test_full_output_merges_in_emission_order() {
    let capture = sample_capture();

    let a = capture.find("TestA").unwrap().id();
    assert_eq!(capture.full_output(a), "hello\nworld\nagain\n");

    let sub = capture.find("TestA/Sub").unwrap().id();
    assert_eq!(capture.full_output(sub), "world\n");

    let root = capture.find("pkg").unwrap().id();
    assert_eq!(capture.full_output(root), "hello\nworld\nagain\n");
}

#[test]
fn test_full_output_is_idempotent() {
    let capture = sample_capture();
    let a = capture.find("TestA").unwrap().id();
    assert_eq!(capture.full_output(a), capture.full_output(a));
}

#[test]
fn test_serialized_shape_matches_report_schema() {
    let mut capture = TestCapture::new_at(
        CaptureOptions {
            title: "nightly run".to_string(),
            ..CaptureOptions::default()
        },
        chrono::DateTime::UNIX_EPOCH,
    );
    for event in [
        ev(TestAction::Start, ""),
        ev(TestAction::Run, "TestA"),
        out("TestA", "hello\n"),
        TestEvent {
            elapsed: 0.25,
            ..ev(TestAction::Pass, "TestA")
        },
    ] {
        capture.apply(&event).unwrap();
    }

    assert_eq!(capture.title(), "nightly run");
    let value = serde_json::to_value(&capture).unwrap();
    assert_eq!(value["title"], "nightly run");

    let root = &value["tests"][0];
    assert_eq!(root["full_name"], "pkg");
    assert_eq!(root["package"], "pkg");
    assert_eq!(root["done"], false);

    let a = &root["tests"][0];
    assert_eq!(a["full_name"], "TestA");
    assert_eq!(a["index"], 1);
    assert_eq!(a["passed"], true);
    assert_eq!(a["elapsed"], 250_000_000u64);
    assert_eq!(a["output"][0]["index"], 0);
    assert_eq!(a["output"][0]["text"], "hello\n");
    // Leaf nodes still carry an explicit, empty tests array
    assert_eq!(a["tests"], serde_json::json!([]));
}
