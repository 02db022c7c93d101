// SPDX-License-Identifier: MIT

//! The reconstructed test tree.
//!
//! Nodes live in a flat arena owned by [`TestCapture`]; parent and child
//! links are [`TestId`] indices, so the child-to-parent back-reference is
//! non-owning by construction. Ids are never reused and double as each
//! node's creation sequence number.

use crate::capture::CaptureOptions;
use chrono::{DateTime, FixedOffset, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;
use std::time::Duration;

/// Stable handle to one node in a capture's tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TestId(pub(crate) usize);

/// One record of text a test wrote, with its capture-wide emission index.
///
/// The index is the only ordering key used when merging a subtree's
/// output back into emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub index: usize,
    pub text: String,
}

/// A single test: a package root or a nested subtest.
#[derive(Clone, Debug)]
pub struct Test {
    pub(crate) full_name: String,
    pub(crate) package: String,
    pub(crate) id: TestId,
    pub(crate) parent: Option<TestId>,
    pub(crate) children: Vec<TestId>,
    pub(crate) output: Vec<Output>,
    pub(crate) done: bool,
    pub(crate) passed: bool,
    pub(crate) skipped: bool,
    pub(crate) started_at: Option<DateTime<FixedOffset>>,
    pub(crate) ended_at: Option<DateTime<FixedOffset>>,
    pub(crate) elapsed: Duration,
}

impl Test {
    /// Identity key: the package name for a root, the full slash-path for
    /// a subtest.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Display name: the last path segment of [`full_name`](Self::full_name).
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.full_name)
    }

    /// The package this test belongs to.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn id(&self) -> TestId {
        self.id
    }

    /// Creation sequence number, strictly increasing per capture.
    pub fn index(&self) -> usize {
        self.id.0
    }

    /// Enclosing test; `None` for a package root.
    pub fn parent(&self) -> Option<TestId> {
        self.parent
    }

    /// Subtests in insertion order.
    pub fn children(&self) -> &[TestId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Output attributed directly to this node, not its descendants.
    pub fn output(&self) -> &[Output] {
        &self.output
    }

    /// Whether a terminal action has been seen for this test.
    pub fn done(&self) -> bool {
        self.done
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn skipped(&self) -> bool {
        self.skipped
    }

    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<FixedOffset>> {
        self.ended_at
    }

    /// Elapsed time as reported by the terminal event, not derived from
    /// wall-clock deltas (the runner may report CPU-normalized durations).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// The root container for one reconstructed test run.
#[derive(Debug)]
pub struct TestCapture {
    pub(crate) title: String,
    pub(crate) emulate: bool,
    pub(crate) lenient: bool,
    pub(crate) nodes: Vec<Test>,
    pub(crate) roots: Vec<TestId>,
    pub(crate) index: HashMap<String, TestId>,
    pub(crate) started_at: Option<DateTime<FixedOffset>>,
    pub(crate) ended_at: Option<DateTime<FixedOffset>>,
    pub(crate) capture_started_at: DateTime<Utc>,
    pub(crate) capture_ended_at: Option<DateTime<Utc>>,
    pub(crate) output_count: usize,
    pub(crate) prev_ts: Option<DateTime<FixedOffset>>,
}

impl TestCapture {
    /// Create an empty capture, stamping the wall-clock start.
    pub fn new(options: CaptureOptions) -> Self {
        Self::new_at(options, Utc::now())
    }

    pub(crate) fn new_at(options: CaptureOptions, now: DateTime<Utc>) -> Self {
        Self {
            title: options.title,
            emulate: options.emulate,
            lenient: options.lenient,
            nodes: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
            started_at: None,
            ended_at: None,
            capture_started_at: now,
            capture_ended_at: None,
            output_count: 0,
            prev_ts: None,
        }
    }

    /// Caller-supplied title for this run.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Root nodes in the order their packages first appeared.
    pub fn roots(&self) -> impl Iterator<Item = &Test> {
        self.roots.iter().map(|id| &self.nodes[id.0])
    }

    pub fn root_ids(&self) -> &[TestId] {
        &self.roots
    }

    pub fn get(&self, id: TestId) -> Option<&Test> {
        self.nodes.get(id.0)
    }

    /// Resolve a full name (package or slash-path) to its node.
    pub fn find(&self, full_name: &str) -> Option<&Test> {
        self.index.get(full_name).map(|id| &self.nodes[id.0])
    }

    /// Total number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Earliest event timestamp seen, across all actions.
    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        self.started_at
    }

    /// Latest event timestamp seen, across all actions.
    pub fn ended_at(&self) -> Option<DateTime<FixedOffset>> {
        self.ended_at
    }

    /// Wall-clock time this capture was created.
    pub fn capture_started_at(&self) -> DateTime<Utc> {
        self.capture_started_at
    }

    /// Wall-clock time ingestion finished; `None` while still running.
    pub fn capture_ended_at(&self) -> Option<DateTime<Utc>> {
        self.capture_ended_at
    }

    /// The combined console output of a subtree, in original emission
    /// order.
    ///
    /// Gathers the node's own output records plus every descendant's,
    /// sorts by the capture-wide emission index, and concatenates. Tree
    /// order would not do: a runner interleaves parent and child output,
    /// and only the emission index reflects that interleaving.
    pub fn full_output(&self, id: TestId) -> String {
        let mut records: Vec<&Output> = Vec::new();
        self.collect_output(id, &mut records);
        records.sort_by_key(|o| o.index);
        records.iter().map(|o| o.text.as_str()).collect()
    }

    fn collect_output<'a>(&'a self, id: TestId, records: &mut Vec<&'a Output>) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        records.extend(node.output.iter());
        for child in &node.children {
            self.collect_output(*child, records);
        }
    }
}

// JSON export in the shape consumed by the report renderer: roots under
// "tests", each node nesting its children under "tests" (always present,
// possibly empty), elapsed in nanoseconds.

struct TestRef<'a> {
    capture: &'a TestCapture,
    test: &'a Test,
}

impl Serialize for TestRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let t = self.test;
        let mut s = serializer.serialize_struct("Test", 11)?;
        s.serialize_field("index", &t.index())?;
        s.serialize_field("started_at", &t.started_at)?;
        s.serialize_field("ended_at", &t.ended_at)?;
        s.serialize_field("full_name", &t.full_name)?;
        s.serialize_field("package", &t.package)?;
        s.serialize_field("output", &t.output)?;
        s.serialize_field("done", &t.done)?;
        s.serialize_field("skipped", &t.skipped)?;
        s.serialize_field("passed", &t.passed)?;
        s.serialize_field("elapsed", &elapsed_nanos(t.elapsed))?;
        let children: Vec<TestRef<'_>> = t
            .children
            .iter()
            .filter_map(|id| self.capture.get(*id))
            .map(|test| TestRef {
                capture: self.capture,
                test,
            })
            .collect();
        s.serialize_field("tests", &children)?;
        s.end()
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Output", 2)?;
        s.serialize_field("index", &self.index)?;
        s.serialize_field("text", &self.text)?;
        s.end()
    }
}

impl Serialize for TestCapture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TestCapture", 6)?;
        let roots: Vec<TestRef<'_>> = self
            .roots
            .iter()
            .filter_map(|id| self.get(*id))
            .map(|test| TestRef {
                capture: self,
                test,
            })
            .collect();
        s.serialize_field("tests", &roots)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("started_at", &self.started_at)?;
        s.serialize_field("ended_at", &self.ended_at)?;
        s.serialize_field("capture_started_at", &self.capture_started_at)?;
        s.serialize_field("capture_ended_at", &self.capture_ended_at)?;
        s.end()
    }
}

fn elapsed_nanos(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
