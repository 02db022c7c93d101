// SPDX-License-Identifier: MIT

//! Wire model for `go test -json` event records.
//!
//! Field names and action values follow the format documented at
//! <https://pkg.go.dev/cmd/test2json>.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Action reported by a single test event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestAction {
    /// The test binary is about to be executed
    Start,
    /// The test has started running
    Run,
    /// The test has been paused
    Pause,
    /// The test has continued running
    Cont,
    /// The test passed
    Pass,
    /// The benchmark printed log output but did not fail
    Bench,
    /// The test or benchmark failed
    Fail,
    /// The test printed output
    Output,
    /// The test was skipped or the package contained no tests
    Skip,
}

impl TestAction {
    /// The wire string for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            TestAction::Start => "start",
            TestAction::Run => "run",
            TestAction::Pause => "pause",
            TestAction::Cont => "cont",
            TestAction::Pass => "pass",
            TestAction::Bench => "bench",
            TestAction::Fail => "fail",
            TestAction::Output => "output",
            TestAction::Skip => "skip",
        }
    }

    /// Whether this action ends a test's active lifetime.
    pub fn is_terminal(self) -> bool {
        matches!(self, TestAction::Pass | TestAction::Fail | TestAction::Skip)
    }
}

impl fmt::Display for TestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded test event, ephemeral: consumed by the capture engine and
/// dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestEvent {
    /// Event timestamp; absent or zero for some synthesized events
    #[serde(default)]
    pub time: Option<DateTime<FixedOffset>>,

    /// What happened
    pub action: TestAction,

    /// Test binary/package identifier
    #[serde(default)]
    pub package: String,

    /// Slash-separated test path; empty for package-level events
    #[serde(default)]
    pub test: String,

    /// Reported seconds, meaningful only on terminal actions
    #[serde(default)]
    pub elapsed: f64,

    /// Raw text, meaningful only on the output action
    #[serde(default)]
    pub output: String,
}

impl TestEvent {
    /// Name of the enclosing test, obtained by dropping the last path
    /// segment. `None` when the event names a top-level test or no test
    /// at all.
    pub fn parent_name(&self) -> Option<&str> {
        self.test.rsplit_once('/').map(|(parent, _)| parent)
    }

    /// Reported elapsed seconds as a `Duration`. Non-finite or negative
    /// values collapse to zero.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.elapsed).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
