// SPDX-License-Identifier: MIT

//! The capture engine: applies decoded events to the test tree.
//!
//! Driven synchronously by the caller, one event at a time. A violating
//! event is returned as an error without touching the tree, so the caller
//! may abort (the default ingestion behavior) or skip and continue.

use crate::clock::{Clock, SystemClock};
use crate::decoder::EventDecoder;
use crate::error::{CaptureError, ProtocolViolation};
use crate::event::{TestAction, TestEvent};
use crate::tree::{Output, TestCapture, TestId};
use std::io::BufRead;
use std::time::Duration;

/// Engine configuration. The input source and output sink are owned by
/// the caller; these are the engine's only knobs.
#[derive(Clone, Debug, Default)]
pub struct CaptureOptions {
    /// Caller-supplied title carried on the capture
    pub title: String,

    /// Replay original inter-event timing while ingesting
    pub emulate: bool,

    /// Skip malformed lines and protocol violations instead of aborting
    pub lenient: bool,
}

impl TestCapture {
    /// Apply one decoded event.
    ///
    /// The event's timestamp widens the capture's time span whether or
    /// not the event is valid. On a protocol violation the tree itself
    /// is untouched and the pacing reference stays at the last accepted
    /// event.
    pub fn apply(&mut self, event: &TestEvent) -> Result<(), ProtocolViolation> {
        if let Some(ts) = event.time {
            self.started_at = Some(self.started_at.map_or(ts, |t| t.min(ts)));
            self.ended_at = Some(self.ended_at.map_or(ts, |t| t.max(ts)));
        }

        match event.action {
            TestAction::Start => {
                if self.index.contains_key(&event.package) {
                    return Err(ProtocolViolation::DuplicateStart {
                        package: event.package.clone(),
                    });
                }
                let id = self.new_test(None, event.package.clone(), event);
                self.index.insert(event.package.clone(), id);
                self.roots.push(id);
            }
            TestAction::Run => {
                if event.test.is_empty() {
                    return Err(ProtocolViolation::MissingTestName {
                        package: event.package.clone(),
                    });
                }
                let parent = self.resolve(event).ok_or_else(|| unknown_target(event))?;
                if self.nodes[parent.0].full_name == event.test {
                    return Err(ProtocolViolation::DuplicateRun {
                        test: event.test.clone(),
                    });
                }
                let id = self.new_test(Some(parent), event.test.clone(), event);
                self.index.insert(event.test.clone(), id);
                self.nodes[parent.0].children.push(id);
            }
            TestAction::Output => {
                let target = self.resolve(event).ok_or_else(|| unknown_target(event))?;
                let record = Output {
                    index: self.output_count,
                    text: event.output.clone(),
                };
                self.output_count += 1;
                self.nodes[target.0].output.push(record);
            }
            TestAction::Pass | TestAction::Fail | TestAction::Skip => {
                let target = self.resolve(event).ok_or_else(|| unknown_target(event))?;
                let node = &mut self.nodes[target.0];
                // A repeated terminal event overwrites the previous state.
                node.done = true;
                node.passed = event.action == TestAction::Pass;
                node.skipped = event.action == TestAction::Skip;
                node.elapsed = event.duration();
                node.ended_at = event.time;
            }
            TestAction::Pause | TestAction::Cont | TestAction::Bench => {}
        }

        self.prev_ts = event.time;
        Ok(())
    }

    /// Resolve an event to its target node: the exact test name if
    /// registered, else the node one path segment up, else the package
    /// root. `None` when the package itself is unknown.
    fn resolve(&self, event: &TestEvent) -> Option<TestId> {
        let root = *self.index.get(&event.package)?;
        if !event.test.is_empty() {
            if let Some(id) = self.index.get(&event.test) {
                return Some(*id);
            }
            if let Some(parent) = event.parent_name() {
                if let Some(id) = self.index.get(parent) {
                    return Some(*id);
                }
            }
        }
        Some(root)
    }

    fn new_test(&mut self, parent: Option<TestId>, full_name: String, event: &TestEvent) -> TestId {
        let id = TestId(self.nodes.len());
        self.nodes.push(crate::tree::Test {
            full_name,
            package: event.package.clone(),
            id,
            parent,
            children: Vec::new(),
            output: Vec::new(),
            done: false,
            passed: false,
            skipped: false,
            started_at: event.time,
            ended_at: None,
            elapsed: Duration::ZERO,
        });
        id
    }

    /// How long emulate mode should pause before this event is handed
    /// back to the caller. Zero or absent timestamps carry no delay
    /// information.
    fn emulate_delay(&self, event: &TestEvent) -> Option<Duration> {
        if !self.emulate {
            return None;
        }
        let prev = self.prev_ts?;
        let current = event.time?;
        (current - prev)
            .to_std()
            .ok()
            .filter(|d| *d > Duration::ZERO)
    }
}

fn unknown_target(event: &TestEvent) -> ProtocolViolation {
    let name = if event.test.is_empty() {
        event.package.clone()
    } else {
        event.test.clone()
    };
    ProtocolViolation::UnknownTarget {
        action: event.action,
        name,
    }
}

/// Ingest a whole event stream into a fresh capture.
///
/// Fail-fast by default: the first malformed line or protocol violation
/// aborts the attempt. With [`CaptureOptions::lenient`] both are skipped.
/// Clean end of stream yields the capture reflecting everything seen.
pub fn read<R: BufRead>(reader: R, options: CaptureOptions) -> Result<TestCapture, CaptureError> {
    read_with_clock(reader, options, &SystemClock)
}

/// [`read`] with an explicit clock, used by emulate-mode consumers and
/// tests that control time.
pub fn read_with_clock<R, C>(
    reader: R,
    options: CaptureOptions,
    clock: &C,
) -> Result<TestCapture, CaptureError>
where
    R: BufRead,
    C: Clock,
{
    let mut capture = TestCapture::new_at(options, clock.now());
    for decoded in EventDecoder::new(reader) {
        let event = match decoded {
            Ok(event) => event,
            Err(_) if capture.lenient => continue,
            Err(err) => return Err(err.into()),
        };

        let delay = capture.emulate_delay(&event);
        match capture.apply(&event) {
            Ok(()) => {
                if let Some(delay) = delay {
                    clock.sleep(delay);
                }
            }
            Err(_) if capture.lenient => {}
            Err(violation) => return Err(violation.into()),
        }
    }
    capture.capture_ended_at = Some(clock.now());
    Ok(capture)
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
