// SPDX-License-Identifier: MIT

//! Error types surfaced by the decoder and the capture engine.
//!
//! The engine never logs; both error kinds are returned to the caller of
//! the ingestion loop, which decides whether to abort or continue.

use crate::event::TestAction;
use thiserror::Error;

/// A line of input that could not be turned into a test event.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line {line_no}: invalid test event: {source}")]
    Parse {
        line_no: usize,
        line: String,
        source: serde_json::Error,
    },

    #[error("line {line_no}: read failed: {source}")]
    Io {
        line_no: usize,
        source: std::io::Error,
    },
}

impl DecodeError {
    /// 1-based number of the offending line.
    pub fn line_no(&self) -> usize {
        match self {
            DecodeError::Parse { line_no, .. } | DecodeError::Io { line_no, .. } => *line_no,
        }
    }

    /// Raw text of the offending line, when it was read successfully.
    pub fn line(&self) -> Option<&str> {
        match self {
            DecodeError::Parse { line, .. } => Some(line),
            DecodeError::Io { .. } => None,
        }
    }
}

/// A well-formed event that is invalid given the current tree state.
///
/// Returned without mutating the tree, so a caller may skip the event
/// and keep going.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("received second binary start event for: {package}")]
    DuplicateStart { package: String },

    #[error("received second run event for test: {test}")]
    DuplicateRun { test: String },

    #[error("received {action} event for unstarted test: {name}")]
    UnknownTarget { action: TestAction, name: String },

    #[error("received run event without a test name for package: {package}")]
    MissingTestName { package: String },
}

/// Failure of a whole capture attempt.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("decode test event: {0}")]
    Decode(#[from] DecodeError),

    #[error("handle test event: {0}")]
    Protocol(#[from] ProtocolViolation),
}
