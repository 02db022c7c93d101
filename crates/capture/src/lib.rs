// SPDX-License-Identifier: MIT

//! Reconstruction of test runs from `go test -json` event streams.
//!
//! Feed a newline-delimited JSON event stream (the shape emitted by
//! `go test -json` / `test2json`) through [`read`] and get back a
//! [`TestCapture`]: the forest of packages, tests and nested subtests,
//! their outcomes and timing, and the exact interleaved output each one
//! produced. Consumers (a terminal browser, a report renderer) only read
//! the resulting tree.
//!
//! ```no_run
//! use std::io::BufReader;
//!
//! let file = std::fs::File::open("test.log")?;
//! let capture = testtrail_capture::read(
//!     BufReader::new(file),
//!     testtrail_capture::CaptureOptions::default(),
//! )?;
//! for root in capture.roots() {
//!     println!("{}: passed={}", root.name(), root.passed());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod capture;
mod clock;
mod decoder;
mod error;
mod event;
mod tree;

pub use capture::{read, read_with_clock, CaptureOptions};
pub use clock::{Clock, FakeClock, SystemClock};
pub use decoder::EventDecoder;
pub use error::{CaptureError, DecodeError, ProtocolViolation};
pub use event::{TestAction, TestEvent};
pub use tree::{Output, Test, TestCapture, TestId};
