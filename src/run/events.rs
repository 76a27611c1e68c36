//! Lifecycle events emitted while a suite run is decoded
//!
//! Events flow through a channel owned by the run session; whoever holds
//! the receiver is the presentation layer.

use crate::model::TestStatus;

/// An event surfaced to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A test has started executing
    TestStart { path: String },
    /// A test finished with a terminal outcome
    TestEnd {
        path: String,
        status: TestStatus,
        /// Coarse human estimate of the time left in the run
        remaining: String,
    },
    /// A leaf's stored result changed; look it up by path for the details
    StatusUpdate { path: String },
    /// Suite-level chatter outside any test, e.g. collection progress
    TestStatusUpdate { text: String },
    /// The suite ran to completion, with diagnostic text if any appeared
    SuiteEnd { error: Option<String> },
    /// The runner died before reporting suite completion
    SuiteError { error: String },
}
