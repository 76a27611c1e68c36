//! Data model for the test suite tree

pub mod path;
pub mod tree;

pub use path::PathCodec;
pub use tree::{TestFilter, TestNode, TestTree};

/// The kind of node a path segment resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A container that may nest: directory, file or python module
    Module,
    /// A container grouping test methods, typically a class
    Case,
    /// A leaf the framework actually executes
    Method,
}

/// Terminal outcome of a test method
///
/// Declaration order is ascending severity; aggregating sub-results keeps
/// the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestStatus {
    Pass,
    Skip,
    ExpectedFail,
    UnexpectedSuccess,
    Fail,
    Error,
}

impl TestStatus {
    /// Statuses that count as failing for the problem view
    pub const FAILING: [TestStatus; 3] = [
        TestStatus::UnexpectedSuccess,
        TestStatus::Fail,
        TestStatus::Error,
    ];

    pub fn is_failing(self) -> bool {
        Self::FAILING.contains(&self)
    }

    /// Human label used in summaries
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Pass => "passed",
            TestStatus::Skip => "skipped",
            TestStatus::ExpectedFail => "expected failures",
            TestStatus::UnexpectedSuccess => "unexpected successes",
            TestStatus::Fail => "failures",
            TestStatus::Error => "errors",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
