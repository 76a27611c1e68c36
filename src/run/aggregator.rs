//! Running result counts and the failing-test projection

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::path::PathCodec;
use crate::model::tree::{MethodNode, TestNode, TestTree};
use crate::model::TestStatus;

/// Tracks per-status counts and maintains the problems tree
///
/// The problems tree is an independent tree holding only the currently
/// failing tests: failing outcomes upsert a copy of the leaf's result,
/// passing outcomes remove it again.
pub struct ResultAggregator {
    counts: BTreeMap<TestStatus, usize>,
    problems: TestTree,
}

impl ResultAggregator {
    pub fn new(codec: Arc<dyn PathCodec>) -> Self {
        Self {
            counts: BTreeMap::new(),
            problems: TestTree::new(codec),
        }
    }

    /// Record one terminal outcome and keep the problems tree in sync
    pub fn record(&mut self, leaf: &MethodNode) {
        let Some(status) = leaf.status() else {
            return;
        };
        *self.counts.entry(status).or_insert(0) += 1;

        if status.is_failing() {
            if let TestNode::Leaf(problem) = self.problems.put(leaf.path()) {
                problem.set_result(
                    leaf.description(),
                    status,
                    Some(leaf.output()),
                    leaf.error(),
                    leaf.duration(),
                );
            }
        } else {
            self.problems.delete(leaf.path());
        }
    }

    /// Count recorded for one status
    pub fn count(&self, status: TestStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// All non-zero counts in severity order
    pub fn counts(&self) -> &BTreeMap<TestStatus, usize> {
        &self.counts
    }

    /// Total outcomes in the failing states
    pub fn any_failing(&self) -> usize {
        TestStatus::FAILING
            .iter()
            .map(|status| self.count(*status))
            .sum()
    }

    /// The tree of currently failing tests
    pub fn problems(&self) -> &TestTree {
        &self.problems
    }
}

/// Render a duration in seconds as a coarse human string, truncating down
pub fn format_remaining(duration: f64) -> String {
    let secs = duration as u64;
    if secs > 4800 {
        format!("{} hours", secs / 2400)
    } else if secs > 2400 {
        format!("{} hour", secs / 2400)
    } else if secs > 120 {
        format!("{} mins", secs / 60)
    } else if secs > 60 {
        format!("{} min", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
