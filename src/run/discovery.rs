//! Suite discovery
//!
//! Discovery runs the framework's listing command and feeds every reported
//! identifier into the tree, creating any missing ancestors along the way.

use std::process::Stdio;

use tokio::process::Command;

use crate::common::{Error, Result};
use crate::framework::TestFramework;
use crate::model::tree::TestTree;

/// What a discovery pass found
#[derive(Debug)]
pub struct DiscoveryReport {
    /// Count of identifiers fed into the tree
    pub discovered: usize,
    /// Diagnostic output captured alongside a nonetheless usable listing
    pub warnings: Vec<String>,
}

/// Discover the suite and populate `tree`.
///
/// Diagnostic output with no tests at all fails with
/// [`Error::SuiteDiscoveryFailed`]; diagnostic output alongside tests is
/// returned as warnings so the caller can decide to retry or ignore.
pub async fn discover(framework: &dyn TestFramework, tree: &mut TestTree) -> Result<DiscoveryReport> {
    let argv = framework.discover_command();
    tracing::debug!(command = ?argv, "discovering tests");
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::Config("framework produced an empty command line".into()))?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::spawn_failed(&argv, &e))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut discovered = 0;
    for line in stdout.lines() {
        let test_id = line.trim();
        if test_id.is_empty() {
            continue;
        }
        tree.put(test_id);
        discovered += 1;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let warnings: Vec<String> = stderr
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if discovered == 0 && !warnings.is_empty() {
        return Err(Error::SuiteDiscoveryFailed(warnings.join("\n")));
    }

    tracing::info!(discovered, warnings = warnings.len(), "suite discovered");
    Ok(DiscoveryReport {
        discovered,
        warnings,
    })
}
