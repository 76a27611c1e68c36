//! Test identifier codecs
//!
//! Each test framework encodes the position of a test in its own identifier
//! scheme. A codec splits an identifier into ordered (kind, label) segments
//! for tree insertion and joins labels back into an identifier the framework
//! accepts.
//!
//! Joining is not guaranteed to invert splitting exactly: the module-path
//! scheme cannot tell a directory from a file after the fact, so a bare
//! module identifier re-joins without `::` markers. Within one tree the
//! stored paths are canonical and consistent.

use super::NodeKind;

/// Splits framework test identifiers and joins them back
///
/// `split` is total: any input yields at least one segment, with segments
/// that cannot be classified degrading to `Module`.
pub trait PathCodec: Send + Sync {
    /// Split an identifier into ordered (kind, label) segments
    fn split(&self, test_id: &str) -> Vec<(NodeKind, String)>;

    /// Join a child label onto its parent path
    fn join(&self, parent: Option<&str>, kind: NodeKind, label: &str) -> String;
}

/// Dot-separated identifiers: `pkg.module.TestCase.test_method`
///
/// The last two segments are the case and method; everything before them
/// is a module. A single-segment identifier is kept as a module.
pub struct DottedPathCodec;

impl PathCodec for DottedPathCodec {
    fn split(&self, test_id: &str) -> Vec<(NodeKind, String)> {
        let parts: Vec<&str> = test_id.split('.').collect();
        if parts.len() < 2 {
            return parts
                .into_iter()
                .map(|p| (NodeKind::Module, p.to_string()))
                .collect();
        }

        let mut segments: Vec<(NodeKind, String)> = parts[..parts.len() - 2]
            .iter()
            .map(|p| (NodeKind::Module, p.to_string()))
            .collect();
        segments.push((NodeKind::Case, parts[parts.len() - 2].to_string()));
        segments.push((NodeKind::Method, parts[parts.len() - 1].to_string()));
        segments
    }

    fn join(&self, parent: Option<&str>, _kind: NodeKind, label: &str) -> String {
        match parent {
            None => label.to_string(),
            Some(parent) => format!("{}.{}", parent, label),
        }
    }
}

/// Slash and `::`-separated identifiers:
/// `top_dir/test_file.py::TestCase::test_method`
///
/// Directory segments split on either slash style since discovery on
/// Windows reports unix-style paths. The trailing segment carries the file
/// plus up to two `::`-separated components.
pub struct ModulePathCodec;

impl PathCodec for ModulePathCodec {
    fn split(&self, test_id: &str) -> Vec<(NodeKind, String)> {
        let dirparts: Vec<&str> = test_id.split(['/', '\\']).collect();

        let mut segments: Vec<(NodeKind, String)> = dirparts[..dirparts.len() - 1]
            .iter()
            .map(|p| (NodeKind::Module, p.to_string()))
            .collect();

        let pathparts: Vec<&str> = dirparts[dirparts.len() - 1].split("::").collect();
        match pathparts.as_slice() {
            [module] => segments.push((NodeKind::Module, module.to_string())),
            [module, method] => {
                segments.push((NodeKind::Module, module.to_string()));
                segments.push((NodeKind::Method, method.to_string()));
            }
            [module, middle @ .., method] => {
                segments.push((NodeKind::Module, module.to_string()));
                for case in middle {
                    segments.push((NodeKind::Case, case.to_string()));
                }
                segments.push((NodeKind::Method, method.to_string()));
            }
            [] => segments.push((NodeKind::Module, String::new())),
        }
        segments
    }

    fn join(&self, parent: Option<&str>, kind: NodeKind, label: &str) -> String {
        let Some(parent) = parent else {
            return label.to_string();
        };
        match kind {
            NodeKind::Module => format!("{}/{}", parent, label),
            NodeKind::Case | NodeKind::Method => format!("{}::{}", parent, label),
        }
    }
}
