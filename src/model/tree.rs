//! The mutable test suite tree
//!
//! The tree itself is the suite root: unnamed, pathless, holding the
//! top-level modules. Containers (modules and cases) and method leaves hang
//! below it, keyed by label in lexicographic order.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common::{Error, Result};

use super::path::PathCodec;
use super::{NodeKind, TestStatus};

/// A node in the suite tree: a container or a method leaf
#[derive(Debug)]
pub enum TestNode {
    Container(ContainerNode),
    Leaf(MethodNode),
}

impl TestNode {
    fn new(kind: NodeKind, path: String, name: String) -> Self {
        match kind {
            NodeKind::Method => TestNode::Leaf(MethodNode::new(path, name)),
            kind => TestNode::Container(ContainerNode::new(kind, path, name)),
        }
    }

    /// Canonical identifier; immutable once the node exists
    pub fn path(&self) -> &str {
        match self {
            TestNode::Container(c) => &c.path,
            TestNode::Leaf(m) => &m.path,
        }
    }

    /// The node's own label, the last path component
    pub fn name(&self) -> &str {
        match self {
            TestNode::Container(c) => &c.name,
            TestNode::Leaf(m) => &m.name,
        }
    }

    pub fn active(&self) -> bool {
        match self {
            TestNode::Container(c) => c.active,
            TestNode::Leaf(m) => m.active,
        }
    }

    /// Force the active flag over this whole subtree
    fn apply_active(&mut self, active: bool) {
        match self {
            TestNode::Leaf(m) => m.active = active,
            TestNode::Container(c) => {
                c.active = active;
                for child in c.children.values_mut() {
                    child.apply_active(active);
                }
            }
        }
    }
}

/// A module or case grouping other nodes
#[derive(Debug)]
pub struct ContainerNode {
    kind: NodeKind,
    path: String,
    name: String,
    active: bool,
    children: BTreeMap<String, TestNode>,
}

impl ContainerNode {
    fn new(kind: NodeKind, path: String, name: String) -> Self {
        Self {
            kind,
            path,
            name,
            active: true,
            children: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn children(&self) -> impl Iterator<Item = &TestNode> {
        self.children.values()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A test method and the results of its last execution
#[derive(Debug)]
pub struct MethodNode {
    path: String,
    name: String,
    active: bool,
    description: String,
    status: Option<TestStatus>,
    output: String,
    error: String,
    duration: Option<f64>,
}

impl MethodNode {
    fn new(path: String, name: String) -> Self {
        Self {
            path,
            name,
            active: true,
            description: String::new(),
            status: None,
            output: String::new(),
            error: String::new(),
            duration: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Status of the last run; None until the method has reported one
    pub fn status(&self) -> Option<TestStatus> {
        self.status
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Append captured output, newline-joined onto what is already stored
    pub fn add_output(&mut self, text: &str) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output.push_str(text.trim_end_matches('\n'));
    }

    /// Store the outcome of one execution
    ///
    /// Output accumulates across calls; error text is replaced.
    pub fn set_result(
        &mut self,
        description: &str,
        status: TestStatus,
        output: Option<&str>,
        error: &str,
        duration: Option<f64>,
    ) {
        self.description = description.to_string();
        self.status = Some(status);
        if let Some(output) = output {
            if !output.is_empty() {
                self.add_output(output);
            }
        }
        self.error = error.to_string();
        self.duration = duration;
    }
}

/// Search criteria for [`TestTree::find_tests`]
#[derive(Debug, Clone)]
pub struct TestFilter {
    /// Only consider nodes whose active flag is set
    pub active_only: bool,
    /// Restrict to leaves whose last status is in this set
    pub statuses: Option<Vec<TestStatus>>,
    /// Restrict to these subtrees (exact node paths)
    pub labels: Option<Vec<String>>,
    /// Disable the whole-subtree shortcut and enumerate every leaf
    pub allow_all: bool,
}

impl Default for TestFilter {
    fn default() -> Self {
        Self {
            active_only: true,
            statuses: None,
            labels: None,
            allow_all: false,
        }
    }
}

/// The suite tree
pub struct TestTree {
    codec: Arc<dyn PathCodec>,
    children: BTreeMap<String, TestNode>,
}

impl TestTree {
    pub fn new(codec: Arc<dyn PathCodec>) -> Self {
        Self {
            codec,
            children: BTreeMap::new(),
        }
    }

    /// The codec this tree splits and joins identifiers with
    pub fn codec(&self) -> Arc<dyn PathCodec> {
        Arc::clone(&self.codec)
    }

    /// Top-level nodes in label order
    pub fn children(&self) -> impl Iterator<Item = &TestNode> {
        self.children.values()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Count of method leaves in the whole tree
    pub fn leaf_count(&self) -> usize {
        fn count(children: &BTreeMap<String, TestNode>) -> usize {
            children
                .values()
                .map(|child| match child {
                    TestNode::Leaf(_) => 1,
                    TestNode::Container(c) => count(&c.children),
                })
                .sum()
        }
        count(&self.children)
    }

    /// Idempotent insert: ensure a node exists for `test_id`, creating all
    /// missing ancestors, and return it.
    pub fn put(&mut self, test_id: &str) -> &mut TestNode {
        let mut segments = self.codec.split(test_id).into_iter().peekable();
        let codec = Arc::clone(&self.codec);
        let mut parent_path: Option<String> = None;
        let mut children = &mut self.children;

        while let Some((kind, label)) = segments.next() {
            let path = codec.join(parent_path.as_deref(), kind, &label);
            let node = children.entry(label.clone()).or_insert_with(|| {
                tracing::debug!(path = %path, ?kind, "inserting test node");
                TestNode::new(kind, path, label)
            });
            if segments.peek().is_none() {
                return node;
            }
            parent_path = Some(node.path().to_string());
            match node {
                TestNode::Container(container) => children = &mut container.children,
                // The id walks through a method; nothing nests below one.
                leaf => return leaf,
            }
        }
        unreachable!("path codecs yield at least one segment")
    }

    /// Remove the node for `test_id` and prune ancestors left empty,
    /// stopping at the first ancestor that still has children.
    ///
    /// Unknown ids are ignored.
    pub fn delete(&mut self, test_id: &str) {
        let labels: Vec<String> = self
            .codec
            .split(test_id)
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        Self::delete_in(&mut self.children, &labels);
    }

    fn delete_in(children: &mut BTreeMap<String, TestNode>, labels: &[String]) {
        let Some((label, rest)) = labels.split_first() else {
            return;
        };
        if rest.is_empty() {
            children.remove(label);
            return;
        }
        let Some(TestNode::Container(container)) = children.get_mut(label) else {
            return;
        };
        Self::delete_in(&mut container.children, rest);
        if container.children.is_empty() {
            children.remove(label);
        }
    }

    /// Exact lookup by walking the split identifier
    pub fn find(&self, test_id: &str) -> Result<&TestNode> {
        let segments = self.codec.split(test_id);
        let mut children = &self.children;
        let mut found: Option<&TestNode> = None;
        for (i, (_, label)) in segments.iter().enumerate() {
            let child = children
                .get(label)
                .ok_or_else(|| Error::NotFound(test_id.to_string()))?;
            if i + 1 < segments.len() {
                match child {
                    TestNode::Container(c) => children = &c.children,
                    TestNode::Leaf(_) => return Err(Error::NotFound(test_id.to_string())),
                }
            }
            found = Some(child);
        }
        found.ok_or_else(|| Error::NotFound(test_id.to_string()))
    }

    /// Exact lookup returning a mutable method leaf
    pub fn find_method_mut(&mut self, test_id: &str) -> Result<&mut MethodNode> {
        let segments = self.codec.split(test_id);
        let mut children = &mut self.children;
        let mut iter = segments.into_iter().peekable();
        while let Some((_, label)) = iter.next() {
            let child = children
                .get_mut(&label)
                .ok_or_else(|| Error::NotFound(test_id.to_string()))?;
            match child {
                TestNode::Container(c) if iter.peek().is_some() => children = &mut c.children,
                TestNode::Leaf(m) if iter.peek().is_none() => return Ok(m),
                _ => return Err(Error::NotFound(test_id.to_string())),
            }
        }
        Err(Error::NotFound(test_id.to_string()))
    }

    /// Every method leaf whose path contains `fragment`, in pre-order
    ///
    /// Recovery path for frameworks that report truncated identifiers.
    pub fn find_by_substring(&self, fragment: &str) -> Vec<String> {
        fn walk(children: &BTreeMap<String, TestNode>, fragment: &str, out: &mut Vec<String>) {
            for child in children.values() {
                match child {
                    TestNode::Leaf(m) => {
                        if m.path.contains(fragment) {
                            out.push(m.path.clone());
                        }
                    }
                    TestNode::Container(c) => walk(&c.children, fragment, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, fragment, &mut out);
        out
    }

    /// Activate the node for `test_id`, its descendants and its ancestors
    pub fn activate(&mut self, test_id: &str) -> Result<()> {
        self.set_active(test_id, true)
    }

    /// Deactivate the node for `test_id` and its descendants; ancestors
    /// left without any active child deactivate too.
    pub fn deactivate(&mut self, test_id: &str) -> Result<()> {
        self.set_active(test_id, false)
    }

    /// Set the active flag with full cascade semantics
    ///
    /// The flag is forced over the target's subtree; on the way back up
    /// every ancestor recomputes its own flag from its children, which
    /// leaves an ancestor active exactly when at least one child is.
    pub fn set_active(&mut self, test_id: &str, active: bool) -> Result<()> {
        let labels: Vec<String> = self
            .codec
            .split(test_id)
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        Self::set_active_in(&mut self.children, &labels, active)
            .ok_or_else(|| Error::NotFound(test_id.to_string()))
    }

    fn set_active_in(
        children: &mut BTreeMap<String, TestNode>,
        labels: &[String],
        active: bool,
    ) -> Option<()> {
        let (label, rest) = labels.split_first()?;
        let node = children.get_mut(label)?;
        if rest.is_empty() {
            node.apply_active(active);
            return Some(());
        }
        let TestNode::Container(container) = node else {
            return None;
        };
        Self::set_active_in(&mut container.children, rest, active)?;
        container.active = container.children.values().any(|child| child.active());
        Some(())
    }

    /// Find the leaves matching `filter`.
    ///
    /// Returns the match count and the minimal set of paths covering
    /// exactly the matching leaves: a fully-matching subtree is represented
    /// by its root path, and a selection of `None` means every leaf under
    /// the suite root matched, so the run needs no narrowing at all. With
    /// `allow_all` the shortcut is disabled and every matching leaf is
    /// listed individually.
    ///
    /// A subtree contributing zero matches is treated as an exclusion, so a
    /// zero-count result is always an explicit (possibly empty) list.
    pub fn find_tests(&self, filter: &TestFilter) -> (usize, Option<Vec<String>>) {
        let (count, selection) = Self::find_in(&self.children, filter);
        if count == 0 {
            return (0, Some(selection.unwrap_or_default()));
        }
        (count, selection)
    }

    fn find_in(
        children: &BTreeMap<String, TestNode>,
        filter: &TestFilter,
    ) -> (usize, Option<Vec<String>>) {
        let mut count = 0;
        let mut tests = Vec::new();
        let mut found_partial = false;

        for child in children.values() {
            if filter.active_only && !child.active() {
                // An inactive child makes this node a partial selection.
                found_partial = true;
                continue;
            }

            let (subcount, subtests) = match child {
                TestNode::Leaf(method) => Self::match_leaf(method, filter),
                TestNode::Container(container) => {
                    let targeted = filter
                        .labels
                        .as_ref()
                        .is_some_and(|labels| labels.iter().any(|l| l == &container.path));
                    let result = if targeted {
                        // An exact label match selects the whole subtree;
                        // the label restriction stops applying below it.
                        let inner = TestFilter {
                            labels: None,
                            ..filter.clone()
                        };
                        Self::find_in(&container.children, &inner)
                    } else {
                        Self::find_in(&container.children, filter)
                    };
                    if result.0 == 0 {
                        // Nothing under this child matched; that is an
                        // exclusion, not a vacuous full match.
                        found_partial = true;
                        continue;
                    }
                    result
                }
            };

            count += subcount;
            match subtests {
                // The whole child subtree matched; its path covers it.
                None => tests.push(child.path().to_string()),
                Some(subtests) => {
                    found_partial = true;
                    tests.extend(subtests);
                }
            }
        }

        if !found_partial && !filter.allow_all {
            return (count, None);
        }
        (count, Some(tests))
    }

    fn match_leaf(method: &MethodNode, filter: &TestFilter) -> (usize, Option<Vec<String>>) {
        if let Some(labels) = &filter.labels {
            if !labels.iter().any(|l| l == &method.path) {
                return (0, Some(Vec::new()));
            }
        }
        if let Some(statuses) = &filter.statuses {
            match method.status {
                Some(status) if statuses.contains(&status) => {}
                _ => return (0, Some(Vec::new())),
            }
        }
        (1, None)
    }

    /// Pre-order walk handing each node and its depth to `visitor`
    pub fn visit<F>(&self, visitor: &mut F)
    where
        F: FnMut(usize, &TestNode),
    {
        fn walk<F>(children: &BTreeMap<String, TestNode>, depth: usize, visitor: &mut F)
        where
            F: FnMut(usize, &TestNode),
        {
            for child in children.values() {
                visitor(depth, child);
                if let TestNode::Container(c) = child {
                    walk(&c.children, depth + 1, visitor);
                }
            }
        }
        walk(&self.children, 0, visitor);
    }
}
