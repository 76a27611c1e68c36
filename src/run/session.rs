//! The suite run state machine
//!
//! A run session wraps the runner child process, drains its output queues
//! on every poll, and decodes the line protocol into lifecycle events. The
//! session is single-threaded: the poll loop is the only place queues are
//! drained and the tree is mutated.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::common::{Error, Result};
use crate::framework::TestFramework;
use crate::model::path::PathCodec;
use crate::model::tree::TestTree;
use crate::model::TestStatus;

use super::aggregator::{format_remaining, ResultAggregator};
use super::events::RunEvent;
use super::reader::spawn_line_reader;
use super::record::{self, Record};

/// Exit-status poll and best-effort termination over the runner process
pub trait ProcessHandle: Send {
    /// The exit code, once the process has terminated
    fn poll_exit(&mut self) -> Option<i32>;

    /// Ask the process to stop; termination is not awaited
    fn terminate(&mut self);
}

impl ProcessHandle for Child {
    fn poll_exit(&mut self) -> Option<i32> {
        match self.try_wait() {
            Ok(Some(status)) => Some(status.code().unwrap_or(-1)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "exit poll failed");
                None
            }
        }
    }

    fn terminate(&mut self) {
        if let Err(e) = self.start_kill() {
            tracing::debug!(error = %e, "terminate request failed");
        }
    }
}

/// Attribution state of the decoder
#[derive(Debug)]
enum DecodeState {
    /// No test currently attributed
    Idle,
    /// Output belongs to the test at `path`
    InTest {
        path: String,
        start_time: f64,
        pending: Option<PendingOutcome>,
    },
}

/// Terminal sub-results accumulated since the current test started
///
/// Frameworks may report several inner outcomes per declared test; the
/// highest severity wins and the sub-errors concatenate.
#[derive(Debug)]
struct PendingOutcome {
    status: TestStatus,
    error: String,
    end_time: f64,
    description: Option<String>,
}

/// One execution of (a selection of) the suite
pub struct RunSession {
    process: Box<dyn ProcessHandle>,
    primary: mpsc::UnboundedReceiver<String>,
    diagnostic: mpsc::UnboundedReceiver<String>,
    primary_closed: bool,
    total_count: usize,
    completed_count: usize,
    first_start: Option<f64>,
    error_buffer: Vec<String>,
    state: DecodeState,
    aggregator: ResultAggregator,
    event_tx: mpsc::UnboundedSender<RunEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<RunEvent>>,
    done: bool,
}

impl RunSession {
    /// Spawn the framework's execution command and attach readers to it
    ///
    /// `selection` of None runs everything; otherwise the minimal covering
    /// paths from [`TestTree::find_tests`](crate::model::TestTree::find_tests).
    pub fn spawn(
        framework: &dyn TestFramework,
        total_count: usize,
        selection: Option<&[String]>,
    ) -> Result<Self> {
        let argv = framework.execute_command(selection);
        tracing::debug!(command = ?argv, "starting test run");
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Config("framework produced an empty command line".into()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::spawn_failed(&argv, &e))?;

        let stdout = child.stdout.take().ok_or_else(|| Error::SpawnFailed {
            command: argv.join(" "),
            error: "no stdout handle".into(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| Error::SpawnFailed {
            command: argv.join(" "),
            error: "no stderr handle".into(),
        })?;

        Ok(Self::new(
            Box::new(child),
            spawn_line_reader(stdout),
            spawn_line_reader(stderr),
            total_count,
            framework.codec(),
        ))
    }

    /// Assemble a session from pre-wired parts
    pub fn new(
        process: Box<dyn ProcessHandle>,
        primary: mpsc::UnboundedReceiver<String>,
        diagnostic: mpsc::UnboundedReceiver<String>,
        total_count: usize,
        codec: Arc<dyn PathCodec>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            process,
            primary,
            diagnostic,
            primary_closed: false,
            total_count,
            completed_count: 0,
            first_start: None,
            error_buffer: Vec::new(),
            state: DecodeState::Idle,
            aggregator: ResultAggregator::new(codec),
            event_tx,
            event_rx: Some(event_rx),
            done: false,
        }
    }

    /// Take the event receiver (can only be called once)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<RunEvent>> {
        self.event_rx.take()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Total outcomes in the failing states so far
    pub fn any_failing(&self) -> usize {
        self.aggregator.any_failing()
    }

    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    /// Ask the runner process to stop; polling just stops being scheduled
    pub fn terminate(&mut self) {
        self.process.terminate();
    }

    fn emit(&self, event: RunEvent) {
        // The presentation side may drop its receiver mid-run.
        let _ = self.event_tx.send(event);
    }

    fn drain(queue: &mut mpsc::UnboundedReceiver<String>, closed: &mut bool) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            match queue.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    *closed = true;
                    break;
                }
            }
        }
        lines
    }

    /// Drain queued runner output and decode it.
    ///
    /// Performs a bounded amount of work: whatever lines are queued right
    /// now. Returns true while polling should continue, false once the run
    /// has ended (suite end seen, or the process died without one).
    pub fn poll(&mut self, tree: &mut TestTree) -> Result<bool> {
        if self.done {
            return Ok(false);
        }

        // Exit status is sampled before draining so a process that dies
        // mid-cycle still gets its queued output decoded first.
        let exited = self.process.poll_exit();

        let mut diagnostic_closed = false;
        self.error_buffer
            .extend(Self::drain(&mut self.diagnostic, &mut diagnostic_closed));

        let mut primary_closed = self.primary_closed;
        let lines = Self::drain(&mut self.primary, &mut primary_closed);
        self.primary_closed = primary_closed;

        let mut finished = false;
        for line in lines {
            tracing::trace!(line = %line, "runner output");

            if record::is_separator(&line) {
                self.finalize_pending(tree);
                if line == record::END_TEST_RESULTS {
                    finished = true;
                }
                continue;
            }

            let payload = record::strip_escape_prefix(&line);
            if record::looks_structured(payload) {
                match Record::parse(payload) {
                    Ok(rec) if rec.is_end() => {
                        self.handle_end_record(tree, rec);
                        continue;
                    }
                    Ok(rec) if rec.is_start() => {
                        self.handle_start_record(tree, rec);
                        continue;
                    }
                    // Recognizable shape but no usable fields: plain output.
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(error = %e, "structured-looking line failed to parse");
                    }
                }
            }

            self.handle_plain_line(tree, line);
        }

        if finished {
            self.done = true;
            let error = (!self.error_buffer.is_empty()).then(|| self.error_buffer.join("\n"));
            tracing::debug!(completed = self.completed_count, "suite finished");
            self.emit(RunEvent::SuiteEnd { error });
            return Ok(false);
        }

        // Declaring the run dead needs both: the process is gone and the
        // primary channel is exhausted, so queued lines always win the race
        // against exit detection.
        if exited.is_some() && self.primary_closed {
            self.done = true;
            let error = if self.error_buffer.is_empty() {
                "Test output ended unexpectedly".to_string()
            } else {
                self.error_buffer.join("\n")
            };
            tracing::debug!(code = ?exited, "runner exited before suite end");
            self.emit(RunEvent::SuiteError { error });
            return Ok(false);
        }

        Ok(true)
    }

    /// Attribute subsequent output to the test named by a start record
    fn handle_start_record(&mut self, tree: &mut TestTree, rec: Record) {
        // A fresh start while a result is pending means the boundary
        // separator got lost in the stream; close out what we have.
        self.finalize_pending(tree);

        let (Some(id), Some(start_time)) = (rec.test_id(), rec.start_time) else {
            return;
        };

        match self.resolve_path(tree, id) {
            Ok(path) => {
                tracing::debug!(path = %path, "test started");
                self.emit(RunEvent::TestStart { path: path.clone() });
                self.state = DecodeState::InTest {
                    path,
                    start_time,
                    pending: None,
                };
            }
            Err(e) => {
                tracing::debug!(id = %id, error = %e, "could not attribute test start");
                self.state = DecodeState::Idle;
            }
        }
    }

    /// Exact lookup, then unique-substring recovery for truncated ids
    fn resolve_path(&self, tree: &TestTree, id: &str) -> Result<String> {
        if let Ok(node) = tree.find(id) {
            return Ok(node.path().to_string());
        }
        let matches = tree.find_by_substring(id);
        match matches.as_slice() {
            [only] => Ok(only.clone()),
            [] => Err(Error::NotFound(id.to_string())),
            _ => Err(Error::AmbiguousMatch {
                path: id.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// Fold an end record into the attributed test
    fn handle_end_record(&mut self, tree: &mut TestTree, rec: Record) {
        let DecodeState::InTest { path, pending, .. } = &mut self.state else {
            tracing::debug!("end record with no test attributed; dropping");
            return;
        };

        // Captured output rides along whether or not there is a verdict.
        if let Some(output) = rec.output.as_deref() {
            if !output.is_empty() {
                if let Ok(leaf) = tree.find_method_mut(path) {
                    leaf.add_output(output);
                }
            }
        }

        let Some(outcome) = record::classify_status(&rec) else {
            return; // live logging output
        };
        let Some(end_time) = rec.end_time else {
            return;
        };

        match pending {
            Some(p) => {
                if outcome.status > p.status {
                    p.status = outcome.status;
                }
                if let Some(error) = outcome.error.filter(|e| !e.is_empty()) {
                    if !p.error.is_empty() {
                        p.error.push_str("\n\n");
                    }
                    p.error.push_str(&error);
                }
                p.end_time = end_time;
                if rec.description.is_some() {
                    p.description = rec.description;
                }
            }
            None => {
                *pending = Some(PendingOutcome {
                    status: outcome.status,
                    error: outcome.error.unwrap_or_default(),
                    end_time,
                    description: rec.description,
                });
            }
        }
    }

    /// Close out the attributed test if a terminal outcome is pending.
    ///
    /// Always returns the decoder to Idle.
    fn finalize_pending(&mut self, tree: &mut TestTree) {
        let state = std::mem::replace(&mut self.state, DecodeState::Idle);
        let DecodeState::InTest {
            path,
            start_time,
            pending: Some(outcome),
        } = state
        else {
            return;
        };

        self.completed_count += 1;
        let duration = outcome.end_time - start_time;

        match tree.find_method_mut(&path) {
            Ok(leaf) => {
                let description = outcome
                    .description
                    .unwrap_or_else(|| leaf.name().to_string());
                leaf.set_result(&description, outcome.status, None, &outcome.error, Some(duration));
                self.aggregator.record(leaf);
            }
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "test vanished before finalization");
                return;
            }
        }

        // Rough time left: average per completed test times what remains.
        let first = *self.first_start.get_or_insert(start_time);
        let elapsed = outcome.end_time - first;
        let per_test = elapsed / self.completed_count as f64;
        let remaining_secs = per_test * self.total_count.saturating_sub(self.completed_count) as f64;
        let remaining = format_remaining(remaining_secs);

        self.emit(RunEvent::StatusUpdate { path: path.clone() });
        self.emit(RunEvent::TestEnd {
            path,
            status: outcome.status,
            remaining,
        });
    }

    /// A line that is neither separator nor record
    fn handle_plain_line(&mut self, tree: &mut TestTree, line: String) {
        match &self.state {
            DecodeState::Idle => self.emit(RunEvent::TestStatusUpdate { text: line }),
            DecodeState::InTest { path, .. } => {
                if let Ok(leaf) = tree.find_method_mut(path) {
                    leaf.add_output(&line);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::path::ModulePathCodec;
    use crate::run::record::{END_TEST_RESULTS, RESULT_SEPARATOR, START_TEST_RESULTS};

    /// Process double whose exit status the test controls
    struct FakeProcess {
        exited: Option<i32>,
    }

    impl ProcessHandle for FakeProcess {
        fn poll_exit(&mut self) -> Option<i32> {
            self.exited
        }

        fn terminate(&mut self) {}
    }

    struct Harness {
        session: RunSession,
        tree: TestTree,
        events: mpsc::UnboundedReceiver<RunEvent>,
        primary_tx: Option<mpsc::UnboundedSender<String>>,
        diagnostic_tx: Option<mpsc::UnboundedSender<String>>,
    }

    impl Harness {
        fn new(test_ids: &[&str], total_count: usize) -> Self {
            let codec: Arc<dyn PathCodec> = Arc::new(ModulePathCodec);
            let mut tree = TestTree::new(Arc::clone(&codec));
            for id in test_ids {
                tree.put(id);
            }

            let (primary_tx, primary_rx) = mpsc::unbounded_channel();
            let (diagnostic_tx, diagnostic_rx) = mpsc::unbounded_channel();
            let mut session = RunSession::new(
                Box::new(FakeProcess { exited: None }),
                primary_rx,
                diagnostic_rx,
                total_count,
                codec,
            );
            let events = session.take_event_receiver().unwrap();

            Self {
                session,
                tree,
                events,
                primary_tx: Some(primary_tx),
                diagnostic_tx: Some(diagnostic_tx),
            }
        }

        fn send(&mut self, lines: &[&str]) {
            let tx = self.primary_tx.as_ref().unwrap();
            for line in lines {
                tx.send(line.to_string()).unwrap();
            }
        }

        fn close_channels(&mut self) {
            self.primary_tx = None;
            self.diagnostic_tx = None;
        }

        fn exit_process(&mut self, code: i32) {
            self.session.process = Box::new(FakeProcess { exited: Some(code) });
        }

        fn poll(&mut self) -> bool {
            self.session.poll(&mut self.tree).unwrap()
        }

        fn drain_events(&mut self) -> Vec<RunEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                events.push(event);
            }
            events
        }
    }

    #[tokio::test]
    async fn test_end_to_end_single_pass() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"10.0"}"#,
            r#"{"description":"test_one","end_time":"10.5","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        let events = harness.drain_events();
        assert_eq!(
            events,
            vec![
                RunEvent::TestStart {
                    path: "pkg/test_a.py::test_one".to_string()
                },
                RunEvent::StatusUpdate {
                    path: "pkg/test_a.py::test_one".to_string()
                },
                RunEvent::TestEnd {
                    path: "pkg/test_a.py::test_one".to_string(),
                    status: TestStatus::Pass,
                    remaining: "0s".to_string(),
                },
                RunEvent::SuiteEnd { error: None },
            ]
        );

        let leaf = harness.tree.find_method_mut("pkg/test_a.py::test_one").unwrap();
        assert_eq!(leaf.status(), Some(TestStatus::Pass));
        assert_eq!(leaf.duration(), Some(0.5));
        assert_eq!(leaf.description(), "test_one");
    }

    #[tokio::test]
    async fn test_sub_results_keep_maximum_severity() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"1.0"}"#,
            r#"{"end_time":"1.2","status":"F","error":"assertion failed"}"#,
            r#"{"end_time":"1.4","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        let leaf = harness.tree.find_method_mut("pkg/test_a.py::test_one").unwrap();
        assert_eq!(leaf.status(), Some(TestStatus::Fail));
        assert!(leaf.error().contains("assertion failed"));

        let events = harness.drain_events();
        let ends: Vec<&RunEvent> = events
            .iter()
            .filter(|e| matches!(e, RunEvent::TestEnd { .. }))
            .collect();
        assert_eq!(ends.len(), 1);
    }

    #[tokio::test]
    async fn test_sub_errors_concatenate_blank_line_separated() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"1.0"}"#,
            r#"{"end_time":"1.2","status":"F","error":"first failure"}"#,
            r#"{"end_time":"1.4","status":"E","error":"second failure"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        let leaf = harness.tree.find_method_mut("pkg/test_a.py::test_one").unwrap();
        assert_eq!(leaf.status(), Some(TestStatus::Error));
        assert_eq!(leaf.error(), "first failure\n\nsecond failure");
    }

    #[tokio::test]
    async fn test_output_only_records_append_output() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"1.0"}"#,
            r#"{"end_time":"1.1","status":"o","output":"intermediate print"}"#,
            "bare line while running",
            r#"{"end_time":"1.2","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        let leaf = harness.tree.find_method_mut("pkg/test_a.py::test_one").unwrap();
        assert_eq!(leaf.status(), Some(TestStatus::Pass));
        assert_eq!(leaf.output(), "intermediate print\nbare line while running");
    }

    #[tokio::test]
    async fn test_substring_recovery_for_truncated_id() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_unique"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"description":"test_unique","start_time":"1.0"}"#,
            r#"{"end_time":"1.5","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        let events = harness.drain_events();
        assert!(events.contains(&RunEvent::TestStart {
            path: "pkg/test_a.py::test_unique".to_string()
        }));
    }

    #[tokio::test]
    async fn test_ambiguous_id_leaves_run_unattributed() {
        let mut harness = Harness::new(
            &["pkg/test_a.py::test_one", "pkg/test_b.py::test_one"],
            2,
        );
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"description":"test_one","start_time":"1.0"}"#,
            r#"{"end_time":"1.5","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        // The run still completes; the unattributable records are dropped.
        assert!(!harness.poll());

        let events = harness.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, RunEvent::TestStart { .. } | RunEvent::TestEnd { .. })));
        assert!(events.contains(&RunEvent::SuiteEnd { error: None }));
    }

    #[tokio::test]
    async fn test_escaped_and_malformed_lines() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            "\u{1b}[0m{\"path\":\"pkg/test_a.py::test_one\",\"start_time\":\"1.0\"}",
            "{broken json}",
            r#"{"end_time":"1.5","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        let leaf = harness.tree.find_method_mut("pkg/test_a.py::test_one").unwrap();
        // The unparseable line degraded to captured output.
        assert_eq!(leaf.output(), "{broken json}");
        assert_eq!(leaf.status(), Some(TestStatus::Pass));
    }

    #[tokio::test]
    async fn test_idle_chatter_becomes_status_updates() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&["collecting 12 items", START_TEST_RESULTS, END_TEST_RESULTS]);

        assert!(!harness.poll());

        let events = harness.drain_events();
        assert_eq!(
            events[0],
            RunEvent::TestStatusUpdate {
                text: "collecting 12 items".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unexpected_exit_emits_suite_error_once() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"1.0"}"#,
        ]);
        harness.close_channels();
        harness.exit_process(1);

        assert!(!harness.poll());
        let events = harness.drain_events();
        assert_eq!(
            events,
            vec![
                RunEvent::TestStart {
                    path: "pkg/test_a.py::test_one".to_string()
                },
                RunEvent::SuiteError {
                    error: "Test output ended unexpectedly".to_string()
                },
            ]
        );

        // Further polls stay quiet.
        assert!(!harness.poll());
        assert!(harness.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_diagnostic_lines_surface_at_suite_end() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness
            .diagnostic_tx
            .as_ref()
            .unwrap()
            .send("DeprecationWarning: old API".to_string())
            .unwrap();
        harness.send(&[START_TEST_RESULTS, END_TEST_RESULTS]);

        assert!(!harness.poll());

        let events = harness.drain_events();
        assert!(events.contains(&RunEvent::SuiteEnd {
            error: Some("DeprecationWarning: old API".to_string())
        }));
    }

    #[tokio::test]
    async fn test_queued_lines_beat_exit_detection() {
        let mut harness = Harness::new(&["pkg/test_a.py::test_one"], 1);
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"1.0"}"#,
            r#"{"end_time":"2.0","status":"OK"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);
        harness.close_channels();
        harness.exit_process(0);

        // The suite end separator is already queued, so the exit is a
        // normal completion rather than a suite error.
        assert!(!harness.poll());
        let events = harness.drain_events();
        assert!(events.contains(&RunEvent::SuiteEnd { error: None }));
        assert!(!events.iter().any(|e| matches!(e, RunEvent::SuiteError { .. })));
    }

    #[tokio::test]
    async fn test_counts_feed_aggregator() {
        let mut harness = Harness::new(
            &["pkg/test_a.py::test_one", "pkg/test_a.py::test_two"],
            2,
        );
        harness.send(&[
            START_TEST_RESULTS,
            r#"{"path":"pkg/test_a.py::test_one","start_time":"1.0"}"#,
            r#"{"end_time":"1.5","status":"OK"}"#,
            RESULT_SEPARATOR,
            r#"{"path":"pkg/test_a.py::test_two","start_time":"1.5"}"#,
            r#"{"end_time":"2.0","status":"F","error":"boom"}"#,
            RESULT_SEPARATOR,
            END_TEST_RESULTS,
        ]);

        assert!(!harness.poll());

        assert_eq!(harness.session.completed_count(), 2);
        assert_eq!(harness.session.any_failing(), 1);
        assert_eq!(harness.session.aggregator().count(TestStatus::Pass), 1);
        assert_eq!(
            harness.session.aggregator().problems().leaf_count(),
            1
        );
    }
}
