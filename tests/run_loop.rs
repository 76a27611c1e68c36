//! End-to-end tests over a real runner child process
//!
//! A scripted stand-in framework points discovery and execution at shell
//! scripts that speak the wire protocol, so the whole pipeline runs:
//! process spawn, background readers, decoding, tree updates, events.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use testdeck::framework::TestFramework;
use testdeck::model::path::{ModulePathCodec, PathCodec};
use testdeck::model::tree::TestTree;
use testdeck::run::discovery;
use testdeck::{Error, RunEvent, RunSession, TestStatus};

/// Framework double backed by generated shell scripts
struct ScriptedFramework {
    discover_script: PathBuf,
    execute_script: PathBuf,
}

impl TestFramework for ScriptedFramework {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn codec(&self) -> Arc<dyn PathCodec> {
        Arc::new(ModulePathCodec)
    }

    fn discover_command(&self) -> Vec<String> {
        vec![
            "sh".to_string(),
            self.discover_script.display().to_string(),
        ]
    }

    fn execute_command(&self, selection: Option<&[String]>) -> Vec<String> {
        let mut argv = vec!["sh".to_string(), self.execute_script.display().to_string()];
        if let Some(selection) = selection {
            argv.extend(selection.iter().cloned());
        }
        argv
    }
}

/// Scratch directory holding the scripts for one test
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn write_script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("Failed to write script");
        path
    }

    fn framework(&self, discover_body: &str, execute_body: &str) -> ScriptedFramework {
        ScriptedFramework {
            discover_script: self.write_script("discover.sh", discover_body),
            execute_script: self.write_script("execute.sh", execute_body),
        }
    }
}

/// Poll the session until the run reports completion
async fn run_to_completion(session: &mut RunSession, tree: &mut TestTree) {
    for _ in 0..500 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if !session.poll(tree).expect("poll failed") {
            return;
        }
    }
    panic!("run did not finish in time");
}

fn drain(events: &mut tokio::sync::mpsc::UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

const DISCOVER_TWO: &str = r#"printf 'pkg/test_demo.py::test_passes\n'
printf 'pkg/test_demo.py::test_fails\n'
"#;

const EXECUTE_TWO: &str = r#"printf '\002\n'
printf '{"path":"pkg/test_demo.py::test_passes","start_time":"1.0"}\n'
printf '{"description":"test_passes","end_time":"1.5","status":"OK"}\n'
printf '\037\n'
printf '{"path":"pkg/test_demo.py::test_fails","start_time":"1.5"}\n'
printf 'stray stdout from the test\n'
printf '{"description":"test_fails","end_time":"2.5","status":"F","error":"assert 1 == 2"}\n'
printf '\037\n'
printf '\003\n'
"#;

#[tokio::test]
async fn test_full_run_streams_results() {
    let context = TestContext::new();
    let framework = context.framework(DISCOVER_TWO, EXECUTE_TWO);

    let mut tree = TestTree::new(framework.codec());
    let report = discovery::discover(&framework, &mut tree)
        .await
        .expect("discovery failed");
    assert_eq!(report.discovered, 2);
    assert_eq!(tree.leaf_count(), 2);

    let mut session =
        RunSession::spawn(&framework, 2, None).expect("failed to spawn run session");
    let mut events = session.take_event_receiver().expect("receiver taken twice");

    run_to_completion(&mut session, &mut tree).await;
    let events = drain(&mut events);

    // Lifecycle events arrive in protocol order.
    let starts: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::TestStart { path } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        starts,
        vec![
            "pkg/test_demo.py::test_passes",
            "pkg/test_demo.py::test_fails"
        ]
    );
    assert!(events.contains(&RunEvent::SuiteEnd { error: None }));

    // Results landed on the leaves.
    let passed = tree
        .find_method_mut("pkg/test_demo.py::test_passes")
        .expect("leaf missing");
    assert_eq!(passed.status(), Some(TestStatus::Pass));
    assert_eq!(passed.duration(), Some(0.5));

    let failed = tree
        .find_method_mut("pkg/test_demo.py::test_fails")
        .expect("leaf missing");
    assert_eq!(failed.status(), Some(TestStatus::Fail));
    assert_eq!(failed.error(), "assert 1 == 2");
    assert_eq!(failed.output(), "stray stdout from the test");

    // And bookkeeping agrees.
    assert_eq!(session.completed_count(), 2);
    assert_eq!(session.any_failing(), 1);
    assert_eq!(session.aggregator().problems().leaf_count(), 1);
}

#[tokio::test]
async fn test_crashing_runner_surfaces_suite_error() {
    let context = TestContext::new();
    let framework = context.framework(
        DISCOVER_TWO,
        r#"printf '\002\n'
printf '{"path":"pkg/test_demo.py::test_passes","start_time":"1.0"}\n'
printf 'Traceback (most recent call last):\n' >&2
printf 'RuntimeError: runner blew up\n' >&2
exit 1
"#,
    );

    let mut tree = TestTree::new(framework.codec());
    discovery::discover(&framework, &mut tree)
        .await
        .expect("discovery failed");

    let mut session =
        RunSession::spawn(&framework, 2, None).expect("failed to spawn run session");
    let mut events = session.take_event_receiver().expect("receiver taken twice");

    run_to_completion(&mut session, &mut tree).await;
    let events = drain(&mut events);

    let errors: Vec<&RunEvent> = events
        .iter()
        .filter(|e| matches!(e, RunEvent::SuiteError { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    let RunEvent::SuiteError { error } = errors[0] else {
        unreachable!()
    };
    assert!(error.contains("RuntimeError: runner blew up"));
    assert!(!events.iter().any(|e| matches!(e, RunEvent::SuiteEnd { .. })));
}

#[tokio::test]
async fn test_selection_reaches_runner_argv() {
    let context = TestContext::new();
    // Echo the selection back as suite chatter so the test can see the
    // argv the runner received.
    let framework = context.framework(
        DISCOVER_TWO,
        r#"printf '%s\n' "args:$*"
printf '\002\n'
printf '\003\n'
"#,
    );

    let mut tree = TestTree::new(framework.codec());
    discovery::discover(&framework, &mut tree)
        .await
        .expect("discovery failed");

    let selection = vec!["pkg/test_demo.py::test_passes".to_string()];
    let mut session =
        RunSession::spawn(&framework, 1, Some(&selection)).expect("failed to spawn run session");
    let mut events = session.take_event_receiver().expect("receiver taken twice");

    run_to_completion(&mut session, &mut tree).await;
    let events = drain(&mut events);

    assert!(events.contains(&RunEvent::TestStatusUpdate {
        text: "args:pkg/test_demo.py::test_passes".to_string()
    }));
}

#[tokio::test]
async fn test_discovery_failure_is_surfaced() {
    let context = TestContext::new();
    let framework = context.framework(
        r#"printf 'ImportError: broken conftest\n' >&2
exit 2
"#,
        "exit 0\n",
    );

    let mut tree = TestTree::new(framework.codec());
    let result = discovery::discover(&framework, &mut tree).await;
    match result {
        Err(Error::SuiteDiscoveryFailed(trace)) => {
            assert!(trace.contains("ImportError: broken conftest"));
        }
        other => panic!("expected discovery failure, got {other:?}"),
    }
    assert!(tree.is_empty());
}

#[tokio::test]
async fn test_discovery_warnings_do_not_fail() {
    let context = TestContext::new();
    let framework = context.framework(
        r#"printf 'pkg/test_demo.py::test_passes\n'
printf 'DeprecationWarning: plugin api\n' >&2
"#,
        "exit 0\n",
    );

    let mut tree = TestTree::new(framework.codec());
    let report = discovery::discover(&framework, &mut tree)
        .await
        .expect("warnings alone must not fail discovery");
    assert_eq!(report.discovered, 1);
    assert_eq!(report.warnings, vec!["DeprecationWarning: plugin api"]);
}
