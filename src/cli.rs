//! CLI command handling
//!
//! Dispatches CLI commands against the suite model and renders run events
//! as terminal lines. Everything here is presentation; the decoding and
//! bookkeeping live in the run module.

use std::time::Duration;

use clap::Subcommand;
use colored::Colorize;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::framework::{self, TestFramework};
use crate::model::tree::{TestFilter, TestNode, TestTree};
use crate::model::TestStatus;
use crate::run::discovery::{self, DiscoveryReport};
use crate::run::{RunEvent, RunSession};

#[derive(Subcommand)]
pub enum Commands {
    /// Discover the test suite and print it as a tree
    Discover {
        /// Test framework to drive (overrides config)
        #[arg(long)]
        framework: Option<String>,
    },

    /// Execute tests, streaming per-test results
    Run {
        /// Test ids or container paths to run; everything when omitted
        labels: Vec<String>,

        /// Test framework to drive (overrides config)
        #[arg(long)]
        framework: Option<String>,
    },
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    let config = Config::load()?;
    match command {
        Commands::Discover { framework } => discover_suite(&config, framework).await,
        Commands::Run { labels, framework } => run_suite(&config, framework, labels).await,
    }
}

fn load_framework(config: &Config, flag: Option<String>) -> Result<Box<dyn TestFramework>> {
    let name = flag.unwrap_or_else(|| config.runner.framework.clone());
    framework::by_name(&name, config)
}

fn print_warnings(report: &DiscoveryReport) {
    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }
}

async fn discover_suite(config: &Config, flag: Option<String>) -> Result<()> {
    let framework = load_framework(config, flag)?;
    let mut tree = TestTree::new(framework.codec());
    let report = discovery::discover(framework.as_ref(), &mut tree).await?;
    print_warnings(&report);

    tree.visit(&mut |depth, node| {
        let indent = "  ".repeat(depth);
        match node {
            TestNode::Container(c) => println!("{}{}", indent, c.name().bold()),
            TestNode::Leaf(m) => println!("{}{}", indent, m.name()),
        }
    });
    println!("\n{} tests discovered", report.discovered);
    Ok(())
}

async fn run_suite(config: &Config, flag: Option<String>, labels: Vec<String>) -> Result<()> {
    let framework = load_framework(config, flag)?;
    let mut tree = TestTree::new(framework.codec());
    let report = discovery::discover(framework.as_ref(), &mut tree).await?;
    print_warnings(&report);

    let filter = TestFilter {
        labels: (!labels.is_empty()).then_some(labels),
        ..TestFilter::default()
    };
    let (count, selection) = tree.find_tests(&filter);
    if count == 0 {
        println!("No tests matched");
        return Ok(());
    }
    println!("Running {} of {} tests\n", count, tree.leaf_count());

    let mut session = RunSession::spawn(framework.as_ref(), count, selection.as_deref())?;
    let mut events = session
        .take_event_receiver()
        .ok_or_else(|| Error::Internal("event receiver already taken".into()))?;

    let mut interval = tokio::time::interval(Duration::from_millis(config.runner.poll_interval_ms));
    let mut suite_error: Option<String> = None;
    loop {
        interval.tick().await;
        let keep_polling = session.poll(&mut tree)?;
        while let Ok(event) = events.try_recv() {
            if let RunEvent::SuiteError { error } = event {
                suite_error = Some(error);
            } else {
                render_event(&tree, &session, &event);
            }
        }
        if !keep_polling {
            break;
        }
    }

    print_summary(&session);

    if let Some(error) = suite_error {
        return Err(Error::ProcessEndedUnexpectedly(error));
    }
    if session.any_failing() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn render_event(tree: &TestTree, session: &RunSession, event: &RunEvent) {
    match event {
        RunEvent::TestStart { .. } | RunEvent::StatusUpdate { .. } => {}
        RunEvent::TestStatusUpdate { text } => println!("{}", text.dimmed()),
        RunEvent::TestEnd {
            path,
            status,
            remaining,
        } => {
            let duration = tree
                .find(path)
                .ok()
                .and_then(|node| match node {
                    TestNode::Leaf(m) => m.duration(),
                    TestNode::Container(_) => None,
                })
                .unwrap_or_default();
            let progress = if session.completed_count() < session.total_count() {
                format!(", {} left", remaining)
            } else {
                String::new()
            };
            println!(
                "{} {} ({:.2}s{})",
                status_tag(*status),
                path,
                duration,
                progress
            );
        }
        RunEvent::SuiteEnd { error } => {
            if let Some(error) = error {
                eprintln!("\n{}\n{}", "Suite diagnostics:".yellow().bold(), error);
            }
        }
        RunEvent::SuiteError { .. } => {}
    }
}

fn status_tag(status: TestStatus) -> colored::ColoredString {
    match status {
        TestStatus::Pass => " PASS".green(),
        TestStatus::Skip => " SKIP".cyan(),
        TestStatus::ExpectedFail => "XFAIL".yellow(),
        TestStatus::UnexpectedSuccess => "UPASS".red(),
        TestStatus::Fail => " FAIL".red().bold(),
        TestStatus::Error => "ERROR".red().bold(),
    }
}

fn print_summary(session: &RunSession) {
    println!();
    let aggregator = session.aggregator();
    for (status, count) in aggregator.counts() {
        println!("{:>4} {}", count, status.label());
    }

    let problems = aggregator.problems();
    if !problems.is_empty() {
        println!("\n{}", "Failing tests:".red().bold());
        problems.visit(&mut |_, node| {
            if let TestNode::Leaf(m) = node {
                println!("  {}", m.path().red());
            }
        });
    }
}
