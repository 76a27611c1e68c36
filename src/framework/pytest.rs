//! pytest adapter
//!
//! Drives pytest through the testdeck plugin. Identifiers look like
//! `top_dir/test_file.py::TestCase::test_method`. Capture stays disabled
//! so the plugin's records reach stdout unbuffered.

use std::path::PathBuf;
use std::sync::Arc;

use crate::common::config::Config;
use crate::common::Result;
use crate::model::path::{ModulePathCodec, PathCodec};

use super::{python_interpreter, TestFramework};

pub struct PytestFramework {
    python: PathBuf,
    log_cli_level: Option<String>,
    junit_xml: Option<PathBuf>,
}

impl PytestFramework {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            python: python_interpreter(config)?,
            log_cli_level: config.pytest.log_cli_level.clone(),
            junit_xml: config.pytest.junit_xml.clone(),
        })
    }

    fn base_command(&self) -> Vec<String> {
        vec![
            self.python.display().to_string(),
            "-m".to_string(),
            "pytest".to_string(),
            "--capture=no".to_string(),
            "-p".to_string(),
            "pytest_testdeck".to_string(),
        ]
    }
}

impl TestFramework for PytestFramework {
    fn name(&self) -> &'static str {
        "pytest"
    }

    fn codec(&self) -> Arc<dyn PathCodec> {
        Arc::new(ModulePathCodec)
    }

    fn discover_command(&self) -> Vec<String> {
        let mut argv = self.base_command();
        argv.extend(["--testdeck".to_string(), "discover".to_string()]);
        argv
    }

    fn execute_command(&self, selection: Option<&[String]>) -> Vec<String> {
        let mut argv = self.base_command();
        argv.extend(["--testdeck".to_string(), "execute".to_string()]);
        if let Some(level) = &self.log_cli_level {
            argv.extend(["--log-cli-level".to_string(), level.clone()]);
        }
        if let Some(path) = &self.junit_xml {
            argv.extend(["--junit-xml".to_string(), path.display().to_string()]);
        }
        if let Some(selection) = selection {
            argv.extend(selection.iter().cloned());
        }
        argv
    }
}
