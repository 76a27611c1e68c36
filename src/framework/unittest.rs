//! unittest adapter
//!
//! Drives the standard library runner through the testdeck helper modules.
//! Identifiers are dotted: `pkg.test_module.TestCase.test_method`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::common::config::Config;
use crate::common::Result;
use crate::model::path::{DottedPathCodec, PathCodec};

use super::{python_interpreter, TestFramework};

pub struct UnittestFramework {
    python: PathBuf,
}

impl UnittestFramework {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            python: python_interpreter(config)?,
        })
    }
}

impl TestFramework for UnittestFramework {
    fn name(&self) -> &'static str {
        "unittest"
    }

    fn codec(&self) -> Arc<dyn PathCodec> {
        Arc::new(DottedPathCodec)
    }

    fn discover_command(&self) -> Vec<String> {
        vec![
            self.python.display().to_string(),
            "-m".to_string(),
            "testdeck.unittest.discover".to_string(),
        ]
    }

    fn execute_command(&self, selection: Option<&[String]>) -> Vec<String> {
        let mut argv = vec![
            self.python.display().to_string(),
            "-m".to_string(),
            "testdeck.unittest.execute".to_string(),
        ];
        if let Some(selection) = selection {
            argv.extend(selection.iter().cloned());
        }
        argv
    }
}
