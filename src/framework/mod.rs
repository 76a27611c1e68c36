//! Test framework adapters
//!
//! A framework adapter supplies the command lines for discovering and
//! executing tests, plus the codec that understands the framework's
//! identifier scheme. The core never builds framework arguments itself.

mod pytest;
mod unittest;

pub use pytest::PytestFramework;
pub use unittest::UnittestFramework;

use std::path::PathBuf;
use std::sync::Arc;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::model::path::PathCodec;

/// Supplies per-framework command lines and the identifier codec
pub trait TestFramework: Send + Sync {
    /// Short name used in config and CLI flags
    fn name(&self) -> &'static str;

    /// The codec for this framework's identifier scheme
    fn codec(&self) -> Arc<dyn PathCodec>;

    /// Command line that lists every test id, one per line on stdout
    fn discover_command(&self) -> Vec<String>;

    /// Command line that executes the given selection
    ///
    /// A selection of None runs everything under the suite root.
    fn execute_command(&self, selection: Option<&[String]>) -> Vec<String>;
}

/// Look up a framework adapter by name
pub fn by_name(name: &str, config: &Config) -> Result<Box<dyn TestFramework>> {
    match name {
        "pytest" => Ok(Box::new(PytestFramework::new(config)?)),
        "unittest" => Ok(Box::new(UnittestFramework::new(config)?)),
        other => Err(Error::Config(format!("unknown test framework '{}'", other))),
    }
}

/// Locate the python interpreter, honoring the config override
fn python_interpreter(config: &Config) -> Result<PathBuf> {
    if let Some(python) = &config.runner.python {
        return Ok(python.clone());
    }
    which::which("python3")
        .or_else(|_| which::which("python"))
        .map_err(|e| Error::Config(format!("no python interpreter on PATH: {}", e)))
}
