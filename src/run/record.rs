//! Wire records from the test runner process
//!
//! The runner emits a line protocol: sentinel separator lines delimiting
//! the result stream, and single-line JSON records describing test starts
//! and outcomes. Everything else on the channel is free-form output.

use serde::{Deserialize, Deserializer};

use crate::common::{Error, Result};
use crate::model::TestStatus;

/// Sentinel marking the start of streamed suite results
pub const START_TEST_RESULTS: &str = "\u{2}";
/// Sentinel marking the end of streamed suite results
pub const END_TEST_RESULTS: &str = "\u{3}";
/// Sentinel separating one test's records from the next
pub const RESULT_SEPARATOR: &str = "\u{1f}";

/// Is this line one of the protocol separators?
pub fn is_separator(line: &str) -> bool {
    line == START_TEST_RESULTS || line == END_TEST_RESULTS || line == RESULT_SEPARATOR
}

/// Does this line have the shape of a structured record?
pub fn looks_structured(line: &str) -> bool {
    line.starts_with('{') && line.ends_with('}')
}

/// Drop an invisible escape-sequence prefix ahead of the payload.
///
/// Doctest and some other tools prefix their records with terminal escape
/// sequences; the record proper begins at the first `{`.
pub fn strip_escape_prefix(line: &str) -> &str {
    if line.starts_with('\u{1b}') {
        match line.find('{') {
            Some(start) => &line[start..],
            None => line,
        }
    } else {
        line
    }
}

/// A self-describing record line
///
/// Every field is optional on the wire; which fields are present decides
/// what the record means. Unrecognized fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible_seconds")]
    pub start_time: Option<f64>,
    #[serde(default, deserialize_with = "flexible_seconds")]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl Record {
    /// Parse one line into a record
    pub fn parse(line: &str) -> Result<Record> {
        serde_json::from_str(line).map_err(|_| Error::MalformedRecord(line.to_string()))
    }

    /// The identifier naming the test, when one is present
    ///
    /// Some runners omit `path` but still carry the id in `description`.
    pub fn test_id(&self) -> Option<&str> {
        self.path.as_deref().or(self.description.as_deref())
    }

    /// A start record carries a start time and an identifier
    pub fn is_start(&self) -> bool {
        self.start_time.is_some() && self.test_id().is_some()
    }

    /// An end record carries an end time and a status code
    pub fn is_end(&self) -> bool {
        self.end_time.is_some() && self.status.is_some()
    }
}

/// Timestamps arrive text-encoded from some runners and numeric from others
fn flexible_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(n)) => Ok(Some(n)),
        Some(Seconds::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A terminal outcome decoded from an end record
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: TestStatus,
    pub error: Option<String>,
}

/// Classify an end record's status code.
///
/// Returns None for codes outside the terminal vocabulary; such records
/// carry live logging output rather than a verdict.
pub fn classify_status(record: &Record) -> Option<Outcome> {
    let outcome = match record.status.as_deref()? {
        "OK" => Outcome {
            status: TestStatus::Pass,
            error: None,
        },
        "s" => Outcome {
            status: TestStatus::Skip,
            error: Some(format!(
                "Skipped: {}",
                record.error.as_deref().unwrap_or_default()
            )),
        },
        "F" => Outcome {
            status: TestStatus::Fail,
            error: record.error.clone(),
        },
        "x" => Outcome {
            status: TestStatus::ExpectedFail,
            error: record.error.clone(),
        },
        "u" => Outcome {
            status: TestStatus::UnexpectedSuccess,
            error: None,
        },
        "E" => Outcome {
            status: TestStatus::Error,
            error: record.error.clone(),
        },
        _ => return None,
    };
    Some(outcome)
}
