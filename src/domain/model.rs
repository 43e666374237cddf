use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::ScrubError;

/// Regulated do-not-contact list a phone number can appear on.
///
/// Declaration order is the canonical output order: status columns always
/// list TCPA first, then DNC Complainers, then Federal DNC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Tcpa,
    DncComplainers,
    FederalDnc,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Tcpa,
        Category::DncComplainers,
        Category::FederalDnc,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Tcpa => "TCPA",
            Category::DncComplainers => "DNC Complainers",
            Category::FederalDnc => "Federal DNC",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ScrubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcpa" => Ok(Category::Tcpa),
            "dnc complainers" | "dnc-complainers" => Ok(Category::DncComplainers),
            "federal dnc" | "federal-dnc" => Ok(Category::FederalDnc),
            other => Err(ScrubError::Config {
                message: format!(
                    "unknown category '{}', expected one of: tcpa, dnc-complainers, federal-dnc",
                    other
                ),
            }),
        }
    }
}

/// Renders a status set as the comma-joined label list written to outputs,
/// e.g. "TCPA, Federal DNC". Empty set renders as an empty string.
pub fn status_text(categories: &BTreeSet<Category>) -> String {
    categories
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A parsed upload: canonical header order from the first row, every data
/// row carrying the same number of columns.
#[derive(Debug, Clone)]
pub struct UploadData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl UploadData {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

/// One row of the reference dataset as returned by the reference port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRow {
    pub contact: String,
    pub tcpa: bool,
    pub dnc_complainers: bool,
    pub federal_dnc: bool,
}

impl ReferenceRow {
    pub fn categories(&self) -> BTreeSet<Category> {
        let mut set = BTreeSet::new();
        if self.tcpa {
            set.insert(Category::Tcpa);
        }
        if self.dnc_complainers {
            set.insert(Category::DncComplainers);
        }
        if self.federal_dnc {
            set.insert(Category::FederalDnc);
        }
        set
    }
}

/// An input row plus the categories it matched under the requested filter.
/// Lives only for the duration of one run; the output writer consumes it.
#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub values: Vec<String>,
    pub status: BTreeSet<Category>,
}

impl ClassifiedRecord {
    pub fn is_match(&self) -> bool {
        !self.status.is_empty()
    }
}

/// Everything one pipeline invocation needs: the upload content plus the
/// caller's column designation and filters. `states` is audit labeling only.
#[derive(Debug, Clone)]
pub struct ScrubRequest {
    pub user_id: i64,
    pub file_name: String,
    pub data: Vec<u8>,
    pub column: String,
    pub categories: BTreeSet<Category>,
    pub states: Vec<String>,
}

/// The audit row persisted once per successful run, returned verbatim to the
/// caller as the run summary. Field names follow the scrub_records table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrubRun {
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub uploaded_file: String,
    pub scrubbed_against_states: String,
    pub scrubbed_against_options: String,
    pub total_count: u64,
    pub matched_count: u64,
    pub unmatched_count: u64,
    pub cost: u64,
    pub matching_file: String,
    pub non_matching_file: String,
    pub execution_time: String,
}
