pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CsvReferenceSource, JsonStateStore, LocalStorage};
pub use config::{CliConfig, FileConfig};
pub use crate::core::index::{ReferenceCache, ReferenceIndex};
pub use crate::core::ledger::CreditLedger;
pub use crate::core::orchestrator::ScrubOrchestrator;
pub use domain::model::{Category, ScrubRequest, ScrubRun};
pub use utils::error::{Result, ScrubError};
