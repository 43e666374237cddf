pub mod classify;
pub mod index;
pub mod ledger;
pub mod normalize;
pub mod orchestrator;
pub mod writer;

pub use crate::domain::model::{
    Category, ClassifiedRecord, ReferenceRow, ScrubRequest, ScrubRun, UploadData,
};
pub use crate::domain::ports::{AuditStore, CreditStore, ReferenceSource, Storage};
pub use crate::utils::error::Result;
