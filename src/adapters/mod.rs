// Adapters layer: concrete implementations of the domain ports (filesystem
// storage, CSV reference dataset, JSON-file credit/audit store).

pub mod local;
pub mod reference;
pub mod store;

pub use local::LocalStorage;
pub use reference::CsvReferenceSource;
pub use store::JsonStateStore;
