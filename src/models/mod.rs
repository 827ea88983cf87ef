//! Core data types shared across the engine: intercepted requests,
//! captured response snapshots, and the durable diagnostic records.

pub mod record;
pub mod request;
pub mod response;

pub use record::{AppInfoRecord, LogEntry, Manifest};
pub use request::{get_identity, FetchRequest};
pub use response::{ResponseKind, ResponseSnapshot};
