//! Test doubles for entmap.
//!
//! [`MockExecutor`] stands in for a database connection and
//! [`RecordingStore`] for a cache backend; both keep a log of what they were
//! asked to do.

mod executor;
mod store;

pub use executor::{Call, CallKind, MockExecutor};
pub use store::{RecordingStore, StoreOp};
