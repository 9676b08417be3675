//! Pure domain logic for the document-request and clearance workflow.
//!
//! This crate contains no I/O: the department policy table, the clearance
//! aggregation rules, the request lifecycle transition table, and the
//! release/pickup date arithmetic are all pure functions evaluated against
//! data the caller has already loaded. The `db` and `api` crates consume
//! these to decide what to write.

pub mod clearance;
pub mod department;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod schedule;
pub mod types;
