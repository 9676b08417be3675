//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create/update DTOs for the write paths
//! - Read-model structs for joined queries

pub mod cart;
pub mod clearance;
pub mod document;
pub mod notification;
pub mod request;
pub mod user;
