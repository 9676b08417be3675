//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource
//! group. Handlers validate path/body input, delegate to the workflow
//! controller or a repository in `docuflow_db`, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod cart;
pub mod clearances;
pub mod documents;
pub mod requests;
pub mod student_clearances;
