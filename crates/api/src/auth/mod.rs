//! Authentication support: JWT validation for the external identity
//! subsystem's tokens.

pub mod jwt;
