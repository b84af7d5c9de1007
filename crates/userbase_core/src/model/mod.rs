//! Domain model for administered user records.
//!
//! # Responsibility
//! - Define canonical data structures used by repository and service code.
//!
//! # Invariants
//! - Every persisted user is identified by a storage-generated `UserId`.
//! - Password material only exists in hashed form on model types.

pub mod user;
