//! User aggregate
//!
//! Accounts are stored and mutated by stored procedures; this module only
//! reads the rows they return and controls what is exposed to clients.

pub mod model;

pub use model::{redact, UserProfile, UserRecord};
