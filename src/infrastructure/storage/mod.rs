//! Procedure backends that do not talk to a database directly

pub mod memory;
pub mod metered;

pub use memory::{InMemoryProcedureBackend, ProcedureCall};
pub use metered::MeteredBackend;
