//! Domain ports
//!
//! The database is the only outside system the domain talks to.

pub mod procedures;

pub use procedures::{
    BackendError, ProcedureBackend, ProcedureOutcome, ProcedureParams, Record,
};
