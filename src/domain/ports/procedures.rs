//! Procedure port: the single outbound call shape of the service
//!
//! Every business rule (state transitions, ownership checks, statistics)
//! lives in stored procedures owned by the database. The application
//! layer only ever asks a [`ProcedureBackend`] to run a named procedure
//! with named parameters and reads back a list of records.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// One row returned by a procedure, keyed by column name.
pub type Record = Map<String, Value>;

// ── Parameters ─────────────────────────────────────────────────

/// Ordered list of named procedure parameters.
///
/// Values are JSON scalars; `Value::Null` is passed through as SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureParams(Vec<(String, Value)>);

impl ProcedureParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. `Option::None` becomes `NULL`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Outcome ────────────────────────────────────────────────────

/// Result reported by a procedure.
///
/// `success == false` means the procedure itself refused the operation
/// (a business rule was violated); transport failures are reported as
/// [`BackendError`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureOutcome {
    pub success: bool,
    pub data: Vec<Record>,
    pub error: Option<String>,
}

impl ProcedureOutcome {
    pub fn rows(data: Vec<Record>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::rows(Vec::new())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn first(&self) -> Option<&Record> {
        self.data.first()
    }

    pub fn into_first(self) -> Option<Record> {
        self.data.into_iter().next()
    }

    /// True when the call succeeded and produced at least one row.
    pub fn found(&self) -> bool {
        self.success && !self.data.is_empty()
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid identifier '{0}' in procedure call")]
    InvalidIdentifier(String),

    #[error("Unsupported parameter value for '{name}': {value}")]
    UnsupportedValue { name: String, value: Value },

    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),
}

// ── ProcedureBackend ───────────────────────────────────────────

/// Executes named stored procedures.
///
/// Implementations must be cheap to share behind an `Arc` and safe to
/// call concurrently from many request tasks.
#[async_trait]
pub trait ProcedureBackend: Send + Sync {
    /// Run `procedure` with `params` and return its rows.
    async fn invoke(
        &self,
        procedure: &str,
        params: ProcedureParams,
    ) -> Result<ProcedureOutcome, BackendError>;

    /// Connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
