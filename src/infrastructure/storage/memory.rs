//! In-memory procedure backend for development and testing
//!
//! Each procedure name is bound to a closure that receives the call
//! parameters and produces an outcome. Every invocation is recorded so
//! callers can assert on the exact parameter shape that was sent.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{BackendError, ProcedureBackend, ProcedureOutcome, ProcedureParams};

type Handler = Arc<dyn Fn(&ProcedureParams) -> ProcedureOutcome + Send + Sync>;

/// A recorded procedure invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub procedure: String,
    pub params: ProcedureParams,
}

/// Scripted [`ProcedureBackend`]
#[derive(Default)]
pub struct InMemoryProcedureBackend {
    handlers: DashMap<String, Handler>,
    calls: Mutex<Vec<ProcedureCall>>,
}

impl InMemoryProcedureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `procedure` to `handler`, replacing any previous binding.
    pub fn register<F>(&self, procedure: &str, handler: F)
    where
        F: Fn(&ProcedureParams) -> ProcedureOutcome + Send + Sync + 'static,
    {
        self.handlers.insert(procedure.to_string(), Arc::new(handler));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(self, procedure: &str, handler: F) -> Self
    where
        F: Fn(&ProcedureParams) -> ProcedureOutcome + Send + Sync + 'static,
    {
        self.register(procedure, handler);
        self
    }

    /// Bind `procedure` to a fixed outcome.
    pub fn returning(self, procedure: &str, outcome: ProcedureOutcome) -> Self {
        self.with(procedure, move |_| outcome.clone())
    }

    /// All invocations so far, oldest first.
    pub fn calls(&self) -> Vec<ProcedureCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invocations of a single procedure, oldest first.
    pub fn calls_to(&self, procedure: &str) -> Vec<ProcedureParams> {
        self.calls()
            .into_iter()
            .filter(|call| call.procedure == procedure)
            .map(|call| call.params)
            .collect()
    }
}

#[async_trait]
impl ProcedureBackend for InMemoryProcedureBackend {
    async fn invoke(
        &self,
        procedure: &str,
        params: ProcedureParams,
    ) -> Result<ProcedureOutcome, BackendError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ProcedureCall {
                procedure: procedure.to_string(),
                params: params.clone(),
            });

        // Clone the handler out so the map shard is not held while it runs.
        let handler = self
            .handlers
            .get(procedure)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BackendError::UnknownProcedure(procedure.to_string()))?;

        Ok(handler(&params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatches_by_name_and_records_calls() {
        let backend = InMemoryProcedureBackend::new()
            .returning("sp_A", ProcedureOutcome::empty())
            .with("sp_B", |params| match params.get("Ok") {
                Some(serde_json::Value::Bool(true)) => ProcedureOutcome::empty(),
                _ => ProcedureOutcome::failure("rejected"),
            });

        let a = backend.invoke("sp_A", ProcedureParams::new()).await.unwrap();
        assert!(a.success);

        let b = backend
            .invoke("sp_B", ProcedureParams::new().with("Ok", false))
            .await
            .unwrap();
        assert_eq!(b.error.as_deref(), Some("rejected"));

        assert_eq!(backend.calls().len(), 2);
        assert_eq!(backend.calls_to("sp_B").len(), 1);
    }

    #[tokio::test]
    async fn unknown_procedure_is_an_error() {
        let backend = InMemoryProcedureBackend::new();
        let result = backend.invoke("sp_Missing", ProcedureParams::new()).await;
        assert!(matches!(result, Err(BackendError::UnknownProcedure(_))));
        assert_eq!(backend.calls().len(), 1);
    }
}
