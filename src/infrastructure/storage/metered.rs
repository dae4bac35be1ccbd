//! Instrumentation wrapper around any [`ProcedureBackend`]
//!
//! Records `procedure_calls_total{procedure,outcome}` and
//! `procedure_call_duration_seconds{procedure}` for every invocation.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{BackendError, ProcedureBackend, ProcedureOutcome, ProcedureParams};

pub struct MeteredBackend {
    inner: Arc<dyn ProcedureBackend>,
}

impl MeteredBackend {
    pub fn new(inner: Arc<dyn ProcedureBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ProcedureBackend for MeteredBackend {
    async fn invoke(
        &self,
        procedure: &str,
        params: ProcedureParams,
    ) -> Result<ProcedureOutcome, BackendError> {
        let start = Instant::now();
        let result = self.inner.invoke(procedure, params).await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(o) if o.success => "ok",
            Ok(_) => "rejected",
            Err(_) => "error",
        };

        match &result {
            Err(e) => warn!(procedure, error = %e, "Stored procedure call failed"),
            Ok(o) => debug!(
                procedure,
                success = o.success,
                rows = o.data.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Stored procedure call finished"
            ),
        }

        metrics::counter!(
            "procedure_calls_total",
            "procedure" => procedure.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!(
            "procedure_call_duration_seconds",
            "procedure" => procedure.to_string()
        )
        .record(elapsed.as_secs_f64());

        result
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.inner.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryProcedureBackend;

    #[tokio::test]
    async fn passes_results_through_unchanged() {
        let inner = Arc::new(
            InMemoryProcedureBackend::new().returning("sp_A", ProcedureOutcome::failure("no")),
        );
        let metered = MeteredBackend::new(inner.clone());

        let outcome = metered.invoke("sp_A", ProcedureParams::new()).await.unwrap();
        assert_eq!(outcome, ProcedureOutcome::failure("no"));
        assert_eq!(inner.calls().len(), 1);

        assert!(metered.invoke("sp_B", ProcedureParams::new()).await.is_err());
    }
}
