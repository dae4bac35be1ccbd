//! Mapping procedure outcomes onto HTTP results
//!
//! Reads that fail are server errors, writes the procedure refuses are
//! client errors, and lookups without a row are 404s.

use tracing::error;

use crate::domain::{ProcedureBackend, ProcedureOutcome, ProcedureParams, Record};

use super::{ApiError, FieldError};

/// Invoke `procedure`, turning transport failures into a logged 500 with
/// `failure_message` as the public text.
pub async fn invoke(
    backend: &dyn ProcedureBackend,
    procedure: &str,
    params: ProcedureParams,
    failure_message: &str,
) -> Result<ProcedureOutcome, ApiError> {
    backend.invoke(procedure, params).await.map_err(|e| {
        error!(procedure, error = %e, "{}", failure_message);
        ApiError::Internal(failure_message.to_string())
    })
}

pub trait OutcomeExt {
    /// All rows of a successful read; a refusal is a 500.
    fn into_rows(self, failure_message: &str) -> Result<Vec<Record>, ApiError>;

    /// First row of a successful lookup; nothing found is a 404.
    fn into_found(self, not_found_message: &str) -> Result<Record, ApiError>;

    /// First row, if any, of a successful write; a refusal is a 400
    /// with `failure_message`.
    fn into_written(self, failure_message: &str) -> Result<Option<Record>, ApiError>;

    /// Like [`into_written`](Self::into_written) but a refusal carries the
    /// procedure's own message when it gave one.
    fn into_created(self, fallback_message: &str) -> Result<Option<Record>, ApiError>;
}

impl OutcomeExt for ProcedureOutcome {
    fn into_rows(self, failure_message: &str) -> Result<Vec<Record>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            error!(reason = ?self.error, "{}", failure_message);
            Err(ApiError::Internal(failure_message.to_string()))
        }
    }

    fn into_found(self, not_found_message: &str) -> Result<Record, ApiError> {
        let row = if self.success { self.into_first() } else { None };
        row.ok_or_else(|| ApiError::NotFound(not_found_message.to_string()))
    }

    fn into_written(self, failure_message: &str) -> Result<Option<Record>, ApiError> {
        if self.success {
            Ok(self.into_first())
        } else {
            Err(ApiError::Upstream(failure_message.to_string()))
        }
    }

    fn into_created(self, fallback_message: &str) -> Result<Option<Record>, ApiError> {
        if self.success {
            Ok(self.into_first())
        } else {
            Err(ApiError::Upstream(
                self.error
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback_message.to_string()),
            ))
        }
    }
}

/// Parse an integer path segment, or fail naming the parameter.
pub fn parse_path_id(field: &str, raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(vec![FieldError::new(field, message)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> Record {
        let mut r = Record::new();
        r.insert("ExpedienteID".into(), json!(3));
        r
    }

    #[test]
    fn reads_and_lookups() {
        assert_eq!(ProcedureOutcome::rows(vec![row()]).into_rows("e").unwrap().len(), 1);
        assert!(matches!(
            ProcedureOutcome::failure("x").into_rows("e"),
            Err(ApiError::Internal(_))
        ));
        assert!(matches!(
            ProcedureOutcome::empty().into_found("Expediente no encontrado"),
            Err(ApiError::NotFound(m)) if m == "Expediente no encontrado"
        ));
        assert!(matches!(
            ProcedureOutcome::failure("x").into_found("nf"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn writes_and_creates() {
        assert!(matches!(
            ProcedureOutcome::failure("ya aprobado").into_written("Error al aprobar expediente"),
            Err(ApiError::Upstream(m)) if m == "Error al aprobar expediente"
        ));
        assert!(matches!(
            ProcedureOutcome::failure("Número duplicado").into_created("Error al crear expediente"),
            Err(ApiError::Upstream(m)) if m == "Número duplicado"
        ));
        assert!(matches!(
            ProcedureOutcome::failure("").into_created("Error al crear expediente"),
            Err(ApiError::Upstream(m)) if m == "Error al crear expediente"
        ));
        assert_eq!(
            ProcedureOutcome::rows(vec![row()]).into_created("e").unwrap(),
            Some(row())
        );
    }

    #[test]
    fn path_ids() {
        assert_eq!(parse_path_id("id", "42", "ID inválido").unwrap(), 42);
        assert!(matches!(
            parse_path_id("id", "abc", "ID de indicio inválido"),
            Err(ApiError::Validation(f)) if f[0].field == "id"
        ));
    }
}
