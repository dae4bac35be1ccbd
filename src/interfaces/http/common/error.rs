//! HTTP error taxonomy
//!
//! Every failure leaving a handler is an [`ApiError`]. Bodies are either
//! `{"success": false, "error": "..."}` or, for input validation,
//! `{"success": false, "errors": [{"field": "...", "message": "..."}]}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::ValidationErrors;

use super::ApiResponse;

/// One violated input rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401: missing, invalid or expired credential
    #[error("{0}")]
    Unauthenticated(String),

    /// 403: authenticated but role not permitted
    #[error("{0}")]
    Forbidden(String),

    /// 400: one entry per violated field rule
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// 400: malformed request that is not a field rule (bad JSON, bad query)
    #[error("{0}")]
    BadRequest(String),

    /// 404
    #[error("{0}")]
    NotFound(String),

    /// 400: the procedure refused the operation
    #[error("{0}")]
    Upstream(String),

    /// 500: the cause has already been logged
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Upstream(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (
                status,
                Json(json!({ "success": false, "errors": errors })),
            )
                .into_response(),
            other => (status, Json(ApiResponse::<()>::error(other.to_string()))).into_response(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

/// Flatten validator output into wire-named field errors, sorted by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = wire_name(field.as_ref());
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Valor inválido".to_string());
                FieldError::new(field.clone(), message)
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// JSON name of a struct field: camelCase, with the accented names clients
/// send for the two ASCII-only Rust identifiers.
fn wire_name(field: &str) -> String {
    match field {
        "anio" => return "año".to_string(),
        "tamano" => return "tamaño".to_string(),
        _ => {}
    }

    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Body {
        #[validate(required(message = "Usuario es requerido"))]
        username: Option<String>,
        #[validate(length(min = 6, message = "Muy corta"))]
        new_password: String,
    }

    #[test]
    fn validation_errors_are_camel_cased_and_sorted() {
        let errors = Body {
            username: None,
            new_password: "abc".into(),
        }
        .validate()
        .unwrap_err();

        let ApiError::Validation(fields) = ApiError::from(errors) else {
            panic!("expected validation error");
        };
        assert_eq!(
            fields,
            vec![
                FieldError::new("newPassword", "Muy corta"),
                FieldError::new("username", "Usuario es requerido"),
            ]
        );
    }

    #[test]
    fn wire_names() {
        assert_eq!(wire_name("numero_expediente"), "numeroExpediente");
        assert_eq!(wire_name("numeroExpediente"), "numeroExpediente");
        assert_eq!(wire_name("anio"), "año");
    }

    #[test]
    fn statuses() {
        assert_eq!(ApiError::Upstream("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
    }
}
