//! Validating extractors for Axum
//!
//! `ValidatedJson<T>` and `ValidatedQuery<T>` work like `axum::Json<T>` and
//! `axum::extract::Query<T>`, but additionally run
//! `validator::Validate::validate()` on the deserialized value. Every
//! violated rule is reported at once as a 400 [`ApiError::Validation`],
//! including values of the wrong JSON type. A missing body, or one sent
//! without a JSON content type, is read as `{}`.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use super::{field_errors, ApiError, FieldError};

/// JSON body that has passed validation.
///
/// ```ignore
/// async fn handler(ValidatedJson(body): ValidatedJson<LoginRequest>) { ... }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(format!("JSON inválido: {}", rejection.body_text())))?;

        let fields = if is_json && !bytes.iter().all(u8::is_ascii_whitespace) {
            parse_object(&bytes)?
        } else {
            Map::new()
        };

        deserialize_fields(fields).map(ValidatedJson)
    }
}

fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("JSON inválido: se esperaba un objeto".into())),
        Err(e) => Err(ApiError::BadRequest(format!("JSON inválido: {e}"))),
    }
}

/// Deserialize `fields` into `T` and validate it.
///
/// A field holding a value of the wrong type is reported next to the rule
/// violations of the other fields, with the message its own rules give for
/// a missing value, or "Valor inválido". This needs `T` to accept `{}`
/// (all fields optional); otherwise a type error is a plain 400.
pub fn deserialize_fields<T>(fields: Map<String, Value>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let error = match serde_json::from_value::<T>(Value::Object(fields.clone())) {
        Ok(value) => {
            value.validate()?;
            return Ok(value);
        }
        Err(e) => e,
    };
    let malformed = || ApiError::BadRequest(format!("JSON inválido: {error}"));

    if serde_json::from_value::<T>(Value::Object(Map::new())).is_err() {
        return Err(malformed());
    }

    let mistyped: Vec<String> = fields
        .iter()
        .filter(|(name, value)| {
            let alone = Map::from_iter([((*name).clone(), (*value).clone())]);
            serde_json::from_value::<T>(Value::Object(alone)).is_err()
        })
        .map(|(name, _)| name.clone())
        .collect();

    let mut rest = fields;
    for name in &mistyped {
        rest.remove(name);
    }

    let mut errors = match serde_json::from_value::<T>(Value::Object(rest)) {
        Ok(value) => value
            .validate()
            .err()
            .map(|e| field_errors(&e))
            .unwrap_or_default(),
        Err(_) => return Err(malformed()),
    };

    for name in mistyped {
        if !errors.iter().any(|e| e.field == name) {
            errors.push(FieldError::new(name, "Valor inválido"));
        }
    }
    errors.sort_by(|a, b| a.field.cmp(&b.field));

    Err(ApiError::Validation(errors))
}

/// Query string that has passed validation.
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::BadRequest(format!("Parámetros inválidos: {}", rejection.body_text()))
            })?;

        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────
