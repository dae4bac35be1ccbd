//! Helpers for driving the router in handler tests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use crate::application::AuthService;
use crate::domain::{Record, Role};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig, TokenClaims};
use crate::infrastructure::storage::InMemoryProcedureBackend;
use crate::interfaces::http::router::{create_router, ApiState, RouterOptions};

pub const TEST_BCRYPT_COST: u32 = 4;

pub fn jwt_config() -> JwtConfig {
    JwtConfig::new("handler-test-secret", 3600)
}

pub fn test_app(backend: InMemoryProcedureBackend) -> (Router, Arc<InMemoryProcedureBackend>) {
    let backend = Arc::new(backend);
    let auth = AuthService::new(backend.clone(), jwt_config(), TEST_BCRYPT_COST);
    let router = create_router(ApiState::new(backend.clone(), auth), RouterOptions::default());
    (router, backend)
}

fn claims(id: i64, rol: Role, lifetime: i64) -> TokenClaims {
    let now = Utc::now().timestamp();
    TokenClaims {
        sub: id.to_string(),
        username: format!("user{id}"),
        nombre: None,
        apellido: None,
        rol,
        iat: now,
        exp: now + lifetime,
        iss: jwt_config().issuer,
    }
}

pub fn token(id: i64, rol: Role) -> String {
    create_token(&claims(id, rol, 3600), &jwt_config()).unwrap()
}

pub fn expired_token(id: i64, rol: Role) -> String {
    create_token(&claims(id, rol, -60), &jwt_config()).unwrap()
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Send one request; the body is `Value::Null` when the response has none.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
