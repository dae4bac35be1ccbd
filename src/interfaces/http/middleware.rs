//! Authentication middleware for Axum
//!
//! Every protected route group is wrapped in [`auth_gate`] with its own
//! [`RoleGate`]. The gate verifies the bearer token, checks the caller's
//! role against the allowed set and stores an [`AuthenticatedUser`] in the
//! request extensions for handlers to extract.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::common::ApiError;
use crate::domain::Role;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims, TokenError};

// ── Gate ────────────────────────────────────────────────────────

/// Which callers a route group admits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleGate {
    /// One role, or any authenticated user when `None`. Distinguishes an
    /// expired token from an invalid one.
    Single(Option<Role>),
    /// Any of the listed roles, or any authenticated user when empty.
    /// Reports invalid and expired tokens with the same message.
    AnyOf(Vec<Role>),
}

/// Why the gate refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    InvalidOrExpiredToken,
    Forbidden,
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GateRejection::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            GateRejection::MissingToken => "No se proporcionó token de autenticación",
            GateRejection::InvalidToken => "Token inválido",
            GateRejection::ExpiredToken => "Token expirado",
            GateRejection::InvalidOrExpiredToken => "Token inválido o expirado",
            GateRejection::Forbidden => "No tiene permisos para acceder a este recurso",
        }
    }
}

impl From<GateRejection> for ApiError {
    fn from(rejection: GateRejection) -> Self {
        match rejection {
            GateRejection::Forbidden => ApiError::Forbidden(rejection.message().to_string()),
            _ => ApiError::Unauthenticated(rejection.message().to_string()),
        }
    }
}

impl RoleGate {
    pub fn authenticated() -> Self {
        RoleGate::Single(None)
    }

    pub fn only(role: Role) -> Self {
        RoleGate::Single(Some(role))
    }

    pub fn any_of(roles: impl Into<Vec<Role>>) -> Self {
        RoleGate::AnyOf(roles.into())
    }

    fn permits(&self, role: Role) -> bool {
        match self {
            RoleGate::Single(None) => true,
            RoleGate::Single(Some(required)) => *required == role,
            RoleGate::AnyOf(roles) => roles.is_empty() || roles.contains(&role),
        }
    }

    fn token_rejection(&self, error: &TokenError) -> GateRejection {
        match (self, error) {
            (RoleGate::AnyOf(_), _) => GateRejection::InvalidOrExpiredToken,
            (RoleGate::Single(_), TokenError::Expired) => GateRejection::ExpiredToken,
            (RoleGate::Single(_), TokenError::Invalid(_)) => GateRejection::InvalidToken,
        }
    }

    /// Decide a request from its `Authorization` header alone.
    pub fn authorize(
        &self,
        authorization: Option<&HeaderValue>,
        jwt_config: &JwtConfig,
    ) -> Result<AuthenticatedUser, GateRejection> {
        let Some(value) = authorization else {
            return Err(GateRejection::MissingToken);
        };
        let Ok(value) = value.to_str() else {
            return Err(self.token_rejection(&TokenError::Invalid("non-ascii header".into())));
        };

        let token = extract_token(value);
        if token.is_empty() {
            return Err(GateRejection::MissingToken);
        }

        let claims = verify_token(token, jwt_config).map_err(|e| self.token_rejection(&e))?;
        let user = AuthenticatedUser::from_claims(claims).ok_or_else(|| {
            self.token_rejection(&TokenError::Invalid("non-numeric subject".into()))
        })?;

        if !self.permits(user.rol) {
            return Err(GateRejection::Forbidden);
        }
        Ok(user)
    }
}

/// Strip an optional `Bearer ` prefix.
pub fn extract_token(header_value: &str) -> &str {
    let value = header_value.trim();
    match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    }
}

// ── Middleware ──────────────────────────────────────────────────

/// State of one gated route group
#[derive(Clone)]
pub struct GateState {
    pub gate: RoleGate,
    pub jwt_config: JwtConfig,
}

impl GateState {
    pub fn new(gate: RoleGate, jwt_config: JwtConfig) -> Self {
        Self { gate, jwt_config }
    }
}

pub async fn auth_gate(State(state): State<GateState>, mut request: Request, next: Next) -> Response {
    let decision = state.gate.authorize(
        request.headers().get(header::AUTHORIZATION),
        &state.jwt_config,
    );

    match decision {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => {
            tracing::debug!(
                path = %request.uri().path(),
                status = rejection.status().as_u16(),
                "Request refused by role gate"
            );
            ApiError::from(rejection).into_response()
        }
    }
}

// ── Request context ─────────────────────────────────────────────

/// Caller identity derived from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub rol: Role,
}

impl AuthenticatedUser {
    /// `None` when `sub` is not a numeric user id.
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            id: claims.user_id()?,
            username: claims.username,
            rol: claims.rol,
        })
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| GateRejection::MissingToken.into())
    }
}
