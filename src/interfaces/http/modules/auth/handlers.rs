//! Authentication API handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use tracing::error;

use super::dto::{LoginRequest, LoginResponse, RegisterRequest, VerifiedUser, VerifyResponse};
use crate::application::{AuthError, NewUser};
use crate::domain::Role;
use crate::infrastructure::crypto::jwt::verify_token;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::extract_token;
use crate::interfaces::http::router::ApiState;

/// Translate identity failures; `internal_message` is shown for anything
/// that is not the caller's fault.
pub(crate) fn auth_failure(err: AuthError, internal_message: &str) -> ApiError {
    match err {
        AuthError::InvalidCredentials
        | AuthError::InactiveUser
        | AuthError::WrongCurrentPassword => ApiError::Unauthenticated(err.to_string()),
        AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
        AuthError::Rejected(reason) => ApiError::Upstream(
            reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| internal_message.to_string()),
        ),
        other => {
            error!(error = %other, "{}", internal_message);
            ApiError::Internal(internal_message.to_string())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials or inactive user")
    )
)]
pub async fn login(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let auth = state
        .auth
        .login(&username, &password)
        .await
        .map_err(|e| auth_failure(e, "Error en el proceso de autenticación"))?;

    Ok(Json(LoginResponse {
        success: true,
        token: auth.token,
        token_type: auth.token_type,
        expires_in: auth.expires_in,
        user: auth.user,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation error or rejected by the database"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn register(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    let rol: Role = request
        .rol
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::BadRequest("Rol inválido".into()))?;

    state
        .auth
        .register(NewUser {
            username: request.username.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
            nombre: request.nombre.unwrap_or_default(),
            apellido: request.apellido.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            rol,
        })
        .await
        .map_err(|e| auth_failure(e, "Error al crear usuario"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Usuario creado exitosamente")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid; returns its payload", body = VerifyResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn verify(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(extract_token)
        .unwrap_or_default();

    if token.is_empty() {
        return Err(ApiError::Unauthenticated("No token provided".into()));
    }

    let user = verify_token(token, state.auth.jwt_config())
        .ok()
        .and_then(VerifiedUser::from_claims)
        .ok_or_else(|| ApiError::Unauthenticated("Invalid token".into()))?;

    Ok(Json(VerifyResponse {
        success: true,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::domain::procedures::{CREATE_USUARIO, GET_USUARIO_BY_USERNAME};
    use crate::domain::{ProcedureOutcome, Role};
    use crate::infrastructure::crypto::password::hash_password;
    use crate::infrastructure::storage::InMemoryProcedureBackend;
    use crate::interfaces::http::test_support::*;

    fn directory() -> InMemoryProcedureBackend {
        let active = hash_password("correcta", TEST_BCRYPT_COST).unwrap();
        InMemoryProcedureBackend::new()
            .with(GET_USUARIO_BY_USERNAME, move |params| {
                let username = params.get("Username").and_then(|v| v.as_str()).unwrap_or("");
                match username {
                    "activo" | "inactivo" => ProcedureOutcome::rows(vec![record(json!({
                        "UsuarioID": 3,
                        "Username": username,
                        "PasswordHash": active.clone(),
                        "Nombre": "Ana",
                        "Apellido": "Ruiz",
                        "Email": "ana@mp.gob.gt",
                        "Rol": "Tecnico",
                        "Activo": username == "activo",
                    }))]),
                    _ => ProcedureOutcome::empty(),
                }
            })
            .returning(CREATE_USUARIO, ProcedureOutcome::empty())
    }

    #[tokio::test]
    async fn login_returns_token_and_redacted_profile() {
        let (app, _) = test_app(directory());
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "activo", "password": "correcta"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["user"]["id"], 3);
        assert_eq!(body["user"]["username"], "activo");
        assert_eq!(body["user"]["nombre"], "Ana");
        assert!(body.get("data").is_none());

        let token = body["token"].as_str().unwrap();
        let (status, verified) = send(&app, "GET", "/api/auth/verify", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["user"]["id"], 3);

        let rendered = body.to_string();
        assert!(!rendered.contains("PasswordHash"));
        assert!(!rendered.contains("password_hash"));
        assert!(!rendered.contains("$2"));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let (app, _) = test_app(directory());
        let unknown = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "fantasma", "password": "correcta"})),
        )
        .await;
        let wrong = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "activo", "password": "incorrecta"})),
        )
        .await;

        assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.1["error"], "Credenciales inválidas");
    }

    #[tokio::test]
    async fn inactive_user_with_valid_password() {
        let (app, _) = test_app(directory());
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "inactivo", "password": "correcta"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Usuario inactivo");
    }

    #[tokio::test]
    async fn empty_credentials_list_both_fields() {
        let (app, backend) = test_app(directory());
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "", "password": ""})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["password", "username"]);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn register_requires_administrator() {
        let (app, backend) = test_app(directory());
        let body = json!({
            "username": "nuevo",
            "password": "secreta1",
            "nombre": "Luis",
            "apellido": "Gómez",
            "email": "luis@mp.gob.gt",
            "rol": "Tecnico"
        });

        let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let coordinador = token(1, Role::Coordinador);
        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/register",
            Some(&coordinador),
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = token(1, Role::Administrador);
        let (status, reply) =
            send(&app, "POST", "/api/auth/register", Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reply["message"], "Usuario creado exitosamente");
        assert_eq!(backend.calls_to(CREATE_USUARIO).len(), 1);
    }

    #[tokio::test]
    async fn register_validates_every_field() {
        let (app, _) = test_app(directory());
        let admin = token(1, Role::Administrador);
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            Some(&admin),
            Some(json!({"username": "ab", "password": "123", "email": "no-es-email", "rol": "Jefe"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(
            fields,
            vec!["apellido", "email", "nombre", "password", "rol", "username"]
        );
    }

    #[tokio::test]
    async fn verify_returns_the_token_payload() {
        let (app, _) = test_app(directory());
        let valid = token(7, Role::Coordinador);

        let (status, body) = send(&app, "GET", "/api/auth/verify", Some(&valid), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["id"], 7);
        assert_eq!(body["user"]["username"], "user7");
        assert_eq!(body["user"]["rol"], "Coordinador");
        assert!(body["user"].get("sub").is_none());

        let (status, body) = send(&app, "GET", "/api/auth/verify", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No token provided");

        let (status, body) = send(&app, "GET", "/api/auth/verify", Some("basura"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }
}
