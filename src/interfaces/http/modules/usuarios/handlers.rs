//! User account handlers
//!
//! Raw user rows pass through [`redact`] before they leave the service.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{ChangePasswordRequest, UpdateProfileRequest, UpdateRoleRequest};
use crate::application::AuthError;
use crate::domain::procedures::{
    GET_ALL_USUARIOS, GET_USUARIO_BY_ID, TOGGLE_USUARIO_ACTIVE, UPDATE_USUARIO_PROFILE,
    UPDATE_USUARIO_ROLE,
};
use crate::domain::user::redact;
use crate::domain::{ProcedureParams, Record};
use crate::interfaces::http::common::{
    blank_as_none, invoke, parse_path_id, ApiError, ApiResponse, OutcomeExt, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::handlers::auth_failure;
use crate::interfaces::http::router::ApiState;

const INVALID_ID: &str = "ID de usuario inválido";

#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All user accounts"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn list_usuarios(
    State(state): State<ApiState>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let rows = invoke(
        &*state.backend,
        GET_ALL_USUARIOS,
        ProcedureParams::new(),
        "Error al obtener usuarios",
    )
    .await?
    .into_rows("Error al obtener usuarios")?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(redact).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/usuarios/profile",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's own account"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_profile(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Record>>, ApiError> {
    let row = invoke(
        &*state.backend,
        GET_USUARIO_BY_ID,
        ProcedureParams::new().with("UsuarioID", user.id),
        "Error al obtener perfil",
    )
    .await?
    .into_found("Usuario no encontrado")?;

    Ok(Json(ApiResponse::success(redact(row))))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/profile",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Validation error or rejected by the database")
    )
)]
pub async fn update_profile(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let params = ProcedureParams::new()
        .with("UsuarioID", user.id)
        .with("Nombre", blank_as_none(request.nombre))
        .with("Apellido", blank_as_none(request.apellido))
        .with("Email", blank_as_none(request.email))
        .with("Telefono", blank_as_none(request.telefono));

    invoke(&*state.backend, UPDATE_USUARIO_PROFILE, params, "Error al actualizar perfil")
        .await?
        .into_written("Error al actualizar perfil")?;

    Ok(Json(ApiResponse::message("Perfil actualizado exitosamente")))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/change-password",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error or rejected by the database"),
        (status = 401, description = "Current password is wrong"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn change_password(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    const FAILED: &str = "Error al cambiar contraseña";

    state
        .auth
        .change_password(
            user.id,
            request.current_password.as_deref().unwrap_or_default(),
            request.new_password.unwrap_or_default(),
        )
        .await
        .map_err(|e| match e {
            AuthError::Rejected(_) => ApiError::Upstream(FAILED.to_string()),
            other => auth_failure(other, FAILED),
        })?;

    Ok(Json(ApiResponse::message("Contraseña actualizada exitosamente")))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/toggle-active",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Active flag flipped"),
        (status = 400, description = "Invalid ID or rejected by the database"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn toggle_active(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    invoke(
        &*state.backend,
        TOGGLE_USUARIO_ACTIVE,
        ProcedureParams::new().with("UsuarioID", id),
        "Error al cambiar estado del usuario",
    )
    .await?
    .into_written("Error al cambiar estado del usuario")?;

    Ok(Json(ApiResponse::message("Estado del usuario actualizado")))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/role",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role changed"),
        (status = 400, description = "Invalid ID or role, or rejected by the database"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn update_role(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    invoke(
        &*state.backend,
        UPDATE_USUARIO_ROLE,
        ProcedureParams::new()
            .with("UsuarioID", id)
            .with("Rol", request.rol),
        "Error al actualizar rol del usuario",
    )
    .await?
    .into_written("Error al actualizar rol del usuario")?;

    Ok(Json(ApiResponse::message("Rol del usuario actualizado")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::domain::procedures::*;
    use crate::domain::{ProcedureOutcome, Role};
    use crate::infrastructure::crypto::password::{hash_password, verify_password};
    use crate::infrastructure::storage::InMemoryProcedureBackend;
    use crate::interfaces::http::test_support::*;

    fn account(id: i64, hash: &str) -> Value {
        json!({
            "UsuarioID": id,
            "Username": format!("user{id}"),
            "PasswordHash": hash,
            "Nombre": "Ana",
            "Apellido": "Ruiz",
            "Email": "ana@mp.gob.gt",
            "Rol": "Tecnico",
            "Activo": 1
        })
    }

    fn accounts() -> InMemoryProcedureBackend {
        let hash = hash_password("actual1", TEST_BCRYPT_COST).unwrap();
        let by_id = hash.clone();
        InMemoryProcedureBackend::new()
            .returning(
                GET_ALL_USUARIOS,
                ProcedureOutcome::rows(vec![record(account(1, &hash)), record(account(2, &hash))]),
            )
            .with(GET_USUARIO_BY_ID, move |params| {
                match params.get("UsuarioID").and_then(Value::as_i64) {
                    Some(id @ 1..=2) => ProcedureOutcome::rows(vec![record(account(id, &by_id))]),
                    _ => ProcedureOutcome::empty(),
                }
            })
            .returning(UPDATE_USUARIO_PASSWORD, ProcedureOutcome::empty())
            .returning(UPDATE_USUARIO_PROFILE, ProcedureOutcome::empty())
            .returning(TOGGLE_USUARIO_ACTIVE, ProcedureOutcome::failure("no existe"))
            .returning(UPDATE_USUARIO_ROLE, ProcedureOutcome::empty())
    }

    #[tokio::test]
    async fn listing_is_admin_only_and_redacted() {
        let (app, _) = test_app(accounts());

        let (status, _) =
            send(&app, "GET", "/api/usuarios", Some(&token(1, Role::Coordinador)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) =
            send(&app, "GET", "/api/usuarios", Some(&token(1, Role::Administrador)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert!(!body.to_string().contains("PasswordHash"));
    }

    #[tokio::test]
    async fn profile_is_the_callers_own_row() {
        let (app, backend) = test_app(accounts());

        let (status, body) =
            send(&app, "GET", "/api/usuarios/profile", Some(&token(2, Role::Tecnico)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["UsuarioID"], 2);
        assert!(body["data"].get("PasswordHash").is_none());
        assert_eq!(backend.calls_to(GET_USUARIO_BY_ID)[0].get("UsuarioID"), Some(&json!(2)));

        let (status, body) =
            send(&app, "GET", "/api/usuarios/profile", Some(&token(9, Role::Tecnico)), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Usuario no encontrado");
    }

    #[tokio::test]
    async fn profile_update_validates_and_nulls_blanks() {
        let (app, backend) = test_app(accounts());
        let me = token(1, Role::Tecnico);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/profile",
            Some(&me),
            Some(json!({"email": "correo", "telefono": "abc"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "email");
        assert_eq!(body["errors"][1]["field"], "telefono");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/profile",
            Some(&me),
            Some(json!({"nombre": "Ana María", "telefono": "+502 5555-1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Perfil actualizado exitosamente");
        let params = &backend.calls_to(UPDATE_USUARIO_PROFILE)[0];
        assert_eq!(params.get("UsuarioID"), Some(&json!(1)));
        assert_eq!(params.get("Nombre"), Some(&json!("Ana María")));
        assert_eq!(params.get("Email"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn change_password_checks_the_current_one() {
        let (app, backend) = test_app(accounts());
        let me = token(1, Role::Tecnico);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/change-password",
            Some(&me),
            Some(json!({"currentPassword": "otra", "newPassword": "nueva123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Contraseña actual incorrecta");
        assert!(backend.calls_to(UPDATE_USUARIO_PASSWORD).is_empty());

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/change-password",
            Some(&me),
            Some(json!({"currentPassword": "actual1", "newPassword": "nueva123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Contraseña actualizada exitosamente");

        let params = &backend.calls_to(UPDATE_USUARIO_PASSWORD)[0];
        let stored = params.get("PasswordHash").and_then(Value::as_str).unwrap();
        assert!(verify_password("nueva123", stored).unwrap());
    }

    #[tokio::test]
    async fn change_password_rules() {
        let (app, _) = test_app(accounts());

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/change-password",
            Some(&token(1, Role::Tecnico)),
            Some(json!({"newPassword": "corta"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "currentPassword");
        assert_eq!(body["errors"][1]["field"], "newPassword");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/change-password",
            Some(&token(9, Role::Tecnico)),
            Some(json!({"currentPassword": "actual1", "newPassword": "nueva123"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Usuario no encontrado");
    }

    #[tokio::test]
    async fn administration_routes() {
        let (app, backend) = test_app(accounts());
        let admin = token(1, Role::Administrador);

        let (status, body) =
            send(&app, "PUT", "/api/usuarios/2/toggle-active", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Error al cambiar estado del usuario");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/2/role",
            Some(&admin),
            Some(json!({"rol": "Jefe"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["message"], "Rol inválido");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/usuarios/2/role",
            Some(&admin),
            Some(json!({"rol": "Coordinador"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Rol del usuario actualizado");
        let params = &backend.calls_to(UPDATE_USUARIO_ROLE)[0];
        assert_eq!(params.get("UsuarioID"), Some(&json!(2)));
        assert_eq!(params.get("Rol"), Some(&json!("Coordinador")));

        let (status, _) = send(
            &app,
            "PUT",
            "/api/usuarios/2/role",
            Some(&token(3, Role::Tecnico)),
            Some(json!({"rol": "Administrador"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
