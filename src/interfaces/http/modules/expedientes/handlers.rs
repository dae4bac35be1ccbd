//! Case file (expediente) handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreateExpedienteRequest, ExpedienteFilters, RejectExpedienteRequest, UpdateExpedienteRequest,
};
use crate::domain::procedures::{
    APPROVE_EXPEDIENTE, CREATE_EXPEDIENTE, GET_EXPEDIENTES, GET_EXPEDIENTE_BY_ID,
    REJECT_EXPEDIENTE, SUBMIT_EXPEDIENTE_FOR_REVIEW, UPDATE_EXPEDIENTE,
};
use crate::domain::{ProcedureParams, Record};
use crate::interfaces::http::common::{
    blank_as_none, invoke, maybe, parse_path_id, ApiError, ApiResponse, OutcomeExt,
    ValidatedJson, ValidatedQuery,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::router::ApiState;

const INVALID_ID: &str = "ID de expediente inválido";

/// Technicians only see the case files they registered.
#[utoipa::path(
    get,
    path = "/api/expedientes",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    params(ExpedienteFilters),
    responses(
        (status = 200, description = "Case files visible to the caller"),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_expedientes(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedQuery(filters): ValidatedQuery<ExpedienteFilters>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let owner = (!user.rol.sees_all_expedientes()).then_some(user.id);

    let params = ProcedureParams::new()
        .with("Estado", blank_as_none(filters.estado))
        .with("FechaInicio", blank_as_none(filters.fecha_inicio))
        .with("FechaFin", blank_as_none(filters.fecha_fin))
        .with("UsuarioID", owner);

    let rows = invoke(&*state.backend, GET_EXPEDIENTES, params, "Error al obtener expedientes")
        .await?
        .into_rows("Error al obtener expedientes")?;

    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/expedientes/{id}",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Case file ID")),
    responses(
        (status = 200, description = "Case file"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_expediente(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Record>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    let row = invoke(
        &*state.backend,
        GET_EXPEDIENTE_BY_ID,
        ProcedureParams::new().with("ExpedienteID", id),
        "Error al obtener expediente",
    )
    .await?
    .into_found("Expediente no encontrado")?;

    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    post,
    path = "/api/expedientes",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    request_body = CreateExpedienteRequest,
    responses(
        (status = 201, description = "Case file created"),
        (status = 400, description = "Validation error or rejected by the database"),
        (status = 403, description = "Technicians only")
    )
)]
pub async fn create_expediente(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateExpedienteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Record>>), ApiError> {
    let params = ProcedureParams::new()
        .with("NumeroExpediente", request.numero_expediente)
        .with("Descripcion", request.descripcion)
        .with("Ubicacion", request.ubicacion)
        .with("FiscaliaOrigen", request.fiscalia_origen)
        .with("TecnicoRegistroID", user.id);

    let row = invoke(&*state.backend, CREATE_EXPEDIENTE, params, "Error al crear expediente")
        .await?
        .into_created("Error al crear expediente")?;

    Ok((
        StatusCode::CREATED,
        Json(maybe(row, "Expediente creado exitosamente")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/expedientes/{id}",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Case file ID")),
    request_body = UpdateExpedienteRequest,
    responses(
        (status = 200, description = "Case file updated"),
        (status = 400, description = "Validation error or rejected by the database")
    )
)]
pub async fn update_expediente(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateExpedienteRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    let params = ProcedureParams::new()
        .with("ExpedienteID", id)
        .with("Descripcion", request.descripcion)
        .with("Ubicacion", request.ubicacion)
        .with("FiscaliaOrigen", request.fiscalia_origen);

    invoke(&*state.backend, UPDATE_EXPEDIENTE, params, "Error al actualizar expediente")
        .await?
        .into_written("Error al actualizar expediente")?;

    Ok(Json(ApiResponse::message("Expediente actualizado exitosamente")))
}

#[utoipa::path(
    post,
    path = "/api/expedientes/{id}/submit-review",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Case file ID")),
    responses(
        (status = 200, description = "Submitted for review"),
        (status = 400, description = "Rejected by the database")
    )
)]
pub async fn submit_for_review(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    invoke(
        &*state.backend,
        SUBMIT_EXPEDIENTE_FOR_REVIEW,
        ProcedureParams::new().with("ExpedienteID", id),
        "Error al enviar expediente a revisión",
    )
    .await?
    .into_written("Error al enviar expediente a revisión")?;

    Ok(Json(ApiResponse::message(
        "Expediente enviado a revisión exitosamente",
    )))
}

#[utoipa::path(
    post,
    path = "/api/expedientes/{id}/approve",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Case file ID")),
    responses(
        (status = 200, description = "Approved"),
        (status = 400, description = "Rejected by the database, e.g. not under review"),
        (status = 403, description = "Coordinators and administrators only")
    )
)]
pub async fn approve_expediente(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    invoke(
        &*state.backend,
        APPROVE_EXPEDIENTE,
        ProcedureParams::new()
            .with("ExpedienteID", id)
            .with("CoordinadorID", user.id),
        "Error al aprobar expediente",
    )
    .await?
    .into_written("Error al aprobar expediente")?;

    Ok(Json(ApiResponse::message("Expediente aprobado exitosamente")))
}

#[utoipa::path(
    post,
    path = "/api/expedientes/{id}/reject",
    tag = "Expedientes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Case file ID")),
    request_body = RejectExpedienteRequest,
    responses(
        (status = 200, description = "Rejected"),
        (status = 400, description = "Missing justification or rejected by the database"),
        (status = 403, description = "Coordinators and administrators only")
    )
)]
pub async fn reject_expediente(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<RejectExpedienteRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    invoke(
        &*state.backend,
        REJECT_EXPEDIENTE,
        ProcedureParams::new()
            .with("ExpedienteID", id)
            .with("CoordinadorID", user.id)
            .with("JustificacionRechazo", request.justificacion),
        "Error al rechazar expediente",
    )
    .await?
    .into_written("Error al rechazar expediente")?;

    Ok(Json(ApiResponse::message("Expediente rechazado")))
}
