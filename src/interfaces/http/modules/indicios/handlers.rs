//! Evidence item (indicio) handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::dto::{CreateIndicioRequest, UpdateIndicioRequest};
use crate::domain::procedures::{
    CREATE_INDICIO, DELETE_INDICIO, GET_INDICIOS_BY_EXPEDIENTE, GET_INDICIO_BY_ID,
    UPDATE_INDICIO,
};
use crate::domain::{ProcedureParams, Record};
use crate::interfaces::http::common::{
    blank_as_none, invoke, maybe, parse_path_id, ApiError, ApiResponse, OutcomeExt,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::router::ApiState;
use crate::shared::validations::{as_integer, as_number};

const INVALID_ID: &str = "ID de indicio inválido";

fn peso(value: Option<Value>) -> Option<f64> {
    value.as_ref().and_then(as_number)
}

#[utoipa::path(
    get,
    path = "/api/indicios/expediente/{expediente_id}",
    tag = "Indicios",
    security(("bearer_auth" = [])),
    params(("expediente_id" = i64, Path, description = "Case file ID")),
    responses(
        (status = 200, description = "Evidence items of the case file"),
        (status = 400, description = "Invalid case file ID")
    )
)]
pub async fn list_by_expediente(
    State(state): State<ApiState>,
    Path(expediente_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Record>>>, ApiError> {
    let expediente_id =
        parse_path_id("expedienteId", &expediente_id, "ID de expediente inválido")?;

    let rows = invoke(
        &*state.backend,
        GET_INDICIOS_BY_EXPEDIENTE,
        ProcedureParams::new().with("ExpedienteID", expediente_id),
        "Error al obtener indicios",
    )
    .await?
    .into_rows("Error al obtener indicios")?;

    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/indicios/{id}",
    tag = "Indicios",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Evidence item ID")),
    responses(
        (status = 200, description = "Evidence item"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_indicio(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Record>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    let row = invoke(
        &*state.backend,
        GET_INDICIO_BY_ID,
        ProcedureParams::new().with("IndicioID", id),
        "Error al obtener indicio",
    )
    .await?
    .into_found("Indicio no encontrado")?;

    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    post,
    path = "/api/indicios",
    tag = "Indicios",
    security(("bearer_auth" = [])),
    request_body = CreateIndicioRequest,
    responses(
        (status = 201, description = "Evidence item created"),
        (status = 400, description = "Validation error or rejected by the database"),
        (status = 403, description = "Technicians only")
    )
)]
pub async fn create_indicio(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateIndicioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Record>>), ApiError> {
    let expediente_id = request.expediente_id.as_ref().and_then(as_integer);

    // The misspelt parameter name is what the procedure declares.
    let params = ProcedureParams::new()
        .with("ExpedienteID", expediente_id)
        .with("TipoIndicio", request.tipo_indicio)
        .with("Descripcion", request.descripcion)
        .with("UbicacionHallazgo", request.ubicacion_hallazgo)
        .with("Color", blank_as_none(request.color))
        .with("Tamaño", blank_as_none(request.tamano))
        .with("Peso", peso(request.peso))
        .with("UnidadPeso", blank_as_none(request.unidad_peso))
        .with("CadenaCustomdia", blank_as_none(request.cadena_custodia))
        .with("Observaciones", blank_as_none(request.observaciones))
        .with("TecnicoRegistroID", user.id);

    let row = invoke(&*state.backend, CREATE_INDICIO, params, "Error al crear indicio")
        .await?
        .into_created("Error al crear indicio")?;

    Ok((
        StatusCode::CREATED,
        Json(maybe(row, "Indicio creado exitosamente")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/indicios/{id}",
    tag = "Indicios",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Evidence item ID")),
    request_body = UpdateIndicioRequest,
    responses(
        (status = 200, description = "Evidence item updated"),
        (status = 400, description = "Validation error or rejected by the database")
    )
)]
pub async fn update_indicio(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateIndicioRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    let params = ProcedureParams::new()
        .with("IndicioID", id)
        .with("Descripcion", request.descripcion)
        .with("UbicacionHallazgo", request.ubicacion_hallazgo)
        .with("Color", request.color)
        .with("Tamaño", request.tamano)
        .with("Peso", peso(request.peso))
        .with("UnidadPeso", request.unidad_peso)
        .with("Observaciones", request.observaciones);

    invoke(&*state.backend, UPDATE_INDICIO, params, "Error al actualizar indicio")
        .await?
        .into_written("Error al actualizar indicio")?;

    Ok(Json(ApiResponse::message("Indicio actualizado exitosamente")))
}

#[utoipa::path(
    delete,
    path = "/api/indicios/{id}",
    tag = "Indicios",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Evidence item ID")),
    responses(
        (status = 200, description = "Evidence item deleted"),
        (status = 400, description = "Rejected by the database")
    )
)]
pub async fn delete_indicio(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_path_id("id", &id, INVALID_ID)?;

    invoke(
        &*state.backend,
        DELETE_INDICIO,
        ProcedureParams::new().with("IndicioID", id),
        "Error al eliminar indicio",
    )
    .await?
    .into_written("Error al eliminar indicio")?;

    Ok(Json(ApiResponse::message("Indicio eliminado exitosamente")))
}
