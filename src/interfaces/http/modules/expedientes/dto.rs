//! Case file (expediente) DTOs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::validations::{validate_estado, validate_iso8601};

/// Filters for the case file listing
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpedienteFilters {
    /// `Pendiente`, `EnRevision`, `Aprobado` or `Rechazado`
    #[validate(custom(function = "validate_estado"))]
    pub estado: Option<String>,
    /// ISO-8601 date
    #[validate(custom(function = "validate_iso8601", message = "Fecha inicio inválida"))]
    pub fecha_inicio: Option<String>,
    /// ISO-8601 date
    #[validate(custom(function = "validate_iso8601", message = "Fecha fin inválida"))]
    pub fecha_fin: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpedienteRequest {
    #[validate(
        required(message = "Número de expediente es requerido"),
        length(min = 1, message = "Número de expediente es requerido")
    )]
    pub numero_expediente: Option<String>,
    #[validate(
        required(message = "Descripción es requerida"),
        length(min = 1, message = "Descripción es requerida")
    )]
    pub descripcion: Option<String>,
    #[validate(
        required(message = "Ubicación es requerida"),
        length(min = 1, message = "Ubicación es requerida")
    )]
    pub ubicacion: Option<String>,
    #[validate(
        required(message = "Fiscalía de origen es requerida"),
        length(min = 1, message = "Fiscalía de origen es requerida")
    )]
    pub fiscalia_origen: Option<String>,
}

/// Absent fields are left unchanged by the procedure.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpedienteRequest {
    #[validate(length(min = 1, message = "Descripción no puede estar vacía"))]
    pub descripcion: Option<String>,
    #[validate(length(min = 1, message = "Ubicación no puede estar vacía"))]
    pub ubicacion: Option<String>,
    #[validate(length(min = 1, message = "Fiscalía de origen no puede estar vacía"))]
    pub fiscalia_origen: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectExpedienteRequest {
    #[validate(
        required(message = "Justificación es requerida para rechazar"),
        length(min = 1, message = "Justificación es requerida para rechazar")
    )]
    pub justificacion: Option<String>,
}
