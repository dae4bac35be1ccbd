//! Evidence item (indicio) DTOs

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validations::{validate_integer, validate_numeric, validate_unidad_peso};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndicioRequest {
    /// Integer, or a string holding one
    #[validate(
        required(message = "ID de expediente es requerido"),
        custom(function = "validate_integer", message = "ID de expediente es requerido")
    )]
    #[schema(value_type = i64)]
    pub expediente_id: Option<Value>,
    #[validate(
        required(message = "Tipo de indicio es requerido"),
        length(min = 1, message = "Tipo de indicio es requerido")
    )]
    pub tipo_indicio: Option<String>,
    #[validate(
        required(message = "Descripción es requerida"),
        length(min = 1, message = "Descripción es requerida")
    )]
    pub descripcion: Option<String>,
    #[validate(
        required(message = "Ubicación del hallazgo es requerida"),
        length(min = 1, message = "Ubicación del hallazgo es requerida")
    )]
    pub ubicacion_hallazgo: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "tamaño")]
    pub tamano: Option<String>,
    #[validate(custom(function = "validate_numeric"))]
    #[schema(value_type = Option<f64>)]
    pub peso: Option<Value>,
    /// `g`, `kg`, `lb` or `oz`
    #[validate(custom(function = "validate_unidad_peso"))]
    pub unidad_peso: Option<String>,
    /// Chain of custody notes
    #[serde(alias = "cadenaCustomdia")]
    pub cadena_custodia: Option<String>,
    pub observaciones: Option<String>,
}

/// Absent fields are left unchanged by the procedure.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIndicioRequest {
    #[validate(length(min = 1, message = "Descripción no puede estar vacía"))]
    pub descripcion: Option<String>,
    #[validate(length(min = 1, message = "Ubicación del hallazgo no puede estar vacía"))]
    pub ubicacion_hallazgo: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "tamaño")]
    pub tamano: Option<String>,
    #[validate(custom(function = "validate_numeric"))]
    #[schema(value_type = Option<f64>)]
    pub peso: Option<Value>,
    #[validate(custom(function = "validate_unidad_peso"))]
    pub unidad_peso: Option<String>,
    pub observaciones: Option<String>,
}
