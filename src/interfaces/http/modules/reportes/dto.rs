//! Report query parameters

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::shared::validations::{validate_estado, validate_integer_str, validate_iso8601};

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpedientesReportQuery {
    #[validate(custom(function = "validate_iso8601", message = "Fecha inicio inválida"))]
    pub fecha_inicio: Option<String>,
    #[validate(custom(function = "validate_iso8601", message = "Fecha fin inválida"))]
    pub fecha_fin: Option<String>,
    #[validate(custom(function = "validate_estado"))]
    pub estado: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IndiciosReportQuery {
    #[validate(custom(function = "validate_iso8601", message = "Fecha inicio inválida"))]
    pub fecha_inicio: Option<String>,
    #[validate(custom(function = "validate_iso8601", message = "Fecha fin inválida"))]
    pub fecha_fin: Option<String>,
    pub tipo_indicio: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActividadReportQuery {
    #[validate(custom(function = "validate_iso8601", message = "Fecha inicio inválida"))]
    pub fecha_inicio: Option<String>,
    #[validate(custom(function = "validate_iso8601", message = "Fecha fin inválida"))]
    pub fecha_fin: Option<String>,
    /// Restrict to one user
    #[validate(custom(function = "validate_integer_str"))]
    pub usuario_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TendenciasQuery {
    /// Defaults to the current year
    #[serde(rename = "año")]
    #[validate(custom(function = "validate_integer_str", message = "Año inválido"))]
    pub anio: Option<String>,
}
