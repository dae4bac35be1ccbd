//! User account DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validations::{validate_phone, validate_role};

/// Absent or empty fields are cleared to `NULL` by the procedure.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Nombre no puede estar vacío"))]
    pub nombre: Option<String>,
    #[validate(length(min = 1, message = "Apellido no puede estar vacío"))]
    pub apellido: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub telefono: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(
        required(message = "Contraseña actual es requerida"),
        length(min = 1, message = "Contraseña actual es requerida")
    )]
    pub current_password: Option<String>,
    #[validate(
        required(message = "Nueva contraseña debe tener mínimo 6 caracteres"),
        length(min = 6, message = "Nueva contraseña debe tener mínimo 6 caracteres")
    )]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    /// `Tecnico`, `Coordinador` or `Administrador`
    #[validate(
        required(message = "Rol inválido"),
        custom(function = "validate_role", message = "Rol inválido")
    )]
    pub rol: Option<String>,
}
