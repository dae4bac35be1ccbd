//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Role, UserProfile};
use crate::infrastructure::crypto::jwt::TokenClaims;
use crate::shared::validations::validate_role;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(
        required(message = "Usuario es requerido"),
        length(min = 1, message = "Usuario es requerido")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "Contraseña es requerida"),
        length(min = 1, message = "Contraseña es requerida")
    )]
    pub password: Option<String>,
}

/// Login reply; `token` and `user` sit beside `success` at the top level.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Decoded token payload as returned by `/auth/verify`
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedUser {
    pub id: i64,
    pub username: String,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub rol: Role,
    pub iat: i64,
    pub exp: i64,
}

impl VerifiedUser {
    /// `None` when `sub` is not a numeric user id.
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            id: claims.user_id()?,
            username: claims.username,
            nombre: claims.nombre,
            apellido: claims.apellido,
            rol: claims.rol,
            iat: claims.iat,
            exp: claims.exp,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: VerifiedUser,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Usuario debe tener mínimo 3 caracteres"),
        length(min = 3, message = "Usuario debe tener mínimo 3 caracteres")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "Contraseña debe tener mínimo 6 caracteres"),
        length(min = 6, message = "Contraseña debe tener mínimo 6 caracteres")
    )]
    pub password: Option<String>,
    #[validate(
        required(message = "Nombre es requerido"),
        length(min = 1, message = "Nombre es requerido")
    )]
    pub nombre: Option<String>,
    #[validate(
        required(message = "Apellido es requerido"),
        length(min = 1, message = "Apellido es requerido")
    )]
    pub apellido: Option<String>,
    #[validate(required(message = "Email inválido"), email(message = "Email inválido"))]
    pub email: Option<String>,
    /// `Tecnico`, `Coordinador` or `Administrador`
    #[validate(
        required(message = "Rol inválido"),
        custom(function = "validate_role", message = "Rol inválido")
    )]
    pub rol: Option<String>,
}
