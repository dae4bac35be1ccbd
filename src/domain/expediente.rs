//! Case file (expediente) vocabulary
//!
//! State transitions are owned by the stored procedures; the API only
//! needs the names to validate filters.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Review state of a case file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EstadoExpediente {
    Pendiente,
    EnRevision,
    Aprobado,
    Rechazado,
}

impl EstadoExpediente {
    pub const ALL: [EstadoExpediente; 4] = [
        EstadoExpediente::Pendiente,
        EstadoExpediente::EnRevision,
        EstadoExpediente::Aprobado,
        EstadoExpediente::Rechazado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoExpediente::Pendiente => "Pendiente",
            EstadoExpediente::EnRevision => "EnRevision",
            EstadoExpediente::Aprobado => "Aprobado",
            EstadoExpediente::Rechazado => "Rechazado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|estado| estado.as_str() == s)
    }
}
