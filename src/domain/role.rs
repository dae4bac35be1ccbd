//! User roles
//!
//! Closed set of permission tiers. Access rules check membership in an
//! explicit role list; there is no implied hierarchy between tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission tier carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Field technician: registers case files and evidence items
    Tecnico,
    /// Reviewer: approves or rejects submitted case files
    Coordinador,
    /// Administrator: manages user accounts
    Administrador,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Tecnico, Role::Coordinador, Role::Administrador];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tecnico => "Tecnico",
            Role::Coordinador => "Coordinador",
            Role::Administrador => "Administrador",
        }
    }

    /// Whether listings of case files should include records registered by
    /// other users. Technicians only see their own.
    pub fn sees_all_expedientes(&self) -> bool {
        matches!(self, Role::Coordinador | Role::Administrador)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
