use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Record, Role};

/// Column names that hold credential material and must never leave the
/// service.
const SECRET_COLUMNS: [&str; 2] = ["passwordhash", "password_hash"];

/// User row as returned by `sp_GetUsuarioByUsername` / `sp_GetUsuarioById`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "UsuarioID")]
    pub id: i64,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "PasswordHash")]
    pub password_hash: String,
    #[serde(rename = "Nombre", default)]
    pub nombre: Option<String>,
    #[serde(rename = "Apellido", default)]
    pub apellido: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Rol")]
    pub rol: Role,
    #[serde(rename = "Activo", deserialize_with = "bool_or_bit")]
    pub activo: bool,
}

impl UserRecord {
    pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record))
    }

    /// Public view of the account, without the password hash.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            nombre: self.nombre.clone(),
            apellido: self.apellido.clone(),
            email: self.email.clone(),
            rol: self.rol,
        }
    }
}

/// Redacted user profile returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub rol: Role,
}

/// Strip credential columns from a raw user row.
pub fn redact(mut record: Record) -> Record {
    record.retain(|column, _| {
        !SECRET_COLUMNS
            .iter()
            .any(|secret| column.eq_ignore_ascii_case(secret))
    });
    record
}

/// Accepts `true`/`false` as well as SQL bit values `1`/`0`.
fn bool_or_bit<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().is_some_and(|v| v != 0)),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected boolean for Activo, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(activo: Value) -> Record {
        let Value::Object(map) = json!({
            "UsuarioID": 4,
            "Username": "jperez",
            "PasswordHash": "$2b$04$abc",
            "Nombre": "Juan",
            "Apellido": "Pérez",
            "Email": "jperez@mp.gob.gt",
            "Rol": "Tecnico",
            "Activo": activo,
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn parses_bit_and_bool_active_flags() {
        assert!(UserRecord::from_record(row(json!(true))).unwrap().activo);
        assert!(UserRecord::from_record(row(json!(1))).unwrap().activo);
        assert!(!UserRecord::from_record(row(json!(0))).unwrap().activo);
        assert!(UserRecord::from_record(row(json!("yes"))).is_err());
    }

    #[test]
    fn profile_has_no_password_hash() {
        let user = UserRecord::from_record(row(json!(true))).unwrap();
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("PasswordHash").is_none());
        assert_eq!(json["rol"], "Tecnico");
    }

    #[test]
    fn redact_removes_hash_in_any_casing() {
        let mut record = row(json!(true));
        record.insert("password_hash".into(), json!("x"));
        let cleaned = redact(record);
        assert!(!cleaned.contains_key("PasswordHash"));
        assert!(!cleaned.contains_key("password_hash"));
        assert_eq!(cleaned["Username"], "jperez");
    }
}
