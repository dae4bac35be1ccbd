//! PostgreSQL procedure backend
//!
//! Procedures are exposed by the database as set-returning functions and
//! called with named notation:
//!
//! ```sql
//! SELECT * FROM "sp_GetExpedientes"("Estado" => $1, "FechaInicio" => NULL, ...)
//! ```
//!
//! Integer parameters are bound as `BIGINT`, decimals as `DOUBLE PRECISION`,
//! strings as `TEXT`. `NULL`s are inlined so the database can resolve their
//! type from the function signature.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, JsonValue, RuntimeErr,
    Statement, Value as DbValue,
};
use serde_json::Value;
use tracing::debug;

use crate::domain::{BackendError, ProcedureBackend, ProcedureOutcome, ProcedureParams, Record};

/// SQLSTATE class for errors raised from PL/pgSQL (`RAISE EXCEPTION`).
const PLPGSQL_ERROR_CLASS: &str = "P0";

/// [`ProcedureBackend`] backed by a SeaORM PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgProcedureBackend {
    db: DatabaseConnection,
}

impl PgProcedureBackend {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ProcedureBackend for PgProcedureBackend {
    async fn invoke(
        &self,
        procedure: &str,
        params: ProcedureParams,
    ) -> Result<ProcedureOutcome, BackendError> {
        let (sql, values) = build_call(procedure, &params)?;
        debug!(procedure, sql = %sql, "Calling stored procedure");

        let statement = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        match JsonValue::find_by_statement(statement).all(&self.db).await {
            Ok(rows) => Ok(ProcedureOutcome::rows(
                rows.into_iter().filter_map(into_record).collect(),
            )),
            Err(err) => match raised_by_procedure(&err) {
                Some(message) => Ok(ProcedureOutcome::failure(message)),
                None => Err(BackendError::Database(err.to_string())),
            },
        }
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.db
            .execute(Statement::from_string(
                DbBackend::Postgres,
                "SELECT 1".to_string(),
            ))
            .await
            .map(|_| ())
            .map_err(|e| BackendError::Database(e.to_string()))
    }
}

/// Render the SQL call and the bound values for a procedure invocation.
pub fn build_call(
    procedure: &str,
    params: &ProcedureParams,
) -> Result<(String, Vec<DbValue>), BackendError> {
    let procedure = quote_identifier(procedure)?;

    let mut arguments = Vec::with_capacity(params.len());
    let mut values = Vec::new();

    for (name, value) in params.iter() {
        let name = quote_identifier(name)?;
        match to_db_value(name.as_str(), value)? {
            Some(bound) => {
                values.push(bound);
                arguments.push(format!("{} => ${}", name, values.len()));
            }
            None => arguments.push(format!("{} => NULL", name)),
        }
    }

    let sql = format!("SELECT * FROM {}({})", procedure, arguments.join(", "));
    Ok((sql, values))
}

/// Double-quote an identifier after checking it contains only letters,
/// digits and underscores.
fn quote_identifier(name: &str) -> Result<String, BackendError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(BackendError::InvalidIdentifier(name.to_string()))
    }
}

fn to_db_value(name: &str, value: &Value) -> Result<Option<DbValue>, BackendError> {
    let bound = match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => DbValue::from(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => DbValue::from(i),
            (None, Some(f)) => DbValue::from(f),
            (None, None) => {
                return Err(BackendError::UnsupportedValue {
                    name: name.to_string(),
                    value: value.clone(),
                })
            }
        },
        Value::String(s) => DbValue::from(s.clone()),
        Value::Array(_) | Value::Object(_) => DbValue::from(value.clone()),
    };
    Ok(Some(bound))
}

fn into_record(row: JsonValue) -> Option<Record> {
    match row {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

/// Message of an exception raised inside the procedure, if that is what
/// `err` is. Such errors are business-rule refusals, not outages.
fn raised_by_procedure(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Query(runtime) | DbErr::Exec(runtime) => runtime,
        _ => return None,
    };
    let RuntimeErr::SqlxError(sqlx_err) = runtime else {
        return None;
    };
    let db_err = sqlx_err.as_database_error()?;
    let code = db_err.code()?;

    code.starts_with(PLPGSQL_ERROR_CLASS)
        .then(|| db_err.message().to_string())
}
