//! Custom field validators used with `#[validate(custom(function = ...))]`

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use validator::ValidationError;

use crate::domain::indicio::is_unidad_peso;
use crate::domain::{EstadoExpediente, Role};

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// ISO-8601 calendar date (`2024`, `2024-03`, `2024-03-01`, `20240301`) or
/// date-time (`2024-03-01T10:15`, seconds and fraction optional, `T` or a
/// space as separator, optional `Z` / `±HH:MM` / `±HHMM` / `±HH` offset).
pub fn validate_iso8601(value: &str) -> Result<(), ValidationError> {
    let ok = match value.split_once(['T', ' ']) {
        Some((date, time)) => is_full_date(date) && is_iso_time(time),
        None => is_iso_date(value),
    };

    if ok {
        Ok(())
    } else {
        Err(invalid("iso8601", "Fecha inválida"))
    }
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_full_date(value: &str) -> bool {
    let expanded = match value.len() {
        8 if all_digits(value) => format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..]),
        10 => value.to_string(),
        _ => return false,
    };
    NaiveDate::parse_from_str(&expanded, "%Y-%m-%d").is_ok()
}

fn is_iso_date(value: &str) -> bool {
    match value.len() {
        4 => all_digits(value),
        7 => {
            value.as_bytes()[4] == b'-'
                && all_digits(&value[..4])
                && NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok()
        }
        _ => is_full_date(value),
    }
}

fn is_iso_time(value: &str) -> bool {
    let (clock, offset) = match value.strip_suffix(['Z', 'z']) {
        Some(clock) => (clock, None),
        None => match value.rfind(['+', '-']) {
            Some(at) => (&value[..at], Some(&value[at + 1..])),
            None => (value, None),
        },
    };

    let offset_ok = offset.map_or(true, |zone| {
        let digits = zone.replacen(':', "", 1);
        matches!(digits.len(), 2 | 4)
            && all_digits(&digits)
            && digits[..2].parse::<u32>().is_ok_and(|h| h <= 23)
            && digits.get(2..).map_or(true, |m| m.is_empty() || m.parse::<u32>().is_ok_and(|m| m <= 59))
            && (zone.len() != 5 || zone.as_bytes()[2] == b':')
    });

    offset_ok
        && (NaiveTime::parse_from_str(clock, "%H:%M:%S%.f").is_ok()
            || NaiveTime::parse_from_str(clock, "%H:%M").is_ok())
}

/// Decimal integer, as sent in query strings.
pub fn validate_integer_str(value: &str) -> Result<(), ValidationError> {
    i64::from_str(value.trim())
        .map(|_| ())
        .map_err(|_| invalid("integer", "Debe ser un número entero"))
}

/// JSON integer, or a string holding one.
pub fn validate_integer(value: &Value) -> Result<(), ValidationError> {
    if as_integer(value).is_some() {
        Ok(())
    } else {
        Err(invalid("integer", "Debe ser un número entero"))
    }
}

/// JSON number, or a string holding one.
pub fn validate_numeric(value: &Value) -> Result<(), ValidationError> {
    if as_number(value).is_some() {
        Ok(())
    } else {
        Err(invalid("numeric", "Debe ser un valor numérico"))
    }
}

/// Optional `+`, then 7 to 15 digits; spaces and dashes are ignored.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let rest = value.strip_prefix('+').unwrap_or(value);
    let mut digits = 0;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => return Err(invalid("phone", "Teléfono inválido")),
        }
    }

    if (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(invalid("phone", "Teléfono inválido"))
    }
}

pub fn validate_role(value: &str) -> Result<(), ValidationError> {
    Role::from_str(value)
        .map(|_| ())
        .map_err(|_| invalid("role", "Rol inválido"))
}

pub fn validate_estado(value: &str) -> Result<(), ValidationError> {
    match EstadoExpediente::parse(value) {
        Some(_) => Ok(()),
        None => Err(invalid("estado", "Estado inválido")),
    }
}

pub fn validate_unidad_peso(value: &str) -> Result<(), ValidationError> {
    if is_unidad_peso(value) {
        Ok(())
    } else {
        Err(invalid("unidad_peso", "Unidad de peso inválida"))
    }
}

/// Integer view of a JSON value that passed [`validate_integer`].
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric view of a JSON value that passed [`validate_numeric`].
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iso8601_dates_and_datetimes() {
        assert!(validate_iso8601("2024-03-01").is_ok());
        assert!(validate_iso8601("2024-03-01T10:15:00Z").is_ok());
        assert!(validate_iso8601("2024-03-01T10:15:00.250").is_ok());
        assert!(validate_iso8601("2024-03-01T10:15").is_ok());
        assert!(validate_iso8601("01/03/2024").is_err());
        assert!(validate_iso8601("2024-03-01T10:15:99").is_err());
        assert!(validate_iso8601("2024-03-01T10:15+25:00").is_err());
        assert!(validate_iso8601("2024-13-01").is_err());
        assert!(validate_iso8601("").is_err());
    }

    #[test]
    fn reduced_precision_and_compact_forms() {
        assert!(validate_iso8601("2024").is_ok());
        assert!(validate_iso8601("2024-01").is_ok());
        assert!(validate_iso8601("20240101").is_ok());
        assert!(validate_iso8601("2024-01-01T10:00Z").is_ok());
        assert!(validate_iso8601("2024-01-01T10:00-06:00").is_ok());
        assert!(validate_iso8601("2024-01-01 10:00:00+0100").is_ok());
        assert!(validate_iso8601("2024-13").is_err());
        assert!(validate_iso8601("202401").is_err());
        assert!(validate_iso8601("24").is_err());
    }

    #[test]
    fn integers_from_json_and_strings() {
        assert!(validate_integer(&json!(12)).is_ok());
        assert!(validate_integer(&json!("12")).is_ok());
        assert!(validate_integer(&json!(1.5)).is_err());
        assert!(validate_integer(&json!("doce")).is_err());
        assert!(validate_integer(&json!(null)).is_err());
        assert!(validate_integer_str("2024").is_ok());
        assert!(validate_integer_str("20x4").is_err());
    }

    #[test]
    fn numeric_values() {
        assert_eq!(as_number(&json!(2.5)), Some(2.5));
        assert_eq!(as_number(&json!("0.75")), Some(0.75));
        assert!(validate_numeric(&json!("heavy")).is_err());
        assert!(validate_numeric(&json!(true)).is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("+502 5555-1234").is_ok());
        assert!(validate_phone("55551234").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn enumerations() {
        assert!(validate_role("Coordinador").is_ok());
        assert!(validate_role("admin").is_err());
        assert!(validate_estado("EnRevision").is_ok());
        assert!(validate_estado("Cerrado").is_err());
        assert!(validate_unidad_peso("kg").is_ok());
        assert!(validate_unidad_peso("ton").is_err());
    }

    #[test]
    fn messages_are_attached() {
        let err = validate_role("x").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Rol inválido"));
    }
}
