//! Static scalar registration table
//!
//! Each scalar type the schema understands is registered here with the index
//! mapping type it translates to and a coercion function that normalizes
//! incoming JSON values before they are indexed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};

use super::errors::{SchemaError, SchemaResult};

/// Reserved object type holding a latitude/longitude pair
pub const GEO_POINT: &str = "GeoPoint";

/// Coercion function for one scalar type
pub type CoerceFn = fn(&Value) -> SchemaResult<Value>;

/// Registration entry for one scalar type
#[derive(Debug, Clone, Copy)]
pub struct ScalarSpec {
    /// Scalar type name
    pub name: &'static str,
    /// Index mapping type, if the scalar maps without an override
    pub mapped_type: Option<&'static str>,
    /// Built into the schema language (never declared with `scalar`)
    pub builtin: bool,
    /// Normalizes an input value
    pub coerce: CoerceFn,
}

/// Every registered scalar, in name order
pub static SCALARS: &[ScalarSpec] = &[
    ScalarSpec { name: "BigDecimal", mapped_type: None, builtin: false, coerce: coerce_big_decimal },
    ScalarSpec { name: "BigInteger", mapped_type: None, builtin: false, coerce: coerce_big_integer },
    ScalarSpec { name: "Boolean", mapped_type: Some("boolean"), builtin: true, coerce: coerce_boolean },
    ScalarSpec { name: "Byte", mapped_type: Some("byte"), builtin: false, coerce: coerce_byte },
    ScalarSpec { name: "Date", mapped_type: Some("date"), builtin: false, coerce: coerce_date },
    ScalarSpec { name: "Float", mapped_type: Some("double"), builtin: true, coerce: coerce_float },
    ScalarSpec { name: "ID", mapped_type: Some("keyword"), builtin: true, coerce: coerce_id },
    ScalarSpec { name: "Instant", mapped_type: Some("date"), builtin: false, coerce: coerce_instant },
    ScalarSpec { name: "Int", mapped_type: Some("integer"), builtin: true, coerce: coerce_int },
    ScalarSpec { name: "LocalDateTime", mapped_type: Some("date"), builtin: false, coerce: coerce_local_date_time },
    ScalarSpec { name: "LocalTime", mapped_type: None, builtin: false, coerce: coerce_local_time },
    ScalarSpec { name: "Long", mapped_type: Some("long"), builtin: false, coerce: coerce_long },
    ScalarSpec { name: "Short", mapped_type: Some("short"), builtin: false, coerce: coerce_short },
    ScalarSpec { name: "String", mapped_type: Some("text"), builtin: true, coerce: coerce_string },
];

/// Look up a registered scalar by name
pub fn lookup(name: &str) -> Option<&'static ScalarSpec> {
    SCALARS.iter().find(|spec| spec.name == name)
}

/// Coerce a value through a scalar's registration.
///
/// Null passes through unchanged. Unregistered scalars pass values through
/// unchanged.
pub fn coerce(scalar: &str, value: &Value) -> SchemaResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match lookup(scalar) {
        Some(spec) => (spec.coerce)(value),
        None => Ok(value.clone()),
    }
}

fn invalid(scalar: &str, value: &Value) -> SchemaError {
    SchemaError::invalid_value(scalar, format!("cannot coerce {}", value))
}

/// Integer from a JSON number or a numeric string
fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn bounded_integer(scalar: &str, value: &Value, min: i64, max: i64) -> SchemaResult<Value> {
    match integer_of(value) {
        Some(n) if (min..=max).contains(&n) => Ok(Value::from(n)),
        _ => Err(invalid(scalar, value)),
    }
}

fn coerce_boolean(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        _ => Err(invalid("Boolean", value)),
    }
}

fn coerce_byte(value: &Value) -> SchemaResult<Value> {
    bounded_integer("Byte", value, i8::MIN.into(), i8::MAX.into())
}

fn coerce_short(value: &Value) -> SchemaResult<Value> {
    bounded_integer("Short", value, i16::MIN.into(), i16::MAX.into())
}

fn coerce_int(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => Ok(value.clone()),
            _ => Err(invalid("Int", value)),
        },
        _ => Err(invalid("Int", value)),
    }
}

fn coerce_long(value: &Value) -> SchemaResult<Value> {
    bounded_integer("Long", value, i64::MIN, i64::MAX)
}

fn coerce_float(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        _ => Err(invalid("Float", value)),
    }
}

fn coerce_string(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::String(_) => Ok(value.clone()),
        _ => Err(invalid("String", value)),
    }
}

fn coerce_id(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
        _ => Err(invalid("ID", value)),
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn coerce_big_integer(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
        Value::String(s) if is_integer_literal(s) => Ok(value.clone()),
        _ => Err(invalid("BigInteger", value)),
    }
}

fn coerce_big_decimal(value: &Value) -> SchemaResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::String(s) if serde_json::from_str::<Number>(s).is_ok() => Ok(value.clone()),
        _ => Err(invalid("BigDecimal", value)),
    }
}

fn coerce_date(value: &Value) -> SchemaResult<Value> {
    match value.as_str() {
        Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => Ok(value.clone()),
        _ => Err(invalid("Date", value)),
    }
}

fn coerce_instant(value: &Value) -> SchemaResult<Value> {
    match value.as_str() {
        Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => Ok(value.clone()),
        _ => Err(invalid("Instant", value)),
    }
}

fn coerce_local_date_time(value: &Value) -> SchemaResult<Value> {
    match value.as_str() {
        Some(s) if NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok() => {
            Ok(value.clone())
        }
        _ => Err(invalid("LocalDateTime", value)),
    }
}

fn coerce_local_time(value: &Value) -> SchemaResult<Value> {
    match value.as_str() {
        Some(s) if NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok() => Ok(value.clone()),
        _ => Err(invalid("LocalTime", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapped_types() {
        assert_eq!(lookup("Boolean").unwrap().mapped_type, Some("boolean"));
        assert_eq!(lookup("Float").unwrap().mapped_type, Some("double"));
        assert_eq!(lookup("ID").unwrap().mapped_type, Some("keyword"));
        assert_eq!(lookup("Instant").unwrap().mapped_type, Some("date"));
        assert_eq!(lookup("String").unwrap().mapped_type, Some("text"));
        assert_eq!(lookup("BigDecimal").unwrap().mapped_type, None);
        assert!(lookup("GeoPoint").is_none());
    }

    #[test]
    fn test_table_is_sorted() {
        let names: Vec<&str> = SCALARS.iter().map(|s| s.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_long_from_string() {
        assert_eq!(coerce("Long", &json!("9007199254740993")).unwrap(), json!(9007199254740993i64));
        assert_eq!(coerce("Long", &json!(5)).unwrap(), json!(5));
        assert!(coerce("Long", &json!("five")).is_err());
    }

    #[test]
    fn test_bounded_integers() {
        assert_eq!(coerce("Byte", &json!(127)).unwrap(), json!(127));
        assert!(coerce("Byte", &json!(128)).is_err());
        assert!(coerce("Short", &json!(40000)).is_err());
        assert!(coerce("Int", &json!(3_000_000_000i64)).is_err());
        assert!(coerce("Int", &json!("3")).is_err());
    }

    #[test]
    fn test_date_time_scalars() {
        assert!(coerce("Date", &json!("2024-02-29")).is_ok());
        assert!(coerce("Date", &json!("2023-02-29")).is_err());
        assert!(coerce("Instant", &json!("2024-01-01T10:00:00Z")).is_ok());
        assert!(coerce("Instant", &json!("2024-01-01 10:00")).is_err());
        assert!(coerce("LocalDateTime", &json!("2024-01-01T10:00:00")).is_ok());
        assert!(coerce("LocalTime", &json!("23:59:59")).is_ok());
        assert!(coerce("LocalTime", &json!("25:00:00")).is_err());
    }

    #[test]
    fn test_id_and_big_numbers() {
        assert_eq!(coerce("ID", &json!(42)).unwrap(), json!("42"));
        assert_eq!(coerce("BigInteger", &json!(12)).unwrap(), json!("12"));
        assert!(coerce("BigInteger", &json!("12.5")).is_err());
        assert_eq!(coerce("BigDecimal", &json!("12.50")).unwrap(), json!("12.50"));
    }

    #[test]
    fn test_null_and_unknown_pass_through() {
        assert_eq!(coerce("Int", &Value::Null).unwrap(), Value::Null);
        assert_eq!(coerce("Custom", &json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_invalid_value_is_reject() {
        let err = coerce("Boolean", &json!("yes")).unwrap_err();
        assert!(!err.is_fatal());
    }
}
