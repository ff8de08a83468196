use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::model::Measurements;

pub const NO_DATA: &str = "No data received";

const TEMPERATURE: &str = "temperature";
const HUMIDITY: &str = "humidity";
const PRESSURE: &str = "pressure";
const LUX: &str = "lux";

/// Parses an ingestion body into measurements.
///
/// Only presence and numeric type are checked; values are not range-checked.
/// Keys other than the four measurements are ignored.
pub fn parse_payload(body: &[u8]) -> Result<Measurements> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::BadRequest(NO_DATA.to_string()));
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|_| Error::BadRequest(NO_DATA.to_string()))?;
    validate(&value)
}

pub fn validate(value: &Value) -> Result<Measurements> {
    let fields = match value.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => return Err(Error::BadRequest(NO_DATA.to_string())),
    };

    Ok(Measurements {
        temperature: number(fields, TEMPERATURE)?,
        humidity: number(fields, HUMIDITY)?,
        pressure: number(fields, PRESSURE)?,
        lux: number(fields, LUX)?,
    })
}

fn number(fields: &Map<String, Value>, name: &str) -> Result<f64> {
    let value = fields
        .get(name)
        .ok_or_else(|| Error::BadRequest(format!("missing field: {name}")))?;

    value
        .as_f64()
        .ok_or_else(|| Error::BadRequest(format!("field {name} must be a number")))
}
