use serde::{Deserialize, Serialize};

/// One stored sensor sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    /// Canonical `YYYY-MM-DD HH:MM:SS` local time, assigned at receipt.
    pub timestamp: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Hectopascal
    pub pressure: f64,
    pub lux: f64,
}

/// A reading that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub lux: f64,
}

/// Measurements accepted from a producer. The timestamp is never taken from the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub lux: f64,
}

impl Measurements {
    pub fn stamped(self, timestamp: String) -> NewReading {
        NewReading {
            timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
            lux: self.lux,
        }
    }
}

/// Column-oriented series for plotting. All vectors are index-aligned.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SeriesResponse {
    pub timestamps: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pressure: Vec<f64>,
    pub lux: Vec<f64>,
}

impl From<Vec<Reading>> for SeriesResponse {
    fn from(readings: Vec<Reading>) -> Self {
        let mut series = SeriesResponse {
            timestamps: Vec::with_capacity(readings.len()),
            temperature: Vec::with_capacity(readings.len()),
            humidity: Vec::with_capacity(readings.len()),
            pressure: Vec::with_capacity(readings.len()),
            lux: Vec::with_capacity(readings.len()),
        };

        for r in readings {
            series.timestamps.push(r.timestamp);
            series.temperature.push(r.temperature);
            series.humidity.push(r.humidity);
            series.pressure.push(r.pressure);
            series.lux.push(r.lux);
        }

        series
    }
}

impl SeriesResponse {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Acknowledgement returned by the ingestion endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: i64, timestamp: &str, base: f64) -> Reading {
        Reading {
            id,
            timestamp: timestamp.to_string(),
            temperature: base,
            humidity: base + 1.0,
            pressure: base + 2.0,
            lux: base + 3.0,
        }
    }

    #[test]
    fn test_series_columns_are_aligned() {
        let series = SeriesResponse::from(vec![
            reading(1, "2024-05-01 10:00:00", 10.0),
            reading(2, "2024-05-01 10:00:05", 20.0),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.temperature.len(), 2);
        assert_eq!(series.humidity.len(), 2);
        assert_eq!(series.pressure.len(), 2);
        assert_eq!(series.lux.len(), 2);
        assert_eq!(series.timestamps[1], "2024-05-01 10:00:05");
        assert_eq!(series.humidity[1], 21.0);
        assert_eq!(series.lux[0], 13.0);
    }

    #[test]
    fn test_empty_series_serializes_all_columns() {
        let series = SeriesResponse::from(Vec::new());
        assert!(series.is_empty());

        let json = serde_json::to_value(&series).unwrap();
        for key in ["timestamps", "temperature", "humidity", "pressure", "lux"] {
            assert_eq!(json[key], serde_json::json!([]), "column {key}");
        }
    }
}
