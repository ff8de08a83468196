use rand::Rng;
use serde::{Deserialize, Serialize};

/// Body of one `POST /sensordata` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorPayload {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub lux: f64,
}

impl SensorPayload {
    /// Indoor-ish conditions: 20-30 °C, 30-70 % RH, 1010-1016 hPa, 0-1000 lux.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            temperature: round2(rng.gen_range(20.0..30.0)),
            humidity: round2(rng.gen_range(30.0..70.0)),
            pressure: round2(rng.gen_range(1010.0..1016.0)),
            lux: round2(rng.gen_range(0.0..1000.0)),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
