//! Raw probe samples
//!
//! Samples arrive as a JSON array of `{x, y, z}` objects, in probe order.
//! Coordinates may be JSON numbers or numeric strings.

use levelkit_core::{HeightMapError, Point3};
use serde::{Deserialize, Deserializer, Serialize};

/// A single height sample in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// True when the point was synthesized by extrapolation
    #[serde(default)]
    pub calculated: bool,
}

impl HeightPoint {
    /// Create a measured point
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            calculated: false,
        }
    }

    /// Create an extrapolated point
    pub fn calculated(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            calculated: true,
        }
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => value,
        NumberOrString::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", text)))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!("{} is not finite", value)));
    }
    Ok(value)
}

#[derive(Deserialize)]
struct RawSample {
    #[serde(deserialize_with = "lenient_f64")]
    x: f64,
    #[serde(deserialize_with = "lenient_f64")]
    y: f64,
    #[serde(deserialize_with = "lenient_f64")]
    z: f64,
}

/// Parse a JSON sample list into measured points
///
/// Z values are rounded to three decimals (half up), X and Y are kept as given.
pub fn parse_samples(json: &str) -> Result<Vec<HeightPoint>, HeightMapError> {
    let raw: Vec<RawSample> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|s| HeightPoint::new(s.x, s.y, round_z(s.z)))
        .collect())
}

/// Round to three decimals, half up
pub fn round_z(z: f64) -> f64 {
    (z * 1000.0 + 0.5).floor() / 1000.0
}
