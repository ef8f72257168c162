use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError};

/// A geographic position in degrees. Compared by value, so a ring can tell
/// whether a tap landed on a point it already holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl Validate for Point {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError::new(
                "coordinates",
                format!("({}, {}) is not a valid position", self.lat, self.lng),
            ))
        }
    }
}
