use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::{point::Point, validate_price, ExampleData, Validate, ValidationError};

/// Price used for a freshly drawn parking until something else is configured.
pub const DEFAULT_PARKING_PRICE: f64 = 300.0;

/// Smallest number of edges that still closes an area.
pub const MIN_EDGES: usize = 3;

/// A parking area. `edges` is the ordered boundary; the closing edge from the
/// last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Parking {
    pub price: f64,
    pub edges: Vec<Point>,
}

impl Parking {
    pub fn new(price: f64, edges: Vec<Point>) -> Self {
        Self { price, edges }
    }
}

impl HasId for Parking {
    type IdType = String;
}

impl Validate for Parking {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_price(self.price)?;
        if self.edges.len() < MIN_EDGES {
            return Err(ValidationError::new(
                "edges",
                format!("needs at least {} points", MIN_EDGES),
            ));
        }
        if let Some(invalid) = self.edges.iter().position(|edge| !edge.is_valid()) {
            return Err(ValidationError::new(
                "edges",
                format!("point {} is not a valid position", invalid),
            ));
        }
        if let Some(((first, _), (second, _))) = self
            .edges
            .iter()
            .enumerate()
            .tuple_combinations()
            .find(|((_, a), (_, b))| a == b)
        {
            return Err(ValidationError::new(
                "edges",
                format!("points {} and {} are the same position", first, second),
            ));
        }
        Ok(())
    }
}

impl ExampleData for Parking {
    fn example_data() -> Self {
        Parking::new(
            DEFAULT_PARKING_PRICE,
            vec![
                Point::new(45.0, 15.0),
                Point::new(45.1, 15.0),
                Point::new(45.1, 15.1),
            ],
        )
    }
}
