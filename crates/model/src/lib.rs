use std::fmt::{self, Debug};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

pub mod marker;
pub mod parking;
pub mod point;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// A value together with the identity the store assigned to it.
///
/// The identity is written as `_id` so clients written against the document
/// store layout keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound(deserialize = "V: Deserialize<'de>, V::IdType: Deserialize<'de>"))]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone + PartialEq,
{
    #[serde(rename = "_id")]
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone + PartialEq,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::new(
            "price",
            "must be a positive number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{marker::Marker, point::Point, ExampleData, WithId};
    use utility::id::Id;

    #[test]
    fn with_id_uses_document_identity_field() {
        let marker = WithId::new(Id::new("abc".to_owned()), Marker::example_data());
        let value = serde_json::to_value(&marker).unwrap();
        assert_eq!(value["_id"], json!("abc"));
        assert_eq!(value["type"], json!("T"));
        assert_eq!(value["coordinates"], json!({ "lat": 45.80724, "lng": 15.96757 }));

        let parsed: WithId<Marker> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, marker);
        assert_eq!(parsed.content.coordinates, Point::new(45.80724, 15.96757));
    }
}
