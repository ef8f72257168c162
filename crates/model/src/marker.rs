use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::{point::Point, validate_price, ExampleData, Validate, ValidationError};

/// The kinds of street furniture a marker can stand for. On the wire each
/// kind is its single letter tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum MarkerKind {
    #[serde(rename = "T")]
    TrafficLight,
    #[serde(rename = "H")]
    Hydrant,
    #[serde(rename = "L")]
    StreetLamp,
    #[serde(rename = "B")]
    Bench,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rendering {
    pub tag: &'static str,
    pub title: &'static str,
    pub fill: &'static str,
    pub default_price: f64,
}

// Indexed by the enum discriminant.
const RENDERINGS: [Rendering; 4] = [
    Rendering {
        tag: "T",
        title: "Traffic light",
        fill: "#1b468d",
        default_price: 1200.0,
    },
    Rendering {
        tag: "H",
        title: "Hydrant",
        fill: "#b3261e",
        default_price: 450.0,
    },
    Rendering {
        tag: "L",
        title: "Street lamp",
        fill: "#c98a00",
        default_price: 300.0,
    },
    Rendering {
        tag: "B",
        title: "Bench",
        fill: "#2e6b30",
        default_price: 120.0,
    },
];

impl MarkerKind {
    pub const ALL: [MarkerKind; 4] = [
        MarkerKind::TrafficLight,
        MarkerKind::Hydrant,
        MarkerKind::StreetLamp,
        MarkerKind::Bench,
    ];

    pub fn rendering(self) -> &'static Rendering {
        &RENDERINGS[self as usize]
    }

    pub fn tag(self) -> &'static str {
        self.rendering().tag
    }

    /// Square icon with the kind's tag in it.
    pub fn icon_svg(self) -> String {
        let rendering = self.rendering();
        format!(
            "<svg width=\"24\" height=\"24\" xmlns=\"http://www.w3.org/2000/svg\">\
             <rect stroke=\"white\" fill=\"{}\" x=\"1\" y=\"1\" width=\"22\" height=\"22\" />\
             <text x=\"12\" y=\"18\" font-size=\"12pt\" font-family=\"Arial\" \
             font-weight=\"bold\" text-anchor=\"middle\" fill=\"white\">{}</text></svg>",
            rendering.fill, rendering.tag
        )
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMarkerKind(pub String);

impl fmt::Display for UnknownMarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown marker type `{}`", self.0)
    }
}

impl std::error::Error for UnknownMarkerKind {}

impl FromStr for MarkerKind {
    type Err = UnknownMarkerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkerKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| UnknownMarkerKind(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Marker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub name: String,
    pub price: f64,
    pub coordinates: Point,
}

impl Marker {
    /// A marker of the given kind, named and priced from its rendering entry.
    pub fn of_kind(kind: MarkerKind, coordinates: Point) -> Self {
        let rendering = kind.rendering();
        Self {
            kind,
            name: rendering.title.to_owned(),
            price: rendering.default_price,
            coordinates,
        }
    }
}

impl HasId for Marker {
    type IdType = String;
}

impl Validate for Marker {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        validate_price(self.price)?;
        self.coordinates.validate()
    }
}

impl ExampleData for Marker {
    fn example_data() -> Self {
        Marker::of_kind(MarkerKind::TrafficLight, Point::new(45.80724, 15.96757))
    }
}
