//! GeoJSON output — document model, emitter and decompiler.
//!
//! Positions are written `[latitude, longitude]`, the reverse of the DSL's
//! `(longitude, latitude)` coordinates; downstream consumers rely on that order.

pub mod decompile;
pub mod emit;

use serde::{Deserialize, Serialize};

pub use decompile::{decompile, decompile_file, DecompileError, DecompileOptions};
pub use emit::{Element, GeoJsonEmitter};

/// A position as written to the document: `[latitude, longitude]`.
pub type Position = [f64; 2];

/// The top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// One city element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub properties: Properties,
    pub geometry: Geometry,
}

/// Per-element properties, tagged by the `element` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "element")]
pub enum Properties {
    Street {
        name: String,
    },
    Institution {
        name: String,
        address: String,
        events: f64,
    },
    Square {
        name: String,
    },
    Statue {
        name: String,
    },
    Lake {
        name: String,
    },
}

impl Properties {
    pub fn name(&self) -> &str {
        match self {
            Properties::Street { name }
            | Properties::Institution { name, .. }
            | Properties::Square { name }
            | Properties::Statue { name }
            | Properties::Lake { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_serializes_with_type_tags() {
        let feature = Feature {
            properties: Properties::Statue {
                name: "Rudolf Maister".to_string(),
            },
            geometry: Geometry::Point {
                coordinates: [46.55, 15.64],
            },
        };
        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["element"], "Statue");
        assert_eq!(value["properties"]["name"], "Rudolf Maister");
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["geometry"]["coordinates"][0], 46.55);
    }

    #[test]
    fn collection_parses_back() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"element": "Institution", "name": "Lent", "address": "Usnjarska 10", "events": 4.0},
                "geometry": {"type": "Polygon", "coordinates": [[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0], [1.0, 2.0]]]}
            }]
        }"#;
        let collection: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.properties.name(), "Lent");
        match &feature.geometry {
            Geometry::Polygon { coordinates } => assert_eq!(coordinates[0].len(), 5),
            other => panic!("expected Polygon, got {other:?}"),
        }
    }
}
