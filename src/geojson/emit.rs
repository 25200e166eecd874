//! Element records and the append-only GeoJSON document builder.

use crate::geometry::{circle_polygon, Coordinate, DEFAULT_CIRCLE_POINTS};

use super::{Feature, FeatureCollection, Geometry, Position, Properties};

/// Samples of a lake's circle that make it into the emitted ring.
pub const LAKE_RING_POINTS: usize = 10;

/// A completed city element with its geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Street {
        name: String,
        bend: [Coordinate; 3],
        line: [Coordinate; 2],
    },
    Institution {
        name: String,
        address: String,
        events: f64,
        block: [Coordinate; 4],
    },
    Square {
        name: String,
        block: [Coordinate; 4],
    },
    Statue {
        name: String,
        point: Coordinate,
    },
    Lake {
        name: String,
        center: Coordinate,
        radius: f64,
        samples: Vec<Coordinate>,
    },
}

impl Element {
    /// A lake sampled with the default circle resolution.
    pub fn lake(name: String, center: Coordinate, radius: f64) -> Self {
        let samples = circle_polygon(&center, radius, DEFAULT_CIRCLE_POINTS);
        Element::Lake {
            name,
            center,
            radius,
            samples,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Element::Street { name, .. }
            | Element::Institution { name, .. }
            | Element::Square { name, .. }
            | Element::Statue { name, .. }
            | Element::Lake { name, .. } => name,
        }
    }

    /// The `element` property value.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Street { .. } => "Street",
            Element::Institution { .. } => "Institution",
            Element::Square { .. } => "Square",
            Element::Statue { .. } => "Statue",
            Element::Lake { .. } => "Lake",
        }
    }

    /// Closed ring of a lake: the leading samples plus the first one again.
    pub fn lake_ring(samples: &[Coordinate]) -> Vec<Coordinate> {
        let mut ring: Vec<Coordinate> = samples.iter().take(LAKE_RING_POINTS).cloned().collect();
        if let Some(first) = ring.first().cloned() {
            ring.push(first);
        }
        ring
    }

    pub fn to_feature(&self) -> Feature {
        let name = self.name().to_string();
        let (properties, geometry) = match self {
            Element::Street { bend, line, .. } => (
                Properties::Street { name },
                Geometry::LineString {
                    coordinates: bend.iter().chain(line.iter()).map(Coordinate::lat_lon).collect(),
                },
            ),
            Element::Institution {
                address,
                events,
                block,
                ..
            } => (
                Properties::Institution {
                    name,
                    address: address.clone(),
                    events: *events,
                },
                closed_block(block),
            ),
            Element::Square { block, .. } => (Properties::Square { name }, closed_block(block)),
            Element::Statue { point, .. } => (
                Properties::Statue { name },
                Geometry::Point {
                    coordinates: point.lat_lon(),
                },
            ),
            Element::Lake { samples, .. } => (
                Properties::Lake { name },
                Geometry::Polygon {
                    coordinates: vec![positions(&Element::lake_ring(samples))],
                },
            ),
        };
        Feature {
            properties,
            geometry,
        }
    }
}

fn positions(points: &[Coordinate]) -> Vec<Position> {
    points.iter().map(Coordinate::lat_lon).collect()
}

fn closed_block(block: &[Coordinate; 4]) -> Geometry {
    let mut ring = positions(block);
    ring.push(block[0].lat_lon());
    Geometry::Polygon {
        coordinates: vec![ring],
    }
}

/// Accumulates one feature per completed element, in completion order.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonEmitter {
    features: Vec<Feature>,
}

impl GeoJsonEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: &Element) {
        self.features.push(element.to_feature());
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Wrap everything emitted so far in a `FeatureCollection`.
    pub fn finish(self) -> FeatureCollection {
        FeatureCollection {
            features: self.features,
        }
    }
}

impl FeatureCollection {
    /// Pretty-printed document text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
