//! GeoJSON → city script.
//!
//! Lossy by construction: bend angles and lake radii are not stored in the
//! document, so fixed values from [`DecompileOptions`] are written instead,
//! and a street keeps only three of its five points.

use std::fmt::Write as _;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::{Position, Properties};

#[derive(Debug, Error)]
pub enum DecompileError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature {feature}: {reason}")]
    Shape { feature: usize, reason: String },

    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Values written where the document has no information.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompileOptions {
    pub city_name: String,
    pub bend_angle: f64,
    pub lake_radius: f64,
}

impl Default for DecompileOptions {
    fn default() -> Self {
        Self {
            city_name: "Maribor City 123".to_string(),
            bend_angle: 1.0,
            lake_radius: 0.0005,
        }
    }
}

// Geometry is kept loose so that unknown geometry types still reach the
// circle fallback.
#[derive(Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    properties: Properties,
    geometry: RawGeometry,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

/// Reconstruct a city script from GeoJSON text.
pub fn decompile(input: &str, options: &DecompileOptions) -> Result<String, DecompileError> {
    let collection: RawCollection = serde_json::from_str(input)?;

    let mut out = String::new();
    let _ = writeln!(out, "city \"{}\" {{\n", options.city_name);
    for (index, feature) in collection.features.iter().enumerate() {
        stanza(&mut out, index, feature, options)?;
    }
    out.push_str("}\n");
    Ok(out)
}

/// Read `path` and decompile its contents.
pub fn decompile_file(path: &Path, options: &DecompileOptions) -> Result<String, DecompileError> {
    let input = std::fs::read_to_string(path)?;
    decompile(&input, options)
}

fn stanza(
    out: &mut String,
    index: usize,
    feature: &RawFeature,
    options: &DecompileOptions,
) -> Result<(), DecompileError> {
    let shape = |reason: String| DecompileError::Shape {
        feature: index,
        reason,
    };
    let keyword = match feature.properties {
        Properties::Street { .. } => "street",
        Properties::Institution { .. } => "institution",
        Properties::Square { .. } => "square",
        Properties::Statue { .. } => "statue",
        Properties::Lake { .. } => "lake",
    };
    let _ = writeln!(out, "    {keyword} \"{}\" {{", feature.properties.name());

    if let Properties::Institution {
        address, events, ..
    } = &feature.properties
    {
        let events = number(*events).map_err(shape)?;
        let _ = writeln!(out, "        address = \"{address}\"");
        let _ = writeln!(out, "        events = {events}");
    }

    let coordinates = &feature.geometry.coordinates;
    let is_lake = matches!(feature.properties, Properties::Lake { .. });
    match feature.geometry.kind.as_str() {
        "LineString" if !is_lake => {
            let points = positions(coordinates).map_err(shape)?;
            if points.len() < 3 {
                return Err(shape(format!(
                    "LineString needs at least 3 positions, has {}",
                    points.len()
                )));
            }
            let angle = number(options.bend_angle).map_err(shape)?;
            let _ = writeln!(
                out,
                "        bend({}, {}, {angle})",
                coordinate(points[0]).map_err(shape)?,
                coordinate(points[1]).map_err(shape)?,
            );
            let _ = writeln!(
                out,
                "        line({}, {})",
                coordinate(points[1]).map_err(shape)?,
                coordinate(points[2]).map_err(shape)?,
            );
        }
        "Polygon" if !is_lake => {
            let ring = coordinates
                .get(0)
                .ok_or_else(|| shape("Polygon has no rings".to_string()))?;
            let corners = positions(ring).map_err(shape)?;
            if corners.len() < 4 {
                return Err(shape(format!(
                    "Polygon ring needs at least 4 positions, has {}",
                    corners.len()
                )));
            }
            let corners = corners[..4]
                .iter()
                .map(|&p| coordinate(p))
                .collect::<Result<Vec<_>, _>>()
                .map_err(shape)?;
            let _ = writeln!(out, "        block({})", corners.join(", "));
        }
        "Point" if !is_lake => {
            let point = position(coordinates).map_err(shape)?;
            let _ = writeln!(out, "        point {}", coordinate(point).map_err(shape)?);
        }
        _ => {
            let center = coordinates
                .get(0)
                .and_then(|ring| ring.get(0))
                .ok_or_else(|| shape("no position to centre a circle on".to_string()))?;
            let center = position(center).map_err(shape)?;
            let radius = number(options.lake_radius).map_err(shape)?;
            let _ = writeln!(
                out,
                "        circle({}, {radius})",
                coordinate(center).map_err(shape)?
            );
        }
    }

    out.push_str("    }\n\n");
    Ok(())
}

fn position(value: &Value) -> Result<Position, String> {
    match value.as_array().map(Vec::as_slice) {
        Some([lat, lon, ..]) => match (lat.as_f64(), lon.as_f64()) {
            (Some(lat), Some(lon)) => Ok([lat, lon]),
            _ => Err(format!("position has non-numeric members: {value}")),
        },
        _ => Err(format!("expected a position, found {value}")),
    }
}

fn positions(value: &Value) -> Result<Vec<Position>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected a list of positions, found {value}"))?
        .iter()
        .map(position)
        .collect()
}

/// `(longitude, latitude)` in script syntax from a `[latitude, longitude]` position.
fn coordinate([lat, lon]: Position) -> Result<String, String> {
    Ok(format!("({}, {})", number(lon)?, number(lat)?))
}

/// A numeric literal the scanner accepts. Scripts have no unary minus, so a
/// negative value becomes `0 - <magnitude>`.
fn number(value: f64) -> Result<String, String> {
    if !value.is_finite() {
        return Err(format!("{value} cannot be written as a number"));
    }
    let magnitude = value.abs().to_string();
    if value.is_sign_negative() && value != 0.0 {
        Ok(format!("0 - {magnitude}"))
    } else {
        Ok(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(features: &str) -> String {
        format!(r#"{{"type": "FeatureCollection", "features": [{features}]}}"#)
    }

    #[test]
    fn number_formatting() {
        assert_eq!(number(1.0).unwrap(), "1");
        assert_eq!(number(0.0005).unwrap(), "0.0005");
        assert_eq!(number(-15.25).unwrap(), "0 - 15.25");
        assert_eq!(number(-0.0).unwrap(), "0");
        assert!(number(f64::NAN).is_err());
    }

    #[test]
    fn header_and_footer() {
        let out = decompile(&doc(""), &DecompileOptions::default()).unwrap();
        assert_eq!(out, "city \"Maribor City 123\" {\n\n}\n");
    }

    #[test]
    fn street_reuses_three_points_and_swaps_order() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Street", "name": "Gosposka"},
                "geometry": {"type": "LineString", "coordinates": [[46.1, 15.1], [46.2, 15.2], [46.2, 15.2], [46.3, 15.3], [46.4, 15.4]]}}"#,
        );
        let out = decompile(&input, &DecompileOptions::default()).unwrap();
        assert!(out.contains("    street \"Gosposka\" {\n"));
        assert!(out.contains("bend((15.1, 46.1), (15.2, 46.2), 1)"));
        assert!(out.contains("line((15.2, 46.2), (15.2, 46.2))"));
    }

    #[test]
    fn institution_keeps_properties() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Institution", "name": "UKC", "address": "Ljubljanska 5", "events": 7.0},
                "geometry": {"type": "Polygon", "coordinates": [[[1, 2], [3, 4], [5, 6], [7, 8], [1, 2]]]}}"#,
        );
        let out = decompile(&input, &DecompileOptions::default()).unwrap();
        assert!(out.contains("address = \"Ljubljanska 5\""));
        assert!(out.contains("events = 7\n"));
        assert!(out.contains("block((2, 1), (4, 3), (6, 5), (8, 7))"));
    }

    #[test]
    fn lake_uses_circle_rule_with_configured_radius() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Lake", "name": "Pond"},
                "geometry": {"type": "Polygon", "coordinates": [[[46.5, 15.6], [46.6, 15.7], [46.5, 15.6]]]}}"#,
        );
        let options = DecompileOptions {
            lake_radius: 0.25,
            ..DecompileOptions::default()
        };
        let out = decompile(&input, &options).unwrap();
        assert!(out.contains("    lake \"Pond\" {\n        circle((15.6, 46.5), 0.25)\n"));
    }

    #[test]
    fn unknown_geometry_falls_back_to_circle() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Square", "name": "Odd"},
                "geometry": {"type": "MultiPoint", "coordinates": [[[1, 2]]]}}"#,
        );
        let out = decompile(&input, &DecompileOptions::default()).unwrap();
        assert!(out.contains("circle((2, 1), 0.0005)"));
    }

    #[test]
    fn negative_coordinates_avoid_unary_minus() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Statue", "name": "West"},
                "geometry": {"type": "Point", "coordinates": [-33.9, -70.6]}}"#,
        );
        let out = decompile(&input, &DecompileOptions::default()).unwrap();
        assert!(out.contains("point (0 - 70.6, 0 - 33.9)"));
    }

    #[test]
    fn short_line_string_is_shape_error() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Street", "name": "Short"},
                "geometry": {"type": "LineString", "coordinates": [[1, 2]]}}"#,
        );
        let err = decompile(&input, &DecompileOptions::default()).unwrap_err();
        assert!(matches!(err, DecompileError::Shape { feature: 0, .. }));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = decompile("{not json", &DecompileOptions::default()).unwrap_err();
        assert!(matches!(err, DecompileError::Json(_)));
    }

    #[test]
    fn unknown_element_is_json_error() {
        let input = doc(
            r#"{"type": "Feature", "properties": {"element": "Bridge", "name": "X"},
                "geometry": {"type": "Point", "coordinates": [1, 2]}}"#,
        );
        let err = decompile(&input, &DecompileOptions::default()).unwrap_err();
        assert!(matches!(err, DecompileError::Json(_)));
    }

    #[test]
    fn decompile_file_reads_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city.geojson");
        std::fs::write(&path, doc("")).unwrap();
        let out = decompile_file(&path, &DecompileOptions::default()).unwrap();
        assert!(out.starts_with("city "));

        let err = decompile_file(&dir.path().join("missing"), &DecompileOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecompileError::Io(_)));
    }
}
