//! Decompile round-trip tests — script → GeoJSON → script → GeoJSON.
//!
//! The decompiler is lossy: bend angles and lake radii come back as fixed
//! values, so these tests check that the rebuilt script parses and keeps the
//! element sequence, names and institution properties.

use assert_approx_eq::assert_approx_eq;
use citygeo::dsl::Compiler;
use citygeo::geojson::{decompile, decompile_file, DecompileOptions, Geometry, Properties};

const SANTIAGO: &str = r#"city "Santiago" {
    coordinate plaza = (0 - 70.65, 0 - 33.44)

    institution "Biblioteca" {
        address = "Av. Libertador 651"
        events = 9
        block(plaza, (0 - 70.64, 0 - 33.44), (0 - 70.64, 0 - 33.43), (0 - 70.65, 0 - 33.43))
    }

    street "Alameda" {
        bend(plaza, (0 - 70.6, 0 - 33.44), 30)
        line(plaza, (0 - 70.6, 0 - 33.44))
    }

    statue "Pedro" {
        point plaza
    }

    lake "Laguna" {
        circle((0 - 70.58, 0 - 33.41), 0.003)
    }

    square "Armas" {
        block((1, 1), (2, 1), (2, 2), (1, 2))
    }
}
"#;

fn element_sequence(doc: &citygeo::geojson::FeatureCollection) -> Vec<(String, String)> {
    doc.features
        .iter()
        .map(|f| {
            let kind = match f.properties {
                Properties::Street { .. } => "Street",
                Properties::Institution { .. } => "Institution",
                Properties::Square { .. } => "Square",
                Properties::Statue { .. } => "Statue",
                Properties::Lake { .. } => "Lake",
            };
            (kind.to_string(), f.properties.name().to_string())
        })
        .collect()
}

#[test]
fn decompiled_script_compiles_again() {
    let first = Compiler::compile(SANTIAGO).unwrap();
    let json = first.document.to_json().unwrap();

    let script = decompile(&json, &DecompileOptions::default()).unwrap();
    let second = Compiler::compile(&script).unwrap_or_else(|e| panic!("{e}\n{script}"));

    assert_eq!(second.name, "Maribor City 123");
    assert_eq!(
        element_sequence(&first.document),
        element_sequence(&second.document)
    );
    assert_eq!(
        first.document.features[0].properties,
        second.document.features[0].properties
    );
}

#[test]
fn negative_positions_survive() {
    let first = Compiler::compile(SANTIAGO).unwrap();
    let json = first.document.to_json().unwrap();
    let script = decompile(&json, &DecompileOptions::default()).unwrap();
    let second = Compiler::compile(&script).unwrap();

    match (
        &first.document.features[2].geometry,
        &second.document.features[2].geometry,
    ) {
        (Geometry::Point { coordinates: a }, Geometry::Point { coordinates: b }) => {
            assert_approx_eq!(a[0], b[0]);
            assert_approx_eq!(a[1], b[1]);
            assert_approx_eq!(b[1], -70.65);
        }
        other => panic!("expected two Points, got {other:?}"),
    }
}

#[test]
fn block_corners_survive() {
    let first = Compiler::compile(SANTIAGO).unwrap();
    let json = first.document.to_json().unwrap();
    let script = decompile(&json, &DecompileOptions::default()).unwrap();
    let second = Compiler::compile(&script).unwrap();
    assert_eq!(
        first.document.features[4].geometry,
        second.document.features[4].geometry
    );
}

#[test]
fn lake_radius_is_replaced() {
    let first = Compiler::compile(SANTIAGO).unwrap();
    let json = first.document.to_json().unwrap();
    let options = DecompileOptions {
        lake_radius: 0.01,
        ..DecompileOptions::default()
    };
    let script = decompile(&json, &options).unwrap();
    assert!(script.contains(", 0.01)"));
    assert!(!script.contains("0.003"));
    Compiler::compile(&script).unwrap();
}

#[test]
fn bend_angle_comes_from_options() {
    let json = Compiler::compile(SANTIAGO)
        .unwrap()
        .document
        .to_json()
        .unwrap();
    let options = DecompileOptions {
        bend_angle: 90.0,
        city_name: "Valparaiso".to_string(),
        ..DecompileOptions::default()
    };
    let script = decompile(&json, &options).unwrap();
    assert!(script.starts_with("city \"Valparaiso\" {"));
    assert!(script.contains(", 90)\n"));
    assert!(!script.contains(", 30)"));
}

#[test]
fn decompile_from_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("santiago.geojson");
    Compiler::compile(SANTIAGO).unwrap().write_to(&path).unwrap();

    let script = decompile_file(&path, &DecompileOptions::default()).unwrap();
    assert!(script.contains("institution \"Biblioteca\""));
    assert!(script.contains("address = \"Av. Libertador 651\""));
    assert!(script.contains("events = 9"));
}
