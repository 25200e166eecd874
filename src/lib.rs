//! citygeo — a compiler from a small city description language to GeoJSON,
//! and a decompiler back.

pub mod compile_log;
pub mod config;
pub mod dsl;
pub mod geojson;
pub mod geometry;
pub mod render;
