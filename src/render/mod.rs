//! Drawing collaborators — projection to pixel space and the sink that
//! receives draw calls for every completed element.
//!
//! The compiler only talks to these traits; an application owning a real
//! drawing surface implements [`DrawingSink`] itself.

use serde::{Deserialize, Serialize};

use crate::geojson::Element;
use crate::geometry::Coordinate;

/// Marker radius, in pixels, for institution corners and statues.
pub const MARKER_RADIUS: f64 = 10.0;

/// Maps geographic coordinates to pixel coordinates.
pub trait Projection {
    fn project(&self, longitude: f64, latitude: f64) -> (f64, f64);
}

/// Receives projected geometry.
pub trait DrawingSink {
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn draw_circle(&mut self, x: f64, y: f64, radius: f64);
    fn draw_polygon(&mut self, points: &[(f64, f64)]);
}

/// Web-mercator projection onto a grid of raster tiles whose top-left tile is
/// `(origin_tile_x, origin_tile_y)`. The y axis points up from the bottom of a
/// map `map_height` pixels tall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileProjection {
    pub tile_size: u32,
    pub zoom: u32,
    pub origin_tile_x: i64,
    pub origin_tile_y: i64,
    pub map_height: f64,
}

impl Default for TileProjection {
    fn default() -> Self {
        Self {
            tile_size: 512,
            zoom: 16,
            origin_tile_x: 0,
            origin_tile_y: 0,
            map_height: 1536.0,
        }
    }
}

impl TileProjection {
    /// World coordinates of a position at zoom level 0.
    fn world(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let size = self.tile_size as f64;
        let sin_lat = latitude.to_radians().sin().clamp(-0.9999, 0.9999);
        (
            size * (0.5 + longitude / 360.0),
            size * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI)),
        )
    }
}

impl Projection for TileProjection {
    fn project(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let (wx, wy) = self.world(longitude, latitude);
        let scale = 2f64.powi(self.zoom as i32);
        let size = self.tile_size as f64;
        let px = (wx * scale).floor() - self.origin_tile_x as f64 * size;
        let py = (wy * scale).floor() - self.origin_tile_y as f64 * size;
        (px, self.map_height - (py - 1.0))
    }
}

/// Sink that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DrawingSink for NullSink {
    fn draw_line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64) {}
    fn draw_circle(&mut self, _x: f64, _y: f64, _radius: f64) {}
    fn draw_polygon(&mut self, _points: &[(f64, f64)]) {}
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Line { from: (f64, f64), to: (f64, f64) },
    Circle { center: (f64, f64), radius: f64 },
    Polygon { points: Vec<(f64, f64)> },
}

/// Sink that keeps every call, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<DrawCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawingSink for RecordingSink {
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.calls.push(DrawCall::Line {
            from: (x1, y1),
            to: (x2, y2),
        });
    }

    fn draw_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.calls.push(DrawCall::Circle {
            center: (x, y),
            radius,
        });
    }

    fn draw_polygon(&mut self, points: &[(f64, f64)]) {
        self.calls.push(DrawCall::Polygon {
            points: points.to_vec(),
        });
    }
}

/// Forward one completed element to `sink`.
pub fn draw_element(element: &Element, projection: &dyn Projection, sink: &mut dyn DrawingSink) {
    let project = |c: &Coordinate| projection.project(c.x, c.y);
    match element {
        Element::Street { line, .. } => {
            let (x1, y1) = project(&line[0]);
            let (x2, y2) = project(&line[1]);
            sink.draw_line(x1, y1, x2, y2);
        }
        Element::Institution { block, .. } => {
            for corner in block {
                let (x, y) = project(corner);
                sink.draw_circle(x, y, MARKER_RADIUS);
            }
        }
        Element::Square { block, .. } => {
            let points: Vec<_> = block.iter().map(project).collect();
            sink.draw_polygon(&points);
        }
        Element::Statue { point, .. } => {
            let (x, y) = project(point);
            sink.draw_circle(x, y, MARKER_RADIUS);
        }
        Element::Lake { samples, .. } => {
            let points: Vec<_> = Element::lake_ring(samples).iter().map(project).collect();
            sink.draw_polygon(&points);
        }
    }
}
