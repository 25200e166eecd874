//! Geometry synthesis — derived point sets for bends and circles.
//!
//! All functions are pure. Coordinates hold `(longitude, latitude)` as `(x, y)`.

use std::f64::consts::PI;

/// Samples taken around a circle when no count is given.
pub const DEFAULT_CIRCLE_POINTS: usize = 20;

/// Fraction of the chord length by which a bend's control point leaves the midpoint.
const BEND_OFFSET: f64 = 0.1;

/// A named longitude/latitude pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub name: String,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

impl Coordinate {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    /// A literal coordinate with the synthetic name `coord`.
    pub fn anonymous(x: f64, y: f64) -> Self {
        Self::new("coord", x, y)
    }

    /// Same position under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.x, self.y)
    }

    /// `[latitude, longitude]`, the order used in emitted documents.
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.y, self.x]
    }

    pub fn distance(&self, other: &Coordinate) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Points describing a bent street segment: the start point followed by the
/// control point twice.
///
/// The control point sits at the midpoint of `start`..`end`, pushed out by a
/// tenth of their distance in the direction `angle_degrees`.
pub fn bend_curve(start: &Coordinate, end: &Coordinate, angle_degrees: f64) -> [Coordinate; 3] {
    let angle = angle_degrees.to_radians();
    let offset = start.distance(end) * BEND_OFFSET;
    let mid_x = (start.x + end.x) / 2.0;
    let mid_y = (start.y + end.y) / 2.0;
    let control = Coordinate::anonymous(mid_x + offset * angle.cos(), mid_y + offset * angle.sin());
    [start.clone(), control.clone(), control]
}

/// Sample `num_points` points around `center`.
///
/// The angle step is `4π / num_points`, so the samples wind around the centre
/// twice and the first half already closes the circle.
pub fn circle_polygon(center: &Coordinate, radius: f64, num_points: usize) -> Vec<Coordinate> {
    if num_points == 0 {
        return Vec::new();
    }
    let step = 4.0 * PI / num_points as f64;
    (0..num_points)
        .map(|i| {
            let angle = i as f64 * step;
            Coordinate::anonymous(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}
