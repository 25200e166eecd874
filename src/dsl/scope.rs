//! Variable environments for city scripts.
//!
//! Two levels exist: the outer (city) scope, written by declarations in the
//! city body, and the inner (element) scope, written by declarations inside a
//! street/institution/square/statue/lake body and emptied whenever an element
//! starts or ends. Lookups try the inner scope first and fall back to the outer
//! one; the two are never merged.

use std::collections::HashMap;

use crate::geometry::Coordinate;

/// Which scope a declaration writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    City,
    Element,
}

/// One scope level: four independent maps keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub strings: HashMap<String, String>,
    pub ints: HashMap<String, i64>,
    pub doubles: HashMap<String, f64>,
    pub coords: HashMap<String, Coordinate>,
}

impl Scope {
    pub fn clear(&mut self) {
        self.strings.clear();
        self.ints.clear();
        self.doubles.clear();
        self.coords.clear();
    }

    /// Numeric value of `name`; doubles win over ints of the same name, ints are widened.
    fn number(&self, name: &str) -> Option<f64> {
        self.doubles
            .get(name)
            .copied()
            .or_else(|| self.ints.get(name).map(|&v| v as f64))
    }
}

/// The outer and inner scopes owned by one parser.
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    city: Scope,
    element: Scope,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    fn level_mut(&mut self, level: Level) -> &mut Scope {
        match level {
            Level::City => &mut self.city,
            Level::Element => &mut self.element,
        }
    }

    /// Reset the element scope; called on entry to and exit from every element.
    pub fn clear_element(&mut self) {
        self.element.clear();
    }

    // Declarations overwrite silently; redeclaring a name is not an error.

    pub fn declare_string(&mut self, level: Level, name: &str, value: String) {
        self.level_mut(level).strings.insert(name.to_string(), value);
    }

    pub fn declare_int(&mut self, level: Level, name: &str, value: i64) {
        self.level_mut(level).ints.insert(name.to_string(), value);
    }

    pub fn declare_double(&mut self, level: Level, name: &str, value: f64) {
        self.level_mut(level).doubles.insert(name.to_string(), value);
    }

    pub fn declare_coord(&mut self, level: Level, name: &str, value: Coordinate) {
        self.level_mut(level).coords.insert(name.to_string(), value);
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.element
            .strings
            .get(name)
            .or_else(|| self.city.strings.get(name))
            .map(String::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.element
            .ints
            .get(name)
            .or_else(|| self.city.ints.get(name))
            .copied()
    }

    pub fn double(&self, name: &str) -> Option<f64> {
        self.element
            .doubles
            .get(name)
            .or_else(|| self.city.doubles.get(name))
            .copied()
    }

    /// Resolve `name` wherever a number is expected: inner doubles, inner ints,
    /// then the same for the outer scope.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.element.number(name).or_else(|| self.city.number(name))
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.element
            .coords
            .get(name)
            .or_else(|| self.city.coords.get(name))
    }
}
