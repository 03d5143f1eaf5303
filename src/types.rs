use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Canvas coordinate in workspace pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn half(self) -> Self {
        Point::new(self.x / 2.0, self.y / 2.0)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Stable identifier of a placed component instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(value: impl Into<String>) -> Self {
        ComponentId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        ComponentId::new(value)
    }
}

impl From<String> for ComponentId {
    fn from(value: String) -> Self {
        ComponentId(value)
    }
}

/// Identifier of a wire inside one wire store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WireId(u64);

impl WireId {
    pub fn new(value: u64) -> Self {
        WireId(value)
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_addition() {
        let p = Point::new(10.0, 20.0) + Point::new(2.5, -4.0);
        assert_eq!(p, Point::new(12.5, 16.0));
        assert_eq!(Point::new(40.0, 80.0).half(), Point::new(20.0, 40.0));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ComponentId::from("led-red-1").to_string(), "led-red-1");
        assert_eq!(WireId::new(7).to_string(), "wire-7");
    }
}
