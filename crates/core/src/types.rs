use serde::{Deserialize, Serialize};

/// Identity of one grid square. Two cells are the same cell iff their
/// `(i, j)` pairs are equal; nothing relies on reference identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub i: i64,
    pub j: i64,
}

impl Cell {
    pub fn new(i: i64, j: i64) -> Self {
        Self { i, j }
    }

    /// Canonical string key, `"i,j"`. Used for the memento table and as
    /// the spawn-hash input, so the format is part of the world's
    /// deterministic contract.
    pub fn key(self) -> String {
        format!("{},{}", self.i, self.j)
    }
}

/// One indivisible unit of in-game value, identified by its origin cell
/// and a serial unique within that cell's initial spawn. Field names are
/// the memento wire format; do not rename them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token {
    pub i: i64,
    pub j: i64,
    pub serial: u32,
}

/// A continuous map coordinate, latitude/longitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Axis-aligned bounds of one cell: `[south, north)` by `[west, east)`.
/// Half-open on the north/east edges so adjacent cells tile without gap
/// or overlap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl CellBounds {
    pub fn contains(self, point: Point) -> bool {
        point.lat >= self.south
            && point.lat < self.north
            && point.lng >= self.west
            && point.lng < self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_key_is_comma_separated_pair() {
        assert_eq!(Cell::new(0, 0).key(), "0,0");
        assert_eq!(Cell::new(-3, 17).key(), "-3,17");
        assert_eq!(Cell::new(369894, -1220628).key(), "369894,-1220628");
    }

    #[test]
    fn cell_equality_is_by_value() {
        assert_eq!(Cell::new(2, -5), Cell::new(2, -5));
        assert_ne!(Cell::new(2, -5), Cell::new(-5, 2));
    }

    #[test]
    fn bounds_containment_is_half_open() {
        let bounds = CellBounds { south: 0.0, west: 0.0, north: 1.0, east: 1.0 };
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(0.5, 0.999)));
        assert!(!bounds.contains(Point::new(1.0, 0.5)));
        assert!(!bounds.contains(Point::new(0.5, 1.0)));
    }
}
