//! Fixed-width cell grid over the continuous coordinate plane.
//!
//! The board canonicalizes cells (one registry entry per `(i, j)`, created
//! lazily, never evicted for the life of the board) and decides which
//! cells near a point are cache-bearing. The spawn decision is a pure
//! function of the cell key, the spawn probability, and [`luck`], so the
//! active set for a given origin is identical across calls and sessions.

use std::collections::BTreeMap;
use std::fmt;

use crate::luck::luck;
use crate::types::{Cell, CellBounds, Point};

#[derive(Debug, Clone, PartialEq)]
pub enum BoardError {
    /// A coordinate was NaN or infinite. The grid never clamps.
    NonFiniteCoordinate { lat: f64, lng: f64 },
    /// A finite coordinate whose cell index does not fit in `i64`.
    /// Rejected for the same reason: the grid never clamps.
    CoordinateOutOfRange { lat: f64, lng: f64 },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteCoordinate { lat, lng } => {
                write!(f, "non-finite coordinate ({lat}, {lng})")
            }
            Self::CoordinateOutOfRange { lat, lng } => {
                write!(f, "coordinate ({lat}, {lng}) is outside the addressable grid")
            }
        }
    }
}

impl std::error::Error for BoardError {}

pub struct Board {
    tile_width: f64,
    visibility_radius: i64,
    spawn_probability: f64,
    known_cells: BTreeMap<(i64, i64), Cell>,
}

impl Board {
    /// `tile_width` is the cell edge length in coordinate degrees,
    /// `visibility_radius` the number of cells considered "nearby" along
    /// each axis, `spawn_probability` the luck threshold below which a
    /// cell carries a cache. All three are fixed for the board's life.
    pub fn new(tile_width: f64, visibility_radius: u32, spawn_probability: f64) -> Self {
        debug_assert!(tile_width.is_finite() && tile_width > 0.0);
        debug_assert!(spawn_probability >= 0.0);
        Self {
            tile_width,
            visibility_radius: i64::from(visibility_radius),
            spawn_probability,
            known_cells: BTreeMap::new(),
        }
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn visibility_radius(&self) -> u32 {
        self.visibility_radius as u32
    }

    pub fn spawn_probability(&self) -> f64 {
        self.spawn_probability
    }

    /// Number of distinct cells ever referenced through this board.
    pub fn known_cell_count(&self) -> usize {
        self.known_cells.len()
    }

    /// The single registry entry for `(i, j)`, created on first reference.
    fn canonical_cell(&mut self, i: i64, j: i64) -> Cell {
        *self.known_cells.entry((i, j)).or_insert_with(|| Cell::new(i, j))
    }

    /// Cell containing `point`: floor division of each coordinate by the
    /// tile width. Fails on non-finite or unaddressable input rather
    /// than clamping.
    pub fn cell_for_point(&mut self, point: Point) -> Result<Cell, BoardError> {
        if !point.is_finite() {
            return Err(BoardError::NonFiniteCoordinate { lat: point.lat, lng: point.lng });
        }
        let (Some(i), Some(j)) = (self.cell_index(point.lat), self.cell_index(point.lng)) else {
            return Err(BoardError::CoordinateOutOfRange { lat: point.lat, lng: point.lng });
        };
        Ok(self.canonical_cell(i, j))
    }

    /// Floored cell index for one axis, or `None` when the quotient does
    /// not fit in `i64` (an `as` cast would saturate instead of failing).
    fn cell_index(&self, coordinate: f64) -> Option<i64> {
        let scaled = (coordinate / self.tile_width).floor();
        if scaled >= i64::MIN as f64 && scaled < i64::MAX as f64 {
            Some(scaled as i64)
        } else {
            None
        }
    }

    /// Bounding rectangle of `cell`. Pure in `(i, j)` and the tile width.
    pub fn cell_bounds(&self, cell: Cell) -> CellBounds {
        let south = cell.i as f64 * self.tile_width;
        let west = cell.j as f64 * self.tile_width;
        CellBounds { south, west, north: south + self.tile_width, east: west + self.tile_width }
    }

    /// Cache-bearing cells near `point`, row-major over the offset window.
    ///
    /// The window is `[-R, R)` on both axes: the +R edge is excluded.
    /// Worlds were generated and saved under this window, so it stays
    /// even though the symmetric `[-R, R]` window might look intended.
    pub fn cells_near_point(&mut self, point: Point) -> Result<Vec<Cell>, BoardError> {
        let origin = self.cell_for_point(point)?;
        let radius = self.visibility_radius;
        let mut cells = Vec::new();
        for di in -radius..radius {
            for dj in -radius..radius {
                let (i, j) = (origin.i + di, origin.j + dj);
                if luck(&Cell::new(i, j).key()) < self.spawn_probability {
                    cells.push(self.canonical_cell(i, j));
                }
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f64 = 1e-4;

    #[test]
    fn cell_for_point_floors_toward_negative_infinity() {
        let mut board = Board::new(1.0, 1, 0.5);
        assert_eq!(board.cell_for_point(Point::new(0.0, 0.0)).unwrap(), Cell::new(0, 0));
        assert_eq!(board.cell_for_point(Point::new(2.5, 3.9)).unwrap(), Cell::new(2, 3));
        assert_eq!(board.cell_for_point(Point::new(-0.5, -2.1)).unwrap(), Cell::new(-1, -3));
    }

    #[test]
    fn repeated_lookups_canonicalize_to_one_entry() {
        let mut board = Board::new(TILE, 1, 0.5);
        let first = board.cell_for_point(Point::new(36.98949, -122.06277)).unwrap();
        let second = board.cell_for_point(Point::new(36.98949, -122.06277)).unwrap();
        assert_eq!(first, second);
        assert_eq!(board.known_cell_count(), 1);
    }

    #[test]
    fn non_finite_input_is_rejected_not_clamped() {
        let mut board = Board::new(TILE, 1, 0.5);
        for point in [
            Point::new(f64::NAN, 0.0),
            Point::new(0.0, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NAN),
        ] {
            assert!(matches!(
                board.cell_for_point(point),
                Err(BoardError::NonFiniteCoordinate { .. })
            ));
        }
        assert_eq!(board.known_cell_count(), 0);
    }

    #[test]
    fn out_of_range_finite_input_is_rejected_not_saturated() {
        // A huge but finite coordinate must not land on an i64::MAX cell.
        let mut board = Board::new(TILE, 1, 0.5);
        for point in [
            Point::new(1e300, 0.0),
            Point::new(0.0, -1e300),
            Point::new(f64::MAX, f64::MAX),
        ] {
            assert!(matches!(
                board.cell_for_point(point),
                Err(BoardError::CoordinateOutOfRange { .. })
            ));
        }
        assert_eq!(board.known_cell_count(), 0);

        // Large coordinates that still index within i64 are fine.
        assert!(board.cell_for_point(Point::new(1e9, -1e9)).is_ok());
    }

    #[test]
    fn bounds_contain_the_deriving_point() {
        let mut board = Board::new(TILE, 1, 0.5);
        for point in [
            Point::new(36.98949379578401, -122.06277128548504),
            Point::new(0.0, 0.0),
            Point::new(-12.00005, 7.77777),
        ] {
            let cell = board.cell_for_point(point).unwrap();
            assert!(board.cell_bounds(cell).contains(point), "{point:?} outside its own cell");
        }
    }

    #[test]
    fn adjacent_bounds_tile_without_gap_or_overlap() {
        let board = Board::new(TILE, 1, 0.5);
        let here = board.cell_bounds(Cell::new(10, -4));
        let north = board.cell_bounds(Cell::new(11, -4));
        let east = board.cell_bounds(Cell::new(10, -3));
        assert_eq!(here.north, north.south);
        assert_eq!(here.east, east.west);
    }

    #[test]
    fn neighborhood_window_excludes_positive_edge() {
        // Radius 2 with everything active: the window is [-2, 2) per
        // axis, 16 cells, and the +2 row/column never appears.
        let mut board = Board::new(1.0, 2, 1.0);
        let cells = board.cells_near_point(Point::new(0.5, 0.5)).unwrap();
        assert_eq!(cells.len(), 16);
        assert!(cells.iter().all(|cell| (-2..2).contains(&cell.i)));
        assert!(cells.iter().all(|cell| (-2..2).contains(&cell.j)));
    }

    #[test]
    fn zero_radius_yields_empty_neighborhood() {
        let mut board = Board::new(1.0, 0, 1.0);
        assert!(board.cells_near_point(Point::new(0.0, 0.0)).unwrap().is_empty());
    }

    #[test]
    fn zero_probability_yields_no_active_cells() {
        let mut board = Board::new(1.0, 4, 0.0);
        assert!(board.cells_near_point(Point::new(0.0, 0.0)).unwrap().is_empty());
    }

    #[test]
    fn active_set_matches_luck_threshold_exactly() {
        let mut board = Board::new(1.0, 3, 0.3);
        let active = board.cells_near_point(Point::new(0.0, 0.0)).unwrap();
        for di in -3i64..3 {
            for dj in -3i64..3 {
                let cell = Cell::new(di, dj);
                let expected = luck(&cell.key()) < 0.3;
                assert_eq!(active.contains(&cell), expected, "cell {cell:?}");
            }
        }
    }

    #[test]
    fn active_set_is_stable_across_calls() {
        let mut board = Board::new(TILE, 8, 0.1);
        let origin = Point::new(36.9895, -122.0628);
        let first = board.cells_near_point(origin).unwrap();
        let second = board.cells_near_point(origin).unwrap();
        assert_eq!(first, second);
    }
}
