//! Session controller: the single owner of the player position, the
//! visible-cache working set, and the memento table.
//!
//! The refresh protocol keeps cache authority unambiguous: before any
//! cache for the new neighborhood is built, every currently visible
//! cache is flushed into the memento table and dropped. A cell is
//! therefore represented either by one live [`Geocache`] or by one
//! memento entry, never by two independently-mutating copies.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::board::{Board, BoardError};
use crate::geocache::{self, Geocache, memento};
use crate::types::{Cell, CellBounds, Point, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Board(BoardError),
    /// A collect/deposit addressed a cell with no visible cache.
    UnknownCell { i: i64, j: i64 },
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        Self::Board(err)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(err) => write!(f, "{err}"),
            Self::UnknownCell { i, j } => write!(f, "no visible cache at cell ({i}, {j})"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Everything an external renderer needs for one visible cache: where it
/// is, the rectangle to draw, and the stock to list.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheView {
    pub cell: Cell,
    pub bounds: CellBounds,
    pub stock: Vec<Token>,
}

/// The five persisted pieces of session state, as one serde document.
/// The visible working set is not persisted; its caches are flushed into
/// `mementos` when the snapshot is taken.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub collected: Vec<Token>,
    pub mementos: BTreeMap<String, String>,
    pub auto_tracking: bool,
    pub position: Point,
    pub path: Vec<Vec<Point>>,
}

pub struct Session {
    board: Board,
    home: Point,
    position: Point,
    visible: Vec<Geocache>,
    mementos: BTreeMap<String, String>,
    collected: Vec<Token>,
    // Walked path as segments, newest segment first. A new segment
    // starts on every discontinuous jump (feed update, restore).
    path: Vec<Vec<Point>>,
    auto_tracking: bool,
}

impl Session {
    pub fn new(board: Board, home: Point) -> Result<Self, SessionError> {
        if !home.is_finite() {
            return Err(BoardError::NonFiniteCoordinate { lat: home.lat, lng: home.lng }.into());
        }
        let mut session = Self {
            board,
            home,
            position: home,
            visible: Vec::new(),
            mementos: BTreeMap::new(),
            collected: Vec::new(),
            path: vec![vec![home]],
            auto_tracking: false,
        };
        session.refresh()?;
        Ok(session)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn collected(&self) -> &[Token] {
        &self.collected
    }

    pub fn auto_tracking(&self) -> bool {
        self.auto_tracking
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn path(&self) -> &[Vec<Point>] {
        &self.path
    }

    /// One manual step: `di`/`dj` are whole-tile offsets along the two
    /// axes. Ignored while the external location feed drives the
    /// position, exactly like the manual controls it models.
    pub fn move_by(&mut self, di: i64, dj: i64) -> Result<(), SessionError> {
        if self.auto_tracking {
            return Ok(());
        }
        let next = Point::new(
            self.position.lat + self.board.tile_width() * di as f64,
            self.position.lng + self.board.tile_width() * dj as f64,
        );
        self.position = next;
        self.extend_path(next);
        self.refresh()
    }

    /// Position update from the external location feed. Starts a fresh
    /// path segment since the jump was not a walked step. A point the
    /// board rejects leaves the session unchanged.
    pub fn set_position(&mut self, point: Point) -> Result<(), SessionError> {
        self.board.cell_for_point(point)?;
        self.position = point;
        self.path.insert(0, vec![point]);
        self.refresh()
    }

    pub fn set_auto_tracking(&mut self, enabled: bool) {
        self.auto_tracking = enabled;
    }

    /// Recompute the visible-cache set around the current position.
    ///
    /// Flush-then-spawn: every visible cache is saved to the memento
    /// table first, then each active nearby cell gets one cache, rebuilt
    /// from its memento when one exists and spawned fresh otherwise. A
    /// memento that fails to decode is dropped and the cell falls back
    /// to its deterministic fresh stock.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        self.flush_visible();
        for cell in self.board.cells_near_point(self.position)? {
            let mut cache = Geocache::new(cell);
            let key = cell.key();
            let stale = match self.mementos.get(&key) {
                Some(encoded) => cache.apply_memento(encoded).is_err(),
                None => false,
            };
            if stale {
                self.mementos.remove(&key);
            }
            self.visible.push(cache);
        }
        Ok(())
    }

    fn flush_visible(&mut self) {
        for cache in self.visible.drain(..) {
            self.mementos.insert(cache.cell.key(), cache.to_memento());
        }
    }

    fn extend_path(&mut self, point: Point) {
        match self.path.first_mut() {
            Some(segment) => segment.push(point),
            None => self.path.push(vec![point]),
        }
    }

    /// Move one token from the addressed cache into the inventory.
    /// `None` means the cache was visible but empty.
    pub fn collect(&mut self, cell: Cell) -> Result<Option<Token>, SessionError> {
        let cache = self
            .visible
            .iter_mut()
            .find(|cache| cache.cell == cell)
            .ok_or(SessionError::UnknownCell { i: cell.i, j: cell.j })?;
        Ok(geocache::transfer(&mut cache.stock, &mut self.collected))
    }

    /// Move one token from the inventory into the addressed cache.
    /// `None` means the inventory was empty.
    pub fn deposit(&mut self, cell: Cell) -> Result<Option<Token>, SessionError> {
        let cache = self
            .visible
            .iter_mut()
            .find(|cache| cache.cell == cell)
            .ok_or(SessionError::UnknownCell { i: cell.i, j: cell.j })?;
        Ok(geocache::transfer(&mut self.collected, &mut cache.stock))
    }

    /// Render-ready snapshot of every visible cache.
    pub fn cache_views(&self) -> Vec<CacheView> {
        self.visible
            .iter()
            .map(|cache| CacheView {
                cell: cache.cell,
                bounds: self.board.cell_bounds(cache.cell),
                stock: cache.stock.clone(),
            })
            .collect()
    }

    /// Persistable copy of the session. Visible caches are flushed into
    /// the copied memento table; the live working set is untouched.
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut mementos = self.mementos.clone();
        for cache in &self.visible {
            mementos.insert(cache.cell.key(), cache.to_memento());
        }
        SessionSnapshot {
            collected: self.collected.clone(),
            mementos,
            auto_tracking: self.auto_tracking,
            position: self.position,
            path: self.path.clone(),
        }
    }

    /// Replace the session state with a previously taken snapshot and
    /// rebuild the visible set around the restored position.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<(), SessionError> {
        self.board.cell_for_point(snapshot.position)?;
        self.visible.clear();
        self.collected = snapshot.collected;
        self.mementos = snapshot.mementos;
        self.auto_tracking = snapshot.auto_tracking;
        self.position = snapshot.position;
        self.path = snapshot.path;
        self.path.insert(0, vec![self.position]);
        self.refresh()
    }

    /// Fresh world at the home point: inventory, mementos, path, and the
    /// auto-tracking flag all reset.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.visible.clear();
        self.mementos.clear();
        self.collected.clear();
        self.auto_tracking = false;
        self.position = self.home;
        self.path = vec![vec![self.home]];
        self.refresh()
    }

    /// Stable digest of the authoritative world state: position, the
    /// auto-tracking flag, the inventory, and each known cell's current
    /// stock (live cache when visible, memento otherwise). Path history
    /// and the live/flushed distinction are deliberately excluded so the
    /// hash survives snapshot/restore cycles.
    pub fn snapshot_hash(&self) -> u64 {
        let mut stocks: BTreeMap<(i64, i64), Vec<Token>> = BTreeMap::new();
        for (key, encoded) in &self.mementos {
            if let Some(cell) = parse_cell_key(key)
                && let Ok(stock) = memento::decode(encoded)
            {
                stocks.insert((cell.i, cell.j), stock);
            }
        }
        for cache in &self.visible {
            stocks.insert((cache.cell.i, cache.cell.j), cache.stock.clone());
        }

        let mut hasher = Xxh3::new();
        hasher.write_u64(self.position.lat.to_bits());
        hasher.write_u64(self.position.lng.to_bits());
        hasher.write_u8(u8::from(self.auto_tracking));
        hasher.write_usize(self.collected.len());
        for token in &self.collected {
            write_token(&mut hasher, token);
        }
        for ((i, j), stock) in &stocks {
            hasher.write_i64(*i);
            hasher.write_i64(*j);
            hasher.write_usize(stock.len());
            for token in stock {
                write_token(&mut hasher, token);
            }
        }
        hasher.finish()
    }
}

fn write_token(hasher: &mut Xxh3, token: &Token) {
    hasher.write_i64(token.i);
    hasher.write_i64(token.j);
    hasher.write_u32(token.serial);
}

fn parse_cell_key(key: &str) -> Option<Cell> {
    let (i, j) = key.split_once(',')?;
    Some(Cell::new(i.parse().ok()?, j.parse().ok()?))
}
