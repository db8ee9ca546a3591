//! Token cache bound to one grid cell.
//!
//! A fresh cache's stock is a pure function of its cell, so a cell that
//! has never been visited always spawns identically. Once play mutates a
//! cache, its state travels through mementos (see [`memento`]) instead.

use std::fmt;

use crate::luck::luck;
use crate::types::{Cell, Token};

/// Salt appended to a cell's key when rolling its initial stock size.
/// Changing it would re-roll every never-visited cache; mementos are
/// unaffected since saved state never passes through the hash.
const INITIAL_STOCK_SALT: &str = "initialValue";

/// Exclusive upper bound on a freshly spawned cache's stock size.
const MAX_INITIAL_STOCK: u32 = 10;

/// Mutable token inventory attached to one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geocache {
    pub cell: Cell,
    pub stock: Vec<Token>,
}

impl Geocache {
    /// Deterministic fresh cache: stock size is
    /// `floor(luck("i,j,initialValue") * 10)`, serials run `0..size`,
    /// every token's origin is this cell.
    pub fn new(cell: Cell) -> Self {
        let roll = luck(&format!("{},{},{INITIAL_STOCK_SALT}", cell.i, cell.j));
        let size = (roll * f64::from(MAX_INITIAL_STOCK)) as u32;
        let stock =
            (0..size).map(|serial| Token { i: cell.i, j: cell.j, serial }).collect();
        Self { cell, stock }
    }

    /// Snapshot the current stock as a memento string.
    pub fn to_memento(&self) -> String {
        memento::encode(&self.stock)
    }

    /// Replace the stock with a decoded memento. The encoding is
    /// validated in full before anything is replaced; on failure the
    /// current stock is untouched.
    pub fn apply_memento(&mut self, encoded: &str) -> Result<(), MementoDecodeError> {
        self.stock = memento::decode(encoded)?;
        Ok(())
    }
}

/// Move the first token of `source` to the end of `dest`.
///
/// Empty source is a no-op returning `None`; otherwise the moved token
/// is returned and appears in exactly one of the two sequences.
pub fn transfer(source: &mut Vec<Token>, dest: &mut Vec<Token>) -> Option<Token> {
    if source.is_empty() {
        return None;
    }
    let token = source.remove(0);
    dest.push(token);
    Some(token)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MementoDecodeError {
    /// The encoding was not a valid token-sequence document.
    Malformed { message: String },
}

impl fmt::Display for MementoDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed memento: {message}"),
        }
    }
}

impl std::error::Error for MementoDecodeError {}

/// Memento encoding as a pair of pure functions.
///
/// The wire form is a JSON array of `{"i":..,"j":..,"serial":..}`
/// objects in stock order. Decoding a previously encoded memento and
/// re-encoding it reproduces the encoding byte for byte.
pub mod memento {
    use super::MementoDecodeError;
    use crate::types::Token;

    pub fn encode(stock: &[Token]) -> String {
        // A slice of integer-only structs always serializes.
        serde_json::to_string(stock).expect("token stock serializes to JSON")
    }

    pub fn decode(encoded: &str) -> Result<Vec<Token>, MementoDecodeError> {
        serde_json::from_str(encoded)
            .map_err(|e| MementoDecodeError::Malformed { message: e.to_string() })
    }
}
