pub mod board;
pub mod geocache;
pub mod luck;
pub mod session;
pub mod types;

pub use board::{Board, BoardError};
pub use geocache::{Geocache, MementoDecodeError, memento, transfer};
pub use luck::luck;
pub use session::{CacheView, Session, SessionError, SessionSnapshot};
pub use types::{Cell, CellBounds, Point, Token};
