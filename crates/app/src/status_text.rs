//! Text rendering for the session driver: status line, inventory, and
//! cache listings. Pure functions from state to strings.

use game_core::{CacheView, Session};

use crate::format_token;

pub fn status_text(session: &Session) -> String {
    let position = session.position();
    let tokens = match session.collected().len() {
        0 => "0 tokens".to_string(),
        n => format!("{n} tokens accumulated"),
    };
    let tracking = if session.auto_tracking() { ", tracking" } else { "" };
    format!(
        "({:.6}, {:.6}) | {tokens} | {} caches visible{tracking}",
        position.lat,
        position.lng,
        session.cache_views().len()
    )
}

pub fn inventory_lines(session: &Session) -> Vec<String> {
    if session.collected().is_empty() {
        return vec!["inventory is empty".to_string()];
    }
    session.collected().iter().map(format_token).collect()
}

/// Listing for one cache: a header with the cell and count, then one
/// indented line per token.
pub fn cache_lines(view: &CacheView) -> Vec<String> {
    let mut lines = vec![format!(
        "cache {}, {}: {} token{}",
        view.cell.i,
        view.cell.j,
        view.stock.len(),
        if view.stock.len() == 1 { "" } else { "s" }
    )];
    for token in &view.stock {
        lines.push(format!("  {}", format_token(token)));
    }
    lines
}

pub fn help_text() -> &'static str {
    "commands:\n\
     \x20 north/south/east/west (n/s/e/w)  step one tile\n\
     \x20 collect I J                      take a token from cache (I, J)\n\
     \x20 deposit I J                      leave a token at cache (I, J)\n\
     \x20 caches                           list visible caches\n\
     \x20 inventory (inv)                  list collected tokens\n\
     \x20 track LAT LNG                    jump to a position (location feed)\n\
     \x20 auto on|off                      toggle auto-tracking\n\
     \x20 save                             write the save file now\n\
     \x20 reset                            wipe progress and restart at home\n\
     \x20 quit (q)                         save and exit"
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Board, CellBounds, Point, Token};

    fn session() -> Session {
        Session::new(Board::new(1e-4, 2, 0.0), Point::new(0.0, 0.0)).unwrap()
    }

    #[test]
    fn status_counts_tokens_and_caches() {
        let session = session();
        let text = status_text(&session);
        assert!(text.contains("0 tokens"), "{text}");
        assert!(text.contains("0 caches visible"), "{text}");
        assert!(!text.contains("tracking"), "{text}");
    }

    #[test]
    fn inventory_renders_token_labels() {
        let session = session();
        assert_eq!(inventory_lines(&session), vec!["inventory is empty".to_string()]);
    }

    #[test]
    fn cache_listing_has_header_and_one_line_per_token() {
        let view = CacheView {
            cell: game_core::Cell::new(3, -4),
            bounds: CellBounds { south: 0.0, west: 0.0, north: 1.0, east: 1.0 },
            stock: vec![Token { i: 3, j: -4, serial: 0 }, Token { i: 3, j: -4, serial: 1 }],
        };
        let lines = cache_lines(&view);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "cache 3, -4: 2 tokens");
        assert_eq!(lines[1], "  3:-4#0");
        assert_eq!(lines[2], "  3:-4#1");
    }

    #[test]
    fn singular_token_count_reads_naturally() {
        let view = CacheView {
            cell: game_core::Cell::new(0, 0),
            bounds: CellBounds { south: 0.0, west: 0.0, north: 1.0, east: 1.0 },
            stock: vec![Token { i: 0, j: 0, serial: 0 }],
        };
        assert_eq!(cache_lines(&view)[0], "cache 0, 0: 1 token");
    }
}
