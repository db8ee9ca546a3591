//! Line-oriented command parsing for the session driver.

use game_core::{Cell, Point};

/// One player command, parsed from a single input line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Step one tile: `(di, dj)` along the latitude/longitude axes.
    Move { di: i64, dj: i64 },
    /// Move one token from the addressed cache into the inventory.
    Collect(Cell),
    /// Move one token from the inventory into the addressed cache.
    Deposit(Cell),
    /// List every visible cache with its stock.
    Caches,
    /// List the player inventory.
    Inventory,
    /// Position update, standing in for the external location feed.
    Track(Point),
    /// Toggle the auto-tracking flag.
    Auto(bool),
    Save,
    Reset,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    let command = match head {
        "north" | "n" => Command::Move { di: 1, dj: 0 },
        "south" | "s" => Command::Move { di: -1, dj: 0 },
        "east" | "e" => Command::Move { di: 0, dj: 1 },
        "west" | "w" => Command::Move { di: 0, dj: -1 },
        "collect" => Command::Collect(parse_cell(&rest)?),
        "deposit" => Command::Deposit(parse_cell(&rest)?),
        "caches" => Command::Caches,
        "inventory" | "inv" => Command::Inventory,
        "track" => Command::Track(parse_point(&rest)?),
        "auto" => match rest.as_slice() {
            ["on"] => Command::Auto(true),
            ["off"] => Command::Auto(false),
            _ => return Err("usage: auto on|off".to_string()),
        },
        "save" => Command::Save,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };

    match command {
        Command::Collect(_) | Command::Deposit(_) | Command::Track(_) | Command::Auto(_) => {}
        _ if !rest.is_empty() => {
            return Err(format!("'{head}' takes no arguments"));
        }
        _ => {}
    }

    Ok(command)
}

/// Whether a prompt answer confirms the reset. Only a bare `y` (any
/// case) counts; everything else, including `yes`, cancels.
pub fn confirms_reset(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

fn parse_cell(args: &[&str]) -> Result<Cell, String> {
    let [i, j] = args else {
        return Err("expected a cell: I J".to_string());
    };
    let i = i.parse::<i64>().map_err(|_| format!("cell index '{i}' must be an integer"))?;
    let j = j.parse::<i64>().map_err(|_| format!("cell index '{j}' must be an integer"))?;
    Ok(Cell::new(i, j))
}

fn parse_point(args: &[&str]) -> Result<Point, String> {
    let [lat, lng] = args else {
        return Err("expected a position: LAT LNG".to_string());
    };
    let lat = lat.parse::<f64>().map_err(|_| format!("latitude '{lat}' must be a number"))?;
    let lng = lng.parse::<f64>().map_err(|_| format!("longitude '{lng}' must be a number"))?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err("position must be finite".to_string());
    }
    Ok(Point::new(lat, lng))
}
