use anyhow::{Context, Result};
use clap::Parser;
use game_core::{Board, Geocache, Point};

/// Print the deterministic cache layout around a point: every active
/// cell in the visibility window with its bounds and fresh stock size.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Origin latitude
    #[arg(long, default_value_t = 36.98949379578401)]
    lat: f64,
    /// Origin longitude
    #[arg(long, default_value_t = -122.06277128548504)]
    lng: f64,
    /// Cell edge length in coordinate degrees
    #[arg(long, default_value_t = 1e-4)]
    tile_width: f64,
    /// Visibility radius in cells
    #[arg(long, default_value_t = 8)]
    radius: u32,
    /// Cache spawn probability threshold
    #[arg(long, default_value_t = 0.1)]
    spawn_probability: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut board = Board::new(args.tile_width, args.radius, args.spawn_probability);
    let origin = Point::new(args.lat, args.lng);

    let origin_cell = board.cell_for_point(origin).context("origin point rejected")?;
    println!("origin cell ({}, {})", origin_cell.i, origin_cell.j);

    let active = board.cells_near_point(origin).context("survey failed")?;
    let mut total_stock = 0usize;
    for cell in &active {
        let bounds = board.cell_bounds(*cell);
        let stock = Geocache::new(*cell).stock.len();
        total_stock += stock;
        println!(
            "cell ({:>7}, {:>8})  [{:.4}, {:.4}] - [{:.4}, {:.4}]  stock {}",
            cell.i, cell.j, bounds.south, bounds.west, bounds.north, bounds.east, stock
        );
    }

    println!("{} active cells, {} tokens total", active.len(), total_stock);
    Ok(())
}
