use anyhow::{Result, bail};
use clap::Parser;
use game_core::{Board, Point, Session, memento};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 2000)]
    steps: u32,
    /// Visibility radius in cells
    #[arg(long, default_value_t = 4)]
    radius: u32,
    /// Cache spawn probability threshold
    #[arg(long, default_value_t = 0.4)]
    spawn_probability: f64,
}

/// Tokens currently accounted for anywhere in the world.
fn accounted_tokens(session: &Session) -> Result<usize> {
    let snapshot = session.snapshot();
    let mut total = snapshot.collected.len();
    for (key, encoded) in &snapshot.mementos {
        total += memento::decode(encoded)
            .map_err(|e| anyhow::anyhow!("memento for {key} undecodable: {e}"))?
            .len();
    }
    Ok(total)
}

fn run_walk(args: &Args) -> Result<u64> {
    let board = Board::new(1e-4, args.radius, args.spawn_probability);
    let mut session = Session::new(board, Point::new(36.9895, -122.0628))?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut known_total = accounted_tokens(&session)?;
    let mut collects = 0u32;
    let mut deposits = 0u32;

    for step in 0..args.steps {
        match rng.next_u64() % 6 {
            0 => session.move_by(1, 0)?,
            1 => session.move_by(-1, 0)?,
            2 => session.move_by(0, 1)?,
            3 => session.move_by(0, -1)?,
            4 => {
                let views = session.cache_views();
                if !views.is_empty() {
                    let cell = views[rng.next_u64() as usize % views.len()].cell;
                    if session.collect(cell)?.is_some() {
                        collects += 1;
                    }
                }
            }
            _ => {
                let views = session.cache_views();
                if !views.is_empty() {
                    let cell = views[rng.next_u64() as usize % views.len()].cell;
                    if session.deposit(cell)?.is_some() {
                        deposits += 1;
                    }
                }
            }
        }

        let total = accounted_tokens(&session)?;
        if total < known_total {
            bail!("Invariant failed: tokens destroyed at step {step} ({known_total} -> {total})");
        }
        known_total = total;
    }

    println!(
        "{} steps, {collects} collects, {deposits} deposits, {known_total} tokens known",
        args.steps
    );
    Ok(session.snapshot_hash())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz walk on seed {} for {} steps...", args.seed, args.steps);
    let first = run_walk(&args)?;
    let second = run_walk(&args)?;
    if first != second {
        bail!("Invariant failed: replay diverged ({first:#x} vs {second:#x})");
    }

    println!("OK, world hash 0x{first:016x}");
    Ok(())
}
