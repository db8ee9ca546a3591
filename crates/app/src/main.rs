use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use game_core::{Board, Point, Session};

use app::command::{Command, confirms_reset, parse_line};
use app::{format_snapshot_hash, format_token, save_file, status_text};

#[derive(Parser)]
#[command(author, version, about = "Deterministic map cache exploration, one command per line")]
struct Args {
    /// Cell edge length in coordinate degrees
    #[arg(long, default_value_t = 1e-4)]
    tile_width: f64,
    /// Visibility radius in cells
    #[arg(long, default_value_t = 8)]
    radius: u32,
    /// Cache spawn probability threshold
    #[arg(long, default_value_t = 0.1)]
    spawn_probability: f64,
    /// Home latitude
    #[arg(long, default_value_t = 36.98949379578401)]
    lat: f64,
    /// Home longitude
    #[arg(long, default_value_t = -122.06277128548504)]
    lng: f64,
    /// Save file path (defaults to the platform data directory)
    #[arg(long)]
    save: Option<PathBuf>,
    /// Run without loading or writing a save file
    #[arg(long)]
    no_save: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let board = Board::new(args.tile_width, args.radius, args.spawn_probability);
    let home = Point::new(args.lat, args.lng);
    let mut session = Session::new(board, home).context("home point rejected")?;

    let save_path = if args.no_save {
        None
    } else {
        match args.save.clone().or_else(save_file::default_path) {
            Some(path) => Some(path),
            None => {
                eprintln!("warning: no data directory available, running without a save file");
                None
            }
        }
    };

    if let Some(path) = &save_path
        && path.exists()
    {
        // A bad save is not fatal: report it and start a fresh world.
        match save_file::load(path) {
            Ok(snapshot) => {
                session.restore(snapshot).context("restoring saved session")?;
                println!("restored session from {}", path.display());
            }
            Err(err) => eprintln!("warning: ignoring save file ({err})"),
        }
    }

    println!("{}", status_text::status_text(&session));
    run_loop(&mut session, save_path.as_deref())?;

    if let Some(path) = &save_path {
        save_file::write_atomic(path, &session.snapshot())
            .with_context(|| format!("writing save file {}", path.display()))?;
        println!("saved to {}", path.display());
    }

    Ok(())
}

fn run_loop(session: &mut Session, save_path: Option<&Path>) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF behaves like quit
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(command) => {
                if let Err(err) = execute(session, save_path, command) {
                    eprintln!("error: {err}");
                }
            }
            Err(message) => eprintln!("error: {message}"),
        }
    }
}

fn execute(session: &mut Session, save_path: Option<&Path>, command: Command) -> Result<()> {
    match command {
        Command::Move { di, dj } => {
            session.move_by(di, dj)?;
            report(session);
        }
        Command::Collect(cell) => {
            match session.collect(cell)? {
                Some(token) => println!("collected {}", format_token(&token)),
                None => println!("cache ({}, {}) is empty", cell.i, cell.j),
            }
            report(session);
        }
        Command::Deposit(cell) => {
            match session.deposit(cell)? {
                Some(token) => println!("deposited {}", format_token(&token)),
                None => println!("nothing to deposit"),
            }
            report(session);
        }
        Command::Caches => {
            for view in session.cache_views() {
                for line in status_text::cache_lines(&view) {
                    println!("{line}");
                }
            }
        }
        Command::Inventory => {
            for line in status_text::inventory_lines(session) {
                println!("{line}");
            }
        }
        Command::Track(point) => {
            session.set_position(point)?;
            report(session);
        }
        Command::Auto(enabled) => {
            session.set_auto_tracking(enabled);
            println!("auto-tracking {}", if enabled { "on" } else { "off" });
        }
        Command::Save => {
            let path = save_path
                .map(Path::to_path_buf)
                .or_else(save_file::default_path)
                .ok_or_else(|| anyhow!("no data directory available"))?;
            save_file::write_atomic(&path, &session.snapshot())?;
            println!("saved to {}", path.display());
        }
        Command::Reset => {
            print!("wipe all progress and restart at home? [y/n] ");
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().lock().read_line(&mut answer)?;
            if confirms_reset(&answer) {
                session.reset()?;
                println!("progress wiped, back home");
                report(session);
            } else {
                println!("reset cancelled");
            }
        }
        Command::Help => println!("{}", status_text::help_text()),
        // Quit is intercepted by the loop before execution.
        Command::Quit => {}
    }
    Ok(())
}

fn report(session: &Session) {
    println!("{}", status_text::status_text(session));
    println!("world {}", format_snapshot_hash(session.snapshot_hash()));
}
