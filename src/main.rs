//! Memory Manager Simulation - Main Entry Point
//!
//! Usage: mem_manager [OPTIONS] [init_file]
//!
//! Arguments:
//!   init_file   - Optional seed file: pool sizes on line 1, process triples on line 2
//!
//! Options:
//!   -v, --verbose       Log every tick and released frame
//!   -q, --quiet         Do not draw the frame view
//!   --tick-ms <ms>      Length of one tick in milliseconds (default 1000)
//!   -h, --help          Print help information

use std::env;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use log::{LevelFilter, info, warn};

use mem_manager::constants::{IDLE_POLL_INTERVAL, RENDER_INTERVAL};
use mem_manager::io::InitData;
use mem_manager::{MemoryManager, MemorySnapshot, Observer, Simulation, SimulationConfig, logger, view};

/// Command-line configuration
struct Config {
    init_file: Option<String>,
    verbose: bool,
    quiet: bool,
    tick_interval: Option<Duration>,
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("Memory Manager - Simulates processes held in physical and virtual frames");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] [init_file]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  init_file   - Seed file: '<physical> <virtual>' then '<id> <frames> <ticks>' triples");
    eprintln!("                (defaults to 10/10 frames with processes 1, 2 and 3)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose     Log every tick and released frame");
    eprintln!("  -q, --quiet       Do not draw the frame view");
    eprintln!("  --tick-ms <ms>    Length of one tick in milliseconds (default 1000)");
    eprintln!("  -h, --help        Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {}", program);
    eprintln!("  {} -v --tick-ms 200 seed.txt", program);
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("mem_manager");

    let mut verbose = false;
    let mut quiet = false;
    let mut tick_interval = None;
    let mut positional: Vec<&String> = Vec::new();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-q" | "--quiet" => {
                quiet = true;
            }
            "--tick-ms" => {
                let value = rest.next().ok_or("--tick-ms needs a value")?;
                let ms: u64 = value
                    .parse()
                    .map_err(|_| format!("Invalid tick length: {}", value))?;
                if ms == 0 {
                    return Err("Tick length must be positive".to_string());
                }
                tick_interval = Some(Duration::from_millis(ms));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}\nUse --help for usage information.", arg));
            }
            _ => {
                positional.push(arg);
            }
        }
    }

    if positional.len() > 1 {
        print_help(program);
        return Err(format!("\nError: Expected at most 1 argument, got {}", positional.len()));
    }

    Ok(Config {
        init_file: positional.first().map(|s| s.to_string()),
        verbose,
        quiet,
        tick_interval,
    })
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> anyhow::Result<()> {
    let level = if config.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    logger::init(level).context("failed to install logger")?;

    // Step 1: Read the seed
    let init_data = match &config.init_file {
        Some(path) => InitData::from_file(path).map_err(|e| anyhow!(e))?,
        None => InitData::default(),
    };
    let processes = init_data.processes().map_err(|e| anyhow!(e))?;

    // Step 2: Build both pools
    let manager = Arc::new(
        MemoryManager::new(init_data.physical_frames, init_data.virtual_frames)
            .context("invalid pool configuration")?,
    );
    info!(
        "{} physical frames, {} virtual frames",
        init_data.physical_frames, init_data.virtual_frames
    );

    // Step 3: Load processes; one that does not fit is dropped
    for p in &processes {
        if let Err(e) = manager.load(p) {
            warn!("{}: {}", p, e);
        }
    }

    // Step 4: Run until every process has finished
    let mut sim_config = SimulationConfig::default();
    if let Some(tick) = config.tick_interval {
        sim_config.tick_interval = tick;
        sim_config.poll_interval = sim_config.poll_interval.min(tick);
    }
    let mut sim = Simulation::new(Arc::clone(&manager), sim_config);
    sim.start()?;

    let renderer = if config.quiet {
        None
    } else {
        let observer = sim.observer();
        Some(
            thread::Builder::new()
                .name("render".into())
                .spawn(move || render_loop(&observer))
                .context("failed to spawn render thread")?,
        )
    };

    while !manager.is_idle() {
        thread::sleep(IDLE_POLL_INTERVAL);
    }
    sim.stop();

    if let Some(handle) = renderer {
        handle.join().map_err(|_| anyhow!("render thread panicked"))?;
    }

    // Step 5: Summary
    let snapshot = manager.snapshot();
    if !config.quiet {
        print!("{}", view::render(&snapshot, true));
    }
    info!(
        "All processes finished: {} physical and {} virtual frames free",
        snapshot.physical.iter().filter(|f| f.is_free()).count(),
        snapshot.virtual_frames.iter().filter(|f| f.is_free()).count(),
    );

    Ok(())
}

/// Redraw the frame view whenever the observed state changes
fn render_loop(observer: &Observer) {
    let mut last: Option<MemorySnapshot> = None;
    while observer.is_running() {
        let snapshot = observer.snapshot();
        if last.as_ref() != Some(&snapshot) {
            println!("{}", view::render(&snapshot, true));
            last = Some(snapshot);
        }
        thread::sleep(RENDER_INTERVAL);
    }
}
