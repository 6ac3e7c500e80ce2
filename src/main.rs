//! Voxpaint CLI - Run a paint search from JSON configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use voxpaint::{
    schema::{SearchConfig, SearchPhase},
    search::{SearchEngine, VoxelGrid},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 3 {
        eprintln!("Usage: {} <config.json> <target.json> [log.json]", args[0]);
        eprintln!();
        eprintln!("Approximate a target voxel grid with evolved box-fill commands.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to search configuration file");
        eprintln!("  target.json  Path to target grid ({{\"size\", \"blocks\"}})");
        eprintln!("  log.json     Optional output path for the committed-command log");
        eprintln!();
        eprintln!("Run with --example to print a starter configuration.");
        std::process::exit(1);
    }

    let config = load_config(Path::new(&args[1]));
    let target = load_grid(Path::new(&args[2]));
    let log_path = args.get(3).map(PathBuf::from);

    println!("Voxpaint Search");
    println!("===============");
    println!("Grid: {size}x{size}x{size}", size = target.size());
    println!("Population: {}", config.population_size);
    println!(
        "Stop: {:.1}% likeness or {:.1}s budget",
        config.stop_likeness, config.stop_time_budget
    );
    println!();

    let mut engine = SearchEngine::from_target(config, target).unwrap_or_else(|e| {
        eprintln!("Error starting search: {}", e);
        std::process::exit(1);
    });

    println!("Initial likeness: {:.2}%", engine.likeness() * 100.0);
    println!("Running search...");
    let start = Instant::now();

    let mut last_report = 0usize;
    loop {
        let phase = engine.step_for(Duration::from_millis(16));
        let progress = engine.progress();

        if progress.commits >= last_report + 10 || phase != SearchPhase::Searching {
            println!(
                "  gen {}: {} commits, likeness {:.2}%, best fitness {}, cost {:.2}s",
                progress.generation,
                progress.commits,
                progress.likeness * 100.0,
                progress.best.as_ref().map(|b| b.fitness).unwrap_or(0),
                progress.executed_cost
            );
            last_report = progress.commits;
        }

        if phase != SearchPhase::Searching {
            break;
        }
    }

    let result = engine.result(start.elapsed().as_secs_f64());

    println!();
    println!("Finished: {:?}", result.stats.stop_reason);
    println!("  Commits: {}", result.stats.commits);
    println!("  Generations: {}", result.stats.generations);
    println!("  Episodes: {}", result.stats.episodes);
    println!(
        "  Final likeness: {:.2}%",
        result.stats.final_likeness * 100.0
    );
    println!("  Elapsed: {:.2}s", result.stats.elapsed_seconds);

    if let Some(path) = log_path {
        let json = serde_json::to_string_pretty(&result.log).expect("serialize command log");
        fs::write(&path, json).unwrap_or_else(|e| {
            eprintln!("Error writing log file: {}", e);
            std::process::exit(1);
        });
        println!("  Command log written to {}", path.display());
    }
}

fn load_config(path: &Path) -> SearchConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn load_grid(path: &Path) -> VoxelGrid {
    let grid_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading target file: {}", e);
        std::process::exit(1);
    });
    let grid: VoxelGrid = serde_json::from_str(&grid_str).unwrap_or_else(|e| {
        eprintln!("Error parsing target grid: {}", e);
        std::process::exit(1);
    });
    if !grid.is_well_formed() {
        eprintln!("Error: target grid size must be a power of two with size^3 blocks");
        std::process::exit(1);
    }
    grid
}

fn print_example_config() {
    let example = SearchConfig {
        random_seed: Some(42),
        ..Default::default()
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&example).expect("serialize example config")
    );
}
