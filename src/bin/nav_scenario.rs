//! Scenario Runner
//!
//! Builds a navigation grid from a TOML scenario file, runs its path queries
//! and prints the outcomes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use motion_map::core::types::CellCoord;
use motion_map::scenario::{Scenario, ScenarioReport};
use motion_map::NavConfig;

/// Scenario Runner - path queries against an ASCII map
#[derive(Parser, Debug)]
#[command(name = "nav_scenario")]
#[command(about = "Run the path queries of a navigation scenario file")]
struct Args {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Navigation profile (TOML) replacing the scenario's [config] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Print the map with each found path drawn on it
    #[arg(long)]
    draw: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        "motion_map=debug"
    } else {
        "motion_map=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut scenario = match Scenario::load(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.scenario.display(), e);
            return ExitCode::from(2);
        }
    };

    if let Some(path) = &args.config {
        let profile = NavConfig::load(path).and_then(|config| scenario.clone().with_config(config));
        scenario = match profile {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("Failed to apply profile {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        };
    }

    let report = match scenario.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Scenario '{}' failed: {}", scenario.name, e);
            return ExitCode::from(2);
        }
    };

    match args.format.as_str() {
        "json" => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::from(2);
            }
        },
        "text" => print_text(&report),
        _ => {
            eprintln!("Unknown format '{}', defaulting to text", args.format);
            print_text(&report);
        }
    }

    if args.draw {
        draw_paths(&scenario, &report);
    }

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_text(report: &ScenarioReport) {
    println!("Scenario: {}", report.name);
    println!("=========={}", "=".repeat(report.name.len()));
    println!(
        "Grid: {}x{} cells of {:.2}, {} too steep, {} obstructed, {} objects",
        report.grid.width,
        report.grid.height,
        report.grid.cell_size,
        report.grid.slope_blocked,
        report.grid.volume_blocked,
        report.grid.obstacles
    );
    println!();

    for query in &report.queries {
        let marker = if query.passed { "ok  " } else { "FAIL" };
        println!(
            "[{}] {} (unit {}): {:?}",
            marker, query.name, query.unit_size, query.outcome
        );
        if let Some(expected) = query.expected {
            if !query.passed {
                println!("       expected {:?}", expected);
            }
        }
        if query.outcome.is_found() {
            let points: Vec<String> = query
                .waypoints
                .iter()
                .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
                .collect();
            println!("       {} waypoints, length {:.2}", points.len(), query.length);
            println!("       {}", points.join(" -> "));
        }
        println!(
            "       {} expanded, {} queued",
            query.stats.expanded, query.stats.queued
        );
    }

    println!();
    println!(
        "{}/{} queries as expected",
        report.queries.len() - report.failures().count(),
        report.queries.len()
    );
}

/// Overlay waypoints on the map, top row printed last so y grows upward
fn draw_paths(scenario: &Scenario, report: &ScenarioReport) {
    let cell_size = scenario.config.cell_size;
    for query in report.queries.iter().filter(|q| q.outcome.is_found()) {
        let mut rows: Vec<Vec<char>> = scenario.map.iter().map(|r| r.chars().collect()).collect();
        for (i, point) in query.waypoints.iter().enumerate() {
            let local = (*point - scenario.origin) / cell_size;
            let cell = CellCoord::new(local.x.floor() as i32, local.y.floor() as i32);
            let symbol = if i == 0 { 'S' } else { '*' };
            if let Some(slot) = rows
                .get_mut(cell.y as usize)
                .and_then(|row| row.get_mut(cell.x as usize))
            {
                *slot = symbol;
            }
        }

        println!();
        println!("{}:", query.name);
        for row in rows.iter().rev() {
            println!("  {}", row.iter().collect::<String>());
        }
    }
}
