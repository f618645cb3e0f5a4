/// Spawn Linter: validates spawn files before they ship.
///
/// Usage: spawn_linter <spawn_file_or_dir> [--config <spawner.ron>]

use gear_spawner::core::config::SpawnerConfig;
use gear_spawner::core::lint::Linter;
use gear_spawner::core::reader::read_str;
use gear_spawner::core::spawner::spawn_files_in;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: spawn_linter <spawn_file_or_dir> [--config <spawner.ron>]");
        process::exit(0);
    }

    let spawn_path = Path::new(&args[1]);
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match SpawnerConfig::load_from_ron(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: Failed to load config '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => SpawnerConfig::default(),
    };

    let files: Vec<PathBuf> = if spawn_path.is_file() {
        vec![spawn_path.to_path_buf()]
    } else if spawn_path.is_dir() {
        match spawn_files_in(spawn_path, &config.spawn_file_extension) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("ERROR: Failed to list '{}': {}", spawn_path.display(), e);
                process::exit(1);
            }
        }
    } else {
        eprintln!("ERROR: Path '{}' does not exist", spawn_path.display());
        process::exit(1);
    };

    let mut linter = Linter::new(&config.item_prefix);
    let mut unreadable = 0;
    for path in &files {
        let origin = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("  ERROR reading {}: {}", origin, e);
                unreadable += 1;
                continue;
            }
        };
        match read_str(&source) {
            Ok(file) => {
                println!(
                    "  Loaded: {} ({} spawns, {} loot entries)",
                    origin,
                    file.spawns.len(),
                    file.loot_entries.len()
                );
                linter.check(&origin, &file);
            }
            Err(e) => linter.read_failed(&origin, &e),
        }
    }

    println!("\n=== Spawn Lint Report ===\n");

    if linter.issues().is_empty() {
        println!("All checks passed!");
    }

    for issue in linter.issues() {
        println!("{}", issue);
    }

    println!(
        "\nSummary: {} files, {} errors, {} warnings",
        files.len(),
        linter.error_count() + unreadable,
        linter.warning_count()
    );

    if linter.error_count() + unreadable == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
