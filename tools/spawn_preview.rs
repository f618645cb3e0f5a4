/// Spawn Preview: interactive shell for trying spawn files without a game.
///
/// Usage: spawn_preview --spawns <path> [--config <spawner.ron>] [--seed <n>]
///
/// Commands:
///   scene <name> [runs]  resolve a scene, averaging over runs
///   seed <n>             set RNG seed
///   scenes               list scenes with spawn entries
///   tables               list loot tables and their entries
///   dump                 print both registries as RON
///   help                 list commands
///   quit                 exit

use gear_spawner::core::spawner::GearSpawner;
use gear_spawner::core::resolver::{SeededRoller, SpawnHost, SpawnReport};
use gear_spawner::schema::spawn::Vec3;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Pretends every asset exists; a handle is just the asset name.
struct PreviewHost;

impl SpawnHost for PreviewHost {
    type Asset = String;
    type Handle = String;

    fn load_asset(&mut self, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn instantiate(&mut self, asset: &String, _position: Vec3, _rotation_euler: Vec3) -> String {
        asset.clone()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut spawns_path = None;
    let mut config_path = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--spawns" if i + 1 < args.len() => {
                i += 1;
                spawns_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(spawns_path) = spawns_path else {
        eprintln!("Error: --spawns is required");
        print_usage();
        std::process::exit(1);
    };

    let mut builder = GearSpawner::builder();
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    builder = if Path::new(&spawns_path).is_dir() {
        builder.spawn_dir(&spawns_path)
    } else {
        builder.spawn_file(&spawns_path)
    };
    let spawner = match builder.build() {
        Ok(spawner) => spawner,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Loaded {} spawn entries in {} scenes",
        spawner.spawn_registry().len(),
        spawner.spawn_registry().scenes().len()
    );
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let mut resolver = spawner.default_resolver(PreviewHost, SeededRoller::new(seed));

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("spawns> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "seed" => {
                match parts.get(1).and_then(|s| s.parse::<u64>().ok()) {
                    Some(n) => {
                        resolver = spawner.default_resolver(PreviewHost, SeededRoller::new(n));
                        println!("Seed set to {}", n);
                    }
                    None => println!("Usage: seed <n>"),
                }
            }
            "scenes" => {
                for scene in spawner.spawn_registry().scenes() {
                    println!("  {}", scene);
                }
            }
            "tables" => {
                let loot = spawner.loot_registry();
                for table in loot.tables() {
                    println!("  {}", table);
                    for entry in loot.entries(table) {
                        println!("    {} (w={})", entry.prefab_name, entry.weight);
                    }
                }
            }
            "dump" => {
                let pretty = ron::ser::PrettyConfig::default();
                match ron::ser::to_string_pretty(spawner.spawn_registry(), pretty.clone()) {
                    Ok(text) => println!("{}", text),
                    Err(e) => println!("ERROR: {}", e),
                }
                match ron::ser::to_string_pretty(spawner.loot_registry(), pretty) {
                    Ok(text) => println!("{}", text),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "scene" => {
                if parts.len() < 2 {
                    println!("Usage: scene <name> [runs]");
                    continue;
                }
                let scene = parts[1];
                let runs: usize = parts
                    .get(2)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1)
                    .max(1);

                let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                let mut listener = |report: &SpawnReport<String>| {
                    for name in &report.spawned {
                        *counts.entry(name.clone()).or_default() += 1;
                    }
                };
                let mut resolved = 0;
                for _ in 0..runs {
                    if spawner
                        .on_scene_activated(&mut resolver, scene, &mut listener)
                        .is_some()
                    {
                        resolved += 1;
                    }
                }

                if resolved == 0 {
                    println!("'{}' is not a gameplay scene; nothing spawns there.", scene);
                    continue;
                }
                println!("\n--- {} over {} run(s) ---", scene, runs);
                if counts.is_empty() {
                    println!("(nothing spawned)");
                }
                for (name, count) in &counts {
                    println!(
                        "  {:<32} {:>5}  ({:.1}%)",
                        name,
                        count,
                        *count as f64 * 100.0 / runs as f64
                    );
                }
                println!("--- End ---\n");
            }
            other => {
                println!("Unknown command: {}. Type 'help'.", other);
            }
        }
    }
}

fn print_usage() {
    println!("Usage: spawn_preview --spawns <path> [--config <spawner.ron>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  scene <name> [runs]  resolve a scene, averaging over runs");
    println!("  seed <n>             set RNG seed");
    println!("  scenes               list scenes with spawn entries");
    println!("  tables               list loot tables and their entries");
    println!("  dump                 print both registries as RON");
    println!("  help                 list commands");
    println!("  quit                 exit");
}
