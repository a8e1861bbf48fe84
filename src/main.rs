//! Biota CLI - Run lineage simulations from JSON configuration.

use std::path::PathBuf;
use std::time::Instant;

use biota::{
    evolution::{GenomeRng, LineageEngine, LineageStats},
    schema::{CladeId, LineageConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <lineage.json> [generations]", args[0]);
        eprintln!();
        eprintln!("Run a Biota lineage simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  lineage.json  Path to lineage configuration file");
        eprintln!("  generations   Override the configured number of generations");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let mut config = LineageConfig::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });
    if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
        config.generations = generations;
    }

    println!("Biota Lineage");
    println!("=============");
    println!("Population: {}", config.population_size);
    println!("Generations: {}", config.generations);
    println!(
        "Mutation rate: [{}, {}], clone rate: [{}, {}]",
        config.genome.mutation_rate_bounds.0,
        config.genome.mutation_rate_bounds.1,
        config.genome.clone_rate_bounds.0,
        config.genome.clone_rate_bounds.1
    );
    println!("Max loci: {}", config.genome.max_loci);
    println!();

    let generations = config.generations;
    let report_every = (generations / 10).max(1);
    let start = Instant::now();

    let mut engine = LineageEngine::new(config);
    let result = engine.run_with_callback(|stats| {
        if stats.generation % report_every == 0 {
            print_stats(stats);
        }
    });

    let elapsed = start.elapsed();

    println!();
    println!("Final population ({:?}):", result.stop_reason);
    print_stats(&result.stats);
    println!(
        "Time: {:.2}s ({:.1} generations/s)",
        elapsed.as_secs_f32(),
        result.stats.generation as f32 / elapsed.as_secs_f32()
    );
}

fn print_stats(stats: &LineageStats) {
    println!(
        "  Generation {}: loci={:.2} (max {}), symmetry={:.2}, mutation={:.1}, clone={:.1}, clades={}, splits={}, diversity={:.3}",
        stats.generation,
        stats.mean_loci,
        stats.max_loci,
        stats.mean_symmetry,
        stats.mean_mutation_rate,
        stats.mean_clone_rate,
        stats.clades,
        stats.clade_splits,
        stats.diversity
    );
}

fn print_example() {
    let config = LineageConfig::default();
    let mut rng = GenomeRng::random(config.genome.clone());
    let genome = rng.random_genome(CladeId::new("clade-00000"));

    let (Ok(config_json), Ok(genome_json)) = (
        serde_json::to_string_pretty(&config),
        serde_json::to_string_pretty(&genome),
    ) else {
        eprintln!("Error serializing example");
        std::process::exit(1);
    };

    println!("Example configuration (lineage.json):");
    println!("{}", config_json);
    println!();
    println!("Example genome:");
    println!("{}", genome_json);
}
