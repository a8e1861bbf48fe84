//! Lineage runs: a population that reproduces, drifts and splits into clades.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{CladeId, Genome, LineageConfig};

use super::genome::{GenomeRng, genome_distance};

/// Genomes sampled when estimating diversity.
const DIVERSITY_SAMPLE: usize = 32;

/// Population summary for one generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageStats {
    pub generation: usize,
    pub population: usize,
    pub mean_loci: f32,
    pub max_loci: usize,
    pub mean_symmetry: f32,
    pub mean_mutation_rate: f32,
    pub mean_clone_rate: f32,
    /// Distinct clades alive.
    pub clades: usize,
    /// Clade splits since the run started.
    pub clade_splits: usize,
    /// Mean pairwise genome distance over a sample of the population.
    pub diversity: f32,
}

/// Reason a lineage run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran every configured generation.
    Completed,
    /// User cancelled.
    Cancelled,
}

/// Outcome of a lineage run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageResult {
    pub stats: LineageStats,
    pub history: Vec<LineageStats>,
    pub population: Vec<Genome>,
    pub stop_reason: StopReason,
    pub elapsed_seconds: f64,
}

/// Drives a population through repeated reproduction.
pub struct LineageEngine {
    config: LineageConfig,
    rng: GenomeRng,
    population: Vec<Genome>,
    history: Vec<LineageStats>,
    generation: usize,
    clade_splits: usize,
    next_clade: Arc<AtomicU64>,
    cancelled: Arc<AtomicBool>,
}

impl LineageEngine {
    /// Create a new engine. `config` must already be validated.
    pub fn new(config: LineageConfig) -> Self {
        let seed = config.random_seed.unwrap_or_else(rand::random);

        Self {
            rng: GenomeRng::new(seed, config.genome.clone()),
            config,
            population: Vec::new(),
            history: Vec::new(),
            generation: 0,
            clade_splits: 0,
            next_clade: Arc::new(AtomicU64::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Seed the population with genesis genomes, one clade each.
    pub fn initialize(&mut self) {
        self.population.clear();
        self.history.clear();
        self.generation = 0;
        self.clade_splits = 0;

        for _ in 0..self.config.population_size {
            let clade = self.allocate_clade();
            let genome = self.rng.random_genome(clade);
            self.population.push(genome);
        }

        log::info!(
            "seeded {} genomes ({} clades)",
            self.population.len(),
            self.population.len()
        );
    }

    fn allocate_clade(&self) -> CladeId {
        let id = self.next_clade.fetch_add(1, Ordering::Relaxed);
        CladeId::new(format!("clade-{id:05}"))
    }

    /// Run a single generation step.
    fn step_generation(&mut self) {
        // Each derivation gets its own source so they can run concurrently
        let seeds: Vec<u64> = (0..self.population.len())
            .map(|_| self.rng.next_seed())
            .collect();
        let genome_config = &self.config.genome;

        let children: Vec<Genome> = self
            .population
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(parent, &seed)| GenomeRng::new(seed, genome_config.clone()).derive_child(parent))
            .collect();

        let threshold = self.config.clade_drift_threshold;
        let mut pool = std::mem::take(&mut self.population);
        pool.reserve(children.len());
        for child in children {
            let drift = child.clade_drift();
            let splits = drift.is_reset() || drift.amount().is_some_and(|n| n >= threshold);
            if splits {
                let clade = self.allocate_clade();
                log::debug!(
                    "clade {} splits into {} at generation {}",
                    child.clade_id(),
                    clade,
                    child.generation()
                );
                self.clade_splits += 1;
                pool.push(child.with_clade(clade));
            } else {
                pool.push(child);
            }
        }

        self.rng.shuffle(&mut pool);
        pool.truncate(self.config.population_size);
        self.population = pool;
        self.generation += 1;
    }

    /// Summarize the current population.
    pub fn stats(&self) -> LineageStats {
        let n = self.population.len();
        if n == 0 {
            return LineageStats {
                generation: self.generation,
                clade_splits: self.clade_splits,
                ..Default::default()
            };
        }

        let mean = |f: fn(&Genome) -> f32| self.population.iter().map(f).sum::<f32>() / n as f32;
        let clades: HashSet<&CladeId> = self.population.iter().map(|g| g.clade_id()).collect();

        LineageStats {
            generation: self.generation,
            population: n,
            mean_loci: mean(|g| g.locus_count() as f32),
            max_loci: self
                .population
                .iter()
                .map(|g| g.locus_count())
                .max()
                .unwrap_or(0),
            mean_symmetry: mean(|g| g.symmetry() as f32),
            mean_mutation_rate: mean(|g| g.mutation_rate() as f32),
            mean_clone_rate: mean(|g| g.clone_rate() as f32),
            clades: clades.len(),
            clade_splits: self.clade_splits,
            diversity: self.compute_diversity(),
        }
    }

    /// Compute population diversity.
    fn compute_diversity(&self) -> f32 {
        let sample = &self.population[..self.population.len().min(DIVERSITY_SAMPLE)];
        if sample.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0f32;
        let mut count = 0;

        for i in 0..sample.len() {
            for j in (i + 1)..sample.len() {
                total_distance += genome_distance(&sample[i], &sample[j]);
                count += 1;
            }
        }

        total_distance / count as f32
    }

    /// Run the lineage with a per-generation callback.
    pub fn run_with_callback<F>(&mut self, callback: F) -> LineageResult
    where
        F: Fn(&LineageStats),
    {
        let start_time = std::time::Instant::now();

        self.initialize();
        let stats = self.stats();
        callback(&stats);
        self.history.push(stats);

        let stop_reason = loop {
            if self.cancelled.load(Ordering::Relaxed) {
                break StopReason::Cancelled;
            }
            if self.generation >= self.config.generations {
                break StopReason::Completed;
            }

            self.step_generation();

            let stats = self.stats();
            callback(&stats);
            self.history.push(stats);
        };

        let stats = self.stats();
        log::info!(
            "lineage stopped ({:?}) after {} generations: {} clades, {} splits",
            stop_reason,
            stats.generation,
            stats.clades,
            stats.clade_splits
        );

        LineageResult {
            stats,
            history: self.history.clone(),
            population: self.population.clone(),
            stop_reason,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        }
    }

    /// Run the lineage (blocking).
    pub fn run(&mut self) -> LineageResult {
        self.run_with_callback(|_| {})
    }
}
