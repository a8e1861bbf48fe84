//! Biota - Variable-length body-plan genomes with self-tuning mutation.
//!
//! This crate provides the heritable core of an artificial-life simulation:
//! a genome that encodes an organism's body plan (a forest of line segments
//! repeated with rotational symmetry) and behavior, plus the stochastic
//! engine that builds genomes from scratch and derives children from parents.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Genome data model, category tables and configuration
//! - `evolution`: Genesis, mutation, topology repair and lineage runs
//!
//! # Example
//!
//! ```rust,no_run
//! use biota::{
//!     evolution::LineageEngine,
//!     schema::LineageConfig,
//! };
//!
//! let config = LineageConfig {
//!     generations: 50,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = LineageEngine::new(config);
//! let result = engine.run();
//!
//! println!("Clades after 50 generations: {}", result.stats.clades);
//! ```

pub mod evolution;
pub mod schema;

// Re-export commonly used types
pub use evolution::{GenomeRng, LineageEngine, StructuralChange};
pub use schema::{Branch, Color, Genome, GenomeConfig, LineageConfig, Locus, Reaction};
