//! Evolution module - Genome genesis, derivation and lineage runs.
//!
//! # Overview
//!
//! - **Genome Operations** (`genome`): random genesis and parent-to-child
//!   derivation, including meta-mutation of the rates that drive it
//! - **Topology** (`topology`): branch re-linking for cloned loci and the
//!   repair pass that runs after a deletion
//! - **Lineage** (`lineage`): a population driver that reproduces genomes in
//!   parallel and splits clades as drift accumulates
//!
//! # Example
//!
//! ```rust
//! use biota::evolution::GenomeRng;
//! use biota::schema::{CladeId, GenomeConfig};
//!
//! let mut rng = GenomeRng::new(42, GenomeConfig::default());
//! let parent = rng.random_genome(CladeId::new("clade-00000"));
//! let child = rng.derive_child(&parent);
//!
//! assert_eq!(child.generation(), parent.generation() + 1);
//! assert!(child.locus_count().abs_diff(parent.locus_count()) <= 1);
//! ```

mod genome;
mod lineage;
pub mod topology;

pub use genome::{GenomeRng, Granularity, LocusGene, StructuralChange, genome_distance};
pub use lineage::{LineageEngine, LineageResult, LineageStats, StopReason};
