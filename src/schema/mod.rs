//! Schema module - Genome data model and configuration types.

mod behavior;
mod color;
mod config;
mod genome;
mod locus;
mod reaction;

pub use behavior::*;
pub use color::*;
pub use config::*;
pub use genome::*;
pub use locus::*;
pub use reaction::*;
