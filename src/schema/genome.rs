//! The heritable record of one organism.

use std::f32::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Behavior, GenomeConfig, Locus, Reaction};

/// Largest symmetry a genome may carry.
pub const MAX_SYMMETRY: u8 = 8;
/// Upper bound for home coordinates (percent of world extent).
pub const HOME_MAX: f32 = 100.0;
/// Numeric form of an unset home coordinate.
pub const HOME_UNSET: f32 = -1.0;

/// Opaque lineage identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CladeId(String);

impl CladeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CladeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Heritable drift accumulated since the last clade boundary.
///
/// Symmetry and mirror changes put the counter into [`CladeDrift::Reset`];
/// color and locus-count changes add one each. `Reset` absorbs further
/// increments until clade bookkeeping consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CladeDrift {
    Reset,
    Drift(u32),
}

impl Default for CladeDrift {
    fn default() -> Self {
        CladeDrift::Drift(0)
    }
}

impl CladeDrift {
    /// Add one unit of incremental drift.
    pub fn bump(self) -> Self {
        match self {
            CladeDrift::Reset => CladeDrift::Reset,
            CladeDrift::Drift(n) => CladeDrift::Drift(n.saturating_add(1)),
        }
    }

    pub fn is_reset(self) -> bool {
        matches!(self, CladeDrift::Reset)
    }

    /// Accumulated drift, or `None` when reset.
    pub fn amount(self) -> Option<u32> {
        match self {
            CladeDrift::Reset => None,
            CladeDrift::Drift(n) => Some(n),
        }
    }
}

/// Invariant violations found while building a genome from raw parts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenomeError {
    #[error("Genome must have at least one locus")]
    NoLoci,
    #[error("Genome has {count} loci, more than the maximum of {max}")]
    TooManyLoci { count: usize, max: usize },
    #[error("Symmetry {0} is outside 1..=8")]
    InvalidSymmetry(u8),
    #[error("Locus {index} branches to {raw}, which is not before it")]
    ForwardBranch { index: usize, raw: i32 },
    #[error("Locus {index} has invalid length {length}")]
    InvalidLength { index: usize, length: f32 },
    #[error("Locus {index} has angle {theta} outside [0, 2pi)")]
    InvalidTheta { index: usize, theta: f32 },
    #[error("Locus {index} reaction {reaction:?} has level {level}")]
    InvalidReaction {
        index: usize,
        reaction: Reaction,
        level: u8,
    },
    #[error("Home coordinate {0} is outside [0, 100]")]
    InvalidHome(f32),
    #[error("Behavior trait {0} is out of range")]
    InvalidBehavior(&'static str),
    #[error("{name} {value} is outside [{min}, {max}]")]
    RateOutOfBounds {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Raw genome fields, as read from or written to an external format.
///
/// Converting to a [`Genome`] validates every structural invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeParts {
    pub loci: Vec<Locus>,
    pub symmetry: u8,
    pub mirror: bool,
    pub mutation_rate: u32,
    pub clone_rate: u32,
    #[serde(default)]
    pub home_x: Option<f32>,
    #[serde(default)]
    pub home_y: Option<f32>,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub generation: u64,
    pub clade_id: CladeId,
    #[serde(default)]
    pub clade_drift: CladeDrift,
}

/// Complete heritable record of one organism.
///
/// A genome is immutable once built: it comes from genesis, from derivation
/// of exactly one parent, or from validated [`GenomeParts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GenomeParts", into = "GenomeParts")]
pub struct Genome {
    loci: Vec<Locus>,
    symmetry: u8,
    mirror: bool,
    mutation_rate: u32,
    clone_rate: u32,
    home_x: Option<f32>,
    home_y: Option<f32>,
    behavior: Behavior,
    generation: u64,
    clade_id: CladeId,
    clade_drift: CladeDrift,
}

impl Genome {
    /// Build from parts, checking the structural invariants.
    pub fn try_from_parts(parts: GenomeParts) -> Result<Self, GenomeError> {
        validate_parts(&parts)?;
        Ok(Self::from_parts_unchecked(parts))
    }

    /// Build from parts the engine has constructed to be valid.
    pub(crate) fn from_parts_unchecked(parts: GenomeParts) -> Self {
        let GenomeParts {
            loci,
            symmetry,
            mirror,
            mutation_rate,
            clone_rate,
            home_x,
            home_y,
            behavior,
            generation,
            clade_id,
            clade_drift,
        } = parts;

        debug_assert!(validate_parts_ref(&loci, symmetry).is_ok());

        Self {
            loci,
            symmetry,
            mirror,
            mutation_rate,
            clone_rate,
            home_x,
            home_y,
            behavior,
            generation,
            clade_id,
            clade_drift,
        }
    }

    /// Decompose into raw parts.
    pub fn into_parts(self) -> GenomeParts {
        GenomeParts {
            loci: self.loci,
            symmetry: self.symmetry,
            mirror: self.mirror,
            mutation_rate: self.mutation_rate,
            clone_rate: self.clone_rate,
            home_x: self.home_x,
            home_y: self.home_y,
            behavior: self.behavior,
            generation: self.generation,
            clade_id: self.clade_id,
            clade_drift: self.clade_drift,
        }
    }

    /// Check the configuration-dependent bounds (locus cap, rate ranges).
    pub fn validate_against(&self, config: &GenomeConfig) -> Result<(), GenomeError> {
        if self.loci.len() > config.max_loci {
            return Err(GenomeError::TooManyLoci {
                count: self.loci.len(),
                max: config.max_loci,
            });
        }
        check_rate(
            "mutation_rate",
            self.mutation_rate,
            config.mutation_rate_bounds,
        )?;
        check_rate("clone_rate", self.clone_rate, config.clone_rate_bounds)?;
        Ok(())
    }

    /// Assign a new lineage, clearing accumulated drift.
    pub fn with_clade(mut self, clade_id: CladeId) -> Self {
        self.clade_id = clade_id;
        self.clade_drift = CladeDrift::Drift(0);
        self
    }

    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    pub fn locus(&self, index: usize) -> Option<&Locus> {
        self.loci.get(index)
    }

    pub fn locus_count(&self) -> usize {
        self.loci.len()
    }

    pub fn symmetry(&self) -> u8 {
        self.symmetry
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn mutation_rate(&self) -> u32 {
        self.mutation_rate
    }

    pub fn clone_rate(&self) -> u32 {
        self.clone_rate
    }

    pub fn home_x(&self) -> Option<f32> {
        self.home_x
    }

    pub fn home_y(&self) -> Option<f32> {
        self.home_y
    }

    /// Home X with the `-1` sentinel for "unset".
    pub fn home_x_raw(&self) -> f32 {
        self.home_x.unwrap_or(HOME_UNSET)
    }

    /// Home Y with the `-1` sentinel for "unset".
    pub fn home_y_raw(&self) -> f32 {
        self.home_y.unwrap_or(HOME_UNSET)
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clade_id(&self) -> &CladeId {
        &self.clade_id
    }

    pub fn clade_drift(&self) -> CladeDrift {
        self.clade_drift
    }

    /// Number of segments in the materialized body plan.
    pub fn segment_count(&self) -> usize {
        self.loci.len() * self.symmetry as usize
    }

    /// Total length of one repetition of the locus sequence.
    pub fn total_length(&self) -> f32 {
        self.loci.iter().map(|l| l.length).sum()
    }
}

impl TryFrom<GenomeParts> for Genome {
    type Error = GenomeError;

    fn try_from(parts: GenomeParts) -> Result<Self, Self::Error> {
        Genome::try_from_parts(parts)
    }
}

impl From<Genome> for GenomeParts {
    fn from(genome: Genome) -> Self {
        genome.into_parts()
    }
}

fn check_rate(name: &'static str, value: u32, bounds: (u32, u32)) -> Result<(), GenomeError> {
    if value < bounds.0 || value > bounds.1 {
        return Err(GenomeError::RateOutOfBounds {
            name,
            value,
            min: bounds.0,
            max: bounds.1,
        });
    }
    Ok(())
}

fn validate_parts(parts: &GenomeParts) -> Result<(), GenomeError> {
    validate_parts_ref(&parts.loci, parts.symmetry)?;

    for (index, locus) in parts.loci.iter().enumerate() {
        if !(locus.length.is_finite() && locus.length > 0.0) {
            return Err(GenomeError::InvalidLength {
                index,
                length: locus.length,
            });
        }
        if !(0.0..TAU).contains(&locus.theta) {
            return Err(GenomeError::InvalidTheta {
                index,
                theta: locus.theta,
            });
        }
        if let Some(reaction) = locus.reactions.first_out_of_range() {
            return Err(GenomeError::InvalidReaction {
                index,
                reaction,
                level: locus.reactions.get(reaction),
            });
        }
    }

    for home in [parts.home_x, parts.home_y].into_iter().flatten() {
        if !(0.0..=HOME_MAX).contains(&home) {
            return Err(GenomeError::InvalidHome(home));
        }
    }

    if let Some(name) = parts.behavior.first_out_of_range() {
        return Err(GenomeError::InvalidBehavior(name));
    }

    Ok(())
}

/// Checks shared by imported and engine-built genomes.
fn validate_parts_ref(loci: &[Locus], symmetry: u8) -> Result<(), GenomeError> {
    if loci.is_empty() {
        return Err(GenomeError::NoLoci);
    }
    if !(1..=MAX_SYMMETRY).contains(&symmetry) {
        return Err(GenomeError::InvalidSymmetry(symmetry));
    }
    if let Some((index, locus)) = loci
        .iter()
        .enumerate()
        .find(|(i, l)| !l.branch.is_legal_at(*i))
    {
        return Err(GenomeError::ForwardBranch {
            index,
            raw: locus.branch.raw(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Branch, Color, Reactions};

    fn locus(branch: Branch) -> Locus {
        Locus {
            length: 5.0,
            theta: 1.0,
            color: Color::Green,
            branch,
            reactions: Reactions::default(),
        }
    }

    fn parts() -> GenomeParts {
        GenomeParts {
            loci: vec![
                locus(Branch::Previous),
                locus(Branch::Origin),
                locus(Branch::Locus(0)),
            ],
            symmetry: 3,
            mirror: true,
            mutation_rate: 10,
            clone_rate: 20,
            home_x: Some(50.0),
            home_y: None,
            behavior: Behavior::default(),
            generation: 4,
            clade_id: CladeId::new("clade-1"),
            clade_drift: CladeDrift::Drift(2),
        }
    }

    #[test]
    fn test_valid_parts() {
        let genome = Genome::try_from_parts(parts()).unwrap();
        assert_eq!(genome.locus_count(), 3);
        assert_eq!(genome.segment_count(), 9);
        assert_eq!(genome.home_x_raw(), 50.0);
        assert_eq!(genome.home_y_raw(), HOME_UNSET);
        assert!((genome.total_length() - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_forward_branch() {
        let mut p = parts();
        p.loci[1].branch = Branch::Locus(1);
        assert_eq!(
            Genome::try_from_parts(p),
            Err(GenomeError::ForwardBranch { index: 1, raw: 2 })
        );
    }

    #[test]
    fn test_rejects_empty_and_bad_symmetry() {
        let mut p = parts();
        p.loci.clear();
        assert_eq!(Genome::try_from_parts(p), Err(GenomeError::NoLoci));

        let mut p = parts();
        p.symmetry = 9;
        assert_eq!(
            Genome::try_from_parts(p),
            Err(GenomeError::InvalidSymmetry(9))
        );
    }

    #[test]
    fn test_rejects_bad_fields() {
        let mut p = parts();
        p.home_y = Some(101.0);
        assert!(matches!(
            Genome::try_from_parts(p),
            Err(GenomeError::InvalidHome(_))
        ));

        let mut p = parts();
        p.loci[2].theta = TAU;
        assert!(matches!(
            Genome::try_from_parts(p),
            Err(GenomeError::InvalidTheta { index: 2, .. })
        ));

        let mut p = parts();
        p.loci[0].reactions[Reaction::Plant] = 9;
        assert!(matches!(
            Genome::try_from_parts(p),
            Err(GenomeError::InvalidReaction { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_against_config() {
        let genome = Genome::try_from_parts(parts()).unwrap();
        let mut config = GenomeConfig::default();
        assert!(genome.validate_against(&config).is_ok());

        config.mutation_rate_bounds = (20, 30);
        assert!(matches!(
            genome.validate_against(&config),
            Err(GenomeError::RateOutOfBounds {
                name: "mutation_rate",
                ..
            })
        ));

        config = GenomeConfig {
            max_loci: 2,
            ..Default::default()
        };
        assert!(matches!(
            genome.validate_against(&config),
            Err(GenomeError::TooManyLoci { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let genome = Genome::try_from_parts(parts()).unwrap();
        let json = serde_json::to_string(&genome).unwrap();
        let parsed: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genome);

        let mut p = parts();
        p.loci[0].branch = Branch::Locus(0);
        let bad = serde_json::to_string(&p).unwrap();
        assert!(serde_json::from_str::<Genome>(&bad).is_err());
    }

    #[test]
    fn test_clade_drift() {
        assert_eq!(CladeDrift::default().bump().bump(), CladeDrift::Drift(2));
        assert_eq!(CladeDrift::Reset.bump(), CladeDrift::Reset);
        assert_eq!(CladeDrift::Reset.amount(), None);
        assert!(CladeDrift::Reset.is_reset());
        assert!(!CladeDrift::Drift(3).is_reset());

        let genome = Genome::try_from_parts(parts())
            .unwrap()
            .with_clade(CladeId::new("clade-2"));
        assert_eq!(genome.clade_id().as_str(), "clade-2");
        assert_eq!(genome.clade_drift(), CladeDrift::Drift(0));
    }
}
