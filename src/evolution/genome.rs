//! Genome genesis and parent-to-child derivation.
//!
//! Every mutation decision is an independent Bernoulli trial whose
//! probability scales with the child's mutation rate. Two granularities are
//! in play: [`Granularity::Coarse`] (`rate / 1000`) for the meta-mutation of
//! the rates themselves and for home coordinates, [`Granularity::Fine`]
//! (`rate / 10000`) for structural changes, locus fields and behavior traits.

use std::f32::consts::TAU;

use rand::prelude::*;

use crate::schema::{
    BEHAVIOR_GENES, Behavior, Branch, CladeDrift, CladeId, Color, Genome, GenomeConfig,
    GenomeParts, HOME_MAX, Locus, MAX_LENGTH, MAX_RESPONSE, MAX_SYMMETRY, MIN_LENGTH, Reaction,
    Reactions,
};

use super::topology::{ClonePlacement, InsertPosition, relink_clone, repair_topology};

/// Divisor applied to the mutation rate to get a per-decision probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// `rate / 1000`.
    Coarse,
    /// `rate / 10000`.
    Fine,
}

impl Granularity {
    fn divisor(self) -> f64 {
        match self {
            Granularity::Coarse => 1_000.0,
            Granularity::Fine => 10_000.0,
        }
    }

    /// Probability of a mutation event at `rate`, clamped to [0, 1].
    pub fn probability(self, rate: u32) -> f64 {
        (rate as f64 / self.divisor()).min(1.0)
    }
}

/// Chance that a home-coordinate mutation re-draws rather than nudges.
const HOME_JUMP_CHANCE: f64 = 0.1;
/// Chance that a mutation-rate mutation jumps rather than steps.
const RATE_JUMP_CHANCE: f64 = 0.1;

/// At most one structural change happens per derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralChange {
    None,
    /// Resampled symmetry (may equal the parent's).
    Symmetry(u8),
    /// Mirror flag flipped.
    Mirror,
    /// One locus inserted at this position of the child.
    Insert { index: usize },
    /// The parent locus at this position dropped.
    Delete { index: usize },
}

impl StructuralChange {
    /// Downgrade to [`StructuralChange::None`] when not applicable to a
    /// parent with `len` loci.
    fn sanitized(self, len: usize, max_loci: usize) -> Self {
        match self {
            StructuralChange::Symmetry(s) if !(1..=MAX_SYMMETRY).contains(&s) => {
                StructuralChange::None
            }
            StructuralChange::Insert { index } if len >= max_loci || index > len => {
                StructuralChange::None
            }
            StructuralChange::Delete { index } if len <= 1 || index >= len => {
                StructuralChange::None
            }
            other => other,
        }
    }
}

/// One mutable field of a locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocusGene {
    Length,
    Theta,
    Branch,
    Color,
    Reaction(Reaction),
}

impl LocusGene {
    /// Every locus field, in the order mutation visits them.
    pub fn all() -> impl Iterator<Item = LocusGene> {
        [
            LocusGene::Length,
            LocusGene::Theta,
            LocusGene::Branch,
            LocusGene::Color,
        ]
        .into_iter()
        .chain(Reaction::ALL.iter().map(|&r| LocusGene::Reaction(r)))
    }
}

/// Random number generator wrapper for genome operations.
pub struct GenomeRng<R = StdRng> {
    rng: R,
    config: GenomeConfig,
}

impl GenomeRng<StdRng> {
    /// Create from seed.
    pub fn new(seed: u64, config: GenomeConfig) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), config)
    }

    /// Create with random seed.
    pub fn random(config: GenomeConfig) -> Self {
        Self::from_rng(StdRng::from_entropy(), config)
    }
}

impl<R: Rng> GenomeRng<R> {
    /// Wrap an existing source. `config` must already be validated.
    pub fn from_rng(rng: R, config: GenomeConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "unvalidated genome config");
        Self { rng, config }
    }

    pub fn config(&self) -> &GenomeConfig {
        &self.config
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// Shuffle `items` in place from this source.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Generate a genome with no parent.
    pub fn random_genome(&mut self, clade_id: CladeId) -> Genome {
        let mirror = self.rng.gen_bool(0.5);
        let symmetry = self.rng.gen_range(1..=MAX_SYMMETRY);

        let sym = symmetry as usize;
        let segments = sym * (1 + self.rng.gen_range(0..self.config.initial_complexity));
        let locus_count = segments.div_ceil(sym).min(self.config.max_loci);

        let loci = (0..locus_count).map(|i| self.random_locus(i)).collect();

        let mutation_rate = self.uniform_rate(self.config.mutation_rate_bounds);
        let clone_rate = self.uniform_rate(self.config.clone_rate_bounds);
        let home_x = self.random_home();
        let home_y = self.random_home();
        let behavior = self.random_behavior();

        Genome::from_parts_unchecked(GenomeParts {
            loci,
            symmetry,
            mirror,
            mutation_rate,
            clone_rate,
            home_x,
            home_y,
            behavior,
            generation: 0,
            clade_id,
            clade_drift: CladeDrift::default(),
        })
    }

    /// Generate a locus that is legal at position `index`.
    pub fn random_locus(&mut self, index: usize) -> Locus {
        let mut locus = Locus {
            length: MIN_LENGTH,
            theta: 0.0,
            color: Color::Green,
            branch: Branch::Previous,
            reactions: Reactions::default(),
        };
        for gene in LocusGene::all() {
            self.resample(&mut locus, gene, index);
        }
        locus
    }

    /// Derive a child genome from `parent`.
    pub fn derive_child(&mut self, parent: &Genome) -> Genome {
        self.derive(parent, None)
    }

    /// Derive a child with a predetermined structural change.
    ///
    /// Changes that do not fit the parent (deleting its only locus, growing
    /// past the locus cap, out-of-range positions) are ignored.
    pub fn derive_child_with(&mut self, parent: &Genome, change: StructuralChange) -> Genome {
        self.derive(parent, Some(change))
    }

    fn derive(&mut self, parent: &Genome, forced: Option<StructuralChange>) -> Genome {
        // The child's own rate governs every later decision
        let mutation_rate = self.mutate_mutation_rate(parent.mutation_rate());
        let clone_rate = self.mutate_clone_rate(parent.clone_rate(), mutation_rate);
        let home_x = self.mutate_home(parent.home_x(), mutation_rate);
        let home_y = self.mutate_home(parent.home_y(), mutation_rate);

        let len = parent.locus_count();
        let change = match forced {
            Some(change) => change,
            None => self.draw_structural_change(len, mutation_rate),
        }
        .sanitized(len, self.config.max_loci);

        let mut symmetry = parent.symmetry();
        let mut mirror = parent.mirror();
        let mut drift = parent.clade_drift();
        let mut insertion = None;
        let mut deletion = None;
        let mut new_len = len;

        match change {
            StructuralChange::None => {}
            StructuralChange::Symmetry(s) => {
                if s != symmetry {
                    drift = CladeDrift::Reset;
                }
                symmetry = s;
            }
            StructuralChange::Mirror => {
                mirror = !mirror;
                drift = CladeDrift::Reset;
            }
            StructuralChange::Insert { index } => {
                insertion = Some(index);
                new_len = len + 1;
                drift = drift.bump();
            }
            StructuralChange::Delete { index } => {
                deletion = Some(index);
                new_len = len - 1;
                drift = drift.bump();
            }
        }
        if change != StructuralChange::None {
            log::debug!(
                "structural change {:?} in clade {} (generation {})",
                change,
                parent.clade_id(),
                parent.generation() + 1
            );
        }

        let parent_loci = parent.loci();
        let mut loci = Vec::with_capacity(new_len);
        let mut j = 0;
        for i in 0..new_len {
            if insertion == Some(i) {
                loci.push(self.inserted_locus(parent_loci, i, clone_rate));
                continue;
            }
            if deletion == Some(j) {
                j += 1;
            }
            let (locus, color_changed) = self.mutate_locus(&parent_loci[j], i, mutation_rate);
            if color_changed {
                drift = drift.bump();
            }
            loci.push(locus);
            j += 1;
        }
        let loci = repair_topology(loci, deletion.is_some());

        let behavior = self.mutate_behavior(parent.behavior(), mutation_rate);

        log::trace!(
            "derived child of clade {}: rate {} -> {}, loci {} -> {}, drift {:?}",
            parent.clade_id(),
            parent.mutation_rate(),
            mutation_rate,
            len,
            loci.len(),
            drift
        );

        Genome::from_parts_unchecked(GenomeParts {
            loci,
            symmetry,
            mirror,
            mutation_rate,
            clone_rate,
            home_x,
            home_y,
            behavior,
            generation: parent.generation() + 1,
            clade_id: parent.clade_id().clone(),
            clade_drift: drift,
        })
    }

    /// Bernoulli trial gated by `rate` at the given granularity.
    fn chance(&mut self, rate: u32, granularity: Granularity) -> bool {
        self.rng.gen_bool(granularity.probability(rate))
    }

    fn mutate_mutation_rate(&mut self, rate: u32) -> u32 {
        if !self.chance(rate, Granularity::Coarse) {
            return rate;
        }
        let (min, max) = self.config.mutation_rate_bounds;
        let next = if self.rng.gen_bool(RATE_JUMP_CHANCE) {
            if self.rng.gen_bool(0.5) {
                self.rng.gen_range(min.min(rate)..=rate)
            } else {
                self.rng.gen_range(rate..=max.max(rate))
            }
        } else {
            let step = self.rng.gen_range(1..=2);
            self.step(rate, step)
        };
        next.clamp(min, max)
    }

    fn mutate_clone_rate(&mut self, clone_rate: u32, mutation_rate: u32) -> u32 {
        if !self.chance(mutation_rate, Granularity::Coarse) {
            return clone_rate;
        }
        let (min, max) = self.config.clone_rate_bounds;
        self.step(clone_rate, 1).clamp(min, max)
    }

    /// Move `value` up or down by `step`, with even odds.
    fn step(&mut self, value: u32, step: u32) -> u32 {
        if self.rng.gen_bool(0.5) {
            value.saturating_add(step)
        } else {
            value.saturating_sub(step)
        }
    }

    fn mutate_home(&mut self, home: Option<f32>, rate: u32) -> Option<f32> {
        if !self.chance(rate, Granularity::Coarse) {
            return home;
        }
        if self.rng.gen_bool(HOME_JUMP_CHANCE) {
            return self.random_home();
        }
        home.map(|h| self.nudge_home(h))
    }

    /// Move a set home coordinate by less than one unit, staying on the map.
    fn nudge_home(&mut self, home: f32) -> f32 {
        (home + self.rng.gen_range(-1.0..1.0)).clamp(0.0, HOME_MAX)
    }

    /// Symmetry, then mirror, then locus count; the first trial that fires wins.
    fn draw_structural_change(&mut self, len: usize, rate: u32) -> StructuralChange {
        if self.chance(rate, Granularity::Fine) {
            return StructuralChange::Symmetry(self.rng.gen_range(1..=MAX_SYMMETRY));
        }
        if self.chance(rate, Granularity::Fine) {
            return StructuralChange::Mirror;
        }
        if self.chance(rate, Granularity::Fine) {
            if self.rng.gen_bool(0.5) {
                if len < self.config.max_loci {
                    return StructuralChange::Insert {
                        index: self.rng.gen_range(0..=len),
                    };
                }
            } else if len > 1 {
                return StructuralChange::Delete {
                    index: self.rng.gen_range(0..len),
                };
            }
        }
        StructuralChange::None
    }

    /// Locus emitted at an insertion point: a clone of a neighbor with
    /// probability `clone_rate` percent, otherwise a fresh random locus.
    fn inserted_locus(&mut self, parent_loci: &[Locus], index: usize, clone_rate: u32) -> Locus {
        let p = (clone_rate as f64 / 100.0).min(1.0);
        if !self.rng.gen_bool(p) {
            return self.random_locus(index);
        }

        let len = parent_loci.len();
        let position = InsertPosition::of(index, len + 1);
        let placement = match position {
            InsertPosition::Interior => {
                if self.rng.gen_bool(0.5) {
                    ClonePlacement::Before
                } else {
                    ClonePlacement::After
                }
            }
            InsertPosition::Boundary if index == 0 => ClonePlacement::Before,
            InsertPosition::Boundary => ClonePlacement::After,
        };
        let template = match placement {
            ClonePlacement::Before => parent_loci[index],
            ClonePlacement::After => parent_loci[index - 1],
        };
        let branch = relink_clone(template.branch, placement, position, index);
        template.with_branch(branch)
    }

    /// Copy `template` into position `index`, resampling each field with
    /// fine-grained probability. Returns whether the color changed.
    fn mutate_locus(&mut self, template: &Locus, index: usize, rate: u32) -> (Locus, bool) {
        let mut locus = *template;
        for gene in LocusGene::all() {
            if self.chance(rate, Granularity::Fine) {
                self.resample(&mut locus, gene, index);
            }
        }
        (locus, locus.color != template.color)
    }

    /// Draw a fresh value for one field of a locus at `index`.
    fn resample(&mut self, locus: &mut Locus, gene: LocusGene, index: usize) {
        match gene {
            LocusGene::Length => locus.length = self.rng.gen_range(MIN_LENGTH..=MAX_LENGTH),
            LocusGene::Theta => locus.theta = self.rng.gen_range(0.0..TAU),
            LocusGene::Branch => locus.branch = self.random_branch(index),
            LocusGene::Color => locus.color = Color::ALL[self.rng.gen_range(0..Color::COUNT)],
            LocusGene::Reaction(r) => locus.reactions[r] = self.rng.gen_range(0..=MAX_RESPONSE),
        }
    }

    /// Either "previous" or a numeric branch in `0..=index`.
    fn random_branch(&mut self, index: usize) -> Branch {
        if self.rng.gen_bool(0.5) {
            Branch::Previous
        } else {
            Branch::numbered(self.rng.gen_range(0..=index))
        }
    }

    fn random_home(&mut self) -> Option<f32> {
        if self.rng.gen_bool(0.5) {
            None
        } else {
            Some(self.rng.gen_range(0.0..=HOME_MAX))
        }
    }

    fn random_behavior(&mut self) -> Behavior {
        let mut behavior = Behavior::default();
        for gene in BEHAVIOR_GENES {
            (gene.set)(&mut behavior, self.rng.gen_range(0..gene.levels));
        }
        behavior
    }

    fn mutate_behavior(&mut self, parent: &Behavior, rate: u32) -> Behavior {
        let mut behavior = *parent;
        for gene in BEHAVIOR_GENES {
            if self.chance(rate, Granularity::Fine) {
                (gene.set)(&mut behavior, self.rng.gen_range(0..gene.levels));
            }
        }
        behavior
    }

    fn uniform_rate(&mut self, bounds: (u32, u32)) -> u32 {
        self.rng.gen_range(bounds.0..=bounds.1)
    }
}

/// Compute genetic distance between two genomes.
///
/// Each compared feature contributes a value in [0, 1]; the result is their
/// mean.
pub fn genome_distance(g1: &Genome, g2: &Genome) -> f32 {
    let mut distance = 0.0f32;
    let mut count = 0;

    for (l1, l2) in g1.loci().iter().zip(g2.loci()) {
        distance += (l1.length - l2.length).abs() / (MAX_LENGTH - MIN_LENGTH);
        let dtheta = (l1.theta - l2.theta).abs();
        distance += dtheta.min(TAU - dtheta) / std::f32::consts::PI;
        distance += (l1.color != l2.color) as u8 as f32;
        distance += (l1.branch != l2.branch) as u8 as f32;

        let reaction_diff: u32 = l1
            .reactions
            .levels()
            .iter()
            .zip(l2.reactions.levels())
            .map(|(a, b)| a.abs_diff(*b) as u32)
            .sum();
        distance +=
            reaction_diff as f32 / (MAX_RESPONSE as f32 * l1.reactions.levels().len() as f32);
        count += 5;
    }

    // Unmatched loci count as fully different
    let extra = g1.locus_count().abs_diff(g2.locus_count());
    distance += extra as f32;
    count += extra;

    distance += g1.symmetry().abs_diff(g2.symmetry()) as f32 / (MAX_SYMMETRY - 1) as f32;
    distance += (g1.mirror() != g2.mirror()) as u8 as f32;
    distance += g1.behavior().differing_traits(g2.behavior()) as f32 / BEHAVIOR_GENES.len() as f32;
    count += 3;

    distance / count as f32
}
