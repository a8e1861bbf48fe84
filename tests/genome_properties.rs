//! Property tests for genesis and derivation invariants.

use proptest::prelude::*;

use biota::{
    StructuralChange,
    evolution::{
        GenomeRng,
        topology::{ClonePlacement, InsertPosition, is_well_formed, relink_clone},
    },
    schema::{Branch, CladeDrift, CladeId, Color, Genome, GenomeConfig, HOME_MAX, Locus},
};

fn config(min_rate: u32, max_rate: u32, max_loci: usize) -> GenomeConfig {
    GenomeConfig {
        mutation_rate_bounds: (min_rate, max_rate),
        clone_rate_bounds: (0, 100),
        max_loci,
        initial_complexity: 6,
    }
}

/// Mutation switched off so only the forced insertion changes anything.
fn insertion_config(clone_rate: u32) -> GenomeConfig {
    GenomeConfig {
        mutation_rate_bounds: (0, 0),
        clone_rate_bounds: (clone_rate, clone_rate),
        max_loci: 100,
        initial_complexity: 6,
    }
}

/// Child loci with the one at `index` removed.
fn without(loci: &[Locus], index: usize) -> Vec<Locus> {
    loci.iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, l)| *l)
        .collect()
}

fn assert_child_invariants(parent: &Genome, child: &Genome, config: &GenomeConfig) {
    assert!(is_well_formed(child.loci()));
    assert!(child.validate_against(config).is_ok());
    assert_eq!(child.generation(), parent.generation() + 1);
    assert_eq!(child.clade_id(), parent.clade_id());
    assert!(child.locus_count().abs_diff(parent.locus_count()) <= 1);
    for home in [child.home_x(), child.home_y()].into_iter().flatten() {
        assert!((0.0..=HOME_MAX).contains(&home));
    }
}

proptest! {
    #[test]
    fn genesis_is_well_formed(seed in any::<u64>(), max_loci in 1usize..40) {
        let config = config(0, 100, max_loci);
        let mut rng = GenomeRng::new(seed, config.clone());
        let genome = rng.random_genome(CladeId::new("p"));

        prop_assert!(is_well_formed(genome.loci()));
        prop_assert!(genome.validate_against(&config).is_ok());
        prop_assert_eq!(genome.generation(), 0);
        prop_assert_eq!(genome.clade_drift(), CladeDrift::Drift(0));
    }

    #[test]
    fn derivation_chain_keeps_invariants(
        seed in any::<u64>(),
        min_rate in 0u32..3000,
        span in 0u32..3000,
        max_loci in 1usize..16,
    ) {
        let config = config(min_rate, min_rate + span, max_loci);
        let mut rng = GenomeRng::new(seed, config.clone());
        let mut genome = rng.random_genome(CladeId::new("p"));

        for _ in 0..40 {
            let child = rng.derive_child(&genome);
            assert_child_invariants(&genome, &child, &config);
            genome = child;
        }
    }

    #[test]
    fn zero_rate_children_only_age(seed in any::<u64>(), genesis_seed in any::<u64>()) {
        let config = config(0, 0, 100);
        let parent = GenomeRng::new(genesis_seed, config.clone()).random_genome(CladeId::new("z"));
        let child = GenomeRng::new(seed, config).derive_child(&parent);

        let mut expected = parent.into_parts();
        expected.generation += 1;
        prop_assert_eq!(child.into_parts(), expected);
    }

    #[test]
    fn forced_structural_changes_stay_legal(
        seed in any::<u64>(),
        position in any::<prop::sample::Index>(),
        insert in any::<bool>(),
    ) {
        let config = config(0, 4000, 30);
        let mut rng = GenomeRng::new(seed, config.clone());
        let parent = rng.random_genome(CladeId::new("f"));

        let change = if insert {
            StructuralChange::Insert { index: position.index(parent.locus_count() + 1) }
        } else {
            StructuralChange::Delete { index: position.index(parent.locus_count()) }
        };
        let child = rng.derive_child_with(&parent, change);

        assert_child_invariants(&parent, &child, &config);
        if insert {
            prop_assert_eq!(child.locus_count(), parent.locus_count() + 1);
        } else if parent.locus_count() > 1 {
            prop_assert_eq!(child.locus_count(), parent.locus_count() - 1);
        }
    }

    #[test]
    fn insertion_clones_a_neighbor(seed in any::<u64>(), position in any::<prop::sample::Index>()) {
        let mut rng = GenomeRng::new(seed, insertion_config(100));
        let parent = rng.random_genome(CladeId::new("c"));
        let loci = parent.loci();
        let len = loci.len();
        let index = position.index(len + 1);

        let child = rng.derive_child_with(&parent, StructuralChange::Insert { index });
        prop_assert_eq!(child.locus_count(), len + 1);
        prop_assert!(is_well_formed(child.loci()));

        let inserted = child.loci()[index];
        if index == 0 {
            // Takes the first locus's place, re-rooted if it pointed anywhere
            prop_assert_eq!(inserted, loci[0].with_branch(loci[0].branch.clamped_to(0)));
        } else if index == len {
            prop_assert_eq!(inserted, loci[len - 1].with_branch(Branch::Previous));
        } else {
            let before = loci[index];
            let after = loci[index - 1].with_branch(Branch::numbered(index));
            prop_assert!(inserted == before || inserted == after, "{:?}", inserted);
        }

        // Everything else is carried over untouched
        prop_assert_eq!(without(child.loci(), index), loci.to_vec());
        prop_assert_eq!(child.clade_drift(), CladeDrift::Drift(1));
    }

    #[test]
    fn insertion_without_cloning_draws_fresh(
        seed in any::<u64>(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut rng = GenomeRng::new(seed, insertion_config(0));
        let parent = rng.random_genome(CladeId::new("c"));
        let loci = parent.loci();
        let index = position.index(loci.len() + 1);

        let child = rng.derive_child_with(&parent, StructuralChange::Insert { index });
        prop_assert!(is_well_formed(child.loci()));

        let inserted = child.loci()[index];
        prop_assert!(inserted.branch.is_legal_at(index));
        prop_assert!(loci.iter().all(|l| l.with_branch(inserted.branch) != inserted));
        prop_assert_eq!(without(child.loci(), index), loci.to_vec());
    }

    #[test]
    fn cloned_branches_never_point_forward(
        raw in -1i32..64,
        index in 0usize..64,
        extra in 1usize..64,
        before in any::<bool>(),
    ) {
        let template = Branch::from_raw(raw).unwrap();
        let new_len = index + extra;
        let placement = if before { ClonePlacement::Before } else { ClonePlacement::After };
        let position = InsertPosition::of(index, new_len);

        let branch = relink_clone(template, placement, position, index);
        prop_assert!(branch.is_legal_at(index));
    }

    #[test]
    fn color_codes_roundtrip(index in 0usize..Color::COUNT) {
        let color = Color::from_index(index).unwrap();
        prop_assert_eq!(Color::from_rgb(color.rgb()), Some(color));
        prop_assert_eq!(Color::from_name(color.name()), Some(color));
    }
}
