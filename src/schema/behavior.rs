//! Genome-wide behavioral traits.
//!
//! Traits are stored as a typed record. Genesis and mutation never touch the
//! fields directly: they walk [`BEHAVIOR_GENES`], a fixed table of
//! `(name, levels, get, set)` entries, so every trait is drawn and mutated the
//! same way.

use serde::{Deserialize, Serialize};

/// Heritable behavioral toggles and small-integer selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    /// Infection strain carried (0 = none).
    pub plague_variant: u8,
    /// Offspring are pushed away from the parent at birth.
    pub disperses_children: bool,
    /// Attacks organisms of its own clade.
    pub attacks_kin: bool,
    /// Shares energy with touching kin.
    pub altruistic: bool,
    /// Drifts toward nearby kin.
    pub social: bool,
    /// Never initiates an attack.
    pub passive: bool,
    /// Rotates clockwise when turning.
    pub clockwise: bool,
    pub turns_on_contact: bool,
    pub hides_when_attacked: bool,
    /// Moves toward its home coordinates when it has them.
    pub returns_home: bool,
    pub avoids_walls: bool,
    pub follows_kin: bool,
    pub flees_larger: bool,
    pub eats_carrion: bool,
    pub parasitic: bool,
    pub broadcasts_alarm: bool,
    pub dormant_when_starving: bool,
    /// Breaks apart into spores on death.
    pub fragments_on_death: bool,
    /// Specialization of green segments (0 = none).
    pub modifies_green: u8,
    pub modifies_red: u8,
    pub modifies_blue: u8,
    pub modifies_cyan: u8,
    pub modifies_white: u8,
    pub modifies_turning: u8,
    /// Share of energy handed to each child, in quarters (0 = one quarter).
    pub child_energy_split: u8,
}

/// One entry of the behavior gene table.
#[derive(Clone, Copy)]
pub struct BehaviorGene {
    /// Stable identifier used by persistence layers.
    pub name: &'static str,
    /// Number of distinct values; the trait lives in `0..levels`.
    pub levels: u8,
    pub get: fn(&Behavior) -> u8,
    pub set: fn(&mut Behavior, u8),
}

impl std::fmt::Debug for BehaviorGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorGene")
            .field("name", &self.name)
            .field("levels", &self.levels)
            .finish()
    }
}

macro_rules! behavior_genes {
    ($($field:ident: $kind:ident $(($levels:literal))?),+ $(,)?) => {
        /// Every behavioral trait, in a fixed order.
        pub const BEHAVIOR_GENES: &[BehaviorGene] = &[
            $(behavior_genes!(@gene $field, $kind $(($levels))?),)+
        ];
    };
    (@gene $field:ident, flag) => {
        BehaviorGene {
            name: stringify!($field),
            levels: 2,
            get: |b| b.$field as u8,
            set: |b, v| b.$field = v != 0,
        }
    };
    (@gene $field:ident, level($levels:literal)) => {
        BehaviorGene {
            name: stringify!($field),
            levels: $levels,
            get: |b| b.$field,
            set: |b, v| b.$field = v,
        }
    };
}

behavior_genes! {
    plague_variant: level(4),
    disperses_children: flag,
    attacks_kin: flag,
    altruistic: flag,
    social: flag,
    passive: flag,
    clockwise: flag,
    turns_on_contact: flag,
    hides_when_attacked: flag,
    returns_home: flag,
    avoids_walls: flag,
    follows_kin: flag,
    flees_larger: flag,
    eats_carrion: flag,
    parasitic: flag,
    broadcasts_alarm: flag,
    dormant_when_starving: flag,
    fragments_on_death: flag,
    modifies_green: level(3),
    modifies_red: level(3),
    modifies_blue: level(3),
    modifies_cyan: level(3),
    modifies_white: level(3),
    modifies_turning: level(3),
    child_energy_split: level(4),
}

impl Behavior {
    /// Name of the first trait whose value is outside its gene's levels.
    pub fn first_out_of_range(&self) -> Option<&'static str> {
        BEHAVIOR_GENES
            .iter()
            .find(|g| (g.get)(self) >= g.levels)
            .map(|g| g.name)
    }

    /// Number of traits that differ from `other`.
    pub fn differing_traits(&self, other: &Behavior) -> usize {
        BEHAVIOR_GENES
            .iter()
            .filter(|g| (g.get)(self) != (g.get)(other))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_gene_table_covers_record() {
        assert_eq!(BEHAVIOR_GENES.len(), 25);
        let names: HashSet<_> = BEHAVIOR_GENES.iter().map(|g| g.name).collect();
        assert_eq!(names.len(), BEHAVIOR_GENES.len());
    }

    #[test]
    fn test_set_then_get() {
        for gene in BEHAVIOR_GENES {
            let mut behavior = Behavior::default();
            let top = gene.levels - 1;
            (gene.set)(&mut behavior, top);
            assert_eq!((gene.get)(&behavior), top, "{}", gene.name);
            assert_eq!(behavior.differing_traits(&Behavior::default()), 1);
        }
    }

    #[test]
    fn test_out_of_range() {
        let mut behavior = Behavior::default();
        assert_eq!(behavior.first_out_of_range(), None);

        behavior.modifies_red = 3;
        assert_eq!(behavior.first_out_of_range(), Some("modifies_red"));
    }
}
