//! Reaction categories and per-segment reaction tables.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::Color;

/// Highest response level a reaction scalar can hold.
pub const MAX_RESPONSE: u8 = 5;

macro_rules! reaction_table {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Interaction category a segment can react to.
        ///
        /// The first twenty categories are "touching a segment of this color";
        /// the rest are situational.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Reaction {
            $($variant,)+
        }

        impl Reaction {
            /// All categories in table order.
            pub const ALL: &'static [Reaction] = &[$(Reaction::$variant,)+];

            /// Stable identifier used by persistence layers.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Reaction::$variant => $name,)+
                }
            }
        }
    };
}

reaction_table! {
    TouchGreen => "touch-green",
    TouchBlue => "touch-blue",
    TouchRed => "touch-red",
    TouchCyan => "touch-cyan",
    TouchWhite => "touch-white",
    TouchGray => "touch-gray",
    TouchYellow => "touch-yellow",
    TouchMagenta => "touch-magenta",
    TouchPink => "touch-pink",
    TouchOrange => "touch-orange",
    TouchViolet => "touch-violet",
    TouchBrown => "touch-brown",
    TouchTeal => "touch-teal",
    TouchNavy => "touch-navy",
    TouchMaroon => "touch-maroon",
    TouchOlive => "touch-olive",
    TouchLime => "touch-lime",
    TouchSilver => "touch-silver",
    TouchGold => "touch-gold",
    TouchIndigo => "touch-indigo",
    Infected => "infected",
    Consumer => "consumer",
    Plant => "plant",
    Kin => "kin",
    Stranger => "stranger",
    Attacked => "attacked",
    Wall => "wall",
    Carrion => "carrion",
    Parasite => "parasite",
    Larger => "larger",
    Smaller => "smaller",
    Starving => "starving",
    Crowded => "crowded",
    Injured => "injured",
    Mate => "mate",
    AtHome => "at-home",
}

/// Number of reaction categories.
pub const REACTION_COUNT: usize = Reaction::ALL.len();

/// Number of colors that carry a dedicated touch reaction.
const TOUCH_COLORS: usize = 20;

impl Reaction {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Reaction> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Reaction> {
        Self::ALL.iter().copied().find(|r| r.name() == name)
    }

    /// Touch reaction for a segment of `color`, if that color has one.
    ///
    /// Touch categories follow the first entries of the color table.
    pub fn touching(color: Color) -> Option<Reaction> {
        if color.index() < TOUCH_COLORS {
            Self::from_index(color.index())
        } else {
            None
        }
    }
}

/// Fixed-size table of response levels, one per [`Reaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct Reactions([u8; REACTION_COUNT]);

/// A serialized reaction table had the wrong number of entries.
#[derive(Debug, thiserror::Error)]
#[error("reaction table needs {expected} entries, got {found}")]
pub struct ReactionTableError {
    pub expected: usize,
    pub found: usize,
}

impl From<Reactions> for Vec<u8> {
    fn from(table: Reactions) -> Self {
        table.0.to_vec()
    }
}

impl TryFrom<Vec<u8>> for Reactions {
    type Error = ReactionTableError;

    fn try_from(levels: Vec<u8>) -> Result<Self, Self::Error> {
        let found = levels.len();
        levels
            .try_into()
            .map(Reactions)
            .map_err(|_| ReactionTableError {
                expected: REACTION_COUNT,
                found,
            })
    }
}

impl Default for Reactions {
    fn default() -> Self {
        Self([0; REACTION_COUNT])
    }
}

impl Reactions {
    /// Response level for `reaction`.
    #[inline]
    pub fn get(&self, reaction: Reaction) -> u8 {
        self.0[reaction.index()]
    }

    /// Raw levels in table order.
    pub fn levels(&self) -> &[u8; REACTION_COUNT] {
        &self.0
    }

    /// Iterate `(category, level)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Reaction, u8)> + '_ {
        Reaction::ALL.iter().map(|&r| (r, self.0[r.index()]))
    }

    /// First category whose level is above [`MAX_RESPONSE`].
    pub fn first_out_of_range(&self) -> Option<Reaction> {
        self.iter()
            .find(|&(_, level)| level > MAX_RESPONSE)
            .map(|(r, _)| r)
    }
}

impl Index<Reaction> for Reactions {
    type Output = u8;

    fn index(&self, reaction: Reaction) -> &u8 {
        &self.0[reaction.index()]
    }
}

impl IndexMut<Reaction> for Reactions {
    fn index_mut(&mut self, reaction: Reaction) -> &mut u8 {
        &mut self.0[reaction.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_count() {
        assert_eq!(REACTION_COUNT, 36);
    }

    #[test]
    fn test_touch_mapping_follows_color_table() {
        assert_eq!(Reaction::touching(Color::Green), Some(Reaction::TouchGreen));
        assert_eq!(Reaction::touching(Color::Indigo), Some(Reaction::TouchIndigo));
        assert_eq!(Reaction::touching(Color::Coral), None);

        for &color in &Color::ALL[..TOUCH_COLORS] {
            let reaction = Reaction::touching(color).unwrap();
            assert_eq!(reaction.name(), format!("touch-{}", color.name()));
        }
    }

    #[test]
    fn test_names_roundtrip() {
        for &reaction in Reaction::ALL {
            assert_eq!(Reaction::from_name(reaction.name()), Some(reaction));
        }
    }

    #[test]
    fn test_index_and_range() {
        let mut table = Reactions::default();
        table[Reaction::Kin] = 3;
        assert_eq!(table.get(Reaction::Kin), 3);
        assert_eq!(table.first_out_of_range(), None);

        table[Reaction::Wall] = MAX_RESPONSE + 1;
        assert_eq!(table.first_out_of_range(), Some(Reaction::Wall));
    }

    #[test]
    fn test_serialization_length_checked() {
        let json = serde_json::to_string(&Reactions::default()).unwrap();
        let parsed: Reactions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Reactions::default());

        assert!(serde_json::from_str::<Reactions>("[1, 2, 3]").is_err());
    }
}
