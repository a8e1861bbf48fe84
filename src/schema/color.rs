//! Segment color categories.
//!
//! Every category has exactly one name and exactly one packed `0xRRGGBB`
//! value, so the name/color mapping is a bijection. The table is versioned
//! with the crate: persistence layers may store either the name or the packed
//! value and decode it back with [`Color::from_name`] / [`Color::from_rgb`].

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! color_table {
    ($($variant:ident => ($name:literal, $rgb:literal)),+ $(,)?) => {
        /// Color (material) category of a body segment.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Color {
            $($variant,)+
        }

        impl Color {
            /// All categories in table order.
            pub const ALL: &'static [Color] = &[$(Color::$variant,)+];

            /// Canonical lowercase name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Color::$variant => $name,)+
                }
            }

            /// Canonical packed `0xRRGGBB` value.
            pub const fn rgb(self) -> u32 {
                match self {
                    $(Color::$variant => $rgb,)+
                }
            }
        }
    };
}

color_table! {
    Green => ("green", 0x00C800),
    Blue => ("blue", 0x0000FF),
    Red => ("red", 0xFF0000),
    Cyan => ("cyan", 0x00FFFF),
    White => ("white", 0xFFFFFF),
    Gray => ("gray", 0x808080),
    Yellow => ("yellow", 0xFFFF00),
    Magenta => ("magenta", 0xFF00FF),
    Pink => ("pink", 0xFF69B4),
    Orange => ("orange", 0xFF8C00),
    Violet => ("violet", 0x9400D3),
    Brown => ("brown", 0x8B4513),
    Teal => ("teal", 0x008080),
    Navy => ("navy", 0x000080),
    Maroon => ("maroon", 0x800000),
    Olive => ("olive", 0x808000),
    Lime => ("lime", 0x32CD32),
    Silver => ("silver", 0xC0C0C0),
    Gold => ("gold", 0xFFD700),
    Indigo => ("indigo", 0x4B0082),
    Coral => ("coral", 0xFF7F50),
    Salmon => ("salmon", 0xFA8072),
    Turquoise => ("turquoise", 0x40E0D0),
    Khaki => ("khaki", 0xF0E68C),
    Plum => ("plum", 0xDDA0DD),
    Orchid => ("orchid", 0xDA70D6),
    Tan => ("tan", 0xD2B48C),
    Chocolate => ("chocolate", 0xD2691E),
    Crimson => ("crimson", 0xDC143C),
    SkyBlue => ("sky-blue", 0x87CEEB),
    SteelBlue => ("steel-blue", 0x4682B4),
    SeaGreen => ("sea-green", 0x2E8B57),
    ForestGreen => ("forest-green", 0x228B22),
    Chartreuse => ("chartreuse", 0x7FFF00),
    Lavender => ("lavender", 0xE6E6FA),
    Beige => ("beige", 0xF5F5DC),
    Ivory => ("ivory", 0xFFFFF0),
    Slate => ("slate", 0x708090),
    Charcoal => ("charcoal", 0x36454F),
    Rust => ("rust", 0xB7410E),
    Amber => ("amber", 0xFFBF00),
    Mint => ("mint", 0x98FF98),
    Peach => ("peach", 0xFFDAB9),
    Periwinkle => ("periwinkle", 0xCCCCFF),
    Sienna => ("sienna", 0xA0522D),
    Ochre => ("ochre", 0xCC7722),
}

impl Color {
    /// Number of categories.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this category in [`Color::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category at `index` in table order.
    pub fn from_index(index: usize) -> Option<Color> {
        Self::ALL.get(index).copied()
    }

    /// Decode a packed `0xRRGGBB` value.
    pub fn from_rgb(rgb: u32) -> Option<Color> {
        Self::ALL.iter().copied().find(|c| c.rgb() == rgb)
    }

    /// Decode a canonical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Color> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Red, green and blue channels.
    pub fn channels(self) -> [u8; 3] {
        let rgb = self.rgb();
        [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_table_size() {
        assert_eq!(Color::COUNT, 46);
    }

    #[test]
    fn test_rgb_bijection() {
        let mut seen = HashSet::new();
        for &color in Color::ALL {
            assert!(seen.insert(color.rgb()), "{color} shares its rgb value");
            assert_eq!(Color::from_rgb(color.rgb()), Some(color));
        }
    }

    #[test]
    fn test_name_bijection() {
        let mut seen = HashSet::new();
        for &color in Color::ALL {
            assert!(seen.insert(color.name()));
            assert_eq!(Color::from_name(color.name()), Some(color));
        }
        assert_eq!(Color::from_name("SKY-BLUE"), Some(Color::SkyBlue));
        assert_eq!(Color::from_name("mauve"), None);
    }

    #[test]
    fn test_index_order() {
        for (i, &color) in Color::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
            assert_eq!(Color::from_index(i), Some(color));
        }
        assert_eq!(Color::from_index(Color::COUNT), None);
    }

    #[test]
    fn test_channels() {
        assert_eq!(Color::Orange.channels(), [0xFF, 0x8C, 0x00]);
        assert_eq!(Color::from_rgb(0x123456), None);
    }
}
