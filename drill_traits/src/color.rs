//! Indicator colors as unions of the red/green/blue primaries.

use std::fmt;

/// One of the eight colors a tri-color LED can show.
///
/// The discriminant is the bit set of lit primaries: red = 1, green = 2,
/// blue = 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum IndicatorColor {
    #[default]
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl IndicatorColor {
    pub const PRIMARIES: [IndicatorColor; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Build a color from its primary bit set; bits above blue are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            _ => Self::White,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn union(self, other: IndicatorColor) -> Self {
        Self::from_bits(self.bits() | other.bits())
    }

    #[inline]
    pub const fn red(self) -> bool {
        self.bits() & Self::Red.bits() != 0
    }

    #[inline]
    pub const fn green(self) -> bool {
        self.bits() & Self::Green.bits() != 0
    }

    #[inline]
    pub const fn blue(self) -> bool {
        self.bits() & Self::Blue.bits() != 0
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }
}

impl fmt::Display for IndicatorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::ops::BitOr for IndicatorColor {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
