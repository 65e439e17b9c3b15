use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// An RGB cell color.
///
/// Only identity matters to the game: two cells are "the same color" when their
/// `Color` values are equal. The textual form is `#RRGGBB`.
///
/// ```
/// use floodit_engine::Color;
///
/// let color: Color = "#00BFFF".parse().unwrap();
/// assert_eq!(color, Color::DEEP_SKY_BLUE);
/// assert_eq!(color.to_string(), "#00BFFF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{r:02X}{g:02X}{b:02X}")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Self = Self::rgb(0xFF, 0x00, 0x00);
    pub const YELLOW: Self = Self::rgb(0xFF, 0xFF, 0x00);
    pub const GREEN: Self = Self::rgb(0x00, 0x80, 0x00);
    pub const ORANGE: Self = Self::rgb(0xFF, 0xA5, 0x00);
    pub const MAGENTA: Self = Self::rgb(0xFF, 0x00, 0xFF);
    pub const BLUE: Self = Self::rgb(0x00, 0x00, 0xFF);
    pub const PURPLE: Self = Self::rgb(0x80, 0x00, 0x80);
    pub const DEEP_SKY_BLUE: Self = Self::rgb(0x00, 0xBF, 0xFF);
    pub const CYAN: Self = Self::rgb(0x00, 0xFF, 0xFF);
    pub const GRAY: Self = Self::rgb(0x80, 0x80, 0x80);

    /// The eight colors of the classic game, in palette order.
    pub const DEFAULT_PALETTE: [Self; 8] = [
        Self::RED,
        Self::YELLOW,
        Self::GREEN,
        Self::ORANGE,
        Self::MAGENTA,
        Self::BLUE,
        Self::PURPLE,
        Self::DEEP_SKY_BLUE,
    ];

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid color {input:?}: expected `#RRGGBB`")]
pub struct ParseColorError {
    input: String,
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_owned(),
        };
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColorVisitor;

        impl de::Visitor<'_> for ColorVisitor {
            type Value = Color;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a `#RRGGBB` color string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ColorVisitor)
    }
}
