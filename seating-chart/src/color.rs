//! Hex RGB colors, the group palette and the stroke darkening rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ChartError;

/// 24-bit RGB color, written and parsed as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    /// Fill of a seat that belongs to no group.
    pub const NEUTRAL_GRAY: Color = Color::new(0xcc, 0xcc, 0xcc);
    /// Outline of a hidden seat.
    pub const LIGHT_GRAY: Color = Color::new(0xcc, 0xcc, 0xcc);
    /// Secondary legend text.
    pub const MUTED_GRAY: Color = Color::new(0x66, 0x66, 0x66);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the `#rgb` shorthand.
    pub fn parse(s: &str) -> Result<Self, ChartError> {
        let hex = s.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(ChartError::InvalidColor(s.to_string())),
        };
        let num = u32::from_str_radix(&expanded, 16)
            .map_err(|_| ChartError::InvalidColor(s.to_string()))?;
        Ok(Self::new((num >> 16) as u8, (num >> 8 & 0xff) as u8, (num & 0xff) as u8))
    }

    /// Lower every channel by `round(amount * 100 * 2.55)`, clamped to `[0, 255]`.
    ///
    /// Not idempotent: darkening an already darkened color darkens it further.
    pub fn darken(self, amount: f64) -> Self {
        let amt = (amount * 100.0 * 2.55).round() as i32;
        let channel = |c: u8| (c as i32 - amt).clamp(0, 255) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Channels scaled to `0.0..=1.0`, the form the PDF writer wants.
    pub fn to_unit_rgb(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Default darkening applied to a group color to get its seat outline.
pub const DEFAULT_DARKEN: f64 = 0.3;

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Fixed palette new groups draw their suggested color from.
pub const PALETTE: [Color; 10] = [
    Color::new(0xe7, 0x4c, 0x3c),
    Color::new(0x34, 0x98, 0xdb),
    Color::new(0x2e, 0xcc, 0x71),
    Color::new(0xf3, 0x9c, 0x12),
    Color::new(0x9b, 0x59, 0xb6),
    Color::new(0x1a, 0xbc, 0x9c),
    Color::new(0xe6, 0x7e, 0x22),
    Color::new(0x34, 0x49, 0x5e),
    Color::new(0xf1, 0xc4, 0x0f),
    Color::new(0xe9, 0x1e, 0x63),
];

/// Pick a palette color not in `used`, falling back to the whole palette
/// once every entry is taken.
///
/// `pick(n)` must return an index below `n`; it is the only source of
/// randomness so callers can make the choice deterministic.
pub fn suggest_color_with(used: &[Color], pick: impl FnOnce(usize) -> usize) -> Color {
    let available: Vec<Color> = PALETTE
        .iter()
        .copied()
        .filter(|c| !used.contains(c))
        .collect();
    if available.is_empty() {
        PALETTE[pick(PALETTE.len()) % PALETTE.len()]
    } else {
        available[pick(available.len()) % available.len()]
    }
}

/// [`suggest_color_with`] using a uniformly random index.
pub fn suggest_color(used: &[Color]) -> Color {
    suggest_color_with(used, random_index)
}

fn random_index(n: usize) -> usize {
    (uuid::Uuid::new_v4().as_u128() % n as u128) as usize
}
