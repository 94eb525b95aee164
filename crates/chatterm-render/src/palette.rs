//! Identity color palettes.
//!
//! An identity (sender name, room name) maps to a palette slot by the byte
//! length of the identity modulo the palette size. Identities of equal length
//! share a color; the mapping is stable across runs and needs no state.

use crossterm::style::Color;

use crate::error::StyleError;

/// 256-color indices used for both text and highlight palettes by default.
pub const DEFAULT_PALETTE: [u8; 12] = [2, 5, 6, 40, 87, 130, 148, 158, 169, 171, 214, 220];

/// Non-empty list of colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Palette from `colors`.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::EmptyPalette` if `colors` is empty.
    pub fn new(colors: Vec<Color>) -> Result<Self, StyleError> {
        if colors.is_empty() {
            return Err(StyleError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Parse a palette from color specs (`"214"` or `"#ffaa00"`).
    ///
    /// # Errors
    ///
    /// - `StyleError::InvalidColor` if any spec does not parse
    /// - `StyleError::EmptyPalette` if `specs` is empty
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, StyleError> {
        specs.iter().map(|s| parse_color(s.as_ref())).collect::<Result<Vec<_>, _>>().and_then(Self::new)
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; palettes are never empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Slot assigned to `identity`.
    pub fn index_for(&self, identity: &str) -> usize {
        identity.len() % self.colors.len()
    }

    /// Color assigned to `identity`.
    pub fn color_for(&self, identity: &str) -> Color {
        self.colors[self.index_for(identity)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self { colors: DEFAULT_PALETTE.iter().copied().map(Color::AnsiValue).collect() }
    }
}

/// Parse a color spec: a 256-color index (`"186"`) or a hex RGB triple
/// (`"#d7d787"` or `"d7d787"`).
///
/// # Errors
///
/// Returns `StyleError::InvalidColor` if the spec is neither.
pub fn parse_color(spec: &str) -> Result<Color, StyleError> {
    let spec = spec.trim();
    if let Ok(index) = spec.parse::<u8>() {
        return Ok(Color::AnsiValue(index));
    }

    let hex = spec.strip_prefix('#').unwrap_or(spec);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(StyleError::InvalidColor(spec.to_owned()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| StyleError::InvalidColor(spec.to_owned()))
    };
    Ok(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}
