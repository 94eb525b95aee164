//! Style configuration errors.
//!
//! Rendering itself never fails; these only surface while building a
//! [`RenderStyle`](crate::RenderStyle) from user configuration.

use thiserror::Error;

/// Invalid render style configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// A palette was configured with no colors
    #[error("palette must contain at least one color")]
    EmptyPalette,

    /// A color spec is neither a 256-color index nor a hex triple
    #[error("invalid color {0:?}: expected 0-255 or #rrggbb")]
    InvalidColor(String),
}
