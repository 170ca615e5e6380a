// Theme module - Color constants and theme re-exports
//
// This module provides the palette of the terminal front end. Route and
// marker colors come from the engine as CSS-style strings and are converted
// with `parse_color`; everything around the map uses the constants below.

pub mod default;

use ratatui::style::Color;

/// Primary accent - borders, titles, default route color
/// RGB: (255, 90, 54)
pub const SIGNAL_ORANGE: Color = Color::Rgb(255, 90, 54);

/// Secondary accent - pinned tooltip pulse target
/// RGB: (255, 158, 100)
pub const AMBER: Color = Color::Rgb(255, 158, 100);

/// Map backdrop lines (graticule)
/// RGB: (59, 66, 97)
pub const DEEP_SEA: Color = Color::Rgb(59, 66, 97);

/// Active/enabled indicator
/// RGB: (158, 206, 106)
pub const SEA_GREEN: Color = Color::Rgb(158, 206, 106);

/// Neutral text
/// RGB: (169, 177, 214)
pub const CHALK: Color = Color::Rgb(169, 177, 214);

/// Travelling markers and highlighted routes
pub const TRAIL_WHITE: Color = Color::Rgb(255, 255, 255);

pub use default::*;
