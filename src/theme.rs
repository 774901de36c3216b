//! Nord-based color palette for the panel.
//!
//! Raw Nord shades first, then the semantic names the widgets use.

use ratatui::style::Color;

// === Nord Polar Night ===

pub const NORD_POLAR_NIGHT_3: Color = Color::Rgb(67, 76, 94);
pub const NORD_POLAR_NIGHT_4: Color = Color::Rgb(76, 86, 106);

// === Nord Snow Storm ===

pub const NORD_SNOW_STORM_1: Color = Color::Rgb(216, 222, 233);

// === Nord Frost ===

/// Cyan, the primary accent.
pub const NORD_FROST_2: Color = Color::Rgb(136, 192, 208);

// === Nord Aurora ===

/// Errors.
pub const NORD_RED: Color = Color::Rgb(191, 97, 106);
/// Warnings and the lock sweep in progress.
pub const NORD_YELLOW: Color = Color::Rgb(235, 203, 139);
/// A tunnel is up.
pub const NORD_GREEN: Color = Color::Rgb(163, 190, 140);

// === Semantic Color Aliases ===

pub const TEXT_PRIMARY: Color = NORD_SNOW_STORM_1;
pub const TEXT_SECONDARY: Color = NORD_POLAR_NIGHT_4;
pub const ACCENT_PRIMARY: Color = NORD_FROST_2;
pub const SUCCESS: Color = NORD_GREEN;
pub const WARNING: Color = NORD_YELLOW;
pub const ERROR: Color = NORD_RED;
pub const INACTIVE: Color = Color::Gray;

// === UI Element Colors ===

pub const BORDER_DEFAULT: Color = NORD_POLAR_NIGHT_3;
pub const BORDER_FOCUSED: Color = NORD_FROST_2;
pub const ROW_SELECTED_BG: Color = Color::Rgb(40, 40, 40);
pub const ROW_SELECTED_FG: Color = NORD_FROST_2;
/// Separator between footer hints.
pub const HINT_SEPARATOR: Color = Color::Rgb(50, 50, 50);
