//! Styling for the panel UI
//!
//! - [`colors`] - RGB565 color constants and the [`ColorPalette`]
//! - [`layout`] - padding
//! - [`style`] - per-element [`Style`] and [`ButtonVariant`]
//! - [`theme`] - palette and corner radius bundled together

pub mod colors;
pub mod layout;
pub mod style;
pub mod theme;

pub use colors::{
    COLOR_ARMED, COLOR_BACKGROUND, COLOR_IDLE, COLOR_PROMPT, COLOR_STROKE, COLOR_SURFACE,
    COLOR_WARNING, ColorPalette, LIGHT_GRAY, WHITE,
};
pub use layout::Padding;
pub use style::{ButtonVariant, Style};
pub use theme::Theme;
