//! Panel UI built on embedded-graphics
//!
//! - Core traits for drawable and touchable elements
//! - Styled components (buttons, text, vertical slider)
//! - Dirty tracking so the frame loop only redraws on change
//! - Events pushed into pages from the daemon link and calibration worker

pub mod components;
pub mod core;
pub mod styling;

pub use components::{Button, MultiLineText, TextComponent, TextSize, VerticalSlider};
pub use core::{
    Action, Drawable, KeyInput, PageEvent, PageId, TouchEvent, TouchPoint, TouchResult, Touchable,
};
pub use styling::{ButtonVariant, ColorPalette, Padding, Style, Theme};

/// Logical display width. The window scales this 2x to the 800 px wide panel.
pub const DISPLAY_WIDTH_PX: u16 = 400;

/// Logical display height. The window scales this 2x to the 600 px tall panel.
pub const DISPLAY_HEIGHT_PX: u16 = 300;

/// Glyph height of the large font
pub const FONT_10X20_CHAR_HEIGHT_PX: u32 = 20;
