//! Color constants and palette
//!
//! All colors are RGB565. Constants are written as 8-bit RGB shifted down
//! (R>>3, G>>2, B>>3) so they can be checked against a color picker.

use embedded_graphics::pixelcolor::Rgb565;

/// Window background - near black with a blue tint
pub const COLOR_BACKGROUND: Rgb565 = Rgb565::new(16 >> 3, 20 >> 2, 26 >> 3);

/// Panels, slider track and disabled controls
pub const COLOR_SURFACE: Rgb565 = Rgb565::new(34 >> 3, 40 >> 2, 50 >> 3);

/// Outlines and separators
pub const COLOR_STROKE: Rgb565 = Rgb565::new(70 >> 3, 80 >> 2, 96 >> 3);

/// Pulses off / ESC idle - calm teal
pub const COLOR_IDLE: Rgb565 = Rgb565::new(80 >> 3, 170 >> 2, 150 >> 3);

/// Pulses running - amber, the motor may spin
pub const COLOR_ARMED: Rgb565 = Rgb565::new(230 >> 3, 160 >> 2, 40 >> 3);

/// Stop button and link errors
pub const COLOR_WARNING: Rgb565 = Rgb565::new(205 >> 3, 70 >> 2, 70 >> 3);

/// Pending operator prompt
pub const COLOR_PROMPT: Rgb565 = Rgb565::new(90 >> 3, 140 >> 2, 220 >> 3);

pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

/// Secondary text
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(21, 42, 21);

/// Colors used across the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    /// Main interactive color (Calibrate, slider thumb at idle)
    pub primary: Rgb565,
    /// Highlight while pulses are being generated
    pub armed: Rgb565,
    /// Destructive or failure color (Stop, errors)
    pub warning: Rgb565,
    /// Pending prompt (Continue button, prompt text)
    pub prompt: Rgb565,
    pub background: Rgb565,
    pub surface: Rgb565,
    pub text_primary: Rgb565,
    pub text_secondary: Rgb565,
    pub border: Rgb565,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: COLOR_IDLE,
            armed: COLOR_ARMED,
            warning: COLOR_WARNING,
            prompt: COLOR_PROMPT,
            background: COLOR_BACKGROUND,
            surface: COLOR_SURFACE,
            text_primary: WHITE,
            text_secondary: LIGHT_GRAY,
            border: COLOR_STROKE,
        }
    }
}
