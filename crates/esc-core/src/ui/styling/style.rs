//! Per-element style and button variants

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder};

use super::colors::{ColorPalette, WHITE};
use super::layout::Padding;

/// Visual style of a single element
///
/// Built with the `with_*` methods:
///
/// ```ignore
/// let style = Style::new()
///     .with_background(palette.surface)
///     .with_border(palette.border, 1)
///     .with_padding(Padding::all(4));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub background_color: Option<Rgb565>,
    pub foreground_color: Option<Rgb565>,
    pub border_color: Option<Rgb565>,
    /// 0 = no border
    pub border_width: u32,
    pub padding: Padding,
}

impl Default for Style {
    /// White text, no background, no border
    fn default() -> Self {
        Self {
            background_color: None,
            foreground_color: Some(WHITE),
            border_color: None,
            border_width: 0,
            padding: Padding::default(),
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Rgb565) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_foreground(mut self, color: Rgb565) -> Self {
        self.foreground_color = Some(color);
        self
    }

    pub fn with_border(mut self, color: Rgb565, width: u32) -> Self {
        self.border_color = Some(color);
        self.border_width = width;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Fill and stroke for embedded-graphics primitives.
    pub fn to_primitive_style(&self) -> PrimitiveStyle<Rgb565> {
        let mut builder = PrimitiveStyleBuilder::new();

        if let Some(bg) = self.background_color {
            builder = builder.fill_color(bg);
        }

        if let Some(border) = self.border_color
            && self.border_width > 0
        {
            builder = builder.stroke_color(border).stroke_width(self.border_width);
        }

        builder.build()
    }
}

/// Button color schemes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonVariant {
    /// Main action (Calibrate)
    Primary,
    /// Emergency action (Stop)
    Danger,
    /// Answer to an operator prompt (Continue, Retry)
    Prompt,
}

impl ButtonVariant {
    pub fn to_style(&self, palette: &ColorPalette) -> Style {
        let style = match self {
            ButtonVariant::Primary => Style::new()
                .with_background(palette.primary)
                .with_foreground(WHITE),
            ButtonVariant::Danger => Style::new()
                .with_background(palette.warning)
                .with_foreground(WHITE),
            ButtonVariant::Prompt => Style::new()
                .with_background(palette.prompt)
                .with_foreground(WHITE),
        };
        style.with_padding(Padding::symmetric(8, 16))
    }
}
