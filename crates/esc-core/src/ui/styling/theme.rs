//! Theme: palette and corner radius in one value

use super::colors::ColorPalette;

/// Styling parameters shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub palette: ColorPalette,
    /// Corner radius for buttons and panels, in pixels
    pub corner_radius: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: ColorPalette::default(),
            corner_radius: 6,
        }
    }
}
