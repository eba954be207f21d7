//! Shared layout constants for the pages

/// Outer margin of every page in pixels
pub const PAGE_MARGIN_PX: i32 = 12;

/// Page header height in pixels
pub const PAGE_HEADER_HEIGHT_PX: u32 = 36;

/// Standard button height in pixels
pub const BUTTON_HEIGHT_PX: u32 = 30;

/// Standard button width in pixels
pub const BUTTON_WIDTH_PX: u32 = 120;

/// Vertical gap between stacked buttons in pixels
pub const BUTTON_GAP_PX: i32 = 8;

/// Width of the throttle slider in pixels
pub const SLIDER_WIDTH_PX: u32 = 36;

/// Height of the pulse-width readout row in pixels
pub const READOUT_HEIGHT_PX: u32 = 24;

/// Log panel border stroke width in pixels
pub const LOG_BORDER_STROKE_WIDTH_PX: u32 = 1;

/// Log panel inner padding in pixels
pub const LOG_PADDING_PX: u32 = 6;
