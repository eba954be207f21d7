//! Vertical throttle slider
//!
//! Bottom of the track is the zero-throttle end of the [`PulseRange`], top is
//! full throttle. The slider can also sit at [`PulseWidth::OFF`], which is
//! drawn at the bottom with an idle thumb; any input moves it back into the
//! range.

use crate::pulse::{PulseRange, PulseWidth};
use crate::ui::core::{Action, Drawable, KeyInput, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::ColorPalette;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};

/// Thumb height in pixels
const THUMB_HEIGHT_PX: u32 = 12;

/// Track width in pixels
const TRACK_WIDTH_PX: u32 = 8;

/// Arrow-key step in µs
pub const FINE_STEP_US: i32 = 10;

/// Page-key step in µs
pub const COARSE_STEP_US: i32 = 100;

pub struct VerticalSlider {
    bounds: Rectangle,
    range: PulseRange,
    value: PulseWidth,
    enabled: bool,
    dragging: bool,
    palette: ColorPalette,
    dirty: bool,
}

impl VerticalSlider {
    /// New slider starting at [`PulseWidth::OFF`].
    pub fn new(bounds: Rectangle, range: PulseRange) -> Self {
        Self {
            bounds,
            range,
            value: PulseWidth::OFF,
            enabled: true,
            dragging: false,
            palette: ColorPalette::default(),
            dirty: true,
        }
    }

    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn value(&self) -> PulseWidth {
        self.value
    }

    pub fn range(&self) -> PulseRange {
        self.range
    }

    /// Move the thumb without emitting an action.
    ///
    /// Values outside the range (other than OFF) are clamped.
    pub fn set_value(&mut self, value: PulseWidth) {
        let value = if value.is_off() {
            value
        } else {
            self.range.clamp(value.micros())
        };
        if self.value != value {
            self.value = value;
            self.dirty = true;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.dragging = false;
            self.dirty = true;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Keyboard nudges. Returns an action when the value changed.
    pub fn handle_key(&mut self, key: KeyInput) -> Option<Action> {
        if !self.enabled {
            return None;
        }

        let target = match key {
            KeyInput::Up => self.range.step(self.value, FINE_STEP_US),
            KeyInput::Down => self.range.step(self.value, -FINE_STEP_US),
            KeyInput::PageUp => self.range.step(self.value, COARSE_STEP_US),
            KeyInput::PageDown => self.range.step(self.value, -COARSE_STEP_US),
            KeyInput::Home => self.range.min(),
            KeyInput::Confirm => return None,
        };
        self.change_to(target)
    }

    fn change_to(&mut self, target: PulseWidth) -> Option<Action> {
        if target == self.value {
            return None;
        }
        self.value = target;
        self.dirty = true;
        Some(Action::SetPulseWidth(target))
    }

    /// y coordinate of the thumb centre at full throttle
    fn travel_top(&self) -> i32 {
        self.bounds.top_left.y + (THUMB_HEIGHT_PX / 2) as i32
    }

    /// Pixels the thumb centre can move
    fn travel(&self) -> u32 {
        self.bounds.size.height.saturating_sub(THUMB_HEIGHT_PX).max(1)
    }

    fn value_at(&self, y: i32) -> PulseWidth {
        let bottom = self.travel_top() + self.travel() as i32;
        let fraction = (bottom - y) as f32 / self.travel() as f32;
        self.range.from_fraction(fraction)
    }

    fn thumb_center_y(&self) -> i32 {
        let fraction = self.range.fraction_of(self.value);
        let bottom = self.travel_top() + self.travel() as i32;
        bottom - (fraction * self.travel() as f32 + 0.5) as i32
    }

    fn value_result(&mut self, point: TouchPoint) -> TouchResult {
        match self.change_to(self.value_at(point.y as i32)) {
            Some(action) => TouchResult::Action(action),
            None => TouchResult::Handled,
        }
    }
}

impl Drawable for VerticalSlider {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(self.palette.background))
            .draw(display)?;

        let center_x = self.bounds.center().x;
        let track = Rectangle::new(
            Point::new(center_x - (TRACK_WIDTH_PX / 2) as i32, self.travel_top()),
            Size::new(TRACK_WIDTH_PX, self.travel()),
        );
        RoundedRectangle::with_equal_corners(track, Size::new(3, 3))
            .into_styled(PrimitiveStyle::with_fill(self.palette.surface))
            .draw(display)?;

        // Filled part of the track below the thumb
        let thumb_y = self.thumb_center_y();
        if !self.value.is_off() {
            let filled_height = (track.top_left.y + track.size.height as i32 - thumb_y).max(0);
            Rectangle::new(
                Point::new(track.top_left.x, thumb_y),
                Size::new(TRACK_WIDTH_PX, filled_height as u32),
            )
            .into_styled(PrimitiveStyle::with_fill(self.palette.armed))
            .draw(display)?;
        }

        let thumb_color = if !self.enabled {
            self.palette.border
        } else if self.value.is_off() {
            self.palette.primary
        } else {
            self.palette.armed
        };
        let thumb = Rectangle::new(
            Point::new(self.bounds.top_left.x, thumb_y - (THUMB_HEIGHT_PX / 2) as i32),
            Size::new(self.bounds.size.width, THUMB_HEIGHT_PX),
        );
        RoundedRectangle::with_equal_corners(thumb, Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(thumb_color))
            .draw(display)?;

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Touchable for VerticalSlider {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        if !self.enabled {
            return TouchResult::NotHandled;
        }

        match event {
            TouchEvent::Press(point) if self.contains_point(point) => {
                self.dragging = true;
                self.value_result(point)
            }
            // Dragging keeps tracking outside the bounds, clamped to the range
            TouchEvent::Drag(point) if self.dragging => self.value_result(point),
            TouchEvent::Release(_) if self.dragging => {
                self.dragging = false;
                TouchResult::Handled
            }
            _ => TouchResult::NotHandled,
        }
    }
}
