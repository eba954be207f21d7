//! Core UI traits and types

use alloc::string::String;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::calibration::CalibrationOutcome;
use crate::pulse::PulseWidth;

/// A point on the display, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Pointer input. The desktop panel maps mouse buttons and motion onto these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// Pointer pressed at a point
    Press(TouchPoint),
    /// Pointer moved while pressed
    Drag(TouchPoint),
    /// Pointer released
    Release(TouchPoint),
}

/// Keyboard input the pages understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Small throttle step up
    Up,
    /// Small throttle step down
    Down,
    /// Large throttle step up
    PageUp,
    /// Large throttle step down
    PageDown,
    /// Jump to zero throttle
    Home,
    /// Answer the pending prompt (Enter)
    Confirm,
}

/// Result from handling a touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchResult {
    /// Event was consumed
    Handled,
    /// Event was not for this element
    NotHandled,
    /// Event triggered an action
    Action(Action),
}

/// Actions that UI elements ask the application to perform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Drive the ESC at this pulse width
    SetPulseWidth(PulseWidth),
    /// Switch pulses off and drop the daemon connection
    Stop,
    /// Start the calibration script
    Calibrate,
    /// Acknowledge the pending calibration prompt
    Continue,
    /// Retry the daemon connection
    Reconnect,
}

/// Page identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Control,
    ConnectionError,
}

/// Events pushed into the active page from outside the UI
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Informational message for the log label
    Status(String),
    /// Calibration is blocked on operator confirmation
    Prompt(String),
    /// Calibration worker started
    CalibrationStarted,
    /// Calibration worker ended; `Err` carries the failure text
    CalibrationFinished(Result<CalibrationOutcome, String>),
    /// The daemon acknowledged a new pulse width
    OutputChanged(PulseWidth),
    /// Pulses were switched off and the connection closed
    Stopped,
    /// A command to the daemon failed
    LinkError(String),
}

/// Trait for any UI element that can be drawn
pub trait Drawable {
    /// Draw the element within its bounds
    fn draw<D: DrawTarget<Color = embedded_graphics::pixelcolor::Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);
}

/// Trait for UI elements that respond to touch events
pub trait Touchable {
    fn contains_point(&self, point: TouchPoint) -> bool;

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult;
}
