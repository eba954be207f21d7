//! Page abstraction and the enum wrapper the panel stores
//!
//! [`Page`] is the lifecycle, input and rendering contract for one screen.
//! [`PageWrapper`] holds one of the concrete pages and forwards every call, so
//! the frame loop can swap screens without trait objects.

use crate::ui::core::{Action, KeyInput, PageEvent, PageId, TouchEvent};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

extern crate alloc;
use alloc::boxed::Box;

/// Trait that every screen implements.
///
/// The frame loop calls these in order:
///
/// 1. **`on_activate`** - once, when the page is shown.
/// 2. **`on_event`** - for every event from the link or the calibration worker.
/// 3. **`handle_touch`** / **`handle_key`** - for operator input.
/// 4. **`draw_page`** - when `is_dirty()` is true.
pub trait Page {
    fn id(&self) -> PageId;

    /// Window title while the page is shown
    fn title(&self) -> &str;

    fn on_activate(&mut self) {}

    /// Process pointer input and optionally return an [`Action`].
    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action>;

    /// Process keyboard input and optionally return an [`Action`].
    fn handle_key(&mut self, _key: KeyInput) -> Option<Action> {
        None
    }

    /// Returns `true` if the event changed what is on screen.
    fn on_event(&mut self, _event: &PageEvent) -> bool {
        false
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D)
    -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);
}

/// One of the panel's concrete pages.
pub enum PageWrapper {
    Control(Box<crate::pages::control::ControlPage>),
    ConnectionError(Box<crate::pages::connection_error::ConnectionErrorPage>),
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Control(page) => page.id(),
            PageWrapper::ConnectionError(page) => page.id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            PageWrapper::Control(page) => page.title(),
            PageWrapper::ConnectionError(page) => page.title(),
        }
    }

    fn on_activate(&mut self) {
        match self {
            PageWrapper::Control(page) => page.on_activate(),
            PageWrapper::ConnectionError(page) => page.on_activate(),
        }
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        match self {
            PageWrapper::Control(page) => page.handle_touch(event),
            PageWrapper::ConnectionError(page) => page.handle_touch(event),
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Option<Action> {
        match self {
            PageWrapper::Control(page) => page.handle_key(key),
            PageWrapper::ConnectionError(page) => page.handle_key(key),
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match self {
            PageWrapper::Control(page) => page.on_event(event),
            PageWrapper::ConnectionError(page) => page.on_event(event),
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        match self {
            PageWrapper::Control(page) => page.draw_page(display),
            PageWrapper::ConnectionError(page) => page.draw_page(display),
        }
    }

    fn bounds(&self) -> Rectangle {
        match self {
            PageWrapper::Control(page) => Page::bounds(page.as_ref()),
            PageWrapper::ConnectionError(page) => Page::bounds(page.as_ref()),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            PageWrapper::Control(page) => Page::is_dirty(page.as_ref()),
            PageWrapper::ConnectionError(page) => Page::is_dirty(page.as_ref()),
        }
    }

    fn mark_clean(&mut self) {
        match self {
            PageWrapper::Control(page) => Page::mark_clean(page.as_mut()),
            PageWrapper::ConnectionError(page) => Page::mark_clean(page.as_mut()),
        }
    }

    fn mark_dirty(&mut self) {
        match self {
            PageWrapper::Control(page) => Page::mark_dirty(page.as_mut()),
            PageWrapper::ConnectionError(page) => Page::mark_dirty(page.as_mut()),
        }
    }
}
