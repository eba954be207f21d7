//! Connection error page
//!
//! Shown when the daemon cannot be reached at startup or on retry. Offers a
//! Retry button (or Enter) that asks the panel to connect again.

use alloc::format;

use crate::pages::Page;
use crate::pages::constants::{BUTTON_HEIGHT_PX, BUTTON_WIDTH_PX, PAGE_MARGIN_PX};
use crate::ui::core::{Action, Drawable, KeyInput, PageEvent, PageId, TouchEvent};
use crate::ui::{
    Button, ButtonVariant, FONT_10X20_CHAR_HEIGHT_PX, MultiLineText, Style, TextComponent,
    TextSize, Theme, TouchResult, Touchable,
};
use embedded_graphics::{
    Drawable as EgDrawable,
    geometry::{Point, Size},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Alignment,
};

/// Hint printed under the error
pub const DAEMON_HINT: &str = "Make sure \"sudo pigpiod\" is running on the Raspberry Pi.";

pub struct ConnectionErrorPage {
    bounds: Rectangle,
    theme: Theme,
    heading: TextComponent,
    address: TextComponent,
    details: MultiLineText,
    retry_button: Button,
    dirty: bool,
}

impl ConnectionErrorPage {
    /// `address` is the `host:port` that failed, `error` the reason.
    pub fn new(bounds: Rectangle, address: &str, error: &str) -> Self {
        let theme = Theme::default();
        let palette = theme.palette;
        let left = bounds.top_left.x + PAGE_MARGIN_PX;
        let width = bounds.size.width - 2 * PAGE_MARGIN_PX as u32;
        let mut y = bounds.top_left.y + PAGE_MARGIN_PX * 2;

        let heading = TextComponent::new(
            Rectangle::new(Point::new(left, y), Size::new(width, FONT_10X20_CHAR_HEIGHT_PX)),
            "Cannot reach pigpiod",
            TextSize::Large,
        )
        .with_alignment(Alignment::Center)
        .with_style(Style::new().with_foreground(palette.warning));
        y += FONT_10X20_CHAR_HEIGHT_PX as i32 + PAGE_MARGIN_PX;

        let address = TextComponent::new(
            Rectangle::new(Point::new(left, y), Size::new(width, 12)),
            address,
            TextSize::Medium,
        )
        .with_alignment(Alignment::Center)
        .with_style(Style::new().with_foreground(palette.text_primary));
        y += 12 + PAGE_MARGIN_PX;

        let retry_top = bounds.top_left.y + bounds.size.height as i32
            - PAGE_MARGIN_PX * 2
            - BUTTON_HEIGHT_PX as i32;
        let details = MultiLineText::new(
            Rectangle::new(
                Point::new(left, y),
                Size::new(width, (retry_top - PAGE_MARGIN_PX - y).max(0) as u32),
            ),
            &format!("{}\n\n{}", error, DAEMON_HINT),
            TextSize::Medium,
        )
        .with_style(Style::new().with_foreground(palette.text_secondary));

        let retry_button = Button::new(
            Rectangle::new(
                Point::new(bounds.center().x - BUTTON_WIDTH_PX as i32 / 2, retry_top),
                Size::new(BUTTON_WIDTH_PX, BUTTON_HEIGHT_PX),
            ),
            "Retry",
            Action::Reconnect,
        )
        .with_variant(ButtonVariant::Prompt)
        .with_palette(palette)
        .with_corner_radius(theme.corner_radius);

        Self {
            bounds,
            theme,
            heading,
            address,
            details,
            retry_button,
            dirty: true,
        }
    }

    pub fn details(&self) -> impl Iterator<Item = &str> {
        self.details.lines()
    }
}

impl Page for ConnectionErrorPage {
    fn id(&self) -> PageId {
        PageId::ConnectionError
    }

    fn title(&self) -> &str {
        "Connection Error"
    }

    fn on_activate(&mut self) {
        self.dirty = true;
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        match self.retry_button.handle_touch(event) {
            TouchResult::Action(a) => Some(a),
            TouchResult::Handled | TouchResult::NotHandled => None,
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Option<Action> {
        match key {
            KeyInput::Confirm => Some(Action::Reconnect),
            _ => None,
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        // A failed retry reports through a new page; only link errors land here
        if let PageEvent::LinkError(message) = event {
            self.details
                .set_text(&format!("{}\n\n{}", message, DAEMON_HINT));
            return true;
        }
        false
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        Drawable::draw(self, display)
    }

    fn bounds(&self) -> Rectangle {
        Drawable::bounds(self)
    }

    fn is_dirty(&self) -> bool {
        Drawable::is_dirty(self)
    }

    fn mark_clean(&mut self) {
        Drawable::mark_clean(self)
    }

    fn mark_dirty(&mut self) {
        Drawable::mark_dirty(self)
    }
}

impl Drawable for ConnectionErrorPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        EgDrawable::draw(
            &self
                .bounds
                .into_styled(PrimitiveStyle::with_fill(self.theme.palette.background)),
            display,
        )?;

        self.heading.draw(display)?;
        self.address.draw(display)?;
        self.details.draw(display)?;
        self.retry_button.draw(display)?;

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.retry_button.is_dirty() || self.details.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.heading.mark_clean();
        self.address.mark_clean();
        self.details.mark_clean();
        self.retry_button.mark_clean();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
