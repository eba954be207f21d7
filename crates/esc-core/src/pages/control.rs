//! Main control page: throttle slider, Stop / Calibrate / Continue, and log
//!
//! Layout (400x300 logical pixels):
//!
//! ```text
//! +--------------------------------------------------+
//! | ESC Control               gpio 25 @ host:8888    |
//! | +--+  1350 µs           +----------------------+ |
//! | |  |                    |               Hello! | |
//! | |##|  [    Stop     ]   |                      | |
//! | |##|  [  Calibrate  ]   |                      | |
//! | |##|  [  Continue   ]   |                      | |
//! | +--+                    +----------------------+ |
//! +--------------------------------------------------+
//! ```

use alloc::format;

use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment as TextAlignment;
use embedded_graphics::{
    Drawable as EgDrawable,
    pixelcolor::Rgb565,
    primitives::{PrimitiveStyle, Rectangle},
};

use crate::calibration::CalibrationOutcome;
use crate::config::PanelConfig;
use crate::pages::constants::{
    BUTTON_GAP_PX, BUTTON_HEIGHT_PX, BUTTON_WIDTH_PX, LOG_BORDER_STROKE_WIDTH_PX, LOG_PADDING_PX,
    PAGE_HEADER_HEIGHT_PX, PAGE_MARGIN_PX, READOUT_HEIGHT_PX, SLIDER_WIDTH_PX,
};
use crate::pages::page::Page;
use crate::pulse::PulseWidth;
use crate::ui::{
    Action, Button, ButtonVariant, Drawable, KeyInput, MultiLineText, PageEvent, PageId, Padding,
    Style, TextComponent, TextSize, Theme, TouchEvent, TouchResult, Touchable, VerticalSlider,
};

/// Text shown in the log before anything happens
pub const GREETING: &str = "Hello!";

/// Gap between the slider column and the controls column
const COLUMN_GAP_PX: i32 = 14;

/// Control page for one ESC.
pub struct ControlPage {
    bounds: Rectangle,
    theme: Theme,
    title: TextComponent,
    target: TextComponent,
    readout: TextComponent,
    slider: VerticalSlider,
    stop_button: Button,
    calibrate_button: Button,
    continue_button: Button,
    log: MultiLineText,
    calibrating: bool,
    prompt_pending: bool,
    dirty: bool,
}

impl ControlPage {
    pub fn new(bounds: Rectangle, config: &PanelConfig) -> Self {
        let theme = Theme::default();
        let palette = theme.palette;
        let margin = PAGE_MARGIN_PX;
        let left = bounds.top_left.x + margin;
        let top = bounds.top_left.y + margin;
        let width = bounds.size.width as i32 - 2 * margin;
        let body_top = top + PAGE_HEADER_HEIGHT_PX as i32;
        let body_height = bounds.size.height as i32 - 2 * margin - PAGE_HEADER_HEIGHT_PX as i32;

        let title = TextComponent::new(
            Rectangle::new(Point::new(left, top), Size::new(160, PAGE_HEADER_HEIGHT_PX / 2)),
            "ESC Control",
            TextSize::Large,
        );

        let target_text = format!("gpio {} @ {}", config.esc.gpio, config.daemon_addr());
        let target = TextComponent::new(
            Rectangle::new(
                Point::new(left + 160, top),
                Size::new((width - 160) as u32, PAGE_HEADER_HEIGHT_PX / 2),
            ),
            &target_text,
            TextSize::Small,
        )
        .with_alignment(TextAlignment::Right)
        .with_style(Style::new().with_foreground(palette.text_secondary));

        let slider = VerticalSlider::new(
            Rectangle::new(
                Point::new(left, body_top),
                Size::new(SLIDER_WIDTH_PX, body_height as u32),
            ),
            config.esc.range,
        )
        .with_palette(palette);

        let controls_left = left + SLIDER_WIDTH_PX as i32 + COLUMN_GAP_PX;
        let readout = TextComponent::new(
            Rectangle::new(
                Point::new(controls_left, body_top),
                Size::new(BUTTON_WIDTH_PX, READOUT_HEIGHT_PX),
            ),
            "off",
            TextSize::Large,
        )
        .with_alignment(TextAlignment::Center)
        .with_style(Style::new().with_foreground(palette.primary));

        let button_at = |row: i32| {
            let y = body_top
                + READOUT_HEIGHT_PX as i32
                + BUTTON_GAP_PX * 2
                + row * (BUTTON_HEIGHT_PX as i32 + BUTTON_GAP_PX);
            Rectangle::new(
                Point::new(controls_left, y),
                Size::new(BUTTON_WIDTH_PX, BUTTON_HEIGHT_PX),
            )
        };

        let stop_button = Button::new(button_at(0), "Stop", Action::Stop)
            .with_variant(ButtonVariant::Danger)
            .with_palette(palette)
            .with_corner_radius(theme.corner_radius);
        let calibrate_button = Button::new(button_at(1), "Calibrate ESC", Action::Calibrate)
            .with_variant(ButtonVariant::Primary)
            .with_palette(palette)
            .with_corner_radius(theme.corner_radius);
        let mut continue_button = Button::new(button_at(2), "Continue", Action::Continue)
            .with_variant(ButtonVariant::Prompt)
            .with_palette(palette)
            .with_corner_radius(theme.corner_radius);
        continue_button.set_enabled(false);

        let log_left = controls_left + BUTTON_WIDTH_PX as i32 + COLUMN_GAP_PX;
        let log = MultiLineText::new(
            Rectangle::new(
                Point::new(log_left, body_top),
                Size::new((left + width - log_left) as u32, body_height as u32),
            ),
            GREETING,
            TextSize::Medium,
        )
        .with_style(
            Style::new()
                .with_background(palette.surface)
                .with_foreground(palette.text_primary)
                .with_border(palette.border, LOG_BORDER_STROKE_WIDTH_PX)
                .with_padding(Padding::all(LOG_PADDING_PX)),
        )
        .with_alignment(TextAlignment::Right);

        Self {
            bounds,
            theme,
            title,
            target,
            readout,
            slider,
            stop_button,
            calibrate_button,
            continue_button,
            log,
            calibrating: false,
            prompt_pending: false,
            dirty: true,
        }
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn is_prompt_pending(&self) -> bool {
        self.prompt_pending
    }

    /// Pulse width the slider currently points at
    pub fn slider_value(&self) -> PulseWidth {
        self.slider.value()
    }

    pub fn log_lines(&self) -> impl Iterator<Item = &str> {
        self.log.lines()
    }

    pub fn readout(&self) -> &str {
        self.readout.text()
    }

    fn show_log(&mut self, text: &str, color: Rgb565) {
        self.log.set_text(text);
        self.log.set_color(color);
    }

    fn set_prompt_pending(&mut self, pending: bool) {
        self.prompt_pending = pending;
        self.continue_button.set_enabled(pending);
    }

    fn set_calibrating(&mut self, calibrating: bool) {
        self.calibrating = calibrating;
        self.slider.set_enabled(!calibrating);
        self.calibrate_button.set_enabled(!calibrating);
        if !calibrating {
            self.set_prompt_pending(false);
        }
    }

    fn show_output(&mut self, width: PulseWidth) {
        let palette = self.theme.palette;
        if width.is_off() {
            self.readout.set_text("off");
            self.readout.set_color(palette.primary);
        } else {
            self.readout.set_text(&format!("{} µs", width.micros()));
            self.readout.set_color(palette.armed);
        }
    }
}

impl Page for ControlPage {
    fn id(&self) -> PageId {
        PageId::Control
    }

    fn title(&self) -> &str {
        "ESC Control"
    }

    fn on_activate(&mut self) {
        self.dirty = true;
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        // Every widget sees the event so press/release state stays consistent
        let results = [
            self.slider.handle_touch(event),
            self.stop_button.handle_touch(event),
            self.calibrate_button.handle_touch(event),
            self.continue_button.handle_touch(event),
        ];

        let action = results.into_iter().find_map(|result| match result {
            TouchResult::Action(action) => Some(action),
            TouchResult::Handled | TouchResult::NotHandled => None,
        });
        if action == Some(Action::Continue) {
            self.set_prompt_pending(false);
        }
        action
    }

    fn handle_key(&mut self, key: KeyInput) -> Option<Action> {
        match key {
            // One answer per prompt; repeats wait for the next prompt
            KeyInput::Confirm if self.prompt_pending => {
                self.set_prompt_pending(false);
                Some(Action::Continue)
            }
            KeyInput::Confirm => None,
            other => self.slider.handle_key(other),
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        let palette = self.theme.palette;

        match event {
            PageEvent::Status(message) => {
                self.set_prompt_pending(false);
                self.show_log(message, palette.text_primary);
            }
            PageEvent::Prompt(message) => {
                self.set_prompt_pending(true);
                self.show_log(message, palette.prompt);
            }
            PageEvent::CalibrationStarted => {
                self.set_calibrating(true);
            }
            PageEvent::CalibrationFinished(result) => {
                self.set_calibrating(false);
                match result {
                    // The last status line already says the ESC is calibrated
                    Ok(CalibrationOutcome::Completed) => {}
                    Ok(CalibrationOutcome::Cancelled { step }) => {
                        let text =
                            format!("Calibration cancelled at step {}. ESC pulses off.", step + 1);
                        self.show_log(&text, palette.text_secondary);
                    }
                    Err(error) => {
                        let text = format!("Calibration failed: {}", error);
                        self.show_log(&text, palette.warning);
                    }
                }
            }
            PageEvent::OutputChanged(width) => {
                self.slider.set_value(*width);
                self.show_output(*width);
            }
            PageEvent::Stopped => {
                self.slider.set_value(PulseWidth::OFF);
                self.show_output(PulseWidth::OFF);
                self.show_log("ESC stopped, connection closed", palette.text_secondary);
            }
            PageEvent::LinkError(message) => {
                self.show_log(message, palette.warning);
            }
        }

        Drawable::is_dirty(self)
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

impl Drawable for ControlPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(self.theme.palette.background))
            .draw(display)?;

        self.title.draw(display)?;
        self.target.draw(display)?;
        self.slider.draw(display)?;
        self.readout.draw(display)?;
        self.stop_button.draw(display)?;
        self.calibrate_button.draw(display)?;
        self.continue_button.draw(display)?;
        self.log.draw(display)?;

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
            || self.title.is_dirty()
            || self.target.is_dirty()
            || self.slider.is_dirty()
            || self.readout.is_dirty()
            || self.stop_button.is_dirty()
            || self.calibrate_button.is_dirty()
            || self.continue_button.is_dirty()
            || self.log.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.title.mark_clean();
        self.target.mark_clean();
        self.slider.mark_clean();
        self.readout.mark_clean();
        self.stop_button.mark_clean();
        self.calibrate_button.mark_clean();
        self.continue_button.mark_clean();
        self.log.mark_clean();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
