//! Desktop control panel for an ESC driven by a remote `pigpiod`.
//!
//! Renders esc-core pages in an SDL2 window via `embedded-graphics-simulator`
//! and sends servo pulses to the Raspberry Pi over the daemon's socket
//! interface.
//!
//! # Key bindings
//!
//! | Key              | Action                        |
//! |------------------|-------------------------------|
//! | Up / Down        | Throttle ±10 µs               |
//! | PageUp / PageDown| Throttle ±100 µs              |
//! | Home             | Zero throttle (min pulse)     |
//! | Enter            | Continue / Retry              |
//! | S                | Stop (pulses off, disconnect) |
//! | C                | Calibrate ESC                 |
//! | Q / Esc          | Quit                          |
//!
//! Mouse presses and drags are forwarded as touch events; the wheel nudges the
//! throttle.

mod app;
mod link;
mod settings;
mod worker;

#[cfg(test)]
mod fake_daemon;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use esc_core::pages::Page;
use esc_core::ui::{Action, DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, KeyInput, TouchEvent, TouchPoint};

use crate::app::Panel;

/// Pixel scale factor; 400x300 logical pixels fill an 800x600 window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

const WINDOW_TITLE: &str = "ESC Control Panel";

/// Operator input after key mapping
enum KeyCommand {
    Page(KeyInput),
    Action(Action),
    Quit,
}

fn screen_bounds() -> Rectangle {
    Rectangle::new(
        Point::zero(),
        Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
    )
}

fn map_key(keycode: Keycode) -> Option<KeyCommand> {
    match keycode {
        Keycode::Up => Some(KeyCommand::Page(KeyInput::Up)),
        Keycode::Down => Some(KeyCommand::Page(KeyInput::Down)),
        Keycode::PageUp => Some(KeyCommand::Page(KeyInput::PageUp)),
        Keycode::PageDown => Some(KeyCommand::Page(KeyInput::PageDown)),
        Keycode::Home => Some(KeyCommand::Page(KeyInput::Home)),
        Keycode::Return | Keycode::KpEnter => Some(KeyCommand::Page(KeyInput::Confirm)),
        Keycode::S => Some(KeyCommand::Action(Action::Stop)),
        Keycode::C => Some(KeyCommand::Action(Action::Calibrate)),
        Keycode::Q | Keycode::Escape => Some(KeyCommand::Quit),
        _ => None,
    }
}

fn touch_point(point: Point) -> TouchPoint {
    TouchPoint::new(point.x.max(0) as u16, point.y.max(0) as u16)
}

fn main() -> ExitCode {
    env_logger::init();
    info!("Starting ESC control panel");

    let config = match settings::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Keys: Up/Down/PgUp/PgDn=throttle  Home=min  Enter=continue  S=stop  C=calibrate  Q=quit");

    let mut panel = Panel::start(config, screen_bounds());

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(
        DISPLAY_WIDTH_PX as u32,
        DISPLAY_HEIGHT_PX as u32,
    ));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new(WINDOW_TITLE, &output_settings);

    // The SDL window is created on the first `update()`; `events()` panics before that.
    let _ = display.clear(Rgb565::BLACK);
    let _ = Page::draw_page(panel.page_mut(), &mut display);
    Page::mark_clean(panel.page_mut());
    window.update(&display);

    let mut needs_redraw = false;
    let mut pointer_down = false;

    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            let action = match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown {
                    keycode, repeat, ..
                } => match map_key(keycode) {
                    Some(KeyCommand::Quit) => break 'running,
                    // Holding Enter must not answer several prompts
                    Some(KeyCommand::Page(KeyInput::Confirm)) if repeat => None,
                    Some(KeyCommand::Page(key)) => Page::handle_key(panel.page_mut(), key),
                    Some(KeyCommand::Action(action)) => Some(action),
                    None => None,
                },

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    pointer_down = true;
                    Page::handle_touch(panel.page_mut(), TouchEvent::Press(touch_point(point)))
                }

                SimulatorEvent::MouseMove { point } if pointer_down => {
                    Page::handle_touch(panel.page_mut(), TouchEvent::Drag(touch_point(point)))
                }

                SimulatorEvent::MouseButtonUp { point, .. } => {
                    pointer_down = false;
                    Page::handle_touch(panel.page_mut(), TouchEvent::Release(touch_point(point)))
                }

                SimulatorEvent::MouseWheel { scroll_delta, .. } => {
                    let key = if scroll_delta.y > 0 {
                        KeyInput::Up
                    } else {
                        KeyInput::Down
                    };
                    Page::handle_key(panel.page_mut(), key)
                }

                _ => None,
            };

            if let Some(action) = action {
                let before = panel.page().id();
                panel.handle_action(action);
                if panel.page().id() != before {
                    info!("Showing {}", panel.page().title());
                    needs_redraw = true;
                }
            }
        }

        if panel.pump_events() {
            needs_redraw = true;
        }

        if needs_redraw || Page::is_dirty(panel.page()) {
            let _ = display.clear(Rgb565::BLACK);
            if let Err(e) = Page::draw_page(panel.page_mut(), &mut display) {
                error!("Draw error: {:?}", e);
            }
            Page::mark_clean(panel.page_mut());
            needs_redraw = false;
        }

        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    panel.shutdown();
    info!("ESC control panel exiting");
    ExitCode::SUCCESS
}
