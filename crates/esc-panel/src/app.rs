//! Panel controller
//!
//! Owns the daemon link, the active page and the calibration worker. The frame
//! loop feeds it operator [`Action`]s and calls [`Panel::pump_events`] once per
//! frame to deliver worker events to the page.

use std::sync::mpsc::{Receiver, Sender, channel};

use embedded_graphics::primitives::Rectangle;
use esc_core::config::PanelConfig;
use esc_core::pages::{ConnectionErrorPage, ControlPage, Page, PageWrapper};
use esc_core::pulse::PulseWidth;
use esc_core::ui::{Action, PageEvent, PageId};
use log::{error, info, warn};

use crate::link::{PigpioLink, SharedLink};
use crate::worker::CalibrationWorker;

pub struct Panel {
    config: PanelConfig,
    bounds: Rectangle,
    link: SharedLink,
    page: PageWrapper,
    events: Sender<PageEvent>,
    inbox: Receiver<PageEvent>,
    worker: Option<CalibrationWorker>,
}

impl Panel {
    /// Connect to the daemon and show the control page, or the connection
    /// error page if the daemon cannot be reached.
    pub fn start(config: PanelConfig, bounds: Rectangle) -> Self {
        let link = SharedLink::new(PigpioLink::new(config.daemon_addr(), config.esc.gpio));
        let (events, inbox) = channel();
        let mut page = open_page(&link, &config, bounds);
        page.on_activate();

        Self {
            config,
            bounds,
            link,
            page,
            events,
            inbox,
            worker: None,
        }
    }

    pub fn page(&self) -> &PageWrapper {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut PageWrapper {
        &mut self.page
    }

    pub fn is_calibrating(&self) -> bool {
        self.worker.is_some()
    }

    pub fn handle_action(&mut self, action: Action) {
        info!("Action: {:?}", action);
        // The error page offers nothing but Retry
        if self.page.id() != PageId::Control && action != Action::Reconnect {
            warn!("Ignoring {:?} on {}", action, self.page.title());
            return;
        }
        match action {
            Action::SetPulseWidth(width) => self.set_pulse_width(width),
            Action::Stop => self.stop(),
            Action::Calibrate => self.start_calibration(),
            Action::Continue => {
                if let Some(worker) = &self.worker {
                    worker.confirm();
                }
            }
            Action::Reconnect => self.reconnect(),
        }
    }

    /// Deliver pending worker events to the page.
    ///
    /// Returns `true` if anything arrived.
    pub fn pump_events(&mut self) -> bool {
        let mut any = false;
        while let Ok(event) = self.inbox.try_recv() {
            if matches!(event, PageEvent::CalibrationFinished(_)) {
                if let Some(worker) = self.worker.take() {
                    worker.join();
                }
            }
            self.page.on_event(&event);
            any = true;
        }
        any
    }

    /// Cancel calibration, switch pulses off and disconnect.
    ///
    /// Reconnects to send OFF if the pin may still be pulsing, even when the
    /// socket dropped mid-command. A link that already sent OFF is just closed.
    pub fn shutdown(&mut self) {
        if self.is_calibrating() {
            info!("Cancelling calibration");
        }
        self.finish_worker();

        let result = self.link.with(|link| {
            if link.is_armed() {
                link.stop()
            } else {
                link.close();
                Ok(())
            }
        });
        if let Err(e) = result {
            warn!("Could not switch ESC off on exit: {}", e);
        }
    }

    fn set_pulse_width(&mut self, width: PulseWidth) {
        if self.worker.is_some() {
            warn!("Ignoring {} while calibrating", width);
            return;
        }

        match self.link.with(|link| link.set_servo(width)) {
            Ok(()) => self.dispatch(PageEvent::OutputChanged(width)),
            Err(e) => {
                error!("Setting {} failed: {}", width, e);
                self.dispatch(PageEvent::LinkError(e.to_string()));
            }
        }
    }

    fn stop(&mut self) {
        self.finish_worker();
        match self.link.with(PigpioLink::stop) {
            Ok(()) => self.dispatch(PageEvent::Stopped),
            Err(e) => {
                error!("Stop failed: {}", e);
                self.dispatch(PageEvent::LinkError(format!("Stop failed: {}", e)));
            }
        }
    }

    fn start_calibration(&mut self) {
        if self.worker.is_some() {
            warn!("Calibration already running");
            return;
        }

        match CalibrationWorker::spawn(
            self.config.esc.range,
            self.link.clone(),
            self.events.clone(),
        ) {
            Ok(worker) => {
                self.worker = Some(worker);
                self.dispatch(PageEvent::CalibrationStarted);
            }
            Err(e) => {
                error!("Could not start calibration thread: {}", e);
                self.dispatch(PageEvent::LinkError(format!("Could not start calibration: {}", e)));
            }
        }
    }

    fn reconnect(&mut self) {
        self.finish_worker();
        self.page = open_page(&self.link, &self.config, self.bounds);
        self.page.on_activate();
    }

    /// Cancel a running calibration, wait for it and flush its events.
    fn finish_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel();
            worker.join();
        }
        self.pump_events();
    }

    fn dispatch(&mut self, event: PageEvent) {
        self.page.on_event(&event);
    }
}

fn open_page(link: &SharedLink, config: &PanelConfig, bounds: Rectangle) -> PageWrapper {
    match link.with(PigpioLink::connect) {
        Ok(_) => PageWrapper::Control(Box::new(ControlPage::new(bounds, config))),
        Err(e) => {
            error!("{}", e);
            PageWrapper::ConnectionError(Box::new(ConnectionErrorPage::new(
                bounds,
                &config.daemon_addr(),
                &e.to_string(),
            )))
        }
    }
}
