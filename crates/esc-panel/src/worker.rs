//! Background calibration
//!
//! The calibration script blocks on prompts and multi-second waits, so it runs
//! on its own thread. Messages flow to the UI as [`PageEvent`]s; the operator's
//! answers flow back as [`OperatorReply`]s.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use esc_core::calibration::{Calibrator, Operator};
use esc_core::output::PulseOutput;
use esc_core::pulse::{PulseRange, PulseWidth};
use esc_core::ui::PageEvent;
use log::{debug, info, warn};

use crate::link::{LinkError, SharedLink};

/// Operator answers sent to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorReply {
    Continue,
    Cancel,
}

/// Handle to a running calibration thread.
pub struct CalibrationWorker {
    replies: Sender<OperatorReply>,
    handle: Option<JoinHandle<()>>,
}

impl CalibrationWorker {
    /// Start calibrating `range` on `link`.
    ///
    /// Ends with exactly one [`PageEvent::CalibrationFinished`] on `events`.
    pub fn spawn(
        range: PulseRange,
        link: SharedLink,
        events: Sender<PageEvent>,
    ) -> std::io::Result<Self> {
        let (replies, replies_rx) = channel();

        let handle = thread::Builder::new()
            .name("calibration".into())
            .spawn(move || {
                let mut output = ReportingOutput {
                    link,
                    events: events.clone(),
                };
                let mut operator = ChannelOperator {
                    events: events.clone(),
                    replies: replies_rx,
                };

                let result = Calibrator::new(range)
                    .run(&mut output, &mut operator)
                    .map_err(|e| e.to_string());
                info!("Calibration finished: {:?}", result);
                events.send(PageEvent::CalibrationFinished(result)).ok();
            })?;

        Ok(Self {
            replies,
            handle: Some(handle),
        })
    }

    /// Answer the pending prompt.
    pub fn confirm(&self) {
        self.replies.send(OperatorReply::Continue).ok();
    }

    /// Abort at the next prompt or wait; pulses are switched off on the way out.
    pub fn cancel(&self) {
        self.replies.send(OperatorReply::Cancel).ok();
    }

    /// Block until the thread exits.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Calibration thread panicked");
            }
        }
    }
}

/// Pulse output that reports every acknowledged width to the UI.
struct ReportingOutput {
    link: SharedLink,
    events: Sender<PageEvent>,
}

impl PulseOutput for ReportingOutput {
    type Error = LinkError;

    fn set_pulse_width(&mut self, width: PulseWidth) -> Result<(), Self::Error> {
        self.link.set_pulse_width(width)?;
        self.events.send(PageEvent::OutputChanged(width)).ok();
        Ok(())
    }
}

/// Operator backed by the UI: prompts go out as events, answers come back on a
/// channel.
struct ChannelOperator {
    events: Sender<PageEvent>,
    replies: Receiver<OperatorReply>,
}

impl Operator for ChannelOperator {
    fn show(&mut self, message: &str) {
        self.events.send(PageEvent::Status(message.to_string())).ok();
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        // Answers sent before this prompt was shown belong to an earlier one
        loop {
            match self.replies.try_recv() {
                Ok(OperatorReply::Continue) => debug!("Dropping stale Continue"),
                Ok(OperatorReply::Cancel) | Err(TryRecvError::Disconnected) => return false,
                Err(TryRecvError::Empty) => break,
            }
        }

        self.events.send(PageEvent::Prompt(prompt.to_string())).ok();
        // A dropped sender means the panel is gone
        matches!(self.replies.recv(), Ok(OperatorReply::Continue))
    }

    fn wait(&mut self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            match self.replies.recv_timeout(remaining) {
                Ok(OperatorReply::Continue) => debug!("Ignoring Continue during wait"),
                Ok(OperatorReply::Cancel) | Err(RecvTimeoutError::Disconnected) => return false,
                Err(RecvTimeoutError::Timeout) => return true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_daemon::FakeDaemon;
    use crate::link::PigpioLink;
    use esc_core::calibration::{CalibrationOutcome, MSG_CONNECT_BATTERY, MSG_DISCONNECT_BATTERY};

    fn operator() -> (ChannelOperator, Receiver<PageEvent>, Sender<OperatorReply>) {
        let (events, events_rx) = channel();
        let (replies, replies_rx) = channel();
        (
            ChannelOperator {
                events,
                replies: replies_rx,
            },
            events_rx,
            replies,
        )
    }

    fn next(events: &Receiver<PageEvent>) -> PageEvent {
        events.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    /// Answer every prompt that shows up on `events` with `reply`.
    fn answer_prompts(
        events: Receiver<PageEvent>,
        replies: Sender<OperatorReply>,
        reply: OperatorReply,
    ) {
        thread::spawn(move || {
            while let Ok(event) = events.recv() {
                if matches!(event, PageEvent::Prompt(_)) && replies.send(reply).is_err() {
                    break;
                }
            }
        });
    }

    #[test]
    fn test_confirm_sends_prompt_and_waits_for_answer() {
        let (mut op, events, replies) = operator();
        answer_prompts(events, replies, OperatorReply::Continue);
        assert!(op.confirm("Press Enter"));
        assert!(op.confirm("Again"));
    }

    #[test]
    fn test_confirm_cancelled() {
        let (mut op, events, replies) = operator();
        answer_prompts(events, replies, OperatorReply::Cancel);
        assert!(!op.confirm("Press Enter"));
    }

    #[test]
    fn test_continue_sent_before_prompt_is_not_an_answer() {
        let (mut op, events, replies) = operator();
        // A double press left an extra Continue queued
        replies.send(OperatorReply::Continue).unwrap();
        replies.send(OperatorReply::Continue).unwrap();
        answer_prompts(events, replies, OperatorReply::Cancel);

        assert!(!op.confirm("Connect the battery"));
    }

    #[test]
    fn test_cancel_sent_before_prompt_still_cancels() {
        let (mut op, events, replies) = operator();
        replies.send(OperatorReply::Cancel).unwrap();
        assert!(!op.confirm("Connect the battery"));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_wait_ignores_continue_and_stops_on_cancel() {
        let (mut op, _events, replies) = operator();
        replies.send(OperatorReply::Continue).unwrap();
        let started = Instant::now();
        assert!(op.wait(Duration::from_millis(50)));
        assert!(started.elapsed() >= Duration::from_millis(50));

        replies.send(OperatorReply::Cancel).unwrap();
        assert!(!op.wait(Duration::from_secs(30)));
    }

    #[test]
    fn test_dropped_panel_cancels() {
        let (mut op, _events, replies) = operator();
        drop(replies);
        assert!(!op.confirm("anyone?"));
        assert!(!op.wait(Duration::from_secs(30)));
    }

    #[test]
    fn test_cancel_at_first_prompt_switches_off() {
        let daemon = FakeDaemon::start();
        let link = SharedLink::new(PigpioLink::new(daemon.addr(), 25));
        let (events, events_rx) = channel();

        let worker = CalibrationWorker::spawn(PulseRange::default(), link, events).unwrap();

        assert_eq!(next(&events_rx), PageEvent::OutputChanged(PulseWidth::OFF));
        assert_eq!(
            next(&events_rx),
            PageEvent::Prompt(MSG_DISCONNECT_BATTERY.into())
        );
        worker.cancel();

        // The forced OFF is reported as well
        assert_eq!(next(&events_rx), PageEvent::OutputChanged(PulseWidth::OFF));
        assert_eq!(
            next(&events_rx),
            PageEvent::CalibrationFinished(Ok(CalibrationOutcome::Cancelled { step: 1 }))
        );
        worker.join();
        assert_eq!(daemon.servo_writes(), [0, 0]);
    }

    #[test]
    fn test_confirm_advances_to_max_then_min() {
        let daemon = FakeDaemon::start();
        let link = SharedLink::new(PigpioLink::new(daemon.addr(), 25));
        let (events, events_rx) = channel();
        let range = PulseRange::default();

        let worker = CalibrationWorker::spawn(range, link, events).unwrap();
        next(&events_rx);
        next(&events_rx);
        worker.confirm();

        assert_eq!(next(&events_rx), PageEvent::OutputChanged(range.max()));
        assert_eq!(next(&events_rx), PageEvent::Prompt(MSG_CONNECT_BATTERY.into()));
        worker.confirm();
        assert_eq!(next(&events_rx), PageEvent::OutputChanged(range.min()));

        // Cancel during the long tone wait
        worker.cancel();
        loop {
            if let PageEvent::CalibrationFinished(result) = next(&events_rx) {
                assert!(matches!(result, Ok(CalibrationOutcome::Cancelled { .. })));
                break;
            }
        }
        worker.join();
        assert_eq!(daemon.servo_writes(), [0, 2000, 700, 0]);
    }

    #[test]
    fn test_double_confirm_does_not_skip_battery_prompt() {
        let daemon = FakeDaemon::start();
        let link = SharedLink::new(PigpioLink::new(daemon.addr(), 25));
        let (events, events_rx) = channel();
        let range = PulseRange::default();

        let worker = CalibrationWorker::spawn(range, link, events).unwrap();
        next(&events_rx);
        next(&events_rx);
        worker.confirm();
        worker.confirm();

        assert_eq!(next(&events_rx), PageEvent::OutputChanged(range.max()));
        assert_eq!(next(&events_rx), PageEvent::Prompt(MSG_CONNECT_BATTERY.into()));
        // Still waiting for the battery to be connected
        assert!(events_rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!daemon.servo_writes().contains(&700));

        worker.cancel();
        loop {
            if let PageEvent::CalibrationFinished(result) = next(&events_rx) {
                assert_eq!(result, Ok(CalibrationOutcome::Cancelled { step: 3 }));
                break;
            }
        }
        worker.join();
        assert_eq!(daemon.servo_writes(), [0, 2000, 0]);
    }

    #[test]
    fn test_unreachable_daemon_fails_calibration() {
        let link = SharedLink::new(PigpioLink::new(FakeDaemon::unused_addr(), 25));
        let (events, events_rx) = channel();

        let worker = CalibrationWorker::spawn(PulseRange::default(), link, events).unwrap();
        match next(&events_rx) {
            PageEvent::CalibrationFinished(Err(message)) => {
                assert!(message.starts_with("Output failed at calibration step 1"))
            }
            other => panic!("unexpected event {:?}", other),
        }
        worker.join();
    }
}
