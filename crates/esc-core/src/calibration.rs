//! Scripted ESC throttle-range calibration
//!
//! Most hobby ESCs learn their throttle range at power-up: if they see a
//! full-throttle pulse when the battery is connected, they beep and wait for
//! the zero-throttle pulse, then store both ends. The script below walks the
//! operator through that dance with the pulse widths of a [`PulseRange`].
//!
//! The runner is synchronous and blocking. Sleeps and confirmations are
//! delegated to an [`Operator`], which lets the desktop panel run it on a worker
//! thread and lets tests run it instantly.

use core::fmt;
use core::time::Duration;

use log::{info, warn};

use crate::output::PulseOutput;
use crate::pulse::{PulseRange, PulseWidth};

/// Prompt shown before the full-throttle pulse is applied
pub const MSG_DISCONNECT_BATTERY: &str = "Disconnect the battery and press Enter";

/// Prompt shown while full throttle is applied
pub const MSG_CONNECT_BATTERY: &str = "Connect the battery. You will hear two beeps, then wait for a gradual falling tone and press Enter";

pub const MSG_SPECIAL_TONE: &str = "There should be a special tone";
pub const MSG_PLEASE_WAIT: &str = "Please wait for it ....";
pub const MSG_ARMING: &str = "Arming ESC now...";
pub const MSG_CALIBRATED: &str = "ESC has been successfully calibrated.";

/// How long the ESC is held at zero throttle to store the range
pub const TONE_WAIT: Duration = Duration::from_secs(12);

/// Pause with pulses off before arming
pub const SETTLE_WAIT: Duration = Duration::from_secs(2);

/// Pause after the arming pulse
pub const ARM_WAIT: Duration = Duration::from_secs(1);

/// Number of steps in the calibration script
pub const CALIBRATION_STEPS: usize = 14;

/// One line of the calibration script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    /// Apply a pulse width to the ESC pin
    Output(PulseWidth),
    /// Show an informational message
    Status(&'static str),
    /// Show a message and block until the operator confirms
    Prompt(&'static str),
    /// Sleep for a fixed time
    Wait(Duration),
}

/// Build the calibration script for the given operating window.
pub fn calibration_script(range: PulseRange) -> [CalibrationStep; CALIBRATION_STEPS] {
    use CalibrationStep::*;

    [
        Output(PulseWidth::OFF),
        Prompt(MSG_DISCONNECT_BATTERY),
        Output(range.max()),
        Prompt(MSG_CONNECT_BATTERY),
        Output(range.min()),
        Status(MSG_SPECIAL_TONE),
        Wait(TONE_WAIT),
        Status(MSG_PLEASE_WAIT),
        Output(PulseWidth::OFF),
        Wait(SETTLE_WAIT),
        Status(MSG_ARMING),
        Output(range.min()),
        Wait(ARM_WAIT),
        Status(MSG_CALIBRATED),
    ]
}

/// The human side of the calibration: messages, confirmations and waiting.
pub trait Operator {
    /// Display an informational message.
    fn show(&mut self, message: &str);

    /// Display `prompt` and block until the operator answers.
    ///
    /// Returns `false` if the operator cancelled.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Block for `duration`.
    ///
    /// Returns `false` if the operator cancelled during the wait.
    fn wait(&mut self, duration: Duration) -> bool;
}

/// How a calibration run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// Every step ran
    Completed,
    /// The operator cancelled at the given step index
    Cancelled { step: usize },
}

/// A pulse write failed part-way through the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError<E> {
    Output { step: usize, error: E },
}

impl<E: fmt::Display> fmt::Display for CalibrationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::Output { step, error } => {
                write!(f, "Output failed at calibration step {}: {}", step + 1, error)
            }
        }
    }
}

/// Runs the calibration script against an output and an operator.
pub struct Calibrator {
    script: [CalibrationStep; CALIBRATION_STEPS],
}

impl Calibrator {
    pub fn new(range: PulseRange) -> Self {
        Self {
            script: calibration_script(range),
        }
    }

    /// Run every step in order.
    ///
    /// If the operator cancels or a write fails, pulses are switched off
    /// before returning (best effort; a second failure is only logged).
    pub fn run<O, P>(
        &self,
        output: &mut O,
        operator: &mut P,
    ) -> Result<CalibrationOutcome, CalibrationError<O::Error>>
    where
        O: PulseOutput,
        O::Error: fmt::Display,
        P: Operator,
    {
        for (index, step) in self.script.iter().enumerate() {
            info!("Calibration step {}/{}: {:?}", index + 1, CALIBRATION_STEPS, step);

            let proceed = match *step {
                CalibrationStep::Output(width) => {
                    if let Err(error) = output.set_pulse_width(width) {
                        warn!("Calibration aborted, output failed: {}", error);
                        Self::switch_off(output);
                        return Err(CalibrationError::Output { step: index, error });
                    }
                    true
                }
                CalibrationStep::Status(message) => {
                    operator.show(message);
                    true
                }
                CalibrationStep::Prompt(message) => operator.confirm(message),
                CalibrationStep::Wait(duration) => operator.wait(duration),
            };

            if !proceed {
                info!("Calibration cancelled at step {}", index + 1);
                Self::switch_off(output);
                return Ok(CalibrationOutcome::Cancelled { step: index });
            }
        }

        Ok(CalibrationOutcome::Completed)
    }

    fn switch_off<O>(output: &mut O)
    where
        O: PulseOutput,
        O::Error: fmt::Display,
    {
        if let Err(e) = output.off() {
            warn!("Could not switch ESC pulses off: {}", e);
        }
    }
}
