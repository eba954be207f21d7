//! Command frames for the `pigpiod` socket interface
//!
//! The daemon listens on TCP port 8888 and takes fixed 16-byte frames made of
//! four little-endian words: `cmd, p1, p2, p3`. It answers every frame with a
//! frame of the same shape whose last word is replaced by a signed result.
//! A negative result is one of the daemon's `PI_*` error codes.
//!
//! Only the handful of commands the panel needs are modelled here.

use core::fmt;

use thiserror_no_std::Error;

use crate::pulse::PulseWidth;

/// Default TCP port of `pigpiod`
pub const DEFAULT_PORT: u16 = 8888;

/// Size of a request or reply frame in bytes
pub const FRAME_LEN: usize = 16;

/// Highest GPIO number the daemon treats as a user GPIO
pub const MAX_USER_GPIO: u8 = 31;

const CMD_SERVO: u32 = 8;
const CMD_HWVER: u32 = 17;
const CMD_GETSERVO: u32 = 84;

/// A single request to the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start (or stop, with [`PulseWidth::OFF`]) servo pulses on a GPIO
    Servo { gpio: u8, width: PulseWidth },
    /// Read back the servo pulse width currently set on a GPIO
    GetServo { gpio: u8 },
    /// Read the Pi hardware revision; used as a connectivity check
    HardwareRevision,
}

impl Command {
    pub fn code(&self) -> u32 {
        match self {
            Command::Servo { .. } => CMD_SERVO,
            Command::GetServo { .. } => CMD_GETSERVO,
            Command::HardwareRevision => CMD_HWVER,
        }
    }

    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let (p1, p2) = match *self {
            Command::Servo { gpio, width } => (gpio as u32, width.micros() as u32),
            Command::GetServo { gpio } => (gpio as u32, 0),
            Command::HardwareRevision => (0, 0),
        };

        let mut frame = [0u8; FRAME_LEN];
        frame[0..4].copy_from_slice(&self.code().to_le_bytes());
        frame[4..8].copy_from_slice(&p1.to_le_bytes());
        frame[8..12].copy_from_slice(&p2.to_le_bytes());
        // p3 is the length of an extension block; none of these commands send one.
        frame
    }
}

/// Errors reported by, or while talking to, the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PigpioError {
    /// The daemon rejected the command
    #[error("pigpiod error {code} ({name})")]
    Daemon {
        /// Raw negative status code
        code: i32,
        /// Symbolic `PI_*` name, or "unknown"
        name: &'static str,
    },

    /// The reply echoed a different command than the one sent
    #[error("Reply for command {got}, expected {expected}")]
    Mismatch {
        /// Command code that was sent
        expected: u32,
        /// Command code found in the reply
        got: u32,
    },
}

impl PigpioError {
    fn from_code(code: i32) -> Self {
        PigpioError::Daemon {
            code,
            name: error_name(code),
        }
    }
}

/// Symbolic name of a daemon status code.
pub fn error_name(code: i32) -> &'static str {
    match code {
        -2 => "PI_BAD_USER_GPIO",
        -3 => "PI_BAD_GPIO",
        -7 => "PI_BAD_PULSEWIDTH",
        -31 => "PI_NOT_INITIALISED",
        -41 => "PI_NOT_PERMITTED",
        -92 => "PI_NOT_PWM_GPIO",
        -93 => "PI_NOT_SERVO_GPIO",
        _ => "unknown",
    }
}

/// A decoded reply frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub cmd: u32,
    pub result: i32,
}

impl Reply {
    pub fn decode(frame: &[u8; FRAME_LEN]) -> Self {
        let word = |i: usize| [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]];
        Self {
            cmd: u32::from_le_bytes(word(0)),
            result: i32::from_le_bytes(word(12)),
        }
    }

    /// Check the reply against the command that was sent.
    ///
    /// Returns the non-negative result value on success.
    pub fn into_result(self, sent: &Command) -> Result<u32, PigpioError> {
        if self.cmd != sent.code() {
            return Err(PigpioError::Mismatch {
                expected: sent.code(),
                got: self.cmd,
            });
        }
        if self.result < 0 {
            return Err(PigpioError::from_code(self.result));
        }
        Ok(self.result as u32)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Servo { gpio, width } => write!(f, "SERVO gpio={} width={}", gpio, width),
            Command::GetServo { gpio } => write!(f, "GETSERVO gpio={}", gpio),
            Command::HardwareRevision => f.write_str("HWVER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_frame(cmd: u32, result: i32) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0..4].copy_from_slice(&cmd.to_le_bytes());
        frame[12..16].copy_from_slice(&result.to_le_bytes());
        frame
    }

    #[test]
    fn test_servo_frame_layout() {
        let width = PulseWidth::new(1500).unwrap();
        let frame = Command::Servo { gpio: 25, width }.encode();

        assert_eq!(&frame[0..4], &8u32.to_le_bytes());
        assert_eq!(&frame[4..8], &25u32.to_le_bytes());
        assert_eq!(&frame[8..12], &1500u32.to_le_bytes());
        assert_eq!(&frame[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_off_frame_sends_zero_width() {
        let frame = Command::Servo {
            gpio: 25,
            width: PulseWidth::OFF,
        }
        .encode();
        assert_eq!(&frame[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_hardware_revision_frame() {
        let frame = Command::HardwareRevision.encode();
        assert_eq!(&frame[0..4], &17u32.to_le_bytes());
        assert!(frame[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_reply_ok() {
        let cmd = Command::GetServo { gpio: 25 };
        let reply = Reply::decode(&reply_frame(84, 1500));
        assert_eq!(reply.into_result(&cmd), Ok(1500));
    }

    #[test]
    fn test_reply_daemon_error() {
        let cmd = Command::Servo {
            gpio: 40,
            width: PulseWidth::OFF,
        };
        let reply = Reply::decode(&reply_frame(8, -2));
        assert_eq!(
            reply.into_result(&cmd),
            Err(PigpioError::Daemon {
                code: -2,
                name: "PI_BAD_USER_GPIO"
            })
        );
    }

    #[test]
    fn test_reply_mismatch() {
        let reply = Reply::decode(&reply_frame(17, 0));
        assert_eq!(
            reply.into_result(&Command::GetServo { gpio: 1 }),
            Err(PigpioError::Mismatch {
                expected: 84,
                got: 17
            })
        );
    }

    #[test]
    fn test_unknown_error_name() {
        assert_eq!(error_name(-9999), "unknown");
        assert_eq!(error_name(-7), "PI_BAD_PULSEWIDTH");
    }
}
