//! TCP link to `pigpiod`
//!
//! One blocking socket, one request in flight at a time. The socket is opened
//! lazily: [`PigpioLink::stop`] closes it (switching pulses off first) and the
//! next command reconnects.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use esc_core::output::PulseOutput;
use esc_core::pigpio::{Command, FRAME_LEN, PigpioError, Reply};
use esc_core::pulse::PulseWidth;
use log::{debug, info, warn};
use thiserror_no_std::Error;

/// Connect timeout for each resolved address
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Read/write timeout for a single command round trip
const IO_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Cannot connect to pigpiod at {addr}: {error}")]
    Connect { addr: String, error: std::io::Error },

    #[error("Lost connection to pigpiod: {0}")]
    Io(std::io::Error),

    #[error("{0}")]
    Daemon(PigpioError),

    #[error("Daemon returned invalid pulse width {0}")]
    BadReading(u32),

    #[error("Link lock poisoned")]
    Poisoned,
}

/// Connection to the daemon, bound to the ESC pin.
pub struct PigpioLink {
    addr: String,
    gpio: u8,
    stream: Option<TcpStream>,
    /// A non-zero width was sent and no OFF has been acknowledged since
    armed: bool,
}

impl PigpioLink {
    pub fn new(addr: impl Into<String>, gpio: u8) -> Self {
        Self {
            addr: addr.into(),
            gpio,
            stream: None,
            armed: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether the pin may still be pulsing.
    ///
    /// Stays set across a dropped connection; the daemon keeps pulsing after
    /// its client goes away.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Connect, check the daemon answers and switch the ESC pin off.
    ///
    /// Returns the Pi's hardware revision.
    pub fn connect(&mut self) -> Result<u32, LinkError> {
        self.close();
        let revision = self.command(Command::HardwareRevision)?;
        info!("Connected to pigpiod at {} (hardware revision {:#x})", self.addr, revision);

        match self.pulse_width() {
            Ok(width) if !width.is_off() => {
                warn!("GPIO {} was already pulsing at {}", self.gpio, width)
            }
            Ok(_) => {}
            // The daemon answers GETSERVO with an error when servo pulses were never started
            Err(LinkError::Daemon(e)) => debug!("GETSERVO on GPIO {}: {}", self.gpio, e),
            Err(e) => return Err(e),
        }

        self.set_servo(PulseWidth::OFF)?;
        Ok(revision)
    }

    /// Set the servo pulse width on the ESC pin.
    pub fn set_servo(&mut self, width: PulseWidth) -> Result<(), LinkError> {
        if !width.is_off() {
            self.armed = true;
        }
        self.command(Command::Servo {
            gpio: self.gpio,
            width,
        })?;
        if width.is_off() {
            self.armed = false;
        }
        Ok(())
    }

    /// Current servo pulse width on the ESC pin.
    pub fn pulse_width(&mut self) -> Result<PulseWidth, LinkError> {
        let raw = self.command(Command::GetServo { gpio: self.gpio })?;
        u16::try_from(raw)
            .ok()
            .and_then(|micros| PulseWidth::new(micros).ok())
            .ok_or(LinkError::BadReading(raw))
    }

    /// Switch pulses off and drop the connection.
    pub fn stop(&mut self) -> Result<(), LinkError> {
        let result = self.set_servo(PulseWidth::OFF);
        self.close();
        info!("Link to {} closed", self.addr);
        result
    }

    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.shutdown(std::net::Shutdown::Both).ok();
        }
    }

    /// Send one command and wait for its reply.
    ///
    /// Any socket failure drops the connection so the next call reconnects.
    pub fn command(&mut self, command: Command) -> Result<u32, LinkError> {
        debug!("-> {}", command);
        let frame = command.encode();

        let stream = self.stream()?;
        let mut reply = [0u8; FRAME_LEN];
        let io = stream
            .write_all(&frame)
            .and_then(|_| stream.read_exact(&mut reply));

        if let Err(e) = io {
            self.close();
            return Err(LinkError::Io(e));
        }

        let result = Reply::decode(&reply).into_result(&command);
        debug!("<- {:?}", result);
        result.map_err(LinkError::Daemon)
    }

    fn stream(&mut self) -> Result<&mut TcpStream, LinkError> {
        if self.stream.is_none() {
            self.stream = Some(self.open()?);
        }
        // Just filled above
        self.stream.as_mut().ok_or(LinkError::Poisoned)
    }

    fn open(&self) -> Result<TcpStream, LinkError> {
        let connect_error = |error| LinkError::Connect {
            addr: self.addr.clone(),
            error,
        };

        let mut last_error = None;
        for addr in self.addr.to_socket_addrs().map_err(connect_error)? {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(IO_TIMEOUT)).map_err(connect_error)?;
                    stream.set_write_timeout(Some(IO_TIMEOUT)).map_err(connect_error)?;
                    stream.set_nodelay(true).ok();
                    debug!("Opened socket to {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(connect_error(last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved")
        })))
    }
}

impl PulseOutput for PigpioLink {
    type Error = LinkError;

    fn set_pulse_width(&mut self, width: PulseWidth) -> Result<(), Self::Error> {
        self.set_servo(width)
    }
}

impl Drop for PigpioLink {
    fn drop(&mut self) {
        self.close();
    }
}

/// The link shared between the UI thread and the calibration worker.
///
/// The lock is held for one command round trip at a time.
#[derive(Clone)]
pub struct SharedLink(Arc<Mutex<PigpioLink>>);

impl SharedLink {
    pub fn new(link: PigpioLink) -> Self {
        Self(Arc::new(Mutex::new(link)))
    }

    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut PigpioLink) -> Result<T, LinkError>,
    ) -> Result<T, LinkError> {
        let mut link = self.0.lock().map_err(|_| LinkError::Poisoned)?;
        f(&mut link)
    }
}

impl PulseOutput for SharedLink {
    type Error = LinkError;

    fn set_pulse_width(&mut self, width: PulseWidth) -> Result<(), Self::Error> {
        self.with(|link| link.set_servo(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_daemon::{FakeDaemon, Frame};

    fn width(micros: u16) -> PulseWidth {
        PulseWidth::new(micros).unwrap()
    }

    #[test]
    fn test_connect_checks_daemon_and_switches_off() {
        let daemon = FakeDaemon::start();
        let mut link = PigpioLink::new(daemon.addr(), 25);

        let revision = link.connect().unwrap();

        assert_eq!(revision, FakeDaemon::REVISION);
        assert!(link.is_connected());
        assert_eq!(
            daemon.frames(),
            [
                Frame { cmd: 17, p1: 0, p2: 0 },
                Frame { cmd: 84, p1: 25, p2: 0 },
                Frame { cmd: 8, p1: 25, p2: 0 },
            ]
        );
    }

    #[test]
    fn test_set_and_read_back() {
        let daemon = FakeDaemon::start();
        let mut link = PigpioLink::new(daemon.addr(), 25);

        link.set_pulse_width(width(1350)).unwrap();
        assert_eq!(link.pulse_width().unwrap(), width(1350));
        assert_eq!(daemon.frames()[0], Frame { cmd: 8, p1: 25, p2: 1350 });
    }

    #[test]
    fn test_daemon_error_is_reported() {
        let daemon = FakeDaemon::start();
        let mut link = PigpioLink::new(daemon.addr(), 40);

        let err = link.set_servo(width(1500)).unwrap_err();
        assert!(matches!(
            err,
            LinkError::Daemon(PigpioError::Daemon { code: -2, .. })
        ));
        // A daemon refusal keeps the socket open
        assert!(link.is_connected());
    }

    #[test]
    fn test_stop_closes_and_next_command_reconnects() {
        let daemon = FakeDaemon::start();
        let mut link = PigpioLink::new(daemon.addr(), 25);

        link.set_servo(width(1200)).unwrap();
        link.stop().unwrap();
        assert!(!link.is_connected());
        assert_eq!(daemon.frames().last(), Some(&Frame { cmd: 8, p1: 25, p2: 0 }));

        link.set_servo(width(800)).unwrap();
        assert!(link.is_connected());
        assert_eq!(daemon.connections(), 2);
    }

    #[test]
    fn test_armed_until_off_is_acknowledged() {
        let daemon = FakeDaemon::start();
        daemon.hang_up_on(1500);
        let mut link = PigpioLink::new(daemon.addr(), 25);

        link.connect().unwrap();
        assert!(!link.is_armed());

        // The write may have reached the daemon before the socket dropped
        assert!(matches!(link.set_servo(width(1500)), Err(LinkError::Io(_))));
        assert!(!link.is_connected());
        assert!(link.is_armed());

        link.stop().unwrap();
        assert!(!link.is_armed());
        assert_eq!(daemon.servo_writes(), [0, 1500, 0]);
        assert_eq!(daemon.connections(), 2);
    }

    #[test]
    fn test_unreachable_daemon() {
        let addr = FakeDaemon::unused_addr();
        let mut link = PigpioLink::new(addr.clone(), 25);

        match link.connect() {
            Err(LinkError::Connect { addr: failed, .. }) => assert_eq!(failed, addr),
            other => panic!("expected connect error, got {:?}", other.map(|_| ())),
        }
        assert!(!link.is_connected());
    }

    #[test]
    fn test_shared_link_drives_same_socket() {
        let daemon = FakeDaemon::start();
        let shared = SharedLink::new(PigpioLink::new(daemon.addr(), 25));

        let mut clone = shared.clone();
        clone.set_pulse_width(width(1000)).unwrap();
        let read = shared.with(|link| link.pulse_width()).unwrap();

        assert_eq!(read, width(1000));
        assert_eq!(daemon.connections(), 1);
    }
}
