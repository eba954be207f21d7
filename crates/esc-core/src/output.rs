//! Pulse output seam
//!
//! Everything that drives the ESC does so through [`PulseOutput`], bound to a
//! single pin. The desktop panel implements it on top of its daemon link;
//! tests implement it with a recorder.

use crate::pulse::PulseWidth;

/// A single ESC signal pin that can be set to a pulse width.
pub trait PulseOutput {
    type Error;

    /// Start pulses of `width` on the pin ([`PulseWidth::OFF`] stops them).
    fn set_pulse_width(&mut self, width: PulseWidth) -> Result<(), Self::Error>;

    /// Stop pulses on the pin.
    fn off(&mut self) -> Result<(), Self::Error> {
        self.set_pulse_width(PulseWidth::OFF)
    }
}

impl<T: PulseOutput + ?Sized> PulseOutput for &mut T {
    type Error = T::Error;

    fn set_pulse_width(&mut self, width: PulseWidth) -> Result<(), Self::Error> {
        (**self).set_pulse_width(width)
    }
}
