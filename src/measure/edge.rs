//! Busy-poll edge detection on a digital input.

use embedded_hal::digital::v2::InputPin;

use crate::hal::timer::{OverflowCounter, OverflowTimer};

/// Block until `pin` completes a low-to-high transition after a full cycle.
///
/// The pin is first awaited high, then low, then high again, so the call
/// returns at a rising zero-cross even when entered in the middle of a high
/// phase. There is no timeout: a line that never toggles hangs here.
pub fn wait_for_cycle<P: InputPin>(pin: &P) -> Result<(), P::Error> {
    while pin.is_low()? {}
    while pin.is_high()? {}
    while pin.is_low()? {}
    Ok(())
}

/// Spin while `pin` reads `level`, polling the overflow flag every iteration.
#[inline]
pub(crate) fn poll_while<P, T>(
    pin: &P,
    level: bool,
    counter: &mut OverflowCounter<T>,
) -> Result<(), P::Error>
where
    P: InputPin,
    T: OverflowTimer,
{
    while pin.is_high()? == level {
        counter.poll_overflow();
    }
    Ok(())
}
