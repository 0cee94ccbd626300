//! Simulated bench for running the measurement loop off-target.
//!
//! Everything hangs off a [`SimClock`] counting timer ticks. Each read of a
//! [`SimSignal`] advances the clock by a fixed step, standing in for the time a
//! busy-poll iteration takes on the real part, so the timing loops observe
//! edges the same way they would on hardware.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::InputPin;

use crate::drivers::AnalogInput;
use crate::hal::timer::{OverflowTimer, TimeBase, COUNTER_SPAN};

/// Shared tick counter of the simulated bench.
pub struct SimClock {
    now: Cell<u64>,
    poll_step: u64,
}

impl SimClock {
    /// `poll_step` is the number of ticks one pin read takes.
    pub const fn new(poll_step: u64) -> Self {
        Self {
            now: Cell::new(0),
            poll_step,
        }
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ticks: u64) {
        self.now.set(self.now.get() + ticks);
    }

    /// Current time, then advance by one poll step.
    fn sample(&self) -> u64 {
        let t = self.now.get();
        self.advance(self.poll_step);
        t
    }
}

/// Level pattern of a simulated digital input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    /// Never toggles
    Constant(bool),
    /// Square wave rising at `lag` (mod `period`) and high for `high` ticks
    Square { period: u64, lag: u64, high: u64 },
}

impl Waveform {
    /// 50% duty square wave with a rising edge at t = 0
    pub fn square(period: u64) -> Self {
        Self::lagging(period, 0)
    }

    /// 50% duty square wave whose rising edges trail t = 0 by `lag` ticks
    pub fn lagging(period: u64, lag: u64) -> Self {
        Waveform::Square {
            period,
            lag,
            high: period / 2,
        }
    }

    pub fn level_at(&self, t: u64) -> bool {
        match *self {
            Waveform::Constant(level) => level,
            Waveform::Square { period, lag, high } => {
                if period == 0 {
                    return false;
                }
                let phase = (t + period - lag % period) % period;
                phase < high
            }
        }
    }
}

/// Digital input following a [`Waveform`] on the bench clock.
pub struct SimSignal<'a> {
    clock: &'a SimClock,
    waveform: Waveform,
}

impl<'a> SimSignal<'a> {
    pub fn new(clock: &'a SimClock, waveform: Waveform) -> Self {
        Self { clock, waveform }
    }
}

impl InputPin for SimSignal<'_> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.waveform.level_at(self.clock.sample()))
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// 16-bit counter driven by the bench clock, with a single overflow flag.
pub struct SimTimer<'a> {
    clock: &'a SimClock,
    origin: u64,
    frozen: u64,
    running: bool,
    acknowledged: u64,
}

impl<'a> SimTimer<'a> {
    pub fn new(clock: &'a SimClock) -> Self {
        Self {
            clock,
            origin: 0,
            frozen: 0,
            running: false,
            acknowledged: 0,
        }
    }

    fn elapsed(&self) -> u64 {
        if self.running {
            self.clock.now() - self.origin
        } else {
            self.frozen
        }
    }
}

impl OverflowTimer for SimTimer<'_> {
    fn reset(&mut self) {
        self.running = false;
        self.frozen = 0;
        self.acknowledged = 0;
    }

    fn start(&mut self) {
        if !self.running {
            self.origin = self.clock.now() - self.frozen;
            self.running = true;
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.frozen = self.clock.now() - self.origin;
            self.running = false;
        }
    }

    fn count(&self) -> u16 {
        (self.elapsed() % COUNTER_SPAN) as u16
    }

    fn take_overflow(&mut self) -> bool {
        // Like the hardware flag, several wraps between polls read as one
        let wraps = self.elapsed() / COUNTER_SPAN;
        if wraps > self.acknowledged {
            self.acknowledged = wraps;
            true
        } else {
            false
        }
    }
}

/// ADC returning a fixed code per channel.
pub struct SimAdc {
    codes: [u16; 8],
    conversions: u32,
}

impl SimAdc {
    pub fn new(codes: [u16; 8]) -> Self {
        Self {
            codes,
            conversions: 0,
        }
    }

    pub fn set_code(&mut self, channel: u8, code: u16) {
        if let Some(slot) = self.codes.get_mut(usize::from(channel)) {
            *slot = code;
        }
    }

    pub fn conversions(&self) -> u32 {
        self.conversions
    }
}

impl AnalogInput for SimAdc {
    type Error = Infallible;

    fn read_channel(&mut self, channel: u8) -> Result<u16, Self::Error> {
        self.conversions += 1;
        Ok(self.codes.get(usize::from(channel)).copied().unwrap_or(0))
    }
}

/// Delay that advances the bench clock instead of spinning.
pub struct SimDelay<'a> {
    clock: &'a SimClock,
    timebase: TimeBase,
}

impl<'a> SimDelay<'a> {
    pub fn new(clock: &'a SimClock, timebase: TimeBase) -> Self {
        Self { clock, timebase }
    }
}

impl DelayUs<u32> for SimDelay<'_> {
    fn delay_us(&mut self, us: u32) {
        self.clock.advance(self.timebase.micros_to_ticks(us));
    }
}

impl DelayUs<u16> for SimDelay<'_> {
    fn delay_us(&mut self, us: u16) {
        DelayUs::<u32>::delay_us(self, u32::from(us));
    }
}

impl DelayMs<u16> for SimDelay<'_> {
    fn delay_ms(&mut self, ms: u16) {
        DelayUs::<u32>::delay_us(self, u32::from(ms) * 1000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_wave_levels() {
        let wave = Waveform::square(100);
        assert!(wave.level_at(0));
        assert!(wave.level_at(49));
        assert!(!wave.level_at(50));
        assert!(!wave.level_at(99));
        assert!(wave.level_at(100));
    }

    #[test]
    fn lagging_wave_rises_late() {
        let wave = Waveform::lagging(100, 25);
        assert!(!wave.level_at(24));
        assert!(wave.level_at(25));
        assert!(wave.level_at(74));
        assert!(!wave.level_at(75));
    }

    #[test]
    fn pin_read_advances_clock() {
        let clock = SimClock::new(7);
        let pin = SimSignal::new(&clock, Waveform::Constant(true));
        assert_eq!(pin.is_high(), Ok(true));
        assert_eq!(pin.is_low(), Ok(false));
        assert_eq!(clock.now(), 14);
    }

    #[test]
    fn delay_advances_clock_in_ticks() {
        let clock = SimClock::new(1);
        let mut delay = SimDelay::new(&clock, TimeBase::new(16_000_000, 8));
        DelayUs::<u32>::delay_us(&mut delay, 5);
        assert_eq!(clock.now(), 10);
        delay.delay_ms(1u16);
        assert_eq!(clock.now(), 2010);
    }

    #[test]
    fn adc_counts_conversions() {
        let mut adc = SimAdc::new([0; 8]);
        adc.set_code(3, 700);
        assert_eq!(adc.read_channel(3), Ok(700));
        assert_eq!(adc.read_channel(9), Ok(0));
        assert_eq!(adc.conversions(), 2);
    }
}
