//! Free-running 16-bit timer with software overflow counting.
//!
//! The hardware counter only spans 65536 ticks, so elapsed time beyond that is
//! reconstructed from an overflow tally that the measuring loop keeps by
//! sampling the timer's overflow flag. The tally is only correct when
//! [`OverflowCounter::poll_overflow`] runs at least once per counter period;
//! a loop that stalls longer loses an overflow and reads low.

/// Number of ticks in one full period of the 16-bit counter.
pub const COUNTER_SPAN: u64 = 1 << 16;

/// Clock source of the measurement timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBase {
    clock_hz: u32,
    prescaler: u16,
}

impl TimeBase {
    pub const fn new(clock_hz: u32, prescaler: u16) -> Self {
        Self { clock_hz, prescaler }
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub fn prescaler(&self) -> u16 {
        self.prescaler
    }

    /// Timer ticks per second. Never zero.
    pub fn tick_hz(&self) -> u32 {
        (self.clock_hz / u32::from(self.prescaler.max(1))).max(1)
    }

    /// Duration of a single tick in seconds
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_hz() as f32
    }

    pub fn ticks_to_seconds(&self, ticks: u64) -> f32 {
        ticks as f32 / self.tick_hz() as f32
    }

    pub fn ticks_to_millis(&self, ticks: u64) -> f32 {
        self.ticks_to_seconds(ticks) * 1000.0
    }

    /// Whole ticks elapsed in `us` microseconds, rounded down
    pub fn micros_to_ticks(&self, us: u32) -> u64 {
        u64::from(us) * u64::from(self.tick_hz()) / 1_000_000
    }
}

/// Hardware seam for a free-running 16-bit counter with an overflow flag.
pub trait OverflowTimer {
    /// Halt the counter, zero it and clear any pending overflow flag.
    fn reset(&mut self);

    /// Begin counting from the current value.
    fn start(&mut self);

    /// Halt the counter, keeping its value.
    fn stop(&mut self);

    /// Current raw counter value.
    fn count(&self) -> u16;

    /// Returns whether the overflow flag was set, clearing it if so.
    fn take_overflow(&mut self) -> bool;
}

/// Elapsed ticks represented by a raw counter value and an overflow tally.
#[inline]
pub fn elapsed_ticks(raw_ticks: u16, overflow_count: u32) -> u64 {
    u64::from(overflow_count) * COUNTER_SPAN + u64::from(raw_ticks)
}

/// Final state of one timing run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub raw_ticks: u16,
    pub overflow_count: u32,
}

impl CounterSnapshot {
    pub fn ticks(&self) -> u64 {
        elapsed_ticks(self.raw_ticks, self.overflow_count)
    }
}

/// Extends a 16-bit [`OverflowTimer`] by counting overflows in software.
///
/// Owns the timer exclusively for as long as it lives; hand the timer back
/// with [`OverflowCounter::release`].
pub struct OverflowCounter<T> {
    timer: T,
    overflow_count: u32,
}

impl<T: OverflowTimer> OverflowCounter<T> {
    pub fn new(mut timer: T) -> Self {
        timer.reset();
        Self {
            timer,
            overflow_count: 0,
        }
    }

    /// Zero the tick register and the overflow tally, then start counting.
    pub fn start(&mut self) {
        self.timer.reset();
        self.overflow_count = 0;
        self.timer.start();
    }

    /// Account for a pending overflow. Call from every busy-loop iteration.
    #[inline]
    pub fn poll_overflow(&mut self) {
        if self.timer.take_overflow() {
            self.overflow_count = self.overflow_count.wrapping_add(1);
        }
    }

    /// Halt counting and return the final tick count.
    pub fn stop(&mut self) -> CounterSnapshot {
        self.timer.stop();
        // An overflow may have landed after the last poll
        self.poll_overflow();
        CounterSnapshot {
            raw_ticks: self.timer.count(),
            overflow_count: self.overflow_count,
        }
    }

    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    pub fn release(mut self) -> T {
        self.timer.reset();
        self.timer
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::{Delay, Timer1};

#[cfg(target_arch = "avr")]
mod avr {
    use super::OverflowTimer;
    use avr_device::atmega128a::{TC0, TC1, TC2};
    use embedded_hal::blocking::delay::{DelayMs, DelayUs};

    // TIFR bit shared by Timer1
    const TOV1: u8 = 1 << 2;
    // CS12:0 = 010, clk/8
    const TIMER1_CLK_DIV8: u8 = 0x02;
    // CSx2:0 = 010 on Timer0/Timer2, clk/8 (2 ticks per microsecond at 16MHz)
    const TIMER8_CLK_DIV8: u8 = 0x02;
    const TIMER8_TICKS_PER_US: u32 = 2;
    const DELAY_CHUNK_US: u32 = 100;

    /// Timer1 in normal mode, used as the measurement counter.
    pub struct Timer1 {
        tc1: TC1,
    }

    impl Timer1 {
        pub fn new(tc1: TC1) -> Self {
            unsafe {
                // Normal mode, stopped
                tc1.tccr1a.write(|w| w.bits(0));
                tc1.tccr1b.write(|w| w.bits(0));
            }
            Self { tc1 }
        }
    }

    impl OverflowTimer for Timer1 {
        fn reset(&mut self) {
            unsafe {
                self.tc1.tccr1b.write(|w| w.bits(0));
                self.tc1.tcnt1.write(|w| w.bits(0));
                // Flag is cleared by writing a one
                self.tc1.tifr.write(|w| w.bits(TOV1));
            }
        }

        fn start(&mut self) {
            unsafe {
                self.tc1.tccr1b.write(|w| w.bits(TIMER1_CLK_DIV8));
            }
        }

        fn stop(&mut self) {
            unsafe {
                self.tc1.tccr1b.write(|w| w.bits(0));
            }
        }

        fn count(&self) -> u16 {
            self.tc1.tcnt1.read().bits()
        }

        fn take_overflow(&mut self) -> bool {
            if self.tc1.tifr.read().bits() & TOV1 != 0 {
                unsafe {
                    self.tc1.tifr.write(|w| w.bits(TOV1));
                }
                true
            } else {
                false
            }
        }
    }

    /// Busy-wait delay on one of the 8-bit timers (Timer0 or Timer2).
    pub struct Delay<TC> {
        tc: TC,
    }

    macro_rules! impl_delay {
        ($TC:ident, $tccr:ident, $tcnt:ident) => {
            impl Delay<$TC> {
                pub fn new(tc: $TC) -> Self {
                    unsafe {
                        tc.$tccr.write(|w| w.bits(0));
                        tc.$tcnt.write(|w| w.bits(0));
                    }
                    Self { tc }
                }

                pub fn release(self) -> $TC {
                    self.tc
                }

                fn wait_ticks(&mut self, ticks: u8) {
                    unsafe {
                        self.tc.$tcnt.write(|w| w.bits(0));
                        self.tc.$tccr.write(|w| w.bits(TIMER8_CLK_DIV8));
                    }
                    while self.tc.$tcnt.read().bits() < ticks {}
                    unsafe {
                        self.tc.$tccr.write(|w| w.bits(0));
                    }
                }
            }

            impl DelayUs<u32> for Delay<$TC> {
                fn delay_us(&mut self, us: u32) {
                    for _ in 0..us / DELAY_CHUNK_US {
                        self.wait_ticks((DELAY_CHUNK_US * TIMER8_TICKS_PER_US) as u8);
                    }
                    let rest = us % DELAY_CHUNK_US;
                    if rest > 0 {
                        self.wait_ticks((rest * TIMER8_TICKS_PER_US) as u8);
                    }
                }
            }

            impl DelayUs<u16> for Delay<$TC> {
                fn delay_us(&mut self, us: u16) {
                    DelayUs::<u32>::delay_us(self, u32::from(us));
                }
            }

            impl DelayMs<u16> for Delay<$TC> {
                fn delay_ms(&mut self, ms: u16) {
                    for _ in 0..ms {
                        DelayUs::<u32>::delay_us(self, 1000);
                    }
                }
            }
        };
    }

    impl_delay!(TC0, tccr0, tcnt0);
    impl_delay!(TC2, tccr2, tcnt2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimClock, SimTimer};

    #[test]
    fn elapsed_ticks_is_exact() {
        assert_eq!(elapsed_ticks(0, 0), 0);
        assert_eq!(elapsed_ticks(1234, 0), 1234);
        assert_eq!(elapsed_ticks(0, 1), 65536);
        assert_eq!(elapsed_ticks(65535, 3), 3 * 65536 + 65535);
        assert_eq!(
            elapsed_ticks(u16::MAX, u32::MAX),
            u64::from(u32::MAX) * 65536 + 65535
        );
    }

    #[test]
    fn timebase_conversions() {
        let tb = TimeBase::new(16_000_000, 8);
        assert_eq!(tb.tick_hz(), 2_000_000);
        assert!((tb.tick_seconds() - 0.5e-6).abs() < 1e-12);
        assert!((tb.ticks_to_seconds(40_000) - 0.02).abs() < 1e-7);
        assert!((tb.ticks_to_millis(10_000) - 5.0).abs() < 1e-4);
        assert_eq!(tb.micros_to_ticks(5_000), 10_000);
    }

    #[test]
    fn timebase_never_divides_by_zero() {
        let tb = TimeBase::new(0, 0);
        assert_eq!(tb.tick_hz(), 1);
    }

    #[test]
    fn counter_accumulates_overflows() {
        let clock = SimClock::new(1);
        let mut counter = OverflowCounter::new(SimTimer::new(&clock));

        counter.start();
        for _ in 0..3 {
            clock.advance(40_000);
            counter.poll_overflow();
            clock.advance(30_000);
            counter.poll_overflow();
        }
        let snap = counter.stop();

        assert_eq!(snap.overflow_count, 3);
        assert_eq!(snap.ticks(), 210_000);
    }

    #[test]
    fn start_resets_previous_run() {
        let clock = SimClock::new(1);
        let mut counter = OverflowCounter::new(SimTimer::new(&clock));

        counter.start();
        clock.advance(70_000);
        counter.poll_overflow();
        counter.stop();
        assert_eq!(counter.overflow_count(), 1);

        counter.start();
        clock.advance(100);
        let snap = counter.stop();
        assert_eq!(snap, CounterSnapshot { raw_ticks: 100, overflow_count: 0 });
    }

    #[test]
    fn stop_counts_overflow_after_last_poll() {
        let clock = SimClock::new(1);
        let mut counter = OverflowCounter::new(SimTimer::new(&clock));

        counter.start();
        clock.advance(65_536 + 10);
        let snap = counter.stop();
        assert_eq!(snap.ticks(), 65_546);
    }

    #[test]
    fn stalled_poll_loses_overflows() {
        let clock = SimClock::new(1);
        let mut counter = OverflowCounter::new(SimTimer::new(&clock));

        counter.start();
        clock.advance(2 * 65_536 + 5);
        counter.poll_overflow();
        let snap = counter.stop();

        // Two wraps collapsed into one flag
        assert_eq!(snap.overflow_count, 1);
        assert_eq!(snap.ticks(), 65_536 + 5);
    }

    #[test]
    fn counter_frozen_after_stop() {
        let clock = SimClock::new(1);
        let mut counter = OverflowCounter::new(SimTimer::new(&clock));

        counter.start();
        clock.advance(500);
        let first = counter.stop();
        clock.advance(500);
        let timer = counter.release();
        assert_eq!(first.raw_ticks, 500);
        assert_eq!(timer.count(), 0);
    }
}
