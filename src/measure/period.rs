use embedded_hal::digital::v2::InputPin;

use super::edge::{poll_while, wait_for_cycle};
use crate::error::{Invalid, MeasureError};
use crate::hal::timer::{OverflowCounter, OverflowTimer, TimeBase};

/// Period of the reference signal. Always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodSample {
    seconds: f32,
}

impl PeriodSample {
    pub fn from_seconds(seconds: f32) -> Result<Self, Invalid> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self { seconds })
        } else {
            Err(Invalid::NonPositivePeriod)
        }
    }

    pub fn from_ticks(ticks: u64, timebase: &TimeBase) -> Result<Self, Invalid> {
        if ticks == 0 {
            return Err(Invalid::ZeroPeriod);
        }
        Self::from_seconds(timebase.ticks_to_seconds(ticks))
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    pub fn millis(&self) -> f32 {
        self.seconds * 1000.0
    }

    pub fn frequency_hz(&self) -> f32 {
        1.0 / self.seconds
    }

    /// A quarter period in whole microseconds, the peak of a sine-like
    /// signal after its rising zero-cross.
    pub fn quarter_micros(&self) -> u32 {
        (self.seconds * 250_000.0 + 0.5) as u32
    }
}

/// Time one full cycle of `signal`, rising edge to rising edge.
pub fn measure_period<P, T>(
    signal: &P,
    counter: &mut OverflowCounter<T>,
    timebase: &TimeBase,
) -> Result<PeriodSample, MeasureError<P::Error>>
where
    P: InputPin,
    T: OverflowTimer,
{
    wait_for_cycle(signal).map_err(MeasureError::Signal)?;
    counter.start();
    poll_while(signal, true, counter).map_err(MeasureError::Signal)?;
    poll_while(signal, false, counter).map_err(MeasureError::Signal)?;
    let snapshot = counter.stop();

    Ok(PeriodSample::from_ticks(snapshot.ticks(), timebase)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimClock, SimSignal, SimTimer, Waveform};

    const TB: TimeBase = TimeBase::new(16_000_000, 8);

    fn measure(period_ticks: u64, poll_step: u64) -> PeriodSample {
        let clock = SimClock::new(poll_step);
        let signal = SimSignal::new(&clock, Waveform::square(period_ticks));
        let mut counter = OverflowCounter::new(SimTimer::new(&clock));
        clock.advance(period_ticks / 3);
        measure_period(&signal, &mut counter, &TB).unwrap()
    }

    #[test]
    fn fifty_hertz() {
        let period = measure(40_000, 10);
        assert!((period.seconds() - 0.02).abs() < 0.02 * 1e-3);
        assert!((period.frequency_hz() - 50.0).abs() < 0.05);
    }

    #[test]
    fn period_longer_than_counter_span() {
        // 10 Hz spans three overflows of the 16-bit counter
        let period = measure(200_000, 10);
        assert!((period.seconds() - 0.1).abs() < 0.1 * 1e-3);
    }

    #[test]
    fn one_kilohertz() {
        let period = measure(2_000, 2);
        assert!((period.frequency_hz() - 1000.0).abs() < 2.0);
    }

    #[test]
    fn zero_ticks_is_invalid() {
        assert_eq!(PeriodSample::from_ticks(0, &TB), Err(Invalid::ZeroPeriod));
    }

    #[test]
    fn non_positive_seconds_are_invalid() {
        assert_eq!(
            PeriodSample::from_seconds(0.0),
            Err(Invalid::NonPositivePeriod)
        );
        assert_eq!(
            PeriodSample::from_seconds(-0.02),
            Err(Invalid::NonPositivePeriod)
        );
        assert_eq!(
            PeriodSample::from_seconds(f32::NAN),
            Err(Invalid::NonPositivePeriod)
        );
        assert_eq!(
            PeriodSample::from_seconds(f32::INFINITY),
            Err(Invalid::NonPositivePeriod)
        );
    }

    #[test]
    fn quarter_period() {
        let period = PeriodSample::from_seconds(0.02).unwrap();
        assert_eq!(period.quarter_micros(), 5_000);
        assert!((period.millis() - 20.0).abs() < 1e-4);
    }
}
