use embedded_hal::digital::v2::InputPin;

use super::edge::{poll_while, wait_for_cycle};
use super::period::PeriodSample;
use crate::error::MeasureError;
use crate::hal::timer::{OverflowCounter, OverflowTimer, TimeBase};

/// Phase of the test signal relative to the reference, in (-180, 180] degrees.
///
/// Negative values mean the test signal lags the reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSample {
    degrees: f32,
}

impl PhaseSample {
    pub const ZERO: PhaseSample = PhaseSample { degrees: 0.0 };

    /// Phase from the delay between the reference zero-cross and the test
    /// signal's next zero-cross.
    pub fn from_delay(elapsed_ms: f32, period: &PeriodSample, correction_deg: f32) -> Self {
        if elapsed_ms == 0.0 {
            return Self::ZERO;
        }
        let raw = raw_angle(elapsed_ms, period.millis());
        Self {
            degrees: normalize_phase(raw, correction_deg),
        }
    }

    pub fn degrees(&self) -> f32 {
        self.degrees
    }
}

/// Delay expressed as an angle of the reference period. `period_ms` must be positive.
#[inline]
pub fn raw_angle(elapsed_ms: f32, period_ms: f32) -> f32 {
    elapsed_ms * 360.0 / period_ms
}

/// Fold a raw delay angle into a signed phase.
///
/// Delays past half a period are read as the test signal leading, with
/// `correction_deg` added to cancel the bench's systematic bias. The result
/// is wrapped into (-180, 180] in case the correction pushes it over.
pub fn normalize_phase(raw_deg: f32, correction_deg: f32) -> f32 {
    let phase = if raw_deg > 180.0 {
        360.0 - raw_deg + correction_deg
    } else {
        -raw_deg
    };
    wrap_degrees(phase)
}

fn wrap_degrees(deg: f32) -> f32 {
    let mut wrapped = deg % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Measure the phase of `test` against `reference`.
///
/// Both signals must run at the frequency that produced `period`; this is
/// not checked.
pub fn measure_phase<R, S, T>(
    reference: &R,
    test: &S,
    counter: &mut OverflowCounter<T>,
    timebase: &TimeBase,
    period: &PeriodSample,
    correction_deg: f32,
) -> Result<PhaseSample, MeasureError<R::Error>>
where
    R: InputPin,
    S: InputPin<Error = R::Error>,
    T: OverflowTimer,
{
    wait_for_cycle(reference).map_err(MeasureError::Signal)?;
    counter.start();
    // High phase, low phase, then stop as the test signal rises again
    poll_while(test, true, counter).map_err(MeasureError::Signal)?;
    poll_while(test, false, counter).map_err(MeasureError::Signal)?;
    let snapshot = counter.stop();

    let elapsed_ms = timebase.ticks_to_millis(snapshot.ticks());
    Ok(PhaseSample::from_delay(elapsed_ms, period, correction_deg))
}
