//! Conversion of raw samples into the readings reported each cycle

use crate::config::{ADC_FULL_SCALE, RMS_FACTOR};
use crate::measure::{PeriodSample, PhaseSample};

/// One ADC conversion result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdcSample {
    raw: u16,
    channel: u8,
}

impl AdcSample {
    /// Codes above full scale are clamped to it.
    pub fn new(channel: u8, raw: u16) -> Self {
        Self {
            raw: raw.min(ADC_FULL_SCALE),
            channel,
        }
    }

    pub fn raw(&self) -> u16 {
        self.raw
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn voltage(&self, vref: f32) -> VoltageReading {
        VoltageReading::from_code(self.raw, vref)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoltageReading {
    volts: f32,
}

impl VoltageReading {
    pub fn new(volts: f32) -> Self {
        Self { volts }
    }

    pub fn from_code(raw: u16, vref: f32) -> Self {
        Self {
            volts: f32::from(raw) * vref / f32::from(ADC_FULL_SCALE),
        }
    }

    pub fn volts(&self) -> f32 {
        self.volts
    }

    /// RMS value, treating this reading as the peak of a sine
    pub fn rms(&self) -> f32 {
        rms_from_peak(self.volts)
    }
}

#[inline]
pub fn rms_from_peak(peak_volts: f32) -> f32 {
    peak_volts * RMS_FACTOR
}

/// Everything reported for one measurement cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub frequency_hz: f32,
    pub reference_rms_volts: f32,
    pub test_rms_volts: f32,
    pub phase_degrees: f32,
}

impl Snapshot {
    pub fn assemble(
        period: &PeriodSample,
        reference_peak: VoltageReading,
        test_peak: VoltageReading,
        phase: PhaseSample,
    ) -> Self {
        Self {
            frequency_hz: period.frequency_hz(),
            reference_rms_volts: reference_peak.rms(),
            test_rms_volts: test_peak.rms(),
            phase_degrees: phase.degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_representative_peaks() {
        for peak in [0.0f32, 1.0, 3.3, 4.096] {
            assert!((rms_from_peak(peak) - peak * 0.707107).abs() < 1e-5);
        }
    }

    #[test]
    fn code_to_volts() {
        let reading = AdcSample::new(0, 512).voltage(4.096);
        assert!((reading.volts() - 2.0500).abs() < 1e-3);
        assert!((reading.rms() - 1.4496).abs() < 1e-3);
    }

    #[test]
    fn full_scale_is_vref() {
        let reading = VoltageReading::from_code(1023, 3.3);
        assert!((reading.volts() - 3.3).abs() < 1e-6);
        assert_eq!(VoltageReading::from_code(0, 3.3).volts(), 0.0);
    }

    #[test]
    fn codes_clamped_to_ten_bits() {
        let sample = AdcSample::new(5, 2000);
        assert_eq!(sample.raw(), 1023);
        assert_eq!(sample.channel(), 5);
    }

    #[test]
    fn snapshot_from_samples() {
        let period = PeriodSample::from_seconds(0.02).unwrap();
        let phase = PhaseSample::from_delay(5.0, &period, 2.7);
        let snap = Snapshot::assemble(
            &period,
            VoltageReading::new(1.0),
            VoltageReading::new(2.0),
            phase,
        );
        assert!((snap.frequency_hz - 50.0).abs() < 1e-3);
        assert!((snap.reference_rms_volts - 0.707107).abs() < 1e-5);
        assert!((snap.test_rms_volts - 1.414214).abs() < 1e-5);
        assert!((snap.phase_degrees + 90.0).abs() < 1e-4);
    }
}
