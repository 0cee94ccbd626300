//! Control loop programs: the phase meter and the room thermometer
//!
//! Each `step` runs one iteration of the firmware's main loop: measure,
//! report over serial, update the LCD. A cycle that produced no valid
//! reading is logged and skipped; the caller simply calls `step` again.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::InputPin;
use ufmt::uWrite;

use crate::config::{MeterConfig, ThermometerConfig};
use crate::drivers::{AnalogInput, TextDisplay};
use crate::error::CycleError;
use crate::hal::timer::{OverflowCounter, OverflowTimer};
use crate::logger::{Level, Logger};
use crate::measure::{measure_period, measure_phase, wait_for_cycle, PeriodSample};
use crate::reading::{AdcSample, Snapshot, VoltageReading};
use crate::report;
use crate::thermometer::TemperatureReading;

/// Frequency, RMS voltages and phase of a reference and a test signal.
pub struct PhaseMeter<REF, TEST, T, ADC, D> {
    reference: REF,
    test: TEST,
    counter: OverflowCounter<T>,
    adc: ADC,
    delay: D,
    config: MeterConfig,
}

impl<REF, TEST, T, ADC, D> PhaseMeter<REF, TEST, T, ADC, D>
where
    REF: InputPin,
    TEST: InputPin<Error = REF::Error>,
    T: OverflowTimer,
    ADC: AnalogInput,
    D: DelayUs<u32>,
{
    pub fn new(reference: REF, test: TEST, timer: T, adc: ADC, delay: D, config: MeterConfig) -> Self {
        Self {
            reference,
            test,
            counter: OverflowCounter::new(timer),
            adc,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// One full measurement: period, both peaks, then phase.
    pub fn measure(&mut self) -> Result<Snapshot, CycleError<REF::Error, ADC::Error>> {
        let timebase = self.config.timebase;
        let period = measure_period(&self.reference, &mut self.counter, &timebase)?;

        let reference_peak = sample_peak(
            &self.reference,
            &mut self.adc,
            &mut self.delay,
            self.config.reference_channel,
            &period,
            self.config.vref,
        )?;
        let test_peak = sample_peak(
            &self.test,
            &mut self.adc,
            &mut self.delay,
            self.config.test_channel,
            &period,
            self.config.vref,
        )?;

        let phase = measure_phase(
            &self.reference,
            &self.test,
            &mut self.counter,
            &timebase,
            &period,
            self.config.phase_correction_deg,
        )?;

        Ok(Snapshot::assemble(&period, reference_peak, test_peak, phase))
    }

    /// Measure and report one cycle.
    pub fn step<W, L>(&mut self, console: &mut W, display: &mut L, logger: &Logger) -> Option<Snapshot>
    where
        W: uWrite,
        L: TextDisplay,
    {
        match self.measure() {
            Ok(snapshot) => {
                report::write_snapshot(console, &snapshot).ok();
                if report::show_snapshot(display, &snapshot).is_err() {
                    logger.error(console, "lcd write failed").ok();
                }
                Some(snapshot)
            }
            Err(CycleError::Invalid(invalid)) => {
                logger
                    .log_value(console, Level::Warn, "cycle skipped", invalid.as_str())
                    .ok();
                None
            }
            Err(CycleError::Signal(_)) => {
                logger.error(console, "signal read failed").ok();
                None
            }
            Err(CycleError::Adc(_)) => {
                logger.error(console, "adc read failed").ok();
                None
            }
        }
    }

    /// Idle between cycles on the meter's own delay.
    pub fn pause_ms(&mut self, ms: u16) {
        self.delay.delay_us(u32::from(ms) * 1000);
    }

    pub fn release(self) -> (REF, TEST, T, ADC, D) {
        (
            self.reference,
            self.test,
            self.counter.release(),
            self.adc,
            self.delay,
        )
    }
}

/// Sample `channel` a quarter period after `signal`'s rising zero-cross,
/// where a sine-like signal peaks.
fn sample_peak<P, ADC, D>(
    signal: &P,
    adc: &mut ADC,
    delay: &mut D,
    channel: u8,
    period: &PeriodSample,
    vref: f32,
) -> Result<VoltageReading, CycleError<P::Error, ADC::Error>>
where
    P: InputPin,
    ADC: AnalogInput,
    D: DelayUs<u32>,
{
    wait_for_cycle(signal).map_err(CycleError::Signal)?;
    delay.delay_us(period.quarter_micros());
    let raw = adc.read_channel(channel).map_err(CycleError::Adc)?;
    Ok(AdcSample::new(channel, raw).voltage(vref))
}

/// Room temperature with a COLD/IDLE/HOT verdict.
pub struct Thermometer<ADC> {
    adc: ADC,
    config: ThermometerConfig,
}

impl<ADC: AnalogInput> Thermometer<ADC> {
    pub fn new(adc: ADC, config: ThermometerConfig) -> Self {
        Self { adc, config }
    }

    pub fn sample(&mut self) -> Result<TemperatureReading, ADC::Error> {
        let raw = self.adc.read_channel(self.config.channel)?;
        let voltage = AdcSample::new(self.config.channel, raw).voltage(self.config.vref);
        Ok(TemperatureReading::from_voltage(voltage, &self.config))
    }

    pub fn step<W, L>(&mut self, console: &mut W, display: &mut L, logger: &Logger) -> Option<TemperatureReading>
    where
        W: uWrite,
        L: TextDisplay,
    {
        match self.sample() {
            Ok(reading) => {
                report::write_temperature(console, &reading).ok();
                if report::show_temperature(display, &reading).is_err() {
                    logger.error(console, "lcd write failed").ok();
                }
                Some(reading)
            }
            Err(_) => {
                logger.error(console, "adc read failed").ok();
                None
            }
        }
    }

    pub fn release(self) -> ADC {
        self.adc
    }
}
