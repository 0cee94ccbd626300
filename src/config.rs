//! Configuration constants for the phase meter firmware

use crate::hal::timer::TimeBase;
use crate::logger::Level;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Timer1 prescaler used for signal timing (16MHz/8 = 2MHz, 0.5us ticks)
pub const TIMER_PRESCALER: u16 = 8;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// MCP3008 reference voltage in volts
pub const ADC_VREF: f32 = 4.096;

/// Full-scale code of the 10-bit ADC
pub const ADC_FULL_SCALE: u16 = 1023;

/// ADC channel wired to the reference signal
pub const REF_CHANNEL: u8 = 0;

/// ADC channel wired to the signal under test
pub const TEST_CHANNEL: u8 = 1;

/// ADC channel wired to the temperature sensor
pub const TEMP_CHANNEL: u8 = 0;

/// Characters per LCD line
pub const CHARS_PER_LINE: usize = 16;

/// Phase correction in degrees applied to leading readings (raw delay past
/// half a period).
/// Calibrated against an oscilloscope on the lab bench.
pub const PHASE_CORRECTION_DEG: f32 = 2.7;

/// Peak to RMS factor for sine-like signals (sqrt(2)/2)
pub const RMS_FACTOR: f32 = 0.707107;

/// Pause between control loop cycles in milliseconds
pub const LOOP_PAUSE_MS: u16 = 100;

/// Room is reported COLD below this temperature (celsius)
pub const ROOM_COLD_BELOW_C: f32 = 22.0;

/// Room is reported HOT above this temperature (celsius)
pub const ROOM_HOT_ABOVE_C: f32 = 30.0;

/// Minimum level written by the serial logger
pub const LOG_LEVEL: Level = Level::Info;

/// Runtime parameters of the phase meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeterConfig {
    pub timebase: TimeBase,
    pub vref: f32,
    pub reference_channel: u8,
    pub test_channel: u8,
    pub phase_correction_deg: f32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            timebase: TimeBase::new(CPU_FREQ_HZ, TIMER_PRESCALER),
            vref: ADC_VREF,
            reference_channel: REF_CHANNEL,
            test_channel: TEST_CHANNEL,
            phase_correction_deg: PHASE_CORRECTION_DEG,
        }
    }
}

/// Runtime parameters of the thermometer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermometerConfig {
    pub vref: f32,
    pub channel: u8,
    pub cold_below_c: f32,
    pub hot_above_c: f32,
}

impl Default for ThermometerConfig {
    fn default() -> Self {
        Self {
            vref: ADC_VREF,
            channel: TEMP_CHANNEL,
            cold_below_c: ROOM_COLD_BELOW_C,
            hot_above_c: ROOM_HOT_ABOVE_C,
        }
    }
}
