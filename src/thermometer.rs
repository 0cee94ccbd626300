//! Room temperature from an LM335 on the ADC (10 mV per kelvin)

use crate::config::ThermometerConfig;
use crate::reading::VoltageReading;

const KELVIN_PER_VOLT: f32 = 100.0;
// Offset used by the lab's calibration, not exactly 273.15
const KELVIN_OFFSET: f32 = 273.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomState {
    Cold,
    Idle,
    Hot,
}

impl RoomState {
    pub fn classify(celsius: f32, config: &ThermometerConfig) -> Self {
        if celsius < config.cold_below_c {
            RoomState::Cold
        } else if celsius > config.hot_above_c {
            RoomState::Hot
        } else {
            RoomState::Idle
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoomState::Cold => "COLD",
            RoomState::Idle => "IDLE",
            RoomState::Hot => "HOT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f32,
    pub state: RoomState,
}

impl TemperatureReading {
    pub fn from_voltage(voltage: VoltageReading, config: &ThermometerConfig) -> Self {
        let celsius = celsius_from_volts(voltage.volts());
        Self {
            celsius,
            state: RoomState::classify(celsius, config),
        }
    }
}

#[inline]
pub fn celsius_from_volts(volts: f32) -> f32 {
    KELVIN_PER_VOLT * volts - KELVIN_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_volts_to_celsius() {
        assert!((celsius_from_volts(2.98) - 25.0).abs() < 1e-3);
        assert!((celsius_from_volts(2.73) - 0.0).abs() < 1e-3);
        assert!((celsius_from_volts(2.33) + 40.0).abs() < 1e-3);
    }

    #[test]
    fn room_state_thresholds() {
        let config = ThermometerConfig::default();
        assert_eq!(RoomState::classify(21.9, &config), RoomState::Cold);
        assert_eq!(RoomState::classify(22.0, &config), RoomState::Idle);
        assert_eq!(RoomState::classify(30.0, &config), RoomState::Idle);
        assert_eq!(RoomState::classify(30.1, &config), RoomState::Hot);
    }

    #[test]
    fn reading_from_adc_code() {
        let config = ThermometerConfig::default();
        // 745 * 4.096 / 1023 = 2.983 V
        let voltage = VoltageReading::from_code(745, config.vref);
        let reading = TemperatureReading::from_voltage(voltage, &config);
        assert!((reading.celsius - 25.29).abs() < 0.05);
        assert_eq!(reading.state, RoomState::Idle);
        assert_eq!(reading.state.label(), "IDLE");
    }
}
