//! Whole control loop on the simulation bench, with the real MCP3008 and
//! serial console drivers talking to mocked buses.

use std::convert::Infallible;

use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::serial::{Mock as SerialMock, Transaction as SerialTransaction};
use embedded_hal_mock::spi::{Mock as SpiMock, Transaction as SpiTransaction};

use phase_meter::drivers::{Mcp3008, SerialConsole, TextDisplay};
use phase_meter::logger::Logger;
use phase_meter::testing::{SimAdc, SimClock, SimDelay, SimSignal, SimTimer, Waveform};
use phase_meter::{MeterConfig, PhaseMeter};

// 50 Hz at 2 MHz timer ticks
const PERIOD_TICKS: u64 = 40_000;
const POLL_STEP: u64 = 4;

#[derive(Default)]
struct Screen {
    lines: Vec<(u8, String)>,
}

impl TextDisplay for Screen {
    type Error = Infallible;

    fn display_line(&mut self, text: &str, line: u8, _pad: bool) -> Result<(), Self::Error> {
        self.lines.push((line, text.to_string()));
        Ok(())
    }
}

fn chip_select_for(reads: usize) -> PinMock {
    let mut expectations = vec![PinTransaction::set(State::High)];
    for _ in 0..reads {
        expectations.push(PinTransaction::set(State::Low));
        expectations.push(PinTransaction::set(State::High));
    }
    PinMock::new(&expectations)
}

#[test]
fn fifty_hz_quarter_lag_over_real_drivers() {
    let clock = SimClock::new(POLL_STEP);
    let config = MeterConfig::default();

    // Reference peak reads 512, test peak 250
    let spi = SpiMock::new(&[
        SpiTransaction::transfer(vec![0x01, 0x80, 0x00], vec![0x00, 0x02, 0x00]),
        SpiTransaction::transfer(vec![0x01, 0x90, 0x00], vec![0x00, 0x00, 0xFA]),
    ]);
    let adc = Mcp3008::new(spi, chip_select_for(2)).unwrap();

    let line = b"freq = 50.000  Vref_rms = 1.450  Vtest_rms = 0.708  Phase = -90.000\r\n";
    let mut console = SerialConsole::new(SerialMock::new(&[SerialTransaction::write_many(line)]));
    let mut screen = Screen::default();

    let mut meter = PhaseMeter::new(
        SimSignal::new(&clock, Waveform::square(PERIOD_TICKS)),
        SimSignal::new(&clock, Waveform::lagging(PERIOD_TICKS, PERIOD_TICKS / 4)),
        SimTimer::new(&clock),
        adc,
        SimDelay::new(&clock, config.timebase),
        config,
    );

    let snapshot = meter
        .step(&mut console, &mut screen, &Logger::default())
        .unwrap();
    assert!((snapshot.phase_degrees + 90.0).abs() < 1e-3);
    assert_eq!(
        screen.lines,
        vec![
            (1, "Vr=1.45 Vt=0.71".to_string()),
            (2, "Fq=50.0 Ph=-90.0".to_string()),
        ]
    );

    console.release().done();
    let (_, _, _, adc, _) = meter.release();
    let (mut spi, mut cs) = adc.release();
    spi.done();
    cs.done();
}

#[test]
fn consecutive_cycles_agree() {
    let clock = SimClock::new(POLL_STEP);
    let config = MeterConfig::default();
    let mut meter = PhaseMeter::new(
        SimSignal::new(&clock, Waveform::square(PERIOD_TICKS)),
        SimSignal::new(&clock, Waveform::lagging(PERIOD_TICKS, 3 * PERIOD_TICKS / 4)),
        SimTimer::new(&clock),
        SimAdc::new([512, 250, 0, 0, 0, 0, 0, 0]),
        SimDelay::new(&clock, config.timebase),
        config,
    );

    let first = meter.measure().unwrap();
    meter.pause_ms(100);
    let second = meter.measure().unwrap();

    assert!((first.phase_degrees - 92.7).abs() < 1e-3);
    assert!((second.phase_degrees - first.phase_degrees).abs() < 1e-3);
    assert!((second.frequency_hz - first.frequency_hz).abs() < 1e-3);
}

#[test]
fn slow_signal_counts_timer_overflows() {
    // 10 Hz: 200_000 ticks per cycle, three wraps of the 16-bit counter
    let period = 200_000;
    let clock = SimClock::new(POLL_STEP);
    let config = MeterConfig::default();
    let mut meter = PhaseMeter::new(
        SimSignal::new(&clock, Waveform::square(period)),
        SimSignal::new(&clock, Waveform::lagging(period, period / 4)),
        SimTimer::new(&clock),
        SimAdc::new([1023, 0, 0, 0, 0, 0, 0, 0]),
        SimDelay::new(&clock, config.timebase),
        config,
    );

    let snapshot = meter.measure().unwrap();
    assert!((snapshot.frequency_hz - 10.0).abs() < 1e-3);
    assert!((snapshot.phase_degrees + 90.0).abs() < 1e-3);
    assert!((snapshot.reference_rms_volts - 4.096 * 0.707107).abs() < 1e-3);
    assert_eq!(snapshot.test_rms_volts, 0.0);
}

#[test]
fn custom_correction_is_applied() {
    let clock = SimClock::new(POLL_STEP);
    let config = MeterConfig {
        phase_correction_deg: 0.0,
        ..MeterConfig::default()
    };
    let mut meter = PhaseMeter::new(
        SimSignal::new(&clock, Waveform::square(PERIOD_TICKS)),
        SimSignal::new(&clock, Waveform::lagging(PERIOD_TICKS, 3 * PERIOD_TICKS / 4)),
        SimTimer::new(&clock),
        SimAdc::new([0; 8]),
        SimDelay::new(&clock, config.timebase),
        config,
    );

    let snapshot = meter.measure().unwrap();
    assert!((snapshot.phase_degrees - 90.0).abs() < 1e-3);
}
