//! Serial and LCD renderings of the readings

use ufmt::{uwrite, uWrite};

use crate::config::CHARS_PER_LINE;
use crate::drivers::TextDisplay;
use crate::fmt::{Fixed, LineBuffer};
use crate::reading::Snapshot;
use crate::thermometer::TemperatureReading;

pub type LcdLine = LineBuffer<CHARS_PER_LINE>;

/// One serial line per cycle, `%5.3f` fields.
pub fn write_snapshot<W>(w: &mut W, snapshot: &Snapshot) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(
        w,
        "freq = {}  Vref_rms = {}  Vtest_rms = {}  Phase = {}\r\n",
        Fixed::new(snapshot.frequency_hz, 3).width(5),
        Fixed::new(snapshot.reference_rms_volts, 3).width(5),
        Fixed::new(snapshot.test_rms_volts, 3).width(5),
        Fixed::new(snapshot.phase_degrees, 3).width(5)
    )
}

/// `Vr=.. Vt=..` over `Fq=.. Ph=..`
pub fn snapshot_lines(snapshot: &Snapshot) -> (LcdLine, LcdLine) {
    let mut top = LcdLine::new();
    let mut bottom = LcdLine::new();
    uwrite!(
        top,
        "Vr={} Vt={}",
        Fixed::new(snapshot.reference_rms_volts, 2).width(3),
        Fixed::new(snapshot.test_rms_volts, 2).width(3)
    )
    .ok();
    uwrite!(
        bottom,
        "Fq={} Ph={}",
        Fixed::new(snapshot.frequency_hz, 1).width(3),
        Fixed::new(snapshot.phase_degrees, 2).width(3)
    )
    .ok();
    (top, bottom)
}

pub fn show_snapshot<D: TextDisplay>(display: &mut D, snapshot: &Snapshot) -> Result<(), D::Error> {
    let (top, bottom) = snapshot_lines(snapshot);
    display.display_line(top.as_str(), 1, true)?;
    display.display_line(bottom.as_str(), 2, true)
}

/// Temperature alone on its own line, as the strip chart expects.
pub fn write_temperature<W>(w: &mut W, reading: &TemperatureReading) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    uwrite!(w, "{}\r\n", Fixed::new(reading.celsius, 3).width(5))
}

pub fn temperature_lines(reading: &TemperatureReading) -> (LcdLine, LcdLine) {
    let mut top = LcdLine::new();
    let mut bottom = LcdLine::new();
    uwrite!(top, "Room State: {}", reading.state.label()).ok();
    uwrite!(bottom, "Temp={} C", Fixed::new(reading.celsius, 3)).ok();
    (top, bottom)
}

pub fn show_temperature<D: TextDisplay>(
    display: &mut D,
    reading: &TemperatureReading,
) -> Result<(), D::Error> {
    let (top, bottom) = temperature_lines(reading);
    display.display_line(top.as_str(), 1, true)?;
    display.display_line(bottom.as_str(), 2, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermometer::RoomState;
    use std::string::String;

    fn snapshot() -> Snapshot {
        Snapshot {
            frequency_hz: 50.0,
            reference_rms_volts: 1.4496,
            test_rms_volts: 0.7071,
            phase_degrees: -90.0,
        }
    }

    #[test]
    fn serial_line() {
        let mut out = String::new();
        write_snapshot(&mut out, &snapshot()).unwrap();
        assert_eq!(
            out,
            "freq = 50.000  Vref_rms = 1.450  Vtest_rms = 0.707  Phase = -90.000\r\n"
        );
    }

    #[test]
    fn lcd_lines_fit_the_display() {
        let (top, bottom) = snapshot_lines(&snapshot());
        assert_eq!(top.as_str(), "Vr=1.45 Vt=0.71");
        assert_eq!(bottom.as_str(), "Fq=50.0 Ph=-90.0");
        assert!(bottom.is_truncated());
    }

    #[test]
    fn temperature_rendering() {
        let reading = TemperatureReading {
            celsius: 23.5,
            state: RoomState::Idle,
        };
        let mut out = String::new();
        write_temperature(&mut out, &reading).unwrap();
        assert_eq!(out, "23.500\r\n");

        let (top, bottom) = temperature_lines(&reading);
        assert_eq!(top.as_str(), "Room State: IDLE");
        assert_eq!(bottom.as_str(), "Temp=23.500 C");
    }
}
