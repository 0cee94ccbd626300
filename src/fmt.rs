//! Float and text helpers for `ufmt` output.
//!
//! `core::fmt` float formatting is far too large for the AVR flash, so
//! readings are rendered in fixed point, the way `%w.pf` would print them.

use core::convert::Infallible;

use heapless::String;
use ufmt::{uDisplay, uWrite, Formatter};

const MAX_PRECISION: u8 = 6;
const RENDER_CAPACITY: usize = 32;

/// `f32` printed with a fixed number of decimals and an optional minimum width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fixed {
    value: f32,
    precision: u8,
    width: u8,
}

impl Fixed {
    pub fn new(value: f32, precision: u8) -> Self {
        Self {
            value,
            precision: precision.min(MAX_PRECISION),
            width: 0,
        }
    }

    /// Left-pad with spaces up to `width` characters
    pub fn width(mut self, width: u8) -> Self {
        self.width = width.min(RENDER_CAPACITY as u8);
        self
    }

    fn render<'b>(&self, buf: &'b mut [u8; RENDER_CAPACITY]) -> &'b str {
        let mut pos = buf.len();

        if self.value.is_nan() {
            put_str(buf, &mut pos, b"nan");
        } else if self.value.is_infinite() {
            put_str(buf, &mut pos, b"inf");
            if self.value < 0.0 {
                put(buf, &mut pos, b'-');
            }
        } else {
            let scale = 10u64.pow(u32::from(self.precision));
            let magnitude = if self.value < 0.0 { -self.value } else { self.value };
            // Saturating cast
            let rounded = (magnitude * scale as f32 + 0.5) as u64;
            let mut frac = rounded % scale;
            let mut int = rounded / scale;

            for _ in 0..self.precision {
                put(buf, &mut pos, b'0' + (frac % 10) as u8);
                frac /= 10;
            }
            if self.precision > 0 {
                put(buf, &mut pos, b'.');
            }
            loop {
                put(buf, &mut pos, b'0' + (int % 10) as u8);
                int /= 10;
                if int == 0 {
                    break;
                }
            }
            if self.value < 0.0 && rounded != 0 {
                put(buf, &mut pos, b'-');
            }
        }

        while buf.len() - pos < usize::from(self.width) && pos > 0 {
            put(buf, &mut pos, b' ');
        }

        core::str::from_utf8(&buf[pos..]).unwrap_or("?")
    }
}

/// Write `byte` in front of what is already rendered at the tail of `buf`.
fn put(buf: &mut [u8], pos: &mut usize, byte: u8) {
    if *pos > 0 {
        *pos -= 1;
        buf[*pos] = byte;
    }
}

fn put_str(buf: &mut [u8], pos: &mut usize, bytes: &[u8]) {
    for &b in bytes.iter().rev() {
        put(buf, pos, b);
    }
}

impl uDisplay for Fixed {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let mut buf = [0u8; RENDER_CAPACITY];
        f.write_str(self.render(&mut buf))
    }
}

/// Fixed-capacity text line that silently drops what does not fit.
#[derive(Clone, Debug, Default)]
pub struct LineBuffer<const N: usize> {
    text: String<N>,
    truncated: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }
}

impl<const N: usize> uWrite for LineBuffer<N> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for c in s.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}
