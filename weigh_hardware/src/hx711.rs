use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::trace;
use weigh_traits::{BoxError, LoadCell};

use crate::error::{HwError, Result};
use crate::util::{sign_extend_24, wait_until_low_with_timeout};

/// Channel/gain selected for the *next* conversion by the trailing pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gain {
    #[default]
    A128,
    B32,
    A64,
}

impl Gain {
    fn extra_pulses(self) -> u8 {
        match self {
            Gain::A128 => 1,
            Gain::B32 => 2,
            Gain::A64 => 3,
        }
    }
}

/// Bit-banged HX711 on two Raspberry Pi GPIO lines.
pub struct Hx711 {
    dout: InputPin,
    sck: OutputPin,
    gain: Gain,
}

impl Hx711 {
    pub fn open(dout_pin: u8, sck_pin: u8, gain: Gain) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open hx711: {e}")))?;
        let dout = gpio
            .get(dout_pin)
            .map_err(|e| HwError::Gpio(format!("open hx711 dout {dout_pin}: {e}")))?
            .into_input();
        let mut sck = gpio
            .get(sck_pin)
            .map_err(|e| HwError::Gpio(format!("open hx711 sck {sck_pin}: {e}")))?
            .into_output();
        // SCK high for >60us powers the chip down
        sck.set_low();
        Ok(Self { dout, sck, gain })
    }

    #[inline]
    fn pulse(&mut self) -> bool {
        self.sck.set_high();
        std::hint::spin_loop();
        let bit = self.dout.is_high();
        self.sck.set_low();
        std::hint::spin_loop();
        bit
    }

    /// Wait for DOUT low, shift out 24 bits MSB first, then arm the gain.
    pub fn read_conversion(&mut self, timeout: Duration) -> Result<i32> {
        let dout = &self.dout;
        wait_until_low_with_timeout(|| dout.is_high(), timeout, Duration::from_micros(200))?;

        let mut word: u32 = 0;
        for _ in 0..24 {
            word = (word << 1) | u32::from(self.pulse());
        }
        for _ in 0..self.gain.extra_pulses() {
            self.pulse();
        }
        let raw = sign_extend_24(word);
        trace!(raw, "hx711 conversion");
        Ok(raw)
    }
}

impl LoadCell for Hx711 {
    fn read_raw(&mut self, timeout: Duration) -> std::result::Result<i32, BoxError> {
        self.read_conversion(timeout).map_err(Into::into)
    }
}
