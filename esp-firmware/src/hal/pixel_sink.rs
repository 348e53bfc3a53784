// Status-LED Pixel Sink
//
// Schreibt eine einzelne RGB-Farbe über das RMT Peripheral auf die
// WS2812 LED des Boards.

use esp_core::error::LedError;
use esp_core::traits::PixelSink;
use esp_hal::Blocking;
use esp_hal::rmt::{PulseCode, Rmt};
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

/// Buffer-Größe für 1 LED (3 Farben * 8 Bits + 1 Reset)
pub const LED_BUFFER_SIZE: usize = 25;

/// WS2812 über RMT
///
/// Der Buffer muss so lange leben wie der Sink; im Geräte-Kontext also
/// `'static` (siehe `main.rs`).
pub struct RmtPixelSink<'a> {
    led: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
    brightness: u8,
}

impl<'a> RmtPixelSink<'a> {
    /// Erstellt den Sink
    ///
    /// # Parameter
    /// - `gpio`: Datenleitung der LED
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten (erstellt mit smart_led_buffer!(1) Macro)
    /// - `brightness`: Skalierung aller Farben (255 = volle Helligkeit)
    pub fn new(
        gpio: esp_hal::peripherals::GPIO8<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut [PulseCode; LED_BUFFER_SIZE],
        brightness: u8,
    ) -> Result<Self, LedError> {
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))
            .map_err(|_| LedError::WriteFailed)?;
        let led = SmartLedsAdapter::new(rmt.channel0, gpio, buffer);

        Ok(Self { led, brightness })
    }
}

/// Skaliert einen Farbkanal linear auf `brightness`
fn scale(channel: u8, brightness: u8) -> u8 {
    ((u16::from(channel) * u16::from(brightness)) / 255) as u8
}

impl PixelSink for RmtPixelSink<'_> {
    fn render(&mut self, color: RGB8) -> Result<(), LedError> {
        let scaled = RGB8 {
            r: scale(color.r, self.brightness),
            g: scale(color.g, self.brightness),
            b: scale(color.b, self.brightness),
        };
        self.led
            .write([scaled].into_iter())
            .map_err(|_| LedError::WriteFailed)
    }
}
