//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use core::fmt::Write;

use heapless::String;
use rgb::RGB8;

/// Kürzeste erlaubte Blink-Periode in Millisekunden
pub const MIN_PERIOD_MS: u32 = 10;

/// Standard-Blink-Periode in Millisekunden
pub const DEFAULT_PERIOD_MS: u32 = 1000;

/// Untere Grenze für den Duty-Cycle
pub const MIN_DUTY: f32 = 0.01;

/// Obere Grenze für den Duty-Cycle
pub const MAX_DUTY: f32 = 0.99;

/// Standard-Duty-Cycle (halb an, halb aus)
pub const DEFAULT_DUTY: f32 = 0.5;

/// Länge eines serialisierten Farbwerts: `#` + 6 Hex-Ziffern
pub const HEX_COLOR_LEN: usize = 7;

/// Begrenzt die Blink-Periode auf mindestens [`MIN_PERIOD_MS`]
pub fn clamp_period(period_ms: u32) -> u32 {
    period_ms.max(MIN_PERIOD_MS)
}

/// Begrenzt den Duty-Cycle auf `[MIN_DUTY, MAX_DUTY]`
///
/// NaN wird wie der Standardwert behandelt.
pub fn clamp_duty(duty: f32) -> f32 {
    if duty.is_nan() {
        return DEFAULT_DUTY;
    }
    duty.clamp(MIN_DUTY, MAX_DUTY)
}

/// Berechnet die Dauer der An- und Aus-Phase
///
/// `on = round(period * duty)`, `off = period - on`, beide mindestens 1 ms.
/// Periode und Duty-Cycle werden vorher begrenzt, daher gilt immer
/// `on + off == clamp_period(period_ms)`.
///
/// # Beispiele
///
/// ```
/// # use esp_core::logic::phase_durations;
/// assert_eq!(phase_durations(1000, 0.5), (500, 500));
/// assert_eq!(phase_durations(10, 0.01), (1, 9));
/// ```
pub fn phase_durations(period_ms: u32, duty: f32) -> (u32, u32) {
    let period = clamp_period(period_ms);
    let duty = clamp_duty(duty);

    // Werte sind positiv: +0.5 und Abschneiden entspricht Runden
    let on = (period as f32 * duty + 0.5) as u32;
    let on = on.clamp(1, period - 1);
    (on, period - on)
}

/// Parst `#RRGGBB` (Groß-/Kleinschreibung egal, genau 6 Hex-Ziffern)
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use esp_core::logic::parse_hex_color;
/// assert_eq!(parse_hex_color("#1a2B3c"), Some(RGB8 { r: 0x1A, g: 0x2B, b: 0x3C }));
/// assert_eq!(parse_hex_color("1a2b3c"), None);
/// ```
pub fn parse_hex_color(hex: &str) -> Option<RGB8> {
    let digits = hex.strip_prefix('#')?;
    // from_str_radix akzeptiert ein führendes '+', daher vorher alle Zeichen prüfen
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
    Some(RGB8 {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Serialisiert eine Farbe kanonisch als `#RRGGBB` (Großbuchstaben)
pub fn format_hex_color(color: RGB8) -> String<HEX_COLOR_LEN> {
    let mut out = String::new();
    // 7 Zeichen passen immer in den Buffer
    let _ = write!(out, "#{:02X}{:02X}{:02X}", color.r, color.g, color.b);
    out
}
