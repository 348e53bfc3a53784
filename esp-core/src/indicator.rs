//! Status-LED Engine
//!
//! Treibt einen [`PixelSink`] nach einem deklarativen Muster (aus / fest /
//! blinken). Die Engine wartet nie selbst: Blinken entsteht ausschließlich
//! durch regelmäßige Aufrufe von [`StatusIndicator::tick`] (Ziel: jede
//! Loop-Iteration, Abstände ≤ ~50 ms).

use rgb::RGB8;

use crate::logic::{DEFAULT_DUTY, DEFAULT_PERIOD_MS, clamp_duty, clamp_period, phase_durations};
use crate::traits::{Clock, PixelSink};
use crate::types::BLACK;

/// Blink-Muster mit abgeleiteten Phasen-Dauern
///
/// Invariante: `on_ms + off_ms == period_ms`, beide ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkPattern {
    on: RGB8,
    off: RGB8,
    period_ms: u32,
    duty: f32,
    on_ms: u32,
    off_ms: u32,
}

impl BlinkPattern {
    /// Erstellt ein Blink-Muster
    ///
    /// `period_ms` wird auf ≥ 10 und `duty` auf `[0.01, 0.99]` begrenzt.
    pub fn new(on: RGB8, off: RGB8, period_ms: u32, duty: f32) -> Self {
        let period_ms = clamp_period(period_ms);
        let duty = clamp_duty(duty);
        let (on_ms, off_ms) = phase_durations(period_ms, duty);
        Self {
            on,
            off,
            period_ms,
            duty,
            on_ms,
            off_ms,
        }
    }

    /// Blinkt `on` gegen Schwarz mit 1000 ms und 50 % Duty-Cycle
    pub fn with_defaults(on: RGB8) -> Self {
        Self::new(on, BLACK, DEFAULT_PERIOD_MS, DEFAULT_DUTY)
    }

    pub fn on_color(&self) -> RGB8 {
        self.on
    }

    pub fn off_color(&self) -> RGB8 {
        self.off
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn duty(&self) -> f32 {
        self.duty
    }

    pub fn on_ms(&self) -> u32 {
        self.on_ms
    }

    pub fn off_ms(&self) -> u32 {
        self.off_ms
    }

    fn set_period(&mut self, period_ms: u32) {
        self.period_ms = clamp_period(period_ms);
        self.recalc();
    }

    fn set_duty(&mut self, duty: f32) {
        self.duty = clamp_duty(duty);
        self.recalc();
    }

    fn recalc(&mut self) {
        let (on_ms, off_ms) = phase_durations(self.period_ms, self.duty);
        self.on_ms = on_ms;
        self.off_ms = off_ms;
    }
}

/// Deklaratives Anzeigemuster
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorPattern {
    Off,
    Solid(RGB8),
    Blink(BlinkPattern),
}

impl IndicatorPattern {
    /// Farbe der "An"-Phase (Schwarz für `Off`)
    pub fn on_color(&self) -> RGB8 {
        match self {
            IndicatorPattern::Off => BLACK,
            IndicatorPattern::Solid(color) => *color,
            IndicatorPattern::Blink(blink) => blink.on_color(),
        }
    }
}

/// Status-LED Engine
///
/// Besitzt den Laufzeit-Zustand (Muster, Phase, Zeitstempel des letzten
/// Wechsels). Jeder `set_*` Aufruf und jeder Phasenwechsel in `tick()`
/// schreibt genau einmal auf den [`PixelSink`].
pub struct StatusIndicator<P, C> {
    sink: P,
    clock: C,
    pattern: IndicatorPattern,
    phase_is_on: bool,
    last_transition_ms: u32,
}

impl<P: PixelSink, C: Clock> StatusIndicator<P, C> {
    /// Erstellt die Engine im Zustand `Off`, ohne die LED zu beschreiben
    pub fn new(sink: P, clock: C) -> Self {
        Self {
            sink,
            clock,
            pattern: IndicatorPattern::Off,
            phase_is_on: false,
            last_transition_ms: 0,
        }
    }

    /// LED aus
    pub fn set_off(&mut self) {
        self.pattern = IndicatorPattern::Off;
        self.phase_is_on = false;
        self.last_transition_ms = 0;
        self.render(BLACK);
    }

    /// Feste Farbe
    pub fn set_solid(&mut self, color: RGB8) {
        self.pattern = IndicatorPattern::Solid(color);
        self.render(color);
    }

    /// Blinken zwischen `on` und `off`
    ///
    /// Startet immer in der An-Phase und setzt den Phasen-Timer zurück.
    pub fn set_blink(&mut self, on: RGB8, off: RGB8, period_ms: u32, duty: f32) {
        self.install_blink(BlinkPattern::new(on, off, period_ms, duty));
    }

    /// Installiert ein beliebiges Muster
    pub fn set_pattern(&mut self, pattern: IndicatorPattern) {
        match pattern {
            IndicatorPattern::Off => self.set_off(),
            IndicatorPattern::Solid(color) => self.set_solid(color),
            IndicatorPattern::Blink(blink) => self.install_blink(blink),
        }
    }

    /// Ändert die Periode eines aktiven Blink-Musters, ohne die Phase zurückzusetzen
    pub fn set_period(&mut self, period_ms: u32) {
        if let IndicatorPattern::Blink(blink) = &mut self.pattern {
            blink.set_period(period_ms);
        }
    }

    /// Ändert den Duty-Cycle eines aktiven Blink-Musters, ohne die Phase zurückzusetzen
    pub fn set_duty(&mut self, duty: f32) {
        if let IndicatorPattern::Blink(blink) = &mut self.pattern {
            blink.set_duty(duty);
        }
    }

    /// Treibt das Blinken voran (nicht blockierend)
    ///
    /// Wechselt die Phase nur, wenn die Dauer der aktuellen Phase abgelaufen
    /// ist. Die Zeitdifferenz wird überlaufsicher berechnet.
    pub fn tick(&mut self) {
        let IndicatorPattern::Blink(blink) = self.pattern else {
            return;
        };

        let now = self.clock.now_ms();
        let due = if self.phase_is_on {
            blink.on_ms()
        } else {
            blink.off_ms()
        };

        if now.wrapping_sub(self.last_transition_ms) >= due {
            self.phase_is_on = !self.phase_is_on;
            self.last_transition_ms = now;
            self.render(if self.phase_is_on {
                blink.on_color()
            } else {
                blink.off_color()
            });
        }
    }

    /// Aktuelles Muster (für die HTTP-API)
    pub fn pattern(&self) -> &IndicatorPattern {
        &self.pattern
    }

    pub fn phase_is_on(&self) -> bool {
        self.phase_is_on
    }

    pub fn last_transition_ms(&self) -> u32 {
        self.last_transition_ms
    }

    /// Zugriff auf den Sink (z.B. Mock-Auswertung in Tests)
    pub fn sink(&self) -> &P {
        &self.sink
    }

    fn install_blink(&mut self, blink: BlinkPattern) {
        self.pattern = IndicatorPattern::Blink(blink);
        self.phase_is_on = true;
        self.last_transition_ms = self.clock.now_ms();
        self.render(blink.on_color());
    }

    fn render(&mut self, color: RGB8) {
        if let Err(_e) = self.sink.render(color) {
            #[cfg(feature = "defmt")]
            defmt::error!("LED: Failed to write to LED: {}", _e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_pattern_clamps() {
        let blink = BlinkPattern::new(BLACK, BLACK, 5, 0.0);
        assert_eq!(blink.period_ms(), 10);
        assert_eq!(blink.duty(), 0.01);
        assert_eq!(blink.on_ms() + blink.off_ms(), 10);
    }

    #[test]
    fn test_blink_pattern_with_defaults() {
        let on = RGB8 { r: 1, g: 2, b: 3 };
        let blink = BlinkPattern::with_defaults(on);
        assert_eq!(blink.on_color(), on);
        assert_eq!(blink.off_color(), BLACK);
        assert_eq!(blink.period_ms(), 1000);
        assert_eq!((blink.on_ms(), blink.off_ms()), (500, 500));
    }

    #[test]
    fn test_pattern_on_color() {
        let c = RGB8 { r: 9, g: 8, b: 7 };
        assert_eq!(IndicatorPattern::Off.on_color(), BLACK);
        assert_eq!(IndicatorPattern::Solid(c).on_color(), c);
        assert_eq!(
            IndicatorPattern::Blink(BlinkPattern::with_defaults(c)).on_color(),
            c
        );
    }
}
