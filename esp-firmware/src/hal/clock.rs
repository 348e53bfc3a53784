// Millisekunden-Uhr auf Basis von embassy-time

use embassy_time::Instant;
use esp_core::traits::Clock;

/// Uhr seit Boot; läuft nach ~49 Tagen über (esp-core rechnet mit wrapping_sub)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
