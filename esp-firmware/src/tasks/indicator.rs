// Status-LED Task - treibt das Blinken nach dem Boot
use defmt::info;
use embassy_time::{Duration, Timer};

use crate::config::INDICATOR_TICK_MS;
use crate::{DeviceCell, with_device};

/// Ruft `tick()` der Status-LED in festem Abstand auf
///
/// Während des Boots tickt die Verbindungs-Schleife selbst; dieser Task
/// übernimmt danach.
#[embassy_executor::task]
pub async fn indicator_task(device: &'static DeviceCell) -> ! {
    info!("LED: Indicator task started ({} ms tick)", INDICATOR_TICK_MS);

    loop {
        with_device(device, |device| device.tick());
        Timer::after(Duration::from_millis(INDICATOR_TICK_MS)).await;
    }
}
