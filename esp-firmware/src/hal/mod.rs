// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus esp-core gegen echte ESP32-C6 Hardware.
// Die Logik selbst bleibt in esp-core und ist auf dem Host getestet.

pub mod clock;
pub mod flash_store;
pub mod pixel_sink;
pub mod wifi_driver;

pub use clock::EmbassyClock;
pub use flash_store::EspFlashDriver;
pub use pixel_sink::{LED_BUFFER_SIZE, RmtPixelSink};
pub use wifi_driver::EspWifiDriver;
