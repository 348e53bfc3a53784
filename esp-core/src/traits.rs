//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use rgb::RGB8;

use crate::error::{LedError, NetworkError, StorageError};
use crate::types::{LinkStatus, NetworkCredentials, ScanResults, WifiMode};

/// Trait für die einzelne Status-LED
///
/// Abstrahiert den Zugriff auf RGB LEDs (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtPixelSink (ESP32 RMT Peripheral)
/// - **Testing:** MockPixelSink (in-memory Mock)
pub trait PixelSink {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// Muss schnell sein und darf nicht blockieren.
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn render(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Monotone Millisekunden-Uhr
///
/// Der Wert darf überlaufen, Vergleiche laufen über `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Persistenter Speicher für WiFi-Zugangsdaten
pub trait CredentialStore {
    /// Lädt die Zugangsdaten
    ///
    /// `Ok(None)` wenn keine (oder nur eine leere SSID) gespeichert sind.
    fn load(&mut self) -> Result<Option<NetworkCredentials>, StorageError>;

    /// Speichert die Zugangsdaten (überschreibt vorhandene)
    fn save(&mut self, credentials: &NetworkCredentials) -> Result<(), StorageError>;

    /// Löscht alle gespeicherten Zugangsdaten
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// WiFi-Treiber (Access Point + Station)
pub trait NetworkDriver {
    fn set_mode(&mut self, mode: WifiMode) -> Result<(), NetworkError>;

    /// Startet den Access Point mit SSID und Passwort
    fn start_access_point(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError>;

    /// Stößt die Verbindung zu einem Netzwerk an, wartet aber nicht darauf
    fn begin_station_connect(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError>;

    /// Aktueller Verbindungsstatus der Station
    fn connection_status(&mut self) -> LinkStatus;

    /// Scannt sichtbare Netzwerke
    fn scan_networks(&mut self) -> Result<ScanResults, NetworkError>;

    fn set_auto_reconnect(&mut self, enabled: bool);
}
