//! Core Types für Status-LED und Netzwerk-Provisionierung
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::fmt;
use core::str::FromStr;

use heapless::String;
use rgb::RGB8;
use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::logic::{format_hex_color, parse_hex_color};

/// Maximale SSID-Länge (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximale Passwort-Länge (WPA2 Passphrase)
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximale Token-Länge
pub const MAX_TOKEN_LEN: usize = 64;

/// Maximale Anzahl gemeldeter Netzwerke eines Scans
pub const MAX_SCAN_RESULTS: usize = 16;

pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
pub const ORANGE: RGB8 = RGB8 { r: 255, g: 165, b: 0 };
pub const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
pub const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };

/// RGB-Farbe mit `#RRGGBB` Text-Repräsentation
///
/// Parsen akzeptiert Groß- und Kleinschreibung, Serialisierung ist immer
/// Großbuchstaben mit `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub RGB8);

impl FromStr for HexColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
            .map(HexColor)
            .ok_or(ValidationError::InvalidColor)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hex_color(self.0))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hex_color(self.0))
    }
}

impl From<RGB8> for HexColor {
    fn from(color: RGB8) -> Self {
        HexColor(color)
    }
}

/// WiFi-Zugangsdaten
///
/// Eine leere SSID gilt als "keine Zugangsdaten", unabhängig davon, was im
/// Speicher steht.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkCredentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    pub token: String<MAX_TOKEN_LEN>,
}

impl NetworkCredentials {
    /// Erstellt Zugangsdaten und prüft die Feldlängen
    pub fn new(ssid: &str, password: &str, token: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            ssid: String::try_from(ssid).map_err(|_| ValidationError::FieldTooLong("ssid"))?,
            password: String::try_from(password)
                .map_err(|_| ValidationError::FieldTooLong("pass"))?,
            token: String::try_from(token).map_err(|_| ValidationError::FieldTooLong("token"))?,
        })
    }

    pub fn has_ssid(&self) -> bool {
        !self.ssid.is_empty()
    }
}

/// Verbindungszustand des Geräts (genau einer ist aktiv)
///
/// `Idle → {ProvisioningMode, OperationMode}`,
/// `OperationMode → OperationAwait → {Connected, ProvisioningMode}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Idle,
    /// Access Point läuft, wartet auf Zugangsdaten
    ProvisioningMode,
    /// Reserviert, wird von der aktuellen Strategie nicht betreten
    ProvisioningAwait,
    /// Station-Modus konfiguriert, Verbindung angestoßen
    OperationMode,
    /// Verbindungsversuch läuft (blockierende Schleife)
    OperationAwait,
    /// Mit dem Netzwerk verbunden (Endzustand bis zum nächsten Boot)
    Connected,
}

/// Betriebsart des WiFi-Radios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiMode {
    AccessPoint,
    Station,
    AccessPointStation,
}

/// Verbindungsstatus der Station, wie ihn der Treiber meldet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    Idle,
    Disconnected,
    Connecting,
    Connected,
    ConnectFailed,
    NoSsidAvailable,
}

/// Authentifizierung eines gescannten Netzwerks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuthMode {
    Open,
    Wep,
    WpaPersonal,
    Wpa2Personal,
    Wpa3Personal,
    Enterprise,
    Other,
}

/// Ein Ergebnis eines Netzwerk-Scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub ssid: String<MAX_SSID_LEN>,
    pub rssi: i32,
    pub auth_mode: AuthMode,
}

/// Scan-Ergebnisse (begrenzt auf [`MAX_SCAN_RESULTS`])
pub type ScanResults = heapless::Vec<ScanEntry, MAX_SCAN_RESULTS>;

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for HexColor {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "#{=u8:02X}{=u8:02X}{=u8:02X}",
            self.0.r,
            self.0.g,
            self.0.b
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScanEntry {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ScanEntry {{ ssid: {}, rssi: {}, auth: {} }}",
            self.ssid.as_str(),
            self.rssi,
            self.auth_mode
        )
    }
}
