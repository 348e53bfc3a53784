//! Fehler-Typen
//!
//! Alle Fehler sind `Copy` und allokieren nicht. Keiner davon ist fatal:
//! Validierungsfehler werden als HTTP 400 gemeldet, Speicher- und
//! Netzwerkfehler geloggt und degradiert behandelt.

use core::fmt;

/// Ungültige Eingabe an der HTTP-Grenze (→ 400, keine Zustandsänderung)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Request ohne Body
    MissingBody,
    /// Body ist kein gültiges JSON
    InvalidJson,
    /// Pflichtfeld fehlt (Feldname)
    MissingField(&'static str),
    /// Farbe entspricht nicht `#RRGGBB`
    InvalidColor,
    /// Feld überschreitet die maximale Länge (Feldname)
    FieldTooLong(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingBody => f.write_str("Missing body"),
            ValidationError::InvalidJson => f.write_str("Invalid JSON"),
            ValidationError::MissingField(field) => write!(f, "Missing '{}'", field),
            ValidationError::InvalidColor => f.write_str("Expect color like \"#RRGGBB\""),
            ValidationError::FieldTooLong(field) => write!(f, "Field '{}' too long", field),
        }
    }
}

/// Fehler beim Zugriff auf den persistenten Speicher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash lesen/schreiben/löschen fehlgeschlagen
    DriverError,
    /// Sektor enthält keinen gültigen Datensatz (z.B. gelöscht)
    InvalidMagicHeader,
    /// Datensatz ist beschädigt
    InvalidData,
    /// Datensatz passt nicht in den Sektor-Buffer
    CapacityExceeded,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DriverError => f.write_str("Storage driver error"),
            StorageError::InvalidMagicHeader => f.write_str("No credential record"),
            StorageError::InvalidData => f.write_str("Corrupt credential record"),
            StorageError::CapacityExceeded => f.write_str("Credential record too large"),
        }
    }
}

/// Fehler des WiFi-Treibers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    ConfigFailed,
    StartFailed,
    ConnectFailed,
    ScanFailed,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConfigFailed => f.write_str("WiFi configuration failed"),
            NetworkError::StartFailed => f.write_str("WiFi start failed"),
            NetworkError::ConnectFailed => f.write_str("WiFi connect failed"),
            NetworkError::ScanFailed => f.write_str("WiFi scan failed"),
        }
    }
}

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Station hat sich innerhalb des Versuchs-Limits nicht verbunden
///
/// Wird von der Zustandsmaschine als Ereignis konsumiert (→ Fallback),
/// nie an Aufrufer weitergereicht.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectTimeout {
    /// Anzahl der durchgeführten Status-Abfragen
    pub attempts: u32,
}

/// Fehler beim Speichern neuer Zugangsdaten über die HTTP-API
///
/// Die Eingabe ist zu diesem Zeitpunkt bereits validiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateError {
    Storage(StorageError),
}

impl From<StorageError> for UpdateError {
    fn from(e: StorageError) -> Self {
        UpdateError::Storage(e)
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::Storage(e) => write!(f, "Failed to save credentials: {}", e),
        }
    }
}
