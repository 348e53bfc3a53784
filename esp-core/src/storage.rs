//! Persistente Zugangsdaten
//!
//! Ein Datensatz belegt einen Flash-Sektor-Ausschnitt fester Größe:
//!
//! ```text
//! [magic u16 LE][ns_len u8][namespace "netcfg"][count u8]
//! ([key_len u8][key][val_len u8][val]) * count
//! 0xFF ... (Rest)
//! ```
//!
//! Ein gelöschter Sektor (0xFF) hat keinen gültigen Magic-Header und gilt
//! als "keine Zugangsdaten".

use crate::error::StorageError;
use crate::traits::CredentialStore;
use crate::types::NetworkCredentials;

/// Größe eines Datensatzes in Bytes (Vielfaches der Flash-Wortbreite)
pub const RECORD_SIZE: usize = 256;

/// Namespace des Datensatzes
pub const NAMESPACE: &str = "netcfg";

pub const KEY_SSID: &str = "ssid";
pub const KEY_PASS: &str = "pass";
pub const KEY_TOKEN: &str = "token";

const MAGIC_HEADER: u16 = 0xC0F6;
const MAGIC_HEADER_SIZE: usize = MAGIC_HEADER.to_le_bytes().len();
const ERASED: u8 = 0xFF;

/// Roher Zugriff auf den Speicherbereich eines Datensatzes
pub trait StorageDriver {
    /// Liest den kompletten Datensatz-Bereich
    fn read(&mut self, buffer: &mut [u8; RECORD_SIZE]) -> Result<(), StorageError>;

    /// Löscht den Bereich und schreibt den Datensatz
    fn write(&mut self, buffer: &[u8; RECORD_SIZE]) -> Result<(), StorageError>;

    /// Löscht den Bereich
    fn erase(&mut self) -> Result<(), StorageError>;
}

/// Serialisiert Zugangsdaten in einen Datensatz
pub fn encode_record(credentials: &NetworkCredentials) -> Result<[u8; RECORD_SIZE], StorageError> {
    let mut buffer = [ERASED; RECORD_SIZE];
    let mut writer = RecordWriter {
        buffer: &mut buffer,
        pos: 0,
    };

    writer.put(&MAGIC_HEADER.to_le_bytes())?;
    writer.put_field(NAMESPACE.as_bytes())?;

    let entries = [
        (KEY_SSID, credentials.ssid.as_str()),
        (KEY_PASS, credentials.password.as_str()),
        (KEY_TOKEN, credentials.token.as_str()),
    ];
    writer.put(&[entries.len() as u8])?;
    for (key, value) in entries {
        writer.put_field(key.as_bytes())?;
        writer.put_field(value.as_bytes())?;
    }

    Ok(buffer)
}

/// Liest Zugangsdaten aus einem Datensatz
///
/// Fehlende Schlüssel ergeben leere Felder, unbekannte werden übersprungen.
pub fn decode_record(buffer: &[u8]) -> Result<NetworkCredentials, StorageError> {
    let mut reader = RecordReader { buffer, pos: 0 };

    let magic = reader.take(MAGIC_HEADER_SIZE)?;
    if u16::from_le_bytes([magic[0], magic[1]]) != MAGIC_HEADER {
        return Err(StorageError::InvalidMagicHeader);
    }
    if reader.take_field()? != NAMESPACE.as_bytes() {
        return Err(StorageError::InvalidData);
    }

    let count = reader.take(1)?[0];
    let mut credentials = NetworkCredentials::default();
    for _ in 0..count {
        let key = reader.take_field()?;
        let value = core::str::from_utf8(reader.take_field()?)
            .map_err(|_| StorageError::InvalidData)?;

        match key {
            k if k == KEY_SSID.as_bytes() => {
                credentials.ssid = value.try_into().map_err(|_| StorageError::InvalidData)?
            }
            k if k == KEY_PASS.as_bytes() => {
                credentials.password = value.try_into().map_err(|_| StorageError::InvalidData)?
            }
            k if k == KEY_TOKEN.as_bytes() => {
                credentials.token = value.try_into().map_err(|_| StorageError::InvalidData)?
            }
            _ => {}
        }
    }

    Ok(credentials)
}

struct RecordWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl RecordWriter<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        let end = self.pos + bytes.len();
        if end > self.buffer.len() {
            return Err(StorageError::CapacityExceeded);
        }
        self.buffer[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_field(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        let len = u8::try_from(bytes.len()).map_err(|_| StorageError::CapacityExceeded)?;
        self.put(&[len])?;
        self.put(bytes)
    }
}

struct RecordReader<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], StorageError> {
        let end = self.pos + len;
        let bytes = self
            .buffer
            .get(self.pos..end)
            .ok_or(StorageError::InvalidData)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_field(&mut self) -> Result<&'a [u8], StorageError> {
        let len = self.take(1)?[0] as usize;
        self.take(len)
    }
}

/// [`CredentialStore`] über einem [`StorageDriver`]
pub struct PersistentCredentialStore<D> {
    driver: D,
}

impl<D: StorageDriver> PersistentCredentialStore<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: StorageDriver> CredentialStore for PersistentCredentialStore<D> {
    fn load(&mut self) -> Result<Option<NetworkCredentials>, StorageError> {
        let mut buffer = [0u8; RECORD_SIZE];
        self.driver.read(&mut buffer)?;

        match decode_record(&buffer) {
            Ok(credentials) if credentials.has_ssid() => Ok(Some(credentials)),
            Ok(_) | Err(StorageError::InvalidMagicHeader) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, credentials: &NetworkCredentials) -> Result<(), StorageError> {
        let buffer = encode_record(credentials)?;
        self.driver.write(&buffer)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.driver.erase()
    }
}
