//! Gemeinsame Test-Doubles für die Integration Tests
//!
//! Alle Fakes zeichnen ihre Aufrufe auf, damit Tests die Seiteneffekte der
//! Zustandsmaschine prüfen können.

#![allow(dead_code)]

use std::cell::Cell;

use embedded_hal::delay::DelayNs;
use esp_core::error::{LedError, NetworkError, StorageError};
use esp_core::provisioning::ProvisioningConfig;
use esp_core::storage::{RECORD_SIZE, StorageDriver};
use esp_core::traits::{Clock, CredentialStore, NetworkDriver, PixelSink};
use esp_core::types::{AuthMode, LinkStatus, NetworkCredentials, ScanEntry, ScanResults, WifiMode};
use esp_core::DeviceContext;
use rgb::RGB8;

pub const AP_SSID: &str = "M5Stack_Atom";
pub const AP_PASSWORD: &str = "66666666";

// ============================================================================
// Mock Pixel Sink
// ============================================================================

#[derive(Default)]
pub struct MockPixelSink {
    pub history: Vec<RGB8>,
    pub fail_next_write: bool,
}

impl MockPixelSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_color(&self) -> Option<RGB8> {
        self.history.last().copied()
    }

    pub fn write_count(&self) -> usize {
        self.history.len()
    }
}

impl PixelSink for MockPixelSink {
    fn render(&mut self, color: RGB8) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }

        self.history.push(color);
        Ok(())
    }
}

// ============================================================================
// Manual Clock
// ============================================================================

/// Uhr, die nur vom Test (oder von [`SimDelay`]) weitergestellt wird
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u32>,
    reads: Cell<u32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: u32) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    pub fn set(&self, now_ms: u32) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Wie oft die Uhr gelesen wurde
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.reads.set(self.reads.get() + 1);
        self.now.get()
    }
}

// ============================================================================
// Simulated Delay
// ============================================================================

/// Verzögerung ohne echtes Warten: stellt nur die [`ManualClock`] weiter
pub struct SimDelay<'a> {
    clock: &'a ManualClock,
    pub calls: u32,
    pub total_ms: u64,
}

impl<'a> SimDelay<'a> {
    pub fn new(clock: &'a ManualClock) -> Self {
        Self {
            clock,
            calls: 0,
            total_ms: 0,
        }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
        self.clock.advance(ms);
    }
}

// ============================================================================
// Mock Network Driver
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCall {
    SetMode(WifiMode),
    StartAccessPoint { ssid: String, password: String },
    BeginStationConnect { ssid: String, password: String },
    SetAutoReconnect(bool),
    Scan,
}

#[derive(Default)]
pub struct MockNetwork {
    pub calls: Vec<NetworkCall>,
    /// Nach so vielen Status-Abfragen meldet der Treiber `Connected`
    pub connect_after_polls: Option<u32>,
    pub polls: u32,
    pub scan_results: ScanResults,
    pub fail_scan: bool,
    pub fail_connect: bool,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verbindet sich bei der `polls`-ten Abfrage
    pub fn connecting_after(polls: u32) -> Self {
        Self {
            connect_after_polls: Some(polls),
            ..Self::default()
        }
    }

    pub fn never_connecting() -> Self {
        Self::default()
    }

    pub fn with_networks(networks: &[(&str, i32)]) -> Self {
        let mut network = Self::default();
        for (ssid, rssi) in networks {
            network
                .scan_results
                .push(ScanEntry {
                    ssid: (*ssid).try_into().unwrap(),
                    rssi: *rssi,
                    auth_mode: AuthMode::Wpa2Personal,
                })
                .unwrap();
        }
        network
    }

    pub fn access_point_starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, NetworkCall::StartAccessPoint { .. }))
            .count()
    }

    pub fn station_connects(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, NetworkCall::BeginStationConnect { .. }))
            .count()
    }
}

impl NetworkDriver for MockNetwork {
    fn set_mode(&mut self, mode: WifiMode) -> Result<(), NetworkError> {
        self.calls.push(NetworkCall::SetMode(mode));
        Ok(())
    }

    fn start_access_point(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError> {
        self.calls.push(NetworkCall::StartAccessPoint {
            ssid: ssid.to_string(),
            password: password.to_string(),
        });
        Ok(())
    }

    fn begin_station_connect(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError> {
        self.calls.push(NetworkCall::BeginStationConnect {
            ssid: ssid.to_string(),
            password: password.to_string(),
        });
        if self.fail_connect {
            return Err(NetworkError::ConnectFailed);
        }
        Ok(())
    }

    fn connection_status(&mut self) -> LinkStatus {
        self.polls += 1;
        match self.connect_after_polls {
            Some(n) if self.polls >= n => LinkStatus::Connected,
            _ => LinkStatus::Disconnected,
        }
    }

    fn scan_networks(&mut self) -> Result<ScanResults, NetworkError> {
        self.calls.push(NetworkCall::Scan);
        if self.fail_scan {
            return Err(NetworkError::ScanFailed);
        }
        Ok(self.scan_results.clone())
    }

    fn set_auto_reconnect(&mut self, enabled: bool) {
        self.calls.push(NetworkCall::SetAutoReconnect(enabled));
    }
}

// ============================================================================
// Credential Stores
// ============================================================================

#[derive(Default)]
pub struct MemoryCredentialStore {
    pub stored: Option<NetworkCredentials>,
    pub fail_load: bool,
    pub fail_save: bool,
    pub fail_clear: bool,
    pub clear_count: usize,
    pub save_count: usize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(ssid: &str, password: &str, token: &str) -> Self {
        Self {
            stored: Some(NetworkCredentials::new(ssid, password, token).unwrap()),
            ..Self::default()
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&mut self) -> Result<Option<NetworkCredentials>, StorageError> {
        if self.fail_load {
            return Err(StorageError::DriverError);
        }
        Ok(self.stored.clone().filter(NetworkCredentials::has_ssid))
    }

    fn save(&mut self, credentials: &NetworkCredentials) -> Result<(), StorageError> {
        if self.fail_save {
            return Err(StorageError::DriverError);
        }
        self.save_count += 1;
        self.stored = Some(credentials.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        if self.fail_clear {
            return Err(StorageError::DriverError);
        }
        self.clear_count += 1;
        self.stored = None;
        Ok(())
    }
}

/// Flash-Sektor im RAM, startet gelöscht
pub struct RamStorageDriver {
    pub data: [u8; RECORD_SIZE],
    pub fail_read: bool,
    pub fail_write: bool,
    pub erase_count: usize,
    pub write_count: usize,
}

impl Default for RamStorageDriver {
    fn default() -> Self {
        Self {
            data: [0xFF; RECORD_SIZE],
            fail_read: false,
            fail_write: false,
            erase_count: 0,
            write_count: 0,
        }
    }
}

impl StorageDriver for RamStorageDriver {
    fn read(&mut self, buffer: &mut [u8; RECORD_SIZE]) -> Result<(), StorageError> {
        if self.fail_read {
            return Err(StorageError::DriverError);
        }
        buffer.copy_from_slice(&self.data);
        Ok(())
    }

    fn write(&mut self, buffer: &[u8; RECORD_SIZE]) -> Result<(), StorageError> {
        if self.fail_write {
            return Err(StorageError::DriverError);
        }
        self.write_count += 1;
        self.data = *buffer;
        Ok(())
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        self.erase_count += 1;
        self.data = [0xFF; RECORD_SIZE];
        Ok(())
    }
}

// ============================================================================
// Device
// ============================================================================

pub type TestDevice<'a> =
    DeviceContext<MockPixelSink, &'a ManualClock, MockNetwork, MemoryCredentialStore, SimDelay<'a>>;

pub fn test_config() -> ProvisioningConfig {
    ProvisioningConfig::new(AP_SSID, AP_PASSWORD)
}

pub fn test_device<'a>(
    clock: &'a ManualClock,
    network: MockNetwork,
    store: MemoryCredentialStore,
) -> TestDevice<'a> {
    DeviceContext::new(
        MockPixelSink::new(),
        clock,
        network,
        store,
        SimDelay::new(clock),
        test_config(),
    )
}
