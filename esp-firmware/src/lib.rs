// Library-Root: Hardware-Anbindung und Tasks
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use esp_core::DeviceContext;
use esp_core::storage::PersistentCredentialStore;
use esp_hal::delay::Delay;

use crate::hal::{EmbassyClock, EspFlashDriver, EspWifiDriver, RmtPixelSink};

// ============================================================================
// Type-Aliase für den Geräte-Kontext
// ============================================================================
//
// Statt:  DeviceContext<RmtPixelSink<'static>, EmbassyClock, EspWifiDriver, ...>
// Nutze:  Device

/// Credential Store auf der "netcfg" Flash-Partition
pub type FlashCredentialStore = PersistentCredentialStore<EspFlashDriver>;

/// Geräte-Kontext mit echter Hardware
pub type Device = DeviceContext<
    RmtPixelSink<'static>,
    EmbassyClock,
    EspWifiDriver,
    FlashCredentialStore,
    Delay,
>;

/// Geteilter Geräte-Kontext (HTTP-Tasks + Tick-Task)
///
/// NoopRawMutex reicht: alle Tasks laufen auf demselben Executor.
/// Der Lock wird nie über einen `.await` gehalten.
pub type DeviceCell = Mutex<NoopRawMutex, RefCell<Device>>;

/// Führt `f` mit exklusivem Zugriff auf den Geräte-Kontext aus
pub fn with_device<R>(device: &DeviceCell, f: impl FnOnce(&mut Device) -> R) -> R {
    device.lock(|cell| f(&mut cell.borrow_mut()))
}
