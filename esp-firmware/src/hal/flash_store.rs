// Flash-Treiber für die Zugangsdaten
//
// Arbeitet ausschließlich im ersten Sektor der "netcfg" Partition
// (Offset NETCFG_PARTITION_OFFSET, siehe partitions.csv).

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
use esp_core::error::StorageError;
use esp_core::storage::{RECORD_SIZE, StorageDriver};
use esp_storage::FlashStorage;

use crate::config::{FLASH_SECTOR_SIZE, NETCFG_PARTITION_OFFSET};

pub struct EspFlashDriver {
    flash: FlashStorage<'static>,
    addr: u32,
}

impl EspFlashDriver {
    pub fn new(flash: FlashStorage<'static>) -> Self {
        Self {
            flash,
            addr: NETCFG_PARTITION_OFFSET,
        }
    }
}

impl StorageDriver for EspFlashDriver {
    fn read(&mut self, buffer: &mut [u8; RECORD_SIZE]) -> Result<(), StorageError> {
        self.flash.read(self.addr, buffer).map_err(|e| {
            defmt::error!("Flash: Read failed: {}", defmt::Debug2Format(&e));
            StorageError::DriverError
        })
    }

    fn write(&mut self, buffer: &[u8; RECORD_SIZE]) -> Result<(), StorageError> {
        self.erase()?;
        self.flash.write(self.addr, buffer).map_err(|e| {
            defmt::error!("Flash: Write failed: {}", defmt::Debug2Format(&e));
            StorageError::DriverError
        })
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        self.flash
            .erase(self.addr, self.addr + FLASH_SECTOR_SIZE)
            .map_err(|e| {
                defmt::error!("Flash: Erase failed: {}", defmt::Debug2Format(&e));
                StorageError::DriverError
            })
    }
}
