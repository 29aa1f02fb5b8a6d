//! Legacy ATA PIO driver
//!
//! Two controllers (primary 0x1F0, secondary 0x170), two drives each,
//! one sector per command, 28-bit LBA. Every wait is an unbounded poll on
//! BSY: a wedged drive blocks the caller.

use etyos_hwinit::PortIo;

use crate::disk::identify::{IdentifyData, IDENTIFY_WORDS};
use crate::disk::SECTOR_SIZE;
use crate::error::IoError;

pub const ATA_PRIMARY_IO_BASE: u16 = 0x1F0;
pub const ATA_SECONDARY_IO_BASE: u16 = 0x170;

pub const REG_DATA: u16 = 0;
pub const REG_ERROR: u16 = 1;
pub const REG_SECCOUNT: u16 = 2;
pub const REG_LBA_LOW: u16 = 3;
pub const REG_LBA_MID: u16 = 4;
pub const REG_LBA_HIGH: u16 = 5;
pub const REG_DEVICE: u16 = 6;
pub const REG_STATUS: u16 = 7;
pub const REG_COMMAND: u16 = 7;

pub const STATUS_BSY: u8 = 0x80;
pub const STATUS_DRDY: u8 = 0x40;
pub const STATUS_DRQ: u8 = 0x08;
pub const STATUS_ERR: u8 = 0x01;

pub const ATA_CMD_READ_SECTORS: u8 = 0x20;
pub const ATA_CMD_WRITE_SECTORS: u8 = 0x30;
pub const ATA_CMD_CACHE_FLUSH: u8 = 0xE7;
pub const ATA_CMD_IDENTIFY: u8 = 0xEC;

/// Device/head select for IDENTIFY (CHS bit pattern, no LBA flag)
const DEVICE_SELECT: u8 = 0xA0;
/// Device/head select with LBA mode; low nibble carries LBA bits 24-27
const DEVICE_SELECT_LBA: u8 = 0xE0;

pub const LBA28_MAX: u64 = 0x0FFF_FFFF;

/// One physical unit on the legacy bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiskHandle {
    /// 0 = primary, 1 = secondary
    pub controller: u8,
    /// 0 = master, 1 = slave
    pub drive: u8,
}

impl DiskHandle {
    pub const PRIMARY_MASTER: Self = Self::new(0, 0);

    /// Scan order: controller-major, master before slave.
    pub const ALL: [Self; 4] = [
        Self::new(0, 0),
        Self::new(0, 1),
        Self::new(1, 0),
        Self::new(1, 1),
    ];

    pub const fn new(controller: u8, drive: u8) -> Self {
        Self {
            controller: controller & 1,
            drive: drive & 1,
        }
    }

    pub const fn io_base(&self) -> u16 {
        if self.controller == 0 {
            ATA_PRIMARY_IO_BASE
        } else {
            ATA_SECONDARY_IO_BASE
        }
    }
}

/// PIO driver over an abstract port space.
pub struct AtaPio<P: PortIo> {
    ports: P,
}

impl<P: PortIo> AtaPio<P> {
    pub fn new(ports: P) -> Self {
        Self { ports }
    }

    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    pub fn into_inner(self) -> P {
        self.ports
    }

    /// Poll until BSY clears; returns the final status byte.
    fn wait_not_busy(&mut self, base: u16) -> u8 {
        loop {
            let status = self.ports.inb(base + REG_STATUS);
            if status & STATUS_BSY == 0 {
                return status;
            }
            core::hint::spin_loop();
        }
    }

    /// Issue IDENTIFY DEVICE. `None` when nothing answers on that position
    /// or the device aborts the command (ATAPI, SATA bridges).
    pub fn identify(&mut self, handle: DiskHandle) -> Option<IdentifyData> {
        let base = handle.io_base();

        self.ports
            .outb(base + REG_DEVICE, DEVICE_SELECT | (handle.drive << 4));
        self.ports.outb(base + REG_SECCOUNT, 0);
        self.ports.outb(base + REG_LBA_LOW, 0);
        self.ports.outb(base + REG_LBA_MID, 0);
        self.ports.outb(base + REG_LBA_HIGH, 0);
        self.ports.outb(base + REG_COMMAND, ATA_CMD_IDENTIFY);

        if self.ports.inb(base + REG_STATUS) == 0 {
            return None;
        }

        let status = self.wait_not_busy(base);
        if status & STATUS_ERR != 0 {
            log::debug!(
                "ata{}.{}: IDENTIFY aborted (status {:#04x})",
                handle.controller,
                handle.drive,
                status
            );
            return None;
        }

        let mut words = [0u16; IDENTIFY_WORDS];
        for word in words.iter_mut() {
            *word = self.ports.inw(base + REG_DATA);
        }
        Some(IdentifyData::from_words(words))
    }

    /// Select the drive and program a one-sector LBA28 transfer.
    fn setup_transfer(&mut self, handle: DiskHandle, lba: u64) -> Result<u16, IoError> {
        if lba > LBA28_MAX {
            return Err(IoError::LbaOutOfRange);
        }
        let base = handle.io_base();
        let lba = lba as u32;

        self.ports.outb(
            base + REG_DEVICE,
            DEVICE_SELECT_LBA | (handle.drive << 4) | ((lba >> 24) & 0x0F) as u8,
        );
        if self.ports.inb(base + REG_STATUS) == 0 {
            return Err(IoError::NoDevice);
        }

        self.ports.outb(base + REG_SECCOUNT, 1);
        self.ports.outb(base + REG_LBA_LOW, lba as u8);
        self.ports.outb(base + REG_LBA_MID, (lba >> 8) as u8);
        self.ports.outb(base + REG_LBA_HIGH, (lba >> 16) as u8);
        Ok(base)
    }

    fn check_error(&mut self, base: u16) -> Result<(), IoError> {
        let status = self.wait_not_busy(base);
        if status & STATUS_ERR != 0 {
            let err = self.ports.inb(base + REG_ERROR);
            log::warn!("ata: command failed, status {:#04x} error {:#04x}", status, err);
            return Err(IoError::DeviceError);
        }
        Ok(())
    }

    pub fn read_sector(&mut self, handle: DiskHandle, lba: u64) -> Result<[u8; SECTOR_SIZE], IoError> {
        let base = self.setup_transfer(handle, lba)?;
        self.ports.outb(base + REG_COMMAND, ATA_CMD_READ_SECTORS);
        self.check_error(base)?;

        let mut buffer = [0u8; SECTOR_SIZE];
        for chunk in buffer.chunks_exact_mut(2) {
            let data = self.ports.inw(base + REG_DATA);
            chunk.copy_from_slice(&data.to_le_bytes());
        }
        Ok(buffer)
    }

    pub fn write_sector(
        &mut self,
        handle: DiskHandle,
        lba: u64,
        buffer: &[u8; SECTOR_SIZE],
    ) -> Result<(), IoError> {
        let base = self.setup_transfer(handle, lba)?;
        self.ports.outb(base + REG_COMMAND, ATA_CMD_WRITE_SECTORS);
        self.check_error(base)?;

        for chunk in buffer.chunks_exact(2) {
            self.ports
                .outw(base + REG_DATA, u16::from_le_bytes([chunk[0], chunk[1]]));
        }

        // Device commits the sector after the last word
        self.check_error(base)
    }

    /// CACHE FLUSH on the selected drive.
    pub fn flush_cache(&mut self, handle: DiskHandle) -> Result<(), IoError> {
        let base = handle.io_base();
        self.ports
            .outb(base + REG_DEVICE, DEVICE_SELECT_LBA | (handle.drive << 4));
        if self.ports.inb(base + REG_STATUS) == 0 {
            return Err(IoError::NoDevice);
        }
        self.ports.outb(base + REG_COMMAND, ATA_CMD_CACHE_FLUSH);
        self.check_error(base)
    }

    /// Legacy entry point: always the primary master.
    pub fn read_sector_primary(&mut self, lba: u64) -> Result<[u8; SECTOR_SIZE], IoError> {
        self.read_sector(DiskHandle::PRIMARY_MASTER, lba)
    }

    /// Legacy entry point: always the primary master.
    pub fn write_sector_primary(&mut self, lba: u64, buffer: &[u8; SECTOR_SIZE]) -> Result<(), IoError> {
        self.write_sector(DiskHandle::PRIMARY_MASTER, lba, buffer)
    }
}
