//! Disk session commands.
//!
//! `Disktool` owns the ATA driver, the disk registry and the formatter
//! identity. Every partition command targets the registry's current disk.

use etyos_hwinit::PortIo;

use crate::config::FormatConfig;
use crate::disk::block_io::AtaBlockIo;
use crate::disk::mbr::{
    allocate_slot_and_region, clear_entry, mb_to_sectors, read_table, write_empty_table,
    write_entry, PartitionEntry, FIRST_PARTITION_LBA, MBR_ENTRY_COUNT,
};
use crate::disk::partition::{PartitionInfo, PartitionTable, TYPE_LINUX_NATIVE};
use crate::disk::{AtaPio, DiskInfo, DiskRegistry};
use crate::error::{AllocError, DisktoolError};
use crate::fs::{format_ext4, format_fat32, read_volume_name, FileSystemType};

/// Smallest disk `format_disk` accepts
pub const MIN_DISK_MB: u64 = 32;

/// Slot and region claimed by a create or whole-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedPartition {
    pub slot: usize,
    pub start_lba: u64,
    pub sector_count: u64,
}

pub struct Disktool<P: PortIo> {
    ata: AtaPio<P>,
    registry: DiskRegistry,
    config: FormatConfig,
}

fn run_formatter<B: gpt_disk_io::BlockIo>(
    block_io: &mut B,
    fs: FileSystemType,
    start_lba: u64,
    sector_count: u64,
    config: &FormatConfig,
) -> Result<(), AllocError> {
    match fs {
        FileSystemType::Fat32 => format_fat32(block_io, start_lba, sector_count, config),
        FileSystemType::Ext4 => format_ext4(block_io, start_lba, sector_count, config),
    }
}

fn check_slot(index: usize) -> Result<(), AllocError> {
    if index >= MBR_ENTRY_COUNT {
        return Err(AllocError::InvalidSlot);
    }
    Ok(())
}

impl<P: PortIo> Disktool<P> {
    pub fn new(ports: P) -> Self {
        Self::with_config(ports, FormatConfig::default())
    }

    pub fn with_config(ports: P, config: FormatConfig) -> Self {
        Self {
            ata: AtaPio::new(ports),
            registry: DiskRegistry::new(),
            config,
        }
    }

    pub fn ata_mut(&mut self) -> &mut AtaPio<P> {
        &mut self.ata
    }

    pub fn registry(&self) -> &DiskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn scan(&mut self) -> &[DiskInfo] {
        self.registry.scan(&mut self.ata)
    }

    pub fn list(&self) -> &[DiskInfo] {
        self.registry.disks()
    }

    pub fn select(&mut self, index: usize) -> Result<(), DisktoolError> {
        self.registry.select(index)?;
        Ok(())
    }

    pub fn current(&self) -> Option<&DiskInfo> {
        self.registry.current()
    }

    fn current_disk(&self) -> Result<DiskInfo, DisktoolError> {
        self.registry
            .current()
            .copied()
            .ok_or(DisktoolError::NoDiskSelected)
    }

    /// Carve `size_mb` out of the free space after the last partition,
    /// record it in the MBR and format it.
    pub fn create_partition_mb(
        &mut self,
        size_mb: u64,
        fs: FileSystemType,
    ) -> Result<CreatedPartition, DisktoolError> {
        let disk = self.current_disk()?;
        if size_mb > disk.size_mb {
            return Err(DisktoolError::ExceedsCapacity);
        }

        let created = self.claim_and_format(&disk, mb_to_sectors(size_mb), fs)?;
        log::info!(
            "created partition {} ({} MB {}) at lba {}",
            created.slot,
            size_mb,
            fs,
            created.start_lba
        );
        Ok(created)
    }

    /// One partition spanning the disk from the first aligned LBA to the end.
    ///
    /// Fails with `InsufficientSpace` if any partition already exists.
    pub fn format_disk(&mut self, fs: FileSystemType) -> Result<CreatedPartition, DisktoolError> {
        let disk = self.current_disk()?;
        if disk.size_mb < MIN_DISK_MB {
            return Err(AllocError::TooSmall.into());
        }

        let sectors = disk.capacity_sectors() - FIRST_PARTITION_LBA;
        let created = self.claim_and_format(&disk, sectors, fs)?;
        log::info!("formatted disk as {} ({} sectors)", fs, sectors);
        Ok(created)
    }

    fn claim_and_format(
        &mut self,
        disk: &DiskInfo,
        sector_count: u64,
        fs: FileSystemType,
    ) -> Result<CreatedPartition, AllocError> {
        let mut block_io = AtaBlockIo::new(&mut self.ata, disk.handle, disk.total_sectors);

        let (slot, start_lba) = allocate_slot_and_region(&mut block_io, disk, sector_count)?;

        // allocation bounds both values to 32 bits
        let entry = PartitionEntry::new(
            fs.partition_type_byte(),
            start_lba as u32,
            sector_count as u32,
        );
        write_entry(&mut block_io, slot, &entry)?;
        run_formatter(&mut block_io, fs, start_lba, sector_count, &self.config)?;

        Ok(CreatedPartition {
            slot,
            start_lba,
            sector_count,
        })
    }

    /// Reformat an existing partition in place and retag its MBR entry.
    pub fn format_partition(&mut self, index: usize, fs: FileSystemType) -> Result<(), DisktoolError> {
        let disk = self.current_disk()?;
        check_slot(index)?;

        let mut block_io = AtaBlockIo::new(&mut self.ata, disk.handle, disk.total_sectors);
        let mut entry = read_table(&mut block_io)?[index];
        if !entry.is_used() {
            return Err(AllocError::SlotEmpty.into());
        }

        run_formatter(
            &mut block_io,
            fs,
            entry.lba_first as u64,
            entry.sector_count as u64,
            &self.config,
        )?;

        let type_byte = fs.partition_type_byte();
        if entry.partition_type != type_byte {
            entry.partition_type = type_byte;
            write_entry(&mut block_io, index, &entry)?;
        }

        log::info!("partition {} formatted as {}", index, fs);
        Ok(())
    }

    pub fn delete_partition(&mut self, index: usize) -> Result<(), DisktoolError> {
        let disk = self.current_disk()?;
        check_slot(index)?;

        let mut block_io = AtaBlockIo::new(&mut self.ata, disk.handle, disk.total_sectors);
        clear_entry(&mut block_io, index)?;

        log::info!("partition {} deleted", index);
        Ok(())
    }

    /// Occupied slots of the current disk with labels and ext4 names.
    pub fn partition_info(&mut self) -> Result<PartitionTable, DisktoolError> {
        let disk = self.current_disk()?;
        let mut block_io = AtaBlockIo::new(&mut self.ata, disk.handle, disk.total_sectors);
        let entries = read_table(&mut block_io)?;

        let mut slots = [None; MBR_ENTRY_COUNT];
        for (index, entry) in entries.iter().enumerate() {
            if !entry.is_used() {
                continue;
            }

            let volume_name = if entry.partition_type == TYPE_LINUX_NATIVE {
                match read_volume_name(&mut block_io, entry.lba_first as u64) {
                    Ok(name) => name,
                    Err(e) => {
                        log::debug!("partition {}: superblock unreadable: {}", index, e);
                        None
                    }
                }
            } else {
                None
            };

            let info = PartitionInfo {
                index: index as u8,
                type_byte: entry.partition_type,
                partition_type: entry.kind(),
                start_lba: entry.lba_first,
                sector_count: entry.sector_count,
                bootable: entry.is_bootable(),
                volume_name,
            };
            slots[index] = Some(info);
        }

        Ok(PartitionTable::from_slots(slots))
    }

    /// Write an empty partition table with a valid signature.
    pub fn init_table(&mut self) -> Result<(), DisktoolError> {
        let disk = self.current_disk()?;
        let mut block_io = AtaBlockIo::new(&mut self.ata, disk.handle, disk.total_sectors);
        write_empty_table(&mut block_io)?;

        log::info!("initialized empty MBR on disk {}", disk.model);
        Ok(())
    }
}
