// Partition information and classification

use crate::disk::mbr::MBR_ENTRY_COUNT;
use crate::disk::SECTOR_SIZE;
use crate::fs::ext4_format::VolumeName;

pub const TYPE_EMPTY: u8 = 0x00;
pub const TYPE_FAT16_SMALL: u8 = 0x04;
pub const TYPE_EXTENDED: u8 = 0x05;
pub const TYPE_FAT16B: u8 = 0x06;
pub const TYPE_NTFS: u8 = 0x07;
pub const TYPE_FAT32_CHS: u8 = 0x0B;
pub const TYPE_FAT32_LBA: u8 = 0x0C;
pub const TYPE_FAT16B_LBA: u8 = 0x0E;
pub const TYPE_EXTENDED_LBA: u8 = 0x0F;
pub const TYPE_LINUX_SWAP: u8 = 0x82;
pub const TYPE_LINUX_NATIVE: u8 = 0x83;

pub const STATUS_BOOTABLE: u8 = 0x80;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionType {
    Empty,
    Fat16,
    Fat16B,
    Fat16BLba,
    Fat32,
    Fat32Lba,
    Ntfs,
    Extended,
    LinuxSwap,
    LinuxNative,
    Unknown(u8),
}

impl PartitionType {
    pub const fn from_byte(b: u8) -> Self {
        match b {
            TYPE_EMPTY => Self::Empty,
            TYPE_FAT16_SMALL => Self::Fat16,
            TYPE_FAT16B => Self::Fat16B,
            TYPE_FAT16B_LBA => Self::Fat16BLba,
            TYPE_FAT32_CHS => Self::Fat32,
            TYPE_FAT32_LBA => Self::Fat32Lba,
            TYPE_NTFS => Self::Ntfs,
            TYPE_EXTENDED | TYPE_EXTENDED_LBA => Self::Extended,
            TYPE_LINUX_SWAP => Self::LinuxSwap,
            TYPE_LINUX_NATIVE => Self::LinuxNative,
            other => Self::Unknown(other),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Fat16 => "FAT16",
            Self::Fat16B => "FAT16B",
            Self::Fat16BLba => "FAT16B LBA",
            Self::Fat32 => "FAT32",
            Self::Fat32Lba => "FAT32 LBA",
            Self::Ntfs => "NTFS",
            Self::Extended => "Extended",
            Self::LinuxSwap => "Linux swap",
            Self::LinuxNative => "EXT4",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// Display view of one occupied MBR slot.
#[derive(Copy, Clone, Debug)]
pub struct PartitionInfo {
    pub index: u8,
    pub type_byte: u8,
    pub partition_type: PartitionType,
    pub start_lba: u32,
    pub sector_count: u32,
    pub bootable: bool,
    /// ext4 volume name, when the superblock could be read and is valid
    pub volume_name: Option<VolumeName>,
}

impl PartitionInfo {
    pub fn size_mb(&self) -> u64 {
        (self.sector_count as u64 * SECTOR_SIZE as u64) / (1024 * 1024)
    }

    pub fn type_name(&self) -> &'static str {
        self.partition_type.type_name()
    }
}

/// Occupied slots of one disk, in slot order.
pub struct PartitionTable {
    partitions: [Option<PartitionInfo>; MBR_ENTRY_COUNT],
    count: usize,
}

impl PartitionTable {
    pub const fn new() -> Self {
        Self {
            partitions: [None; MBR_ENTRY_COUNT],
            count: 0,
        }
    }

    /// Build from per-slot results. Occupied slots are packed to the front
    /// in slot order.
    pub fn from_slots(slots: [Option<PartitionInfo>; MBR_ENTRY_COUNT]) -> Self {
        let mut table = Self::new();
        for info in slots.into_iter().flatten() {
            table.partitions[table.count] = Some(info);
            table.count += 1;
        }
        table
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn get(&self, index: usize) -> Option<&PartitionInfo> {
        if index < self.count {
            self.partitions[index].as_ref()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartitionInfo> {
        self.partitions[..self.count]
            .iter()
            .filter_map(|p| p.as_ref())
    }
}
