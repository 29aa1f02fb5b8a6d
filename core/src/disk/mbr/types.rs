// On-disk MBR layout

use crate::disk::partition::{PartitionType, STATUS_BOOTABLE, TYPE_EMPTY};
use crate::disk::SECTOR_SIZE;
use crate::utils::{read_u32, write_u32};

pub const MBR_PARTITION_TABLE_OFFSET: usize = 0x1BE;
pub const PARTITION_ENTRY_SIZE: usize = 16;
pub const MBR_ENTRY_COUNT: usize = 4;
pub const MBR_SIGNATURE_OFFSET: usize = 510;
pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// One 16-byte partition table entry.
///
/// CHS fields are carried through untouched; only LBA addressing is used.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionEntry {
    pub status: u8,
    pub chs_start: [u8; 3],
    pub partition_type: u8,
    pub chs_end: [u8; 3],
    pub lba_first: u32,
    pub sector_count: u32,
}

impl PartitionEntry {
    pub const EMPTY: Self = Self {
        status: 0,
        chs_start: [0; 3],
        partition_type: TYPE_EMPTY,
        chs_end: [0; 3],
        lba_first: 0,
        sector_count: 0,
    };

    /// Inactive entry of the given type.
    pub const fn new(partition_type: u8, lba_first: u32, sector_count: u32) -> Self {
        Self {
            status: 0,
            chs_start: [0; 3],
            partition_type,
            chs_end: [0; 3],
            lba_first,
            sector_count,
        }
    }

    pub fn is_used(&self) -> bool {
        self.partition_type != TYPE_EMPTY
    }

    pub fn is_bootable(&self) -> bool {
        self.status & STATUS_BOOTABLE != 0
    }

    pub fn kind(&self) -> PartitionType {
        PartitionType::from_byte(self.partition_type)
    }

    /// First LBA past the partition.
    pub fn end_lba(&self) -> u64 {
        self.lba_first as u64 + self.sector_count as u64
    }

    pub fn from_bytes(raw: &[u8; PARTITION_ENTRY_SIZE]) -> Self {
        Self {
            status: raw[0],
            chs_start: [raw[1], raw[2], raw[3]],
            partition_type: raw[4],
            chs_end: [raw[5], raw[6], raw[7]],
            lba_first: read_u32(raw, 8),
            sector_count: read_u32(raw, 12),
        }
    }

    pub fn to_bytes(&self) -> [u8; PARTITION_ENTRY_SIZE] {
        let mut raw = [0u8; PARTITION_ENTRY_SIZE];
        raw[0] = self.status;
        raw[1..4].copy_from_slice(&self.chs_start);
        raw[4] = self.partition_type;
        raw[5..8].copy_from_slice(&self.chs_end);
        write_u32(&mut raw, 8, self.lba_first);
        write_u32(&mut raw, 12, self.sector_count);
        raw
    }
}

pub const fn entry_offset(slot: usize) -> usize {
    MBR_PARTITION_TABLE_OFFSET + slot * PARTITION_ENTRY_SIZE
}

/// Interpret bytes [0x1BE, 0x1FE) of sector 0 as four entries.
pub fn decode_table(mbr: &[u8; SECTOR_SIZE]) -> [PartitionEntry; MBR_ENTRY_COUNT] {
    let mut table = [PartitionEntry::EMPTY; MBR_ENTRY_COUNT];
    for (slot, entry) in table.iter_mut().enumerate() {
        let off = entry_offset(slot);
        let mut raw = [0u8; PARTITION_ENTRY_SIZE];
        raw.copy_from_slice(&mbr[off..off + PARTITION_ENTRY_SIZE]);
        *entry = PartitionEntry::from_bytes(&raw);
    }
    table
}

/// Overwrite exactly one entry's 16 bytes; nothing else in `mbr` changes.
pub fn encode_entry(mbr: &mut [u8; SECTOR_SIZE], slot: usize, entry: &PartitionEntry) {
    let off = entry_offset(slot);
    mbr[off..off + PARTITION_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
}

pub fn has_signature(mbr: &[u8; SECTOR_SIZE]) -> bool {
    mbr[MBR_SIGNATURE_OFFSET..] == MBR_SIGNATURE
}
