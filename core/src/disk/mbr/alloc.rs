// Slot and region allocation

use gpt_disk_io::BlockIo;

use super::table::read_table;
use super::types::{PartitionEntry, MBR_ENTRY_COUNT};
use crate::disk::manager::DiskInfo;
use crate::disk::SECTOR_SIZE;
use crate::error::AllocError;

/// 1MB in 512-byte sectors
pub const PARTITION_ALIGNMENT: u64 = 2048;
pub const FIRST_PARTITION_LBA: u64 = PARTITION_ALIGNMENT;

/// Round up to the next 1MB boundary
pub fn align_lba(lba: u64) -> u64 {
    lba.div_ceil(PARTITION_ALIGNMENT) * PARTITION_ALIGNMENT
}

pub fn mb_to_sectors(size_mb: u64) -> u64 {
    size_mb.saturating_mul(1024 * 1024 / SECTOR_SIZE as u64)
}

/// Pick the first free slot and the first aligned LBA past every occupied
/// entry. Works on a decoded table only; no I/O.
pub fn plan_region(
    table: &[PartitionEntry; MBR_ENTRY_COUNT],
    disk_sectors: u64,
    requested_sectors: u64,
) -> Result<(usize, u64), AllocError> {
    if requested_sectors == 0 {
        return Err(AllocError::TooSmall);
    }

    let slot = table
        .iter()
        .position(|e| !e.is_used())
        .ok_or(AllocError::NoFreeSlot)?;

    // Highest end across all slots, not the first occupied one found
    let highest_end = table
        .iter()
        .filter(|e| e.is_used())
        .map(PartitionEntry::end_lba)
        .max()
        .unwrap_or(0);

    let start_lba = align_lba(highest_end).max(FIRST_PARTITION_LBA);

    let fits = start_lba
        .checked_add(requested_sectors)
        .is_some_and(|end| end <= disk_sectors);
    if !fits {
        return Err(AllocError::InsufficientSpace);
    }
    if start_lba > u32::MAX as u64 || requested_sectors > u32::MAX as u64 {
        return Err(AllocError::TooLarge);
    }

    Ok((slot, start_lba))
}

/// Read the disk's table and plan a region of `requested_sectors` on it.
/// Capacity comes from the registry's size in MB, not the raw sector count.
pub fn allocate_slot_and_region<B: BlockIo>(
    block_io: &mut B,
    disk: &DiskInfo,
    requested_sectors: u64,
) -> Result<(usize, u64), AllocError> {
    let table = read_table(block_io)?;
    let (slot, start_lba) = plan_region(&table, disk.capacity_sectors(), requested_sectors)?;

    log::debug!(
        "alloc: slot {} start {} ({} sectors requested)",
        slot,
        start_lba,
        requested_sectors
    );
    Ok((slot, start_lba))
}
