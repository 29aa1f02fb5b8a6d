// Sector 0 read-modify-write

use gpt_disk_io::BlockIo;

use super::types::{
    decode_table, encode_entry, PartitionEntry, MBR_ENTRY_COUNT, MBR_PARTITION_TABLE_OFFSET,
    MBR_SIGNATURE, MBR_SIGNATURE_OFFSET,
};
use crate::disk::block_io::{flush, read_lba, write_lba};
use crate::disk::SECTOR_SIZE;
use crate::error::{AllocError, IoError};

const MBR_LBA: u64 = 0;

pub fn read_mbr<B: BlockIo>(block_io: &mut B) -> Result<[u8; SECTOR_SIZE], IoError> {
    read_lba(block_io, MBR_LBA)
}

pub fn read_table<B: BlockIo>(
    block_io: &mut B,
) -> Result<[PartitionEntry; MBR_ENTRY_COUNT], IoError> {
    let mbr = read_mbr(block_io)?;
    Ok(decode_table(&mbr))
}

/// Replace one slot. The whole sector is re-read, one entry patched and the
/// sector written back, so the other three entries and the boot code survive.
pub fn write_entry<B: BlockIo>(
    block_io: &mut B,
    slot: usize,
    entry: &PartitionEntry,
) -> Result<(), AllocError> {
    if slot >= MBR_ENTRY_COUNT {
        return Err(AllocError::InvalidSlot);
    }

    let mut mbr = read_mbr(block_io)?;
    encode_entry(&mut mbr, slot, entry);
    write_lba(block_io, MBR_LBA, &mbr)?;
    flush(block_io)?;

    log::debug!(
        "mbr: slot {} <- type {:#04x} start {} count {}",
        slot,
        entry.partition_type,
        entry.lba_first,
        entry.sector_count
    );
    Ok(())
}

/// Zero-fill one slot. A slot that is already free is an error and nothing
/// is written.
pub fn clear_entry<B: BlockIo>(block_io: &mut B, slot: usize) -> Result<(), AllocError> {
    if slot >= MBR_ENTRY_COUNT {
        return Err(AllocError::InvalidSlot);
    }

    let mut mbr = read_mbr(block_io)?;
    if !decode_table(&mbr)[slot].is_used() {
        return Err(AllocError::SlotEmpty);
    }

    encode_entry(&mut mbr, slot, &PartitionEntry::EMPTY);
    write_lba(block_io, MBR_LBA, &mbr)?;
    flush(block_io)?;

    log::debug!("mbr: slot {} cleared", slot);
    Ok(())
}

/// Fresh table: four free entries and the 0x55AA signature. Boot code bytes
/// before the table are kept as they are.
pub fn write_empty_table<B: BlockIo>(block_io: &mut B) -> Result<(), AllocError> {
    let mut mbr = read_mbr(block_io)?;
    mbr[MBR_PARTITION_TABLE_OFFSET..MBR_SIGNATURE_OFFSET].fill(0);
    mbr[MBR_SIGNATURE_OFFSET..].copy_from_slice(&MBR_SIGNATURE);
    write_lba(block_io, MBR_LBA, &mbr)?;
    flush(block_io)?;
    Ok(())
}
