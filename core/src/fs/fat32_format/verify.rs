// FAT32 post-format check

use gpt_disk_io::BlockIo;

use super::*;
use crate::disk::block_io::read_lba;
use crate::error::AllocError;
use crate::utils::read_u32;

/// Re-read the boot area and both FAT heads of a freshly formatted volume.
///
/// Returns `VerifyFailed` on the first field that does not match what
/// `format_fat32` writes.
pub fn verify_fat32<B: BlockIo>(block_io: &mut B, partition_lba_start: u64) -> Result<(), AllocError> {
    let raw = read_lba(block_io, partition_lba_start)?;
    let boot = Fat32BootSector::parse(&raw).ok_or(AllocError::VerifyFailed)?;

    let geometry_ok = boot.bytes_per_sector == BYTES_PER_SECTOR
        && boot.sectors_per_cluster == SECTORS_PER_CLUSTER
        && boot.reserved_sectors == RESERVED_SECTORS
        && boot.num_fats == NUM_FATS
        && boot.root_cluster == ROOT_CLUSTER
        && boot.fs_info_sector == FSINFO_SECTOR
        && boot.backup_boot_sector == BACKUP_BOOT_SECTOR
        && &boot.fs_type == FS_TYPE_TAG;
    if !geometry_ok {
        log::warn!("fat32 verify: boot sector geometry mismatch");
        return Err(AllocError::VerifyFailed);
    }

    let fsinfo = read_lba(block_io, partition_lba_start + FSINFO_SECTOR as u64)?;
    if read_u32(&fsinfo, 0) != FSINFO_LEAD_SIG
        || read_u32(&fsinfo, 484) != FSINFO_STRUC_SIG
        || read_u32(&fsinfo, 508) != FSINFO_TRAIL_SIG
    {
        log::warn!("fat32 verify: bad FSInfo signatures");
        return Err(AllocError::VerifyFailed);
    }

    let backup = read_lba(block_io, partition_lba_start + BACKUP_BOOT_SECTOR as u64)?;
    if backup != raw {
        log::warn!("fat32 verify: backup boot sector differs");
        return Err(AllocError::VerifyFailed);
    }

    let fat1 = partition_lba_start + RESERVED_SECTORS as u64;
    let fat2 = fat1 + boot.fat_size_32 as u64;
    for fat_lba in [fat1, fat2] {
        let head = read_lba(block_io, fat_lba)?;
        if read_u32(&head, 0) != FAT_MEDIA_ENTRY
            || read_u32(&head, 4) != FAT_EOC
            || read_u32(&head, 8) != FAT_EOC
        {
            log::warn!("fat32 verify: bad FAT head at lba {}", fat_lba);
            return Err(AllocError::VerifyFailed);
        }
    }

    Ok(())
}
