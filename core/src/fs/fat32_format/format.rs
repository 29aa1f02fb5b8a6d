// FAT32 filesystem formatter

use gpt_disk_io::BlockIo;

use super::*;
use crate::config::{FormatConfig, FAT_LABEL_LEN};
use crate::disk::block_io::{flush, write_lba};
use crate::disk::mbr::MBR_SIGNATURE;
use crate::disk::SECTOR_SIZE;
use crate::error::AllocError;
use crate::utils::{read_u16, read_u32, write_u16, write_u32};

/// FAT size for a region, per copy, in sectors.
///
/// Closed form matching the fixed cluster size: 128 entries per FAT sector
/// times 8 sectors per cluster, plus 2 for the two copies.
pub fn sectors_per_fat(total_sectors: u32) -> u32 {
    let data = total_sectors.saturating_sub(RESERVED_SECTORS as u32);
    let per_fat_sector = SECTORS_PER_CLUSTER as u32 * 128 + NUM_FATS as u32;
    data.div_ceil(per_fat_sector) * 2
}

/// Derived placement of the FAT32 areas, relative to the partition start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fat32Layout {
    pub total_sectors: u32,
    pub sectors_per_fat: u32,
    pub fat1_offset: u32,
    pub fat2_offset: u32,
    pub data_offset: u32,
    pub cluster_count: u32,
}

impl Fat32Layout {
    pub fn compute(total_sectors: u32) -> Result<Self, AllocError> {
        if total_sectors <= RESERVED_SECTORS as u32 {
            return Err(AllocError::TooSmall);
        }

        let spf = sectors_per_fat(total_sectors);
        let fat1_offset = RESERVED_SECTORS as u32;
        let fat2_offset = fat1_offset + spf;
        let data_offset = fat2_offset + spf;

        let data_sectors = total_sectors
            .checked_sub(data_offset)
            .ok_or(AllocError::TooSmall)?;
        let cluster_count = data_sectors / SECTORS_PER_CLUSTER as u32;
        if cluster_count == 0 {
            return Err(AllocError::TooSmall);
        }

        Ok(Self {
            total_sectors,
            sectors_per_fat: spf,
            fat1_offset,
            fat2_offset,
            data_offset,
            cluster_count,
        })
    }
}

/// The boot sector fields this formatter writes, with explicit offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fat32BootSector {
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub media_type: u8,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,
    pub fat_size_32: u32,
    pub root_cluster: u32,
    pub fs_info_sector: u16,
    pub backup_boot_sector: u16,
    pub drive_number: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; FAT_LABEL_LEN],
    pub fs_type: [u8; 8],
}

impl Fat32BootSector {
    pub fn new(layout: &Fat32Layout, hidden_sectors: u32, config: &FormatConfig) -> Self {
        Self {
            oem_name: config.oem_name,
            bytes_per_sector: BYTES_PER_SECTOR,
            sectors_per_cluster: SECTORS_PER_CLUSTER,
            reserved_sectors: RESERVED_SECTORS,
            num_fats: NUM_FATS,
            media_type: MEDIA_FIXED_DISK,
            sectors_per_track: 63,
            num_heads: 255,
            hidden_sectors,
            total_sectors_32: layout.total_sectors,
            fat_size_32: layout.sectors_per_fat,
            root_cluster: ROOT_CLUSTER,
            fs_info_sector: FSINFO_SECTOR,
            backup_boot_sector: BACKUP_BOOT_SECTOR,
            drive_number: 0x80,
            boot_signature: 0x29,
            volume_id: config.volume_id,
            volume_label: config.fat_label,
            fs_type: *FS_TYPE_TAG,
        }
    }

    pub fn to_bytes(&self) -> [u8; SECTOR_SIZE] {
        let mut bs = [0u8; SECTOR_SIZE];

        // JMP short + NOP
        bs[0x00..0x03].copy_from_slice(&[0xEB, 0x58, 0x90]);
        bs[0x03..0x0B].copy_from_slice(&self.oem_name);
        write_u16(&mut bs, 0x0B, self.bytes_per_sector);
        bs[0x0D] = self.sectors_per_cluster;
        write_u16(&mut bs, 0x0E, self.reserved_sectors);
        bs[0x10] = self.num_fats;
        // root entry count, total16 and fat16 size stay 0 on FAT32
        bs[0x15] = self.media_type;
        write_u16(&mut bs, 0x18, self.sectors_per_track);
        write_u16(&mut bs, 0x1A, self.num_heads);
        write_u32(&mut bs, 0x1C, self.hidden_sectors);
        write_u32(&mut bs, 0x20, self.total_sectors_32);
        write_u32(&mut bs, 0x24, self.fat_size_32);
        write_u32(&mut bs, 0x2C, self.root_cluster);
        write_u16(&mut bs, 0x30, self.fs_info_sector);
        write_u16(&mut bs, 0x32, self.backup_boot_sector);
        bs[0x40] = self.drive_number;
        bs[0x42] = self.boot_signature;
        write_u32(&mut bs, 0x43, self.volume_id);
        bs[0x47..0x52].copy_from_slice(&self.volume_label);
        bs[0x52..0x5A].copy_from_slice(&self.fs_type);
        bs[510..].copy_from_slice(&MBR_SIGNATURE);
        bs
    }

    /// Decode a sector. `None` if the trailing 0x55AA is missing.
    pub fn parse(bs: &[u8; SECTOR_SIZE]) -> Option<Self> {
        if bs[510..] != MBR_SIGNATURE {
            return None;
        }

        let mut oem_name = [0u8; 8];
        oem_name.copy_from_slice(&bs[0x03..0x0B]);
        let mut volume_label = [0u8; FAT_LABEL_LEN];
        volume_label.copy_from_slice(&bs[0x47..0x52]);
        let mut fs_type = [0u8; 8];
        fs_type.copy_from_slice(&bs[0x52..0x5A]);

        Some(Self {
            oem_name,
            bytes_per_sector: read_u16(bs, 0x0B),
            sectors_per_cluster: bs[0x0D],
            reserved_sectors: read_u16(bs, 0x0E),
            num_fats: bs[0x10],
            media_type: bs[0x15],
            sectors_per_track: read_u16(bs, 0x18),
            num_heads: read_u16(bs, 0x1A),
            hidden_sectors: read_u32(bs, 0x1C),
            total_sectors_32: read_u32(bs, 0x20),
            fat_size_32: read_u32(bs, 0x24),
            root_cluster: read_u32(bs, 0x2C),
            fs_info_sector: read_u16(bs, 0x30),
            backup_boot_sector: read_u16(bs, 0x32),
            drive_number: bs[0x40],
            boot_signature: bs[0x42],
            volume_id: read_u32(bs, 0x43),
            volume_label,
            fs_type,
        })
    }
}

fn fsinfo_sector(free_clusters: u32) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    write_u32(&mut sector, 0, FSINFO_LEAD_SIG);
    write_u32(&mut sector, 484, FSINFO_STRUC_SIG);
    write_u32(&mut sector, 488, free_clusters);
    // cluster 2 is the root directory
    write_u32(&mut sector, 492, ROOT_CLUSTER + 1);
    write_u32(&mut sector, 508, FSINFO_TRAIL_SIG);
    sector
}

fn fat_head_sector() -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    write_u32(&mut sector, 0, FAT_MEDIA_ENTRY);
    write_u32(&mut sector, 4, FAT_EOC);
    write_u32(&mut sector, 8, FAT_EOC);
    sector
}

/// Format a partition as FAT32.
///
/// Writes the boot sector, FSInfo, backup boot sector, the first sector of
/// both FATs and a zeroed root directory cluster. A failed write leaves the
/// region partially formatted.
pub fn format_fat32<B: BlockIo>(
    block_io: &mut B,
    partition_lba_start: u64,
    partition_sectors: u64,
    config: &FormatConfig,
) -> Result<(), AllocError> {
    let hidden = u32::try_from(partition_lba_start).map_err(|_| AllocError::TooLarge)?;
    let total = u32::try_from(partition_sectors).map_err(|_| AllocError::TooLarge)?;
    let layout = Fat32Layout::compute(total)?;

    log::info!(
        "fat32: formatting {} sectors at lba {} (fat size {}, {} clusters)",
        total,
        partition_lba_start,
        layout.sectors_per_fat,
        layout.cluster_count
    );

    let boot = Fat32BootSector::new(&layout, hidden, config).to_bytes();
    write_lba(block_io, partition_lba_start, &boot)?;

    let fsinfo = fsinfo_sector(layout.cluster_count - 1);
    write_lba(block_io, partition_lba_start + FSINFO_SECTOR as u64, &fsinfo)?;
    write_lba(block_io, partition_lba_start + BACKUP_BOOT_SECTOR as u64, &boot)?;

    let fat_head = fat_head_sector();
    write_lba(block_io, partition_lba_start + layout.fat1_offset as u64, &fat_head)?;
    write_lba(block_io, partition_lba_start + layout.fat2_offset as u64, &fat_head)?;

    let zero = [0u8; SECTOR_SIZE];
    let root_lba = partition_lba_start + layout.data_offset as u64;
    for i in 0..SECTORS_PER_CLUSTER as u64 {
        write_lba(block_io, root_lba + i, &zero)?;
    }

    flush(block_io)?;
    log::info!("fat32: format complete");
    Ok(())
}
