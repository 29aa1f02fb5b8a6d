// ext4 bootstrap formatter

use gpt_disk_io::BlockIo;

use super::group::block_bitmap_sector;
use super::*;
use crate::config::FormatConfig;
use crate::disk::block_io::{flush, read_lba, write_lba};
use crate::disk::SECTOR_SIZE;
use crate::error::AllocError;

/// Block and group counts for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ext4Geometry {
    pub blocks_count: u32,
    pub groups: u32,
}

impl Ext4Geometry {
    pub fn compute(partition_sectors: u64) -> Result<Self, AllocError> {
        if partition_sectors < EXT4_MIN_SECTORS {
            return Err(AllocError::TooSmall);
        }

        // 64BIT is advertised but the high word is never used
        let blocks = (partition_sectors / SECTORS_PER_BLOCK).min(u32::MAX as u64);
        let groups = blocks.div_ceil(BLOCKS_PER_GROUP as u64);
        if groups == 0 || groups > MAX_BLOCK_GROUPS {
            return Err(AllocError::InvalidGroupCount);
        }

        Ok(Self {
            blocks_count: blocks as u32,
            groups: groups as u32,
        })
    }

    /// The last group gets the remainder, not a full group.
    pub fn blocks_in_group(&self, group: u32) -> u32 {
        let used = group as u64 * BLOCKS_PER_GROUP as u64;
        (self.blocks_count as u64 - used).min(BLOCKS_PER_GROUP as u64) as u32
    }
}

/// Bootstrap an ext4 layout on a partition.
///
/// Nothing is written if the region is too small. An I/O failure stops at
/// once; groups already written stay on disk.
pub fn format_ext4<B: BlockIo>(
    block_io: &mut B,
    partition_lba_start: u64,
    partition_sectors: u64,
    config: &FormatConfig,
) -> Result<(), AllocError> {
    let geo = Ext4Geometry::compute(partition_sectors)?;

    log::info!(
        "ext4: formatting {} blocks in {} group(s) at lba {}",
        geo.blocks_count,
        geo.groups,
        partition_lba_start
    );

    let sb = Ext4Superblock::new(geo.blocks_count, geo.groups, config.ext4_uuid, config.ext4_name);
    write_lba(block_io, partition_lba_start + SUPERBLOCK_SECTOR, &sb.to_sector())?;

    let zero = [0u8; SECTOR_SIZE];
    for group in 0..geo.groups {
        let gd = GroupDescriptor::for_group(group, geo.blocks_in_group(group));
        write_lba(
            block_io,
            partition_lba_start + GROUP_DESC_SECTOR + group as u64,
            &gd.to_sector(),
        )?;

        let bitmap_lba = partition_lba_start + gd.block_bitmap as u64 * SECTORS_PER_BLOCK;
        write_lba(block_io, bitmap_lba, &block_bitmap_sector())?;
        write_lba(block_io, bitmap_lba + 1, &zero)?;

        #[cfg(feature = "format_debug")]
        log::trace!("ext4: group {} done", group);
    }

    flush(block_io)?;
    log::info!("ext4: format complete");
    Ok(())
}

/// Volume name of the ext4 filesystem at `partition_lba_start`, if the
/// superblock magic is present.
pub fn read_volume_name<B: BlockIo>(
    block_io: &mut B,
    partition_lba_start: u64,
) -> Result<Option<VolumeName>, AllocError> {
    let sector = read_lba(block_io, partition_lba_start + SUPERBLOCK_SECTOR)?;
    Ok(Ext4Superblock::from_sector(&sector).map(|sb| VolumeName::from_raw(&sb.volume_name)))
}
