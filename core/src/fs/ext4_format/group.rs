// ext4 block group descriptors

use super::*;
use crate::disk::SECTOR_SIZE;
use crate::utils::{read_u16, read_u32, write_u16, write_u32};

const BG_BLOCK_BITMAP_LO: usize = 0x00;
const BG_INODE_BITMAP_LO: usize = 0x04;
const BG_INODE_TABLE_LO: usize = 0x08;
const BG_FREE_BLOCKS_COUNT_LO: usize = 0x0C;
const BG_FREE_INODES_COUNT_LO: usize = 0x0E;

/// Group descriptor fields the bootstrap formatter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub block_bitmap: u32,
    pub inode_bitmap: u32,
    pub inode_table: u32,
    pub free_blocks_count: u16,
    pub free_inodes_count: u16,
}

impl GroupDescriptor {
    /// Metadata placed at the start of the group's own block range.
    pub fn for_group(group: u32, blocks_in_group: u32) -> Self {
        let first_block = group * BLOCKS_PER_GROUP;
        Self {
            block_bitmap: first_block,
            inode_bitmap: first_block + 1,
            inode_table: first_block + 2,
            free_blocks_count: blocks_in_group.saturating_sub(METADATA_BLOCKS_PER_GROUP) as u16,
            free_inodes_count: INODES_PER_GROUP as u16,
        }
    }

    pub fn to_sector(&self) -> [u8; SECTOR_SIZE] {
        let mut s = [0u8; SECTOR_SIZE];
        write_u32(&mut s, BG_BLOCK_BITMAP_LO, self.block_bitmap);
        write_u32(&mut s, BG_INODE_BITMAP_LO, self.inode_bitmap);
        write_u32(&mut s, BG_INODE_TABLE_LO, self.inode_table);
        write_u16(&mut s, BG_FREE_BLOCKS_COUNT_LO, self.free_blocks_count);
        write_u16(&mut s, BG_FREE_INODES_COUNT_LO, self.free_inodes_count);
        s
    }

    pub fn from_sector(s: &[u8; SECTOR_SIZE]) -> Self {
        Self {
            block_bitmap: read_u32(s, BG_BLOCK_BITMAP_LO),
            inode_bitmap: read_u32(s, BG_INODE_BITMAP_LO),
            inode_table: read_u32(s, BG_INODE_TABLE_LO),
            free_blocks_count: read_u16(s, BG_FREE_BLOCKS_COUNT_LO),
            free_inodes_count: read_u16(s, BG_FREE_INODES_COUNT_LO),
        }
    }
}

/// Block bitmap head: the four metadata blocks are in use.
pub(super) fn block_bitmap_sector() -> [u8; SECTOR_SIZE] {
    let mut s = [0u8; SECTOR_SIZE];
    s[0] = (1u8 << METADATA_BLOCKS_PER_GROUP) - 1;
    s
}
