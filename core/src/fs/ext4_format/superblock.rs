// ext4 superblock codec

use uguid::Guid;

use super::*;
use crate::config::EXT4_NAME_LEN;
use crate::disk::SECTOR_SIZE;
use crate::utils::{read_u16, read_u32, write_u16, write_u32};

const S_INODES_COUNT: usize = 0x00;
const S_BLOCKS_COUNT_LO: usize = 0x04;
const S_R_BLOCKS_COUNT_LO: usize = 0x08;
const S_FREE_BLOCKS_COUNT_LO: usize = 0x0C;
const S_FREE_INODES_COUNT: usize = 0x10;
const S_FIRST_DATA_BLOCK: usize = 0x14;
const S_LOG_BLOCK_SIZE: usize = 0x18;
const S_LOG_CLUSTER_SIZE: usize = 0x1C;
const S_BLOCKS_PER_GROUP: usize = 0x20;
const S_CLUSTERS_PER_GROUP: usize = 0x24;
const S_INODES_PER_GROUP: usize = 0x28;
const S_MAGIC: usize = 0x38;
const S_STATE: usize = 0x3A;
const S_ERRORS: usize = 0x3C;
const S_REV_LEVEL: usize = 0x4C;
const S_FIRST_INO: usize = 0x54;
const S_INODE_SIZE: usize = 0x58;
const S_FEATURE_COMPAT: usize = 0x5C;
const S_FEATURE_INCOMPAT: usize = 0x60;
const S_FEATURE_RO_COMPAT: usize = 0x64;
const S_UUID: usize = 0x68;
const S_VOLUME_NAME: usize = 0x78;
const S_DESC_SIZE: usize = 0xFE;
const S_BLOCKS_COUNT_HI: usize = 0x150;

const STATE_CLEAN: u16 = 1;
const ERRORS_CONTINUE: u16 = 1;
const REV_DYNAMIC: u32 = 1;
/// log2(4096) - 10
const LOG_BLOCK_SIZE_4K: u32 = 2;

/// The superblock fields the bootstrap formatter populates.
///
/// Everything not listed here is zero on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ext4Superblock {
    pub inodes_count: u32,
    pub blocks_count: u64,
    pub r_blocks_count: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    pub first_data_block: u32,
    pub log_block_size: u32,
    pub log_cluster_size: u32,
    pub blocks_per_group: u32,
    pub clusters_per_group: u32,
    pub inodes_per_group: u32,
    pub magic: u16,
    pub state: u16,
    pub errors: u16,
    pub rev_level: u32,
    pub first_ino: u32,
    pub inode_size: u16,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub feature_ro_compat: u32,
    pub uuid: Guid,
    pub volume_name: [u8; EXT4_NAME_LEN],
    pub desc_size: u16,
}

impl Ext4Superblock {
    pub fn new(blocks_count: u32, groups: u32, uuid: Guid, volume_name: [u8; EXT4_NAME_LEN]) -> Self {
        let inodes_count = INODES_PER_GROUP * groups;
        Self {
            inodes_count,
            blocks_count: blocks_count as u64,
            r_blocks_count: blocks_count / 20,
            free_blocks_count: blocks_count.saturating_sub(1),
            free_inodes_count: inodes_count.saturating_sub(RESERVED_INODES),
            first_data_block: 0,
            log_block_size: LOG_BLOCK_SIZE_4K,
            log_cluster_size: LOG_BLOCK_SIZE_4K,
            blocks_per_group: BLOCKS_PER_GROUP,
            clusters_per_group: BLOCKS_PER_GROUP,
            inodes_per_group: INODES_PER_GROUP,
            magic: EXT4_MAGIC,
            state: STATE_CLEAN,
            errors: ERRORS_CONTINUE,
            rev_level: REV_DYNAMIC,
            first_ino: EXT4_FIRST_INO,
            inode_size: EXT4_INODE_SIZE,
            feature_compat: FEATURE_COMPAT_DIR_INDEX,
            feature_incompat: FEATURE_INCOMPAT_EXTENTS | FEATURE_INCOMPAT_64BIT,
            feature_ro_compat: 0,
            uuid,
            volume_name,
            desc_size: EXT4_DESC_SIZE,
        }
    }

    /// Encode the first 512 bytes of the superblock.
    pub fn to_sector(&self) -> [u8; SECTOR_SIZE] {
        let mut s = [0u8; SECTOR_SIZE];
        write_u32(&mut s, S_INODES_COUNT, self.inodes_count);
        write_u32(&mut s, S_BLOCKS_COUNT_LO, self.blocks_count as u32);
        write_u32(&mut s, S_R_BLOCKS_COUNT_LO, self.r_blocks_count);
        write_u32(&mut s, S_FREE_BLOCKS_COUNT_LO, self.free_blocks_count);
        write_u32(&mut s, S_FREE_INODES_COUNT, self.free_inodes_count);
        write_u32(&mut s, S_FIRST_DATA_BLOCK, self.first_data_block);
        write_u32(&mut s, S_LOG_BLOCK_SIZE, self.log_block_size);
        write_u32(&mut s, S_LOG_CLUSTER_SIZE, self.log_cluster_size);
        write_u32(&mut s, S_BLOCKS_PER_GROUP, self.blocks_per_group);
        write_u32(&mut s, S_CLUSTERS_PER_GROUP, self.clusters_per_group);
        write_u32(&mut s, S_INODES_PER_GROUP, self.inodes_per_group);
        write_u16(&mut s, S_MAGIC, self.magic);
        write_u16(&mut s, S_STATE, self.state);
        write_u16(&mut s, S_ERRORS, self.errors);
        write_u32(&mut s, S_REV_LEVEL, self.rev_level);
        write_u32(&mut s, S_FIRST_INO, self.first_ino);
        write_u16(&mut s, S_INODE_SIZE, self.inode_size);
        write_u32(&mut s, S_FEATURE_COMPAT, self.feature_compat);
        write_u32(&mut s, S_FEATURE_INCOMPAT, self.feature_incompat);
        write_u32(&mut s, S_FEATURE_RO_COMPAT, self.feature_ro_compat);
        s[S_UUID..S_UUID + 16].copy_from_slice(&self.uuid.to_bytes());
        s[S_VOLUME_NAME..S_VOLUME_NAME + EXT4_NAME_LEN].copy_from_slice(&self.volume_name);
        write_u16(&mut s, S_DESC_SIZE, self.desc_size);
        write_u32(&mut s, S_BLOCKS_COUNT_HI, (self.blocks_count >> 32) as u32);
        s
    }

    /// Decode a superblock sector. `None` unless the magic matches.
    pub fn from_sector(s: &[u8; SECTOR_SIZE]) -> Option<Self> {
        if read_u16(s, S_MAGIC) != EXT4_MAGIC {
            return None;
        }

        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(&s[S_UUID..S_UUID + 16]);
        let mut volume_name = [0u8; EXT4_NAME_LEN];
        volume_name.copy_from_slice(&s[S_VOLUME_NAME..S_VOLUME_NAME + EXT4_NAME_LEN]);

        let blocks_lo = read_u32(s, S_BLOCKS_COUNT_LO) as u64;
        let blocks_hi = read_u32(s, S_BLOCKS_COUNT_HI) as u64;

        Some(Self {
            inodes_count: read_u32(s, S_INODES_COUNT),
            blocks_count: (blocks_hi << 32) | blocks_lo,
            r_blocks_count: read_u32(s, S_R_BLOCKS_COUNT_LO),
            free_blocks_count: read_u32(s, S_FREE_BLOCKS_COUNT_LO),
            free_inodes_count: read_u32(s, S_FREE_INODES_COUNT),
            first_data_block: read_u32(s, S_FIRST_DATA_BLOCK),
            log_block_size: read_u32(s, S_LOG_BLOCK_SIZE),
            log_cluster_size: read_u32(s, S_LOG_CLUSTER_SIZE),
            blocks_per_group: read_u32(s, S_BLOCKS_PER_GROUP),
            clusters_per_group: read_u32(s, S_CLUSTERS_PER_GROUP),
            inodes_per_group: read_u32(s, S_INODES_PER_GROUP),
            magic: EXT4_MAGIC,
            state: read_u16(s, S_STATE),
            errors: read_u16(s, S_ERRORS),
            rev_level: read_u32(s, S_REV_LEVEL),
            first_ino: read_u32(s, S_FIRST_INO),
            inode_size: read_u16(s, S_INODE_SIZE),
            feature_compat: read_u32(s, S_FEATURE_COMPAT),
            feature_incompat: read_u32(s, S_FEATURE_INCOMPAT),
            feature_ro_compat: read_u32(s, S_FEATURE_RO_COMPAT),
            uuid: Guid::from_bytes(uuid),
            volume_name,
            desc_size: read_u16(s, S_DESC_SIZE),
        })
    }

    pub fn block_size(&self) -> u64 {
        1024 << self.log_block_size
    }
}
