//! Minimal ext4 bootstrap: superblock, group descriptors and bitmaps.
//!
//! No root inode, journal or inode table contents are written. The result
//! carries valid ext4 metadata headers but is not mountable as-is.

mod format;
mod group;
mod superblock;

pub use format::{format_ext4, read_volume_name, Ext4Geometry};
pub use group::GroupDescriptor;
pub use superblock::Ext4Superblock;

use crate::config::EXT4_NAME_LEN;
use crate::utils::FixedStr;

pub type VolumeName = FixedStr<EXT4_NAME_LEN>;

/// 4 MiB
pub const EXT4_MIN_SECTORS: u64 = 8192;
pub const EXT4_BLOCK_SIZE: u64 = 4096;
pub const SECTORS_PER_BLOCK: u64 = EXT4_BLOCK_SIZE / 512;
pub const BLOCKS_PER_GROUP: u32 = 32768;
pub const INODES_PER_GROUP: u32 = 8192;
pub const MAX_BLOCK_GROUPS: u64 = 65536;

pub const EXT4_MAGIC: u16 = 0xEF53;

/// Superblock lives at byte 1024 of the partition
pub const SUPERBLOCK_SECTOR: u64 = 1024 / 512;
/// Descriptor for group `g` is at `SUPERBLOCK_SECTOR + 1 + g`
pub const GROUP_DESC_SECTOR: u64 = SUPERBLOCK_SECTOR + 1;

pub const EXT4_INODE_SIZE: u16 = 256;
pub const EXT4_DESC_SIZE: u16 = 64;
pub const EXT4_FIRST_INO: u32 = 11;
/// Inodes 1..=10 are reserved
pub const RESERVED_INODES: u32 = 10;

pub const FEATURE_COMPAT_DIR_INDEX: u32 = 0x0020;
pub const FEATURE_INCOMPAT_EXTENTS: u32 = 0x0040;
pub const FEATURE_INCOMPAT_64BIT: u32 = 0x0080;

/// Block bitmap, inode bitmap, inode table and superblock block
pub const METADATA_BLOCKS_PER_GROUP: u32 = 4;
