//! etyOS Storage Core
//!
//! Disk discovery over ATA PIO, the MBR partition table, and from-scratch
//! FAT32 / ext4 metadata bootstrap. Designed to be no_std and heap-free.

#![no_std]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod disk;
pub mod disktool;
pub mod error;
pub mod fs;
pub mod logger;
pub mod utils;

pub use config::FormatConfig;
pub use disk::{DiskHandle, DiskInfo, DiskRegistry, PartitionEntry, SECTOR_SIZE};
pub use disktool::{CreatedPartition, Disktool};
pub use error::{AllocError, DisktoolError, IoError, SelectError};
pub use fs::FileSystemType;
