// Filesystem formatters

pub mod ext4_format;
pub mod fat32_format;

pub use ext4_format::{format_ext4, read_volume_name, VolumeName};
pub use fat32_format::{format_fat32, verify_fat32};

use crate::disk::partition::{TYPE_FAT32_LBA, TYPE_LINUX_NATIVE};

/// Filesystem a partition is formatted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemType {
    Fat32,
    Ext4,
}

impl FileSystemType {
    /// Parse a shell token. Only an exact `"ext4"` selects ext4; anything
    /// else, including typos, falls back to FAT32.
    pub fn from_token(token: &str) -> Self {
        match token {
            "ext4" => Self::Ext4,
            _ => Self::Fat32,
        }
    }

    /// MBR type byte written for this filesystem
    pub const fn partition_type_byte(&self) -> u8 {
        match self {
            Self::Fat32 => TYPE_FAT32_LBA,
            Self::Ext4 => TYPE_LINUX_NATIVE,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fat32 => "FAT32",
            Self::Ext4 => "EXT4",
        }
    }
}

impl core::fmt::Display for FileSystemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
