//! Formatter configuration.
//!
//! Identity fields written into new volumes. Geometry (cluster size, group
//! size, reserved area) is fixed by the formatters and not configurable.

use uguid::{guid, Guid};

/// FAT32 volume label length (space padded)
pub const FAT_LABEL_LEN: usize = 11;

/// ext4 `s_volume_name` length (NUL padded)
pub const EXT4_NAME_LEN: usize = 16;

/// Identity written by the FAT32 and ext4 formatters.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// FAT32 OEM name (boot sector bytes 3..11)
    pub oem_name: [u8; 8],
    /// FAT32 volume label
    pub fat_label: [u8; FAT_LABEL_LEN],
    /// FAT32 volume serial number
    pub volume_id: u32,
    /// ext4 volume name
    pub ext4_name: [u8; EXT4_NAME_LEN],
    /// ext4 filesystem UUID
    pub ext4_uuid: Guid,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            oem_name: *b"MSWIN4.1",
            fat_label: *b"NO NAME    ",
            volume_id: 0x1234_5678,
            ext4_name: pad_nul(b"etyOS"),
            ext4_uuid: guid!("e7a0c3f1-5b2d-4c8e-9f61-0d3b8a7e2c54"),
        }
    }
}

impl FormatConfig {
    /// Set the FAT32 volume label. Truncated to 11 bytes, space padded.
    pub fn fat_label(mut self, label: &str) -> Self {
        let mut out = [b' '; FAT_LABEL_LEN];
        for (dst, src) in out.iter_mut().zip(label.bytes()) {
            *dst = src.to_ascii_uppercase();
        }
        self.fat_label = out;
        self
    }

    /// Set the FAT32 volume serial number.
    pub fn volume_id(mut self, id: u32) -> Self {
        self.volume_id = id;
        self
    }

    /// Set the ext4 volume name. Truncated to 16 bytes.
    pub fn ext4_name(mut self, name: &str) -> Self {
        self.ext4_name = pad_nul(name.as_bytes());
        self
    }

    /// Set the ext4 filesystem UUID.
    pub fn ext4_uuid(mut self, uuid: Guid) -> Self {
        self.ext4_uuid = uuid;
        self
    }
}

fn pad_nul(src: &[u8]) -> [u8; EXT4_NAME_LEN] {
    let mut out = [0u8; EXT4_NAME_LEN];
    let n = src.len().min(EXT4_NAME_LEN);
    out[..n].copy_from_slice(&src[..n]);
    out
}
