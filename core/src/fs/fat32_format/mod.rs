mod format;
mod verify;

pub use format::{format_fat32, sectors_per_fat, Fat32BootSector, Fat32Layout};
pub use verify::verify_fat32;

pub const BYTES_PER_SECTOR: u16 = 512;
pub const SECTORS_PER_CLUSTER: u8 = 8;
pub const RESERVED_SECTORS: u16 = 32;
pub const NUM_FATS: u8 = 2;
pub const MEDIA_FIXED_DISK: u8 = 0xF8;
pub const ROOT_CLUSTER: u32 = 2;
pub const FSINFO_SECTOR: u16 = 1;
pub const BACKUP_BOOT_SECTOR: u16 = 6;

pub const FSINFO_LEAD_SIG: u32 = 0x4161_5252;
pub const FSINFO_STRUC_SIG: u32 = 0x6141_7272;
pub const FSINFO_TRAIL_SIG: u32 = 0xAA55_0000;

/// FAT entries 0, 1 and the root directory's end-of-chain
pub const FAT_MEDIA_ENTRY: u32 = 0x0FFF_FFF8;
pub const FAT_EOC: u32 = 0x0FFF_FFFF;

pub const FS_TYPE_TAG: &[u8; 8] = b"FAT32   ";
