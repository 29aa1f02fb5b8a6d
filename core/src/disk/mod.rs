// Disk management: ATA PIO, registry, MBR

pub const SECTOR_SIZE: usize = 512;

pub mod ata;
pub mod block_io;
pub mod identify;
pub mod manager;
pub mod mbr;
pub mod partition;

pub use ata::{AtaPio, DiskHandle};
pub use block_io::AtaBlockIo;
pub use identify::{IdentifyData, ModelName};
pub use manager::{DiskInfo, DiskProbe, DiskRegistry, MAX_DISKS};
pub use mbr::PartitionEntry;
pub use partition::{PartitionInfo, PartitionTable, PartitionType};
