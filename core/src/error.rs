//! Error taxonomy for the storage core
//!
//! Every failure is returned to the immediate caller; nothing in this crate
//! aborts. The shell turns these into console text via `Display`.

use core::any::Any;
use core::fmt;

/// ATA transfer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// ERR bit set in the status register after a command
    DeviceError,
    /// Status register read back as 0: nothing on the bus
    NoDevice,
    /// LBA does not fit in 28 bits
    LbaOutOfRange,
    /// Buffer length is not a whole number of sectors
    BufferSize,
}

impl IoError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceError => "ATA device reported an error",
            Self::NoDevice => "No ATA device present",
            Self::LbaOutOfRange => "LBA exceeds 28-bit addressing",
            Self::BufferSize => "Buffer is not a multiple of the sector size",
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a `BlockIo` error onto `IoError`.
///
/// ATA-backed devices already report an `IoError` and keep it; anything else
/// is a generic device failure.
pub(crate) fn block_io_failed<E: fmt::Display + 'static>(e: E) -> IoError {
    log::warn!("block I/O failed: {}", e);
    match (&e as &dyn Any).downcast_ref::<IoError>() {
        Some(io) => *io,
        None => IoError::DeviceError,
    }
}

/// Disk selection failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    /// Index is not below the number of scanned disks
    OutOfRange,
}

impl SelectError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "Invalid disk index",
        }
    }
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition table and formatter failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Underlying block read or write failed
    IoError,
    /// All four MBR entries are occupied
    NoFreeSlot,
    /// Aligned region does not fit on the disk
    InsufficientSpace,
    /// Target entry is already free
    SlotEmpty,
    /// Partition index outside 0..=3
    InvalidSlot,
    /// Region below the filesystem's minimum size
    TooSmall,
    /// Region start or length does not fit the on-disk 32-bit fields
    TooLarge,
    /// ext4 block group count is zero or above the sanity ceiling
    InvalidGroupCount,
    /// Re-read metadata does not match what the formatter writes
    VerifyFailed,
}

impl AllocError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IoError => "Disk I/O failed",
            Self::NoFreeSlot => "No empty partition slots available",
            Self::InsufficientSpace => "Not enough free space on disk",
            Self::SlotEmpty => "Partition does not exist",
            Self::InvalidSlot => "Invalid partition index",
            Self::TooSmall => "Partition too small for filesystem",
            Self::TooLarge => "Partition exceeds 32-bit sector addressing",
            Self::InvalidGroupCount => "Invalid ext4 block group count",
            Self::VerifyFailed => "Filesystem metadata verification failed",
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<IoError> for AllocError {
    fn from(_: IoError) -> Self {
        Self::IoError
    }
}

/// Failures of the session-level disktool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisktoolError {
    NoDiskSelected,
    /// Requested size is larger than the whole disk
    ExceedsCapacity,
    /// Partition table could not be read
    Io(IoError),
    Select(SelectError),
    Alloc(AllocError),
}

impl fmt::Display for DisktoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDiskSelected => f.write_str("No disk selected"),
            Self::ExceedsCapacity => f.write_str("Requested size exceeds disk capacity"),
            Self::Io(e) => write!(f, "{}", e),
            Self::Select(e) => write!(f, "{}", e),
            Self::Alloc(e) => write!(f, "{}", e),
        }
    }
}

impl From<IoError> for DisktoolError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl From<SelectError> for DisktoolError {
    fn from(e: SelectError) -> Self {
        Self::Select(e)
    }
}

impl From<AllocError> for DisktoolError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}
