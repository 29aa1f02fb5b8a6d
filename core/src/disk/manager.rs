// Disk registry - scan results and the current-disk selection

use etyos_hwinit::PortIo;

use crate::disk::ata::{AtaPio, DiskHandle};
use crate::disk::identify::{IdentifyData, ModelName};
use crate::disk::SECTOR_SIZE;
use crate::error::SelectError;

/// 2 controllers x 2 drives
pub const MAX_DISKS: usize = 4;

/// Anything that can answer IDENTIFY for a bus position.
pub trait DiskProbe {
    fn identify(&mut self, handle: DiskHandle) -> Option<IdentifyData>;
}

impl<P: PortIo> DiskProbe for AtaPio<P> {
    fn identify(&mut self, handle: DiskHandle) -> Option<IdentifyData> {
        AtaPio::identify(self, handle)
    }
}

/// Represents a physical disk found by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskInfo {
    pub handle: DiskHandle,
    pub model: ModelName,
    pub size_mb: u64,
    /// LBA28 addressable sectors as reported by IDENTIFY
    pub total_sectors: u64,
}

impl DiskInfo {
    const EMPTY: Self = Self {
        handle: DiskHandle::PRIMARY_MASTER,
        model: ModelName::empty(),
        size_mb: 0,
        total_sectors: 0,
    };

    pub fn from_identify(handle: DiskHandle, id: &IdentifyData) -> Self {
        Self {
            handle,
            model: id.model(),
            size_mb: id.size_mb(),
            total_sectors: id.total_sectors() as u64,
        }
    }

    /// Capacity used for allocation decisions: whole megabytes in sectors.
    pub fn capacity_sectors(&self) -> u64 {
        self.size_mb * (1024 * 1024 / SECTOR_SIZE as u64)
    }
}

/// Scan results plus the "current disk" used by the session commands.
///
/// Invariant: `selected`, when set, indexes a scanned disk.
pub struct DiskRegistry {
    disks: [DiskInfo; MAX_DISKS],
    count: usize,
    selected: Option<usize>,
}

impl DiskRegistry {
    pub const fn new() -> Self {
        Self {
            disks: [DiskInfo::EMPTY; MAX_DISKS],
            count: 0,
            selected: None,
        }
    }

    /// Probe every bus position and replace the registry contents.
    ///
    /// A previous selection survives only if the same unit is still at the
    /// same index.
    pub fn scan<D: DiskProbe>(&mut self, probe: &mut D) -> &[DiskInfo] {
        let previous = self.selected.map(|i| (i, self.disks[i].handle));
        self.clear();

        for handle in DiskHandle::ALL {
            let Some(id) = probe.identify(handle) else {
                continue;
            };
            let info = DiskInfo::from_identify(handle, &id);
            log::info!(
                "disk {}: ata{}.{} {} ({} MB)",
                self.count,
                handle.controller,
                handle.drive,
                info.model,
                info.size_mb
            );
            self.disks[self.count] = info;
            self.count += 1;
        }

        self.selected = previous
            .filter(|&(i, handle)| i < self.count && self.disks[i].handle == handle)
            .map(|(i, _)| i);

        log::info!("found {} disks", self.count);
        self.disks()
    }

    pub fn disks(&self) -> &[DiskInfo] {
        &self.disks[..self.count]
    }

    pub fn disk_count(&self) -> usize {
        self.count
    }

    pub fn get_disk(&self, index: usize) -> Option<&DiskInfo> {
        self.disks().get(index)
    }

    pub fn select(&mut self, index: usize) -> Result<(), SelectError> {
        if index >= self.count {
            return Err(SelectError::OutOfRange);
        }
        self.selected = Some(index);
        log::info!("selected disk {}: {}", index, self.disks[index].model);
        Ok(())
    }

    pub fn current(&self) -> Option<&DiskInfo> {
        self.selected.map(|i| &self.disks[i])
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Clear all disks
    pub fn clear(&mut self) {
        self.disks = [DiskInfo::EMPTY; MAX_DISKS];
        self.count = 0;
        self.selected = None;
    }
}
