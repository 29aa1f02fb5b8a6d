//! MBR table read/write/allocate tests

mod common;

use common::{MemoryBlockDevice, SimDisk, SimulatedAta};
use etyos_core::disk::mbr::{
    allocate_slot_and_region, clear_entry, read_table, write_empty_table, write_entry,
    PartitionEntry,
};
use etyos_core::disk::{AtaBlockIo, AtaPio, DiskHandle, DiskInfo, ModelName};
use etyos_core::{AllocError, IoError};

fn disk_of(size_mb: u64) -> DiskInfo {
    DiskInfo {
        handle: DiskHandle::PRIMARY_MASTER,
        model: ModelName::new("TEST DISK"),
        size_mb,
        total_sectors: size_mb * 2048,
    }
}

fn with_signature(device: &mut MemoryBlockDevice) {
    device.data[510] = 0x55;
    device.data[511] = 0xAA;
}

#[test]
fn test_write_entry_round_trips_all_fields() {
    let mut device = MemoryBlockDevice::new(4096);
    with_signature(&mut device);

    let entry = PartitionEntry {
        status: 0x80,
        chs_start: [0x01, 0x02, 0x03],
        partition_type: 0x83,
        chs_end: [0xFE, 0xFF, 0xFF],
        lba_first: 2048,
        sector_count: 1024,
    };
    write_entry(&mut device, 3, &entry).expect("write should succeed");

    let table = read_table(&mut device).expect("read should succeed");
    assert_eq!(table[3], entry);
    assert!(table[3].is_bootable());
    for slot in 0..3 {
        assert_eq!(table[slot], PartitionEntry::EMPTY);
    }
    assert_eq!(&device.data[510..512], &[0x55, 0xAA]);
}

#[test]
fn test_write_entry_preserves_rest_of_sector() {
    let mut device = MemoryBlockDevice::new(4096);
    for (i, b) in device.data[..0x1BE].iter_mut().enumerate() {
        *b = (i % 251) as u8;
    }
    write_entry(&mut device, 0, &PartitionEntry::new(0x0C, 2048, 2048)).unwrap();
    write_entry(&mut device, 1, &PartitionEntry::new(0x83, 4096, 2048)).unwrap();

    for i in 0..0x1BE {
        assert_eq!(device.data[i], (i % 251) as u8);
    }
    let table = read_table(&mut device).unwrap();
    assert_eq!(table[0].partition_type, 0x0C);
    assert_eq!(table[1].partition_type, 0x83);
}

#[test]
fn test_clear_empty_slot_is_refused_without_writing() {
    let mut device = MemoryBlockDevice::new(4096);
    write_entry(&mut device, 0, &PartitionEntry::new(0x0C, 2048, 2048)).unwrap();
    let before = device.data.clone();
    let writes = device.writes;

    assert_eq!(clear_entry(&mut device, 2), Err(AllocError::SlotEmpty));
    assert_eq!(device.writes, writes);
    assert_eq!(device.data, before);
}

#[test]
fn test_clear_zero_fills_entry() {
    let mut device = MemoryBlockDevice::new(4096);
    write_entry(&mut device, 1, &PartitionEntry::new(0x07, 2048, 2048)).unwrap();
    clear_entry(&mut device, 1).unwrap();

    assert!(device.data[0x1CE..0x1DE].iter().all(|&b| b == 0));
    assert!(!read_table(&mut device).unwrap()[1].is_used());
}

#[test]
fn test_invalid_slot() {
    let mut device = MemoryBlockDevice::new(16);
    assert_eq!(
        write_entry(&mut device, 4, &PartitionEntry::new(0x0C, 2048, 1)),
        Err(AllocError::InvalidSlot)
    );
    assert_eq!(clear_entry(&mut device, 7), Err(AllocError::InvalidSlot));
    assert_eq!(device.writes, 0);
}

#[test]
fn test_read_failure_maps_to_io_error() {
    let mut device = MemoryBlockDevice::new(16).failing_at(0);
    assert_eq!(read_table(&mut device), Err(IoError::DeviceError));
}

#[test]
fn test_read_table_keeps_ata_failure_kind() {
    let mut bad = SimDisk::new("BAD SECTOR", 4);
    bad.fail_lba = Some(0);
    let sim = SimulatedAta::new()
        .with_disk(0, 0, SimDisk::new("QEMU HARDDISK", 4))
        .with_disk(1, 0, bad);
    let mut ata = AtaPio::new(sim);

    // nothing attached as primary slave
    let mut absent = AtaBlockIo::new(&mut ata, DiskHandle::new(0, 1), 8192);
    assert_eq!(read_table(&mut absent), Err(IoError::NoDevice));

    let mut failing = AtaBlockIo::new(&mut ata, DiskHandle::new(1, 0), 8192);
    assert_eq!(read_table(&mut failing), Err(IoError::DeviceError));

    // mutations still report the collapsed kind
    let mut absent = AtaBlockIo::new(&mut ata, DiskHandle::new(0, 1), 8192);
    assert_eq!(
        allocate_slot_and_region(&mut absent, &disk_of(4), 2048),
        Err(AllocError::IoError)
    );
}

#[test]
fn test_allocate_huge_request_is_insufficient_space() {
    let mut device = MemoryBlockDevice::new(16);
    with_signature(&mut device);
    assert_eq!(
        allocate_slot_and_region(&mut device, &disk_of(100), u64::MAX),
        Err(AllocError::InsufficientSpace)
    );
    assert_eq!(device.writes, 0);
}

#[test]
fn test_empty_table_keeps_boot_code() {
    let mut device = MemoryBlockDevice::new(16);
    device.data[..0x1BE].fill(0x90);
    device.data[0x1BE..512].fill(0xFF);

    write_empty_table(&mut device).unwrap();

    assert!(device.data[..0x1BE].iter().all(|&b| b == 0x90));
    assert!(device.data[0x1BE..0x1FE].iter().all(|&b| b == 0));
    assert_eq!(&device.data[510..512], &[0x55, 0xAA]);
}

#[test]
fn test_allocations_are_aligned_and_disjoint() {
    let disk = disk_of(64);
    let mut device = MemoryBlockDevice::new(disk.total_sectors);

    for sectors in [3000u64, 2048, 777, 10_000] {
        let (slot, start) = allocate_slot_and_region(&mut device, &disk, sectors).unwrap();
        assert_eq!(start % 2048, 0);

        let table = read_table(&mut device).unwrap();
        for existing in table.iter().filter(|e| e.is_used()) {
            let overlaps = start < existing.end_lba() && (existing.lba_first as u64) < start + sectors;
            assert!(!overlaps, "slot {} overlaps {:?}", slot, existing);
        }
        write_entry(
            &mut device,
            slot,
            &PartitionEntry::new(0x0C, start as u32, sectors as u32),
        )
        .unwrap();
    }

    assert_eq!(
        allocate_slot_and_region(&mut device, &disk, 2048),
        Err(AllocError::NoFreeSlot)
    );
}

#[test]
fn test_allocation_checks_registry_capacity() {
    let disk = disk_of(8);
    let mut device = MemoryBlockDevice::new(disk.total_sectors);
    assert_eq!(
        allocate_slot_and_region(&mut device, &disk, 8 * 2048),
        Err(AllocError::InsufficientSpace)
    );
    assert_eq!(
        allocate_slot_and_region(&mut device, &disk, 7 * 2048),
        Ok((0, 2048))
    );
}
