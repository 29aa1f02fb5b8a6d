//! Common test utilities: an in-memory block device and a simulated ATA bus

#![allow(dead_code)]

use etyos_core::disk::identify::IDENTIFY_WORDS;
use etyos_core::SECTOR_SIZE;
use etyos_hwinit::PortIo;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use std::collections::BTreeMap;
use std::io;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
    /// Number of sectors written so far
    pub writes: usize,
    pub flushes: usize,
    /// Reads and writes touching this LBA fail
    pub fail_lba: Option<u64>,
}

impl MemoryBlockDevice {
    /// Zero-filled device of `num_blocks` 512-byte sectors
    pub fn new(num_blocks: u64) -> Self {
        Self::from_data(vec![0u8; num_blocks as usize * SECTOR_SIZE])
    }

    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            data,
            block_size: SECTOR_SIZE,
            writes: 0,
            flushes: 0,
            fail_lba: None,
        }
    }

    pub fn failing_at(mut self, lba: u64) -> Self {
        self.fail_lba = Some(lba);
        self
    }

    pub fn sector(&self, lba: u64) -> &[u8] {
        let offset = lba as usize * self.block_size;
        &self.data[offset..offset + self.block_size]
    }

    pub fn u32_at(&self, lba: u64, offset: usize) -> u32 {
        let s = self.sector(lba);
        u32::from_le_bytes([s[offset], s[offset + 1], s[offset + 2], s[offset + 3]])
    }

    pub fn u16_at(&self, lba: u64, offset: usize) -> u16 {
        let s = self.sector(lba);
        u16::from_le_bytes([s[offset], s[offset + 1]])
    }

    fn check_injected(&self, start_lba: Lba, len: usize) -> Result<(), io::Error> {
        let first = start_lba.0;
        let count = (len / self.block_size) as u64;
        match self.fail_lba {
            Some(bad) if bad >= first && bad < first + count => {
                Err(io::Error::new(io::ErrorKind::Other, "injected sector failure"))
            }
            _ => Ok(()),
        }
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        self.check_injected(start_lba, dst.len())?;
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        self.check_injected(start_lba, src.len())?;
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        self.writes += src.len() / self.block_size;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// IDENTIFY image as a drive returns it: model in words 27..=46, high byte
/// first and space padded; LBA28 capacity in words 60-61.
pub fn identify_words(model: &str, sectors: u32) -> [u16; IDENTIFY_WORDS] {
    let mut words = [0u16; IDENTIFY_WORDS];
    let mut text = [b' '; 40];
    for (dst, src) in text.iter_mut().zip(model.bytes()) {
        *dst = src;
    }
    for (word, pair) in words[27..=46].iter_mut().zip(text.chunks_exact(2)) {
        *word = u16::from_be_bytes([pair[0], pair[1]]);
    }
    words[60] = (sectors & 0xFFFF) as u16;
    words[61] = (sectors >> 16) as u16;
    words
}

const STATUS_IDLE: u8 = 0x50;
const STATUS_DATA: u8 = 0x58;
const STATUS_FAULT: u8 = 0x51;
const ERROR_ABORT: u8 = 0x04;

/// One emulated ATA disk with sparse sector storage.
#[derive(Debug, Clone)]
pub struct SimDisk {
    pub model: String,
    pub total_sectors: u32,
    pub sectors: BTreeMap<u64, [u8; SECTOR_SIZE]>,
    /// Reads and writes of this LBA set ERR
    pub fail_lba: Option<u64>,
    /// Abort IDENTIFY the way ATAPI devices do
    pub atapi: bool,
    pub writes: usize,
    pub flushes: usize,
}

impl SimDisk {
    pub fn new(model: &str, size_mb: u32) -> Self {
        Self {
            model: model.to_string(),
            total_sectors: size_mb * 2048,
            sectors: BTreeMap::new(),
            fail_lba: None,
            atapi: false,
            writes: 0,
            flushes: 0,
        }
    }

    pub fn sector(&self, lba: u64) -> [u8; SECTOR_SIZE] {
        self.sectors.get(&lba).copied().unwrap_or([0u8; SECTOR_SIZE])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    None,
    Read,
    Write(u64),
}

/// Register file of one controller.
#[derive(Debug, Clone)]
struct Channel {
    drive: usize,
    seccount: u8,
    lba: [u8; 3],
    device: u8,
    status: u8,
    error: u8,
    buffer: [u16; IDENTIFY_WORDS],
    cursor: usize,
    transfer: Transfer,
}

impl Channel {
    fn new() -> Self {
        Self {
            drive: 0,
            seccount: 0,
            lba: [0; 3],
            device: 0,
            status: STATUS_IDLE,
            error: 0,
            buffer: [0; IDENTIFY_WORDS],
            cursor: 0,
            transfer: Transfer::None,
        }
    }

    fn lba28(&self) -> u64 {
        (self.lba[0] as u64)
            | (self.lba[1] as u64) << 8
            | (self.lba[2] as u64) << 16
            | ((self.device & 0x0F) as u64) << 24
    }
}

/// `PortIo` emulating the two legacy ATA channels with up to four disks.
///
/// Index of `disks` is `controller * 2 + drive`.
#[derive(Debug, Clone)]
pub struct SimulatedAta {
    pub disks: [Option<SimDisk>; 4],
    channels: [Channel; 2],
}

impl SimulatedAta {
    pub fn new() -> Self {
        Self {
            disks: [None, None, None, None],
            channels: [Channel::new(), Channel::new()],
        }
    }

    pub fn with_disk(mut self, controller: usize, drive: usize, disk: SimDisk) -> Self {
        self.disks[controller * 2 + drive] = Some(disk);
        self
    }

    pub fn disk(&self, controller: usize, drive: usize) -> &SimDisk {
        self.disks[controller * 2 + drive]
            .as_ref()
            .expect("no simulated disk at that position")
    }

    pub fn disk_mut(&mut self, controller: usize, drive: usize) -> &mut SimDisk {
        self.disks[controller * 2 + drive]
            .as_mut()
            .expect("no simulated disk at that position")
    }

    fn decode(port: u16) -> Option<(usize, u16)> {
        match port {
            0x1F0..=0x1F7 => Some((0, port - 0x1F0)),
            0x170..=0x177 => Some((1, port - 0x170)),
            _ => None,
        }
    }

    fn command(&mut self, ch: usize, cmd: u8) {
        let unit = ch * 2 + self.channels[ch].drive;
        let lba = self.channels[ch].lba28();
        let Some(disk) = self.disks[unit].as_mut() else {
            return;
        };
        let c = &mut self.channels[ch];
        c.cursor = 0;
        c.transfer = Transfer::None;
        c.error = 0;

        match cmd {
            0xEC => {
                if disk.atapi {
                    c.status = STATUS_FAULT;
                    c.error = ERROR_ABORT;
                    return;
                }
                c.buffer = identify_words(&disk.model, disk.total_sectors);
                c.transfer = Transfer::Read;
                c.status = STATUS_DATA;
            }
            0x20 | 0x30 => {
                if disk.fail_lba == Some(lba) || lba >= disk.total_sectors as u64 {
                    c.status = STATUS_FAULT;
                    c.error = ERROR_ABORT;
                    return;
                }
                if cmd == 0x20 {
                    let sector = disk.sector(lba);
                    for (w, pair) in c.buffer.iter_mut().zip(sector.chunks_exact(2)) {
                        *w = u16::from_le_bytes([pair[0], pair[1]]);
                    }
                    c.transfer = Transfer::Read;
                } else {
                    c.transfer = Transfer::Write(lba);
                }
                c.status = STATUS_DATA;
            }
            0xE7 => {
                disk.flushes += 1;
                c.status = STATUS_IDLE;
            }
            _ => {
                c.status = STATUS_FAULT;
                c.error = ERROR_ABORT;
            }
        }
    }
}

impl Default for SimulatedAta {
    fn default() -> Self {
        Self::new()
    }
}

impl PortIo for SimulatedAta {
    fn inb(&mut self, port: u16) -> u8 {
        let Some((ch, reg)) = Self::decode(port) else {
            return 0xFF;
        };
        let unit = ch * 2 + self.channels[ch].drive;
        if self.disks[unit].is_none() {
            return 0;
        }
        let c = &self.channels[ch];
        match reg {
            1 => c.error,
            2 => c.seccount,
            3..=5 => c.lba[(reg - 3) as usize],
            6 => c.device,
            7 => c.status,
            _ => 0,
        }
    }

    fn outb(&mut self, port: u16, value: u8) {
        let Some((ch, reg)) = Self::decode(port) else {
            return;
        };
        let c = &mut self.channels[ch];
        match reg {
            2 => c.seccount = value,
            3..=5 => c.lba[(reg - 3) as usize] = value,
            6 => {
                c.device = value;
                c.drive = ((value >> 4) & 1) as usize;
            }
            7 => self.command(ch, value),
            _ => {}
        }
    }

    fn inw(&mut self, port: u16) -> u16 {
        let Some((ch, 0)) = Self::decode(port) else {
            return 0;
        };
        let c = &mut self.channels[ch];
        if c.transfer != Transfer::Read || c.cursor >= IDENTIFY_WORDS {
            return 0;
        }
        let word = c.buffer[c.cursor];
        c.cursor += 1;
        if c.cursor == IDENTIFY_WORDS {
            c.transfer = Transfer::None;
            c.status = STATUS_IDLE;
        }
        word
    }

    fn outw(&mut self, port: u16, value: u16) {
        let Some((ch, 0)) = Self::decode(port) else {
            return;
        };
        let unit = ch * 2 + self.channels[ch].drive;
        let c = &mut self.channels[ch];
        let Transfer::Write(lba) = c.transfer else {
            return;
        };
        c.buffer[c.cursor] = value;
        c.cursor += 1;
        if c.cursor < IDENTIFY_WORDS {
            return;
        }

        let mut sector = [0u8; SECTOR_SIZE];
        for (pair, w) in sector.chunks_exact_mut(2).zip(c.buffer.iter()) {
            pair.copy_from_slice(&w.to_le_bytes());
        }
        c.transfer = Transfer::None;
        c.status = STATUS_IDLE;
        if let Some(disk) = self.disks[unit].as_mut() {
            disk.sectors.insert(lba, sector);
            disk.writes += 1;
        }
    }
}
