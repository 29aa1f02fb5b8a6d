// Adapter to use the ATA PIO driver with gpt_disk_io

use etyos_hwinit::PortIo;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};

use crate::disk::ata::{AtaPio, DiskHandle};
use crate::disk::SECTOR_SIZE;
use crate::error::{block_io_failed, IoError};

/// One ATA disk seen through the generic `BlockIo` interface.
///
/// Multi-block requests are split into single-sector PIO commands.
pub struct AtaBlockIo<'a, P: PortIo> {
    ata: &'a mut AtaPio<P>,
    handle: DiskHandle,
    num_blocks: u64,
}

impl<'a, P: PortIo> AtaBlockIo<'a, P> {
    pub fn new(ata: &'a mut AtaPio<P>, handle: DiskHandle, num_blocks: u64) -> Self {
        Self {
            ata,
            handle,
            num_blocks,
        }
    }

    pub fn handle(&self) -> DiskHandle {
        self.handle
    }
}

impl<P: PortIo> BlockIo for AtaBlockIo<'_, P> {
    type Error = IoError;

    fn block_size(&self) -> BlockSize {
        BlockSize::BS_512
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok(self.num_blocks)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        if dst.len() % SECTOR_SIZE != 0 {
            return Err(IoError::BufferSize);
        }
        for (i, chunk) in dst.chunks_exact_mut(SECTOR_SIZE).enumerate() {
            let sector = self.ata.read_sector(self.handle, start_lba.to_u64() + i as u64)?;
            chunk.copy_from_slice(&sector);
        }
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        if src.len() % SECTOR_SIZE != 0 {
            return Err(IoError::BufferSize);
        }
        for (i, chunk) in src.chunks_exact(SECTOR_SIZE).enumerate() {
            let mut sector = [0u8; SECTOR_SIZE];
            sector.copy_from_slice(chunk);
            self.ata
                .write_sector(self.handle, start_lba.to_u64() + i as u64, &sector)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.ata.flush_cache(self.handle)
    }
}

/// Read one 512-byte sector through any `BlockIo`.
pub fn read_lba<B: BlockIo>(block_io: &mut B, lba: u64) -> Result<[u8; SECTOR_SIZE], IoError> {
    let mut sector = [0u8; SECTOR_SIZE];
    block_io
        .read_blocks(Lba(lba), &mut sector)
        .map_err(block_io_failed)?;
    Ok(sector)
}

/// Write one 512-byte sector through any `BlockIo`.
pub fn write_lba<B: BlockIo>(
    block_io: &mut B,
    lba: u64,
    sector: &[u8; SECTOR_SIZE],
) -> Result<(), IoError> {
    #[cfg(feature = "format_debug")]
    log::trace!("write lba {}", lba);

    block_io
        .write_blocks(Lba(lba), sector)
        .map_err(block_io_failed)
}

pub fn flush<B: BlockIo>(block_io: &mut B) -> Result<(), IoError> {
    block_io.flush().map_err(block_io_failed)
}
