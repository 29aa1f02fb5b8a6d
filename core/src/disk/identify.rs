//! ATA IDENTIFY DEVICE response parsing.
//!
//! The response is 256 little-endian words. Text fields pack two ASCII
//! characters per word, high byte first.

use crate::disk::SECTOR_SIZE;
use crate::utils::FixedStr;

pub const IDENTIFY_WORDS: usize = 256;

const MODEL_FIRST_WORD: usize = 27;
const MODEL_LAST_WORD: usize = 46;

/// Words 60-61: total user-addressable sectors in LBA28 mode
const LBA28_SECTORS_LO: usize = 60;
const LBA28_SECTORS_HI: usize = 61;

pub const MODEL_LEN: usize = (MODEL_LAST_WORD - MODEL_FIRST_WORD + 1) * 2;

pub type ModelName = FixedStr<MODEL_LEN>;

#[derive(Clone)]
pub struct IdentifyData {
    words: [u16; IDENTIFY_WORDS],
}

impl IdentifyData {
    pub const fn from_words(words: [u16; IDENTIFY_WORDS]) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[u16; IDENTIFY_WORDS] {
        &self.words
    }

    pub fn model(&self) -> ModelName {
        let mut raw = [0u8; MODEL_LEN];
        for (i, word) in self.words[MODEL_FIRST_WORD..=MODEL_LAST_WORD].iter().enumerate() {
            raw[i * 2] = (word >> 8) as u8;
            raw[i * 2 + 1] = (word & 0xFF) as u8;
        }
        ModelName::from_raw(&raw)
    }

    pub fn total_sectors(&self) -> u32 {
        self.words[LBA28_SECTORS_LO] as u32 | ((self.words[LBA28_SECTORS_HI] as u32) << 16)
    }

    pub fn size_mb(&self) -> u64 {
        (self.total_sectors() as u64 * SECTOR_SIZE as u64) / (1024 * 1024)
    }
}

impl core::fmt::Debug for IdentifyData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentifyData")
            .field("model", &self.model())
            .field("total_sectors", &self.total_sectors())
            .finish()
    }
}

/// Pack `model` and `sectors` into an IDENTIFY word image.
#[cfg(test)]
pub(crate) fn encode_identify(model: &str, sectors: u32) -> [u16; IDENTIFY_WORDS] {
    let mut words = [0u16; IDENTIFY_WORDS];
    let mut raw = [b' '; MODEL_LEN];
    for (dst, src) in raw.iter_mut().zip(model.bytes()) {
        *dst = src;
    }
    for i in 0..(MODEL_LEN / 2) {
        words[MODEL_FIRST_WORD + i] = ((raw[i * 2] as u16) << 8) | raw[i * 2 + 1] as u16;
    }
    words[LBA28_SECTORS_LO] = (sectors & 0xFFFF) as u16;
    words[LBA28_SECTORS_HI] = (sectors >> 16) as u16;
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_is_byte_swapped_per_word() {
        let mut words = [0u16; IDENTIFY_WORDS];
        // "QE" "MU" stored high byte first
        words[27] = u16::from_be_bytes(*b"QE");
        words[28] = u16::from_be_bytes(*b"MU");
        for w in &mut words[29..=46] {
            *w = 0x2020;
        }
        let id = IdentifyData::from_words(words);
        assert_eq!(id.model().as_str(), "QEMU");
    }

    #[test]
    fn test_capacity_words() {
        // 100 MiB = 204800 sectors = 0x0003_2000
        let mut words = [0u16; IDENTIFY_WORDS];
        words[60] = 0x2000;
        words[61] = 0x0003;
        let id = IdentifyData::from_words(words);
        assert_eq!(id.total_sectors(), 204_800);
        assert_eq!(id.size_mb(), 100);
    }

    #[test]
    fn test_large_disk_size_does_not_overflow() {
        // 0x0FFFFFFF sectors (~128 GiB) overflows 32-bit byte math
        let id = IdentifyData::from_words(encode_identify("BIG", 0x0FFF_FFFF));
        assert_eq!(id.size_mb(), (0x0FFF_FFFFu64 * 512) >> 20);
    }

    #[test]
    fn test_encode_matches_parser() {
        let id = IdentifyData::from_words(encode_identify("QEMU HARDDISK", 204_800));
        assert_eq!(id.model().as_str(), "QEMU HARDDISK");
        assert_eq!(id.size_mb(), 100);
    }
}
