// Byte-level helpers shared by the on-disk encoders

use core::fmt;

#[inline]
pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

#[inline]
pub fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[inline]
pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Bounded ASCII string stored inline (model names, volume names).
///
/// Bytes outside printable ASCII are dropped on construction, so `as_str`
/// never fails.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> FixedStr<N> {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Build from raw bytes: stops at the first NUL, keeps printable ASCII,
    /// trims surrounding spaces.
    pub fn from_raw(raw: &[u8]) -> Self {
        let mut out = Self::empty();
        for &b in raw.iter().take_while(|&&b| b != 0) {
            if out.len == N {
                break;
            }
            if (0x20..=0x7E).contains(&b) {
                out.bytes[out.len] = b;
                out.len += 1;
            }
        }
        out.trim_spaces();
        out
    }

    pub fn new(s: &str) -> Self {
        Self::from_raw(s.as_bytes())
    }

    fn trim_spaces(&mut self) {
        while self.len > 0 && self.bytes[self.len - 1] == b' ' {
            self.len -= 1;
        }
        let lead = self.bytes[..self.len].iter().take_while(|&&b| b == b' ').count();
        if lead > 0 {
            self.bytes.copy_within(lead..self.len, 0);
            self.len -= lead;
        }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
