//! Serial debug output (COM1 @ 0x3F8)
//!
//! No buffering, no interrupts, pure polling.

use crate::pio::PortIo;

pub const COM1: u16 = 0x3F8;

const LSR_OFFSET: u16 = 5;
const LSR_TX_EMPTY: u8 = 0x20;

/// Bounded wait per byte; a missing UART must never hang the logger.
const TX_SPIN_LIMIT: usize = 100;

pub struct SerialPort<P: PortIo> {
    ports: P,
    base: u16,
}

impl<P: PortIo> SerialPort<P> {
    pub fn new(ports: P, base: u16) -> Self {
        Self { ports, base }
    }

    pub fn com1(ports: P) -> Self {
        Self::new(ports, COM1)
    }

    /// Write one byte. Gives up silently after `TX_SPIN_LIMIT` polls.
    #[inline]
    pub fn putc(&mut self, b: u8) {
        for _ in 0..TX_SPIN_LIMIT {
            if self.ports.inb(self.base + LSR_OFFSET) & LSR_TX_EMPTY != 0 {
                self.ports.outb(self.base, b);
                return;
            }
            core::hint::spin_loop();
        }
    }

    pub fn puts(&mut self, s: &str) {
        for b in s.bytes() {
            if b == b'\n' {
                self.putc(b'\r');
            }
            self.putc(b);
        }
    }

    pub fn into_inner(self) -> P {
        self.ports
    }
}

impl<P: PortIo> core::fmt::Write for SerialPort<P> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.puts(s);
        Ok(())
    }
}
