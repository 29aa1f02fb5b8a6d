//! Hardware access layer for etyOS
//!
//! Port I/O and the COM1 debug writer. Everything here is polling-only:
//! no interrupts, no DMA, no buffering.
//!
//! # Usage
//!
//! ```ignore
//! use etyos_hwinit::pio::X86PortIo;
//! use etyos_hwinit::serial::SerialPort;
//!
//! // Kernel context only: we own the legacy I/O space.
//! let ports = unsafe { X86PortIo::new() };
//! let mut com1 = SerialPort::com1(ports);
//! core::fmt::Write::write_str(&mut com1, "hello\n").ok();
//! ```

#![no_std]

pub mod pio;
pub mod serial;

pub use pio::PortIo;
#[cfg(target_arch = "x86_64")]
pub use pio::X86PortIo;
pub use serial::SerialPort;
