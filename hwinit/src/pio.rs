//! Port I/O bindings.
//!
//! The storage drivers talk to hardware only through [`PortIo`], so the same
//! register-level code runs against real ports in the kernel and against a
//! simulated device in host tests.

/// Byte and word access to the x86 I/O port space.
pub trait PortIo {
    fn inb(&mut self, port: u16) -> u8;
    fn outb(&mut self, port: u16, value: u8);
    fn inw(&mut self, port: u16) -> u16;
    fn outw(&mut self, port: u16, value: u16);
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        (**self).inb(port)
    }

    #[inline]
    fn outb(&mut self, port: u16, value: u8) {
        (**self).outb(port, value)
    }

    #[inline]
    fn inw(&mut self, port: u16) -> u16 {
        (**self).inw(port)
    }

    #[inline]
    fn outw(&mut self, port: u16, value: u16) {
        (**self).outw(port, value)
    }
}

/// Real `in`/`out` instructions.
#[cfg(target_arch = "x86_64")]
#[derive(Debug)]
pub struct X86PortIo {
    _private: (),
}

#[cfg(target_arch = "x86_64")]
impl X86PortIo {
    /// # Safety
    /// Caller must run at a privilege level allowed to touch the I/O space and
    /// must be the only code driving the ports it passes to this handle.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "x86_64")]
impl PortIo for X86PortIo {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        let mut p = x86_64::instructions::port::Port::<u8>::new(port);
        // SAFETY: construction of X86PortIo is the unsafe contract
        unsafe { p.read() }
    }

    #[inline]
    fn outb(&mut self, port: u16, value: u8) {
        let mut p = x86_64::instructions::port::Port::<u8>::new(port);
        unsafe { p.write(value) }
    }

    #[inline]
    fn inw(&mut self, port: u16) -> u16 {
        let mut p = x86_64::instructions::port::Port::<u16>::new(port);
        unsafe { p.read() }
    }

    #[inline]
    fn outw(&mut self, port: u16, value: u16) {
        let mut p = x86_64::instructions::port::Port::<u16>::new(port);
        unsafe { p.write(value) }
    }
}
