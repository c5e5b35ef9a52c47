//! Register access paths.
//!
//! The switch registers are 32 bits wide and can be reached two ways:
//!
//! - [`MmioTransport`]: the switch core embedded in the MT7620 SoC, mapped
//!   directly into the CPU's address space
//! - [`MdioTransport`]: the external MT7530, reached through the management
//!   bus by paging 16-bit halves through PHY address 0x1f
//!
//! Neither transport locks. A logical register access through
//! [`MdioTransport`] is three bus transactions that must not interleave with
//! another access; the caller owns that serialization.

use std::ptr::NonNull;
use tracing::debug;

/// Which physical path a transport uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// Memory-mapped registers
    Direct,
    /// Paged access over the management bus
    Indirect,
}

/// 32-bit register access to the switch.
pub trait RegisterTransport {
    /// Reads a register.
    fn read(&mut self, reg: u32) -> u32;

    /// Writes a register.
    fn write(&mut self, reg: u32, value: u32);

    /// Returns the access path of this transport.
    fn kind(&self) -> TransportKind;

    /// Performs a read-modify-write operation on a register.
    fn modify<F>(&mut self, reg: u32, f: F)
    where
        F: FnOnce(&mut u32),
        Self: Sized,
    {
        let mut value = self.read(reg);
        f(&mut value);
        self.write(reg, value);
    }
}

/// Memory-mapped register access.
pub struct MmioTransport {
    base: NonNull<u8>,
}

impl MmioTransport {
    /// Creates a transport over a mapped register window.
    ///
    /// # Safety
    ///
    /// `base` must point to the switch register window (or memory standing in
    /// for it), valid for volatile 32-bit reads and writes at every offset the
    /// driver uses (up to [`HWTRAP`](crate::regs::HWTRAP) plus four bytes),
    /// and aligned to 4 bytes, for as long as the transport lives.
    pub unsafe fn new(base: NonNull<u8>) -> Self {
        Self { base }
    }

    fn reg_ptr(&self, reg: u32) -> *mut u32 {
        // SAFETY: `new` guarantees `base + reg` stays inside the window.
        unsafe { self.base.as_ptr().add(reg as usize).cast::<u32>() }
    }
}

impl RegisterTransport for MmioTransport {
    fn read(&mut self, reg: u32) -> u32 {
        // SAFETY: pointer validity and alignment are guaranteed by `new`.
        let value = unsafe { self.reg_ptr(reg).read_volatile() };
        debug!(reg = format_args!("{:#06x}", reg), value = format_args!("{:#010x}", value), "MMIO read");
        value
    }

    fn write(&mut self, reg: u32, value: u32) {
        debug!(reg = format_args!("{:#06x}", reg), value = format_args!("{:#010x}", value), "MMIO write");
        // SAFETY: pointer validity and alignment are guaranteed by `new`.
        unsafe { self.reg_ptr(reg).write_volatile(value) }
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }
}

/// Clause 22 management bus access.
pub trait MdioBus {
    /// Reads a 16-bit PHY register.
    fn read(&mut self, phy: u8, reg: u8) -> u16;

    /// Writes a 16-bit PHY register.
    fn write(&mut self, phy: u8, reg: u8, value: u16);
}

/// Paged register access over a management bus.
pub struct MdioTransport<B: MdioBus> {
    bus: B,
}

impl<B: MdioBus> MdioTransport<B> {
    /// PHY address the switch answers on for paged access.
    pub const PHY_ADDR: u8 = 0x1f;
    /// Sub-register selecting the page.
    pub const PAGE_REG: u8 = 0x1f;
    /// Sub-register carrying the high 16 bits.
    pub const HIGH_REG: u8 = 0x10;

    /// Creates a transport on top of a bus.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Returns the underlying bus.
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Returns the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Page number for a register address.
    pub const fn page(reg: u32) -> u16 {
        ((reg >> 6) & 0x3ff) as u16
    }

    /// Sub-register carrying the low 16 bits of a register address.
    pub const fn low_reg(reg: u32) -> u8 {
        ((reg >> 2) & 0xf) as u8
    }

    fn select_page(&mut self, reg: u32) {
        self.bus
            .write(Self::PHY_ADDR, Self::PAGE_REG, Self::page(reg));
    }
}

impl<B: MdioBus> RegisterTransport for MdioTransport<B> {
    fn read(&mut self, reg: u32) -> u32 {
        self.select_page(reg);
        let low = self.bus.read(Self::PHY_ADDR, Self::low_reg(reg));
        let high = self.bus.read(Self::PHY_ADDR, Self::HIGH_REG);

        let value = (u32::from(high) << 16) | u32::from(low);
        debug!(reg = format_args!("{:#06x}", reg), value = format_args!("{:#010x}", value), "MDIO read");
        value
    }

    fn write(&mut self, reg: u32, value: u32) {
        debug!(reg = format_args!("{:#06x}", reg), value = format_args!("{:#010x}", value), "MDIO write");
        self.select_page(reg);
        self.bus
            .write(Self::PHY_ADDR, Self::low_reg(reg), (value & 0xffff) as u16);
        self.bus
            .write(Self::PHY_ADDR, Self::HIGH_REG, (value >> 16) as u16);
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Indirect
    }
}
