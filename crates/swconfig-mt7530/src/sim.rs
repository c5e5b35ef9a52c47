//! Software model of the switch register file.
//!
//! [`SimulatedChip`] answers register accesses the way the silicon does for
//! the registers this driver touches, including the VLAN table command
//! handshake. [`SimulatedMdioBus`] puts the chip behind the paged management
//! bus interface. Both back the tests and the `mt7530ctl plan` command.

use std::collections::BTreeMap;
use tracing::debug;

use crate::cam::CamCommand;
use crate::regs::{self, vtcr};
use crate::state::NUM_VLANS;
use crate::transport::{MdioBus, MdioTransport, RegisterTransport, TransportKind};

/// HWTRAP value left behind by a typical boot loader.
pub const BOOTLOADER_HWTRAP: u32 = 0x0111_7fdf;

/// One logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Register read and the value returned
    Read(u32, u32),
    /// Register write and the value written
    Write(u32, u32),
}

impl Access {
    /// Register address of the access.
    pub fn reg(&self) -> u32 {
        match *self {
            Access::Read(reg, _) | Access::Write(reg, _) => reg,
        }
    }
}

/// In-memory switch chip.
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    regs: BTreeMap<u32, u32>,
    cam: [(u32, u32); NUM_VLANS],
    log: Vec<Access>,
    kind: TransportKind,
    stuck_cam: bool,
    busy_polls: u32,
    busy_remaining: u32,
    pending: Option<u32>,
    cam_commands: usize,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChip {
    /// Creates a chip with an empty register file, as a direct transport.
    ///
    /// HWTRAP holds [`BOOTLOADER_HWTRAP`].
    pub fn new() -> Self {
        let mut regs = BTreeMap::new();
        regs.insert(regs::HWTRAP, BOOTLOADER_HWTRAP);

        Self {
            regs,
            cam: [(0, 0); NUM_VLANS],
            log: Vec::new(),
            kind: TransportKind::Direct,
            stuck_cam: false,
            busy_polls: 0,
            busy_remaining: 0,
            pending: None,
            cam_commands: 0,
        }
    }

    /// Reports `kind` from [`RegisterTransport::kind`].
    pub fn with_kind(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Keeps VTCR busy for `polls` reads after each command.
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Never completes VLAN table commands.
    pub fn with_stuck_cam(mut self) -> Self {
        self.stuck_cam = true;
        self
    }

    /// Reads a register without logging or side effects.
    pub fn peek(&self, reg: u32) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    /// Writes a register without logging or side effects.
    pub fn poke(&mut self, reg: u32, value: u32) {
        self.regs.insert(reg, value);
    }

    /// Sets the raw PMSR value reported for `port`.
    pub fn set_port_status(&mut self, port: usize, pmsr: u32) {
        self.poke(regs::pmsr(port), pmsr);
    }

    /// Stored (VAWD1, VAWD2) pair of a VLAN table slot, `None` past the table.
    pub fn cam_entry(&self, slot: usize) -> Option<(u32, u32)> {
        self.cam.get(slot).copied()
    }

    /// Stores a VLAN table slot directly.
    ///
    /// # Panics
    ///
    /// If `slot` is not below [`NUM_VLANS`].
    pub fn set_cam_entry(&mut self, slot: usize, vawd1: u32, vawd2: u32) {
        assert!(
            slot < NUM_VLANS,
            "VLAN table slot {} out of range (table has {})",
            slot,
            NUM_VLANS
        );
        self.cam[slot] = (vawd1, vawd2);
    }

    /// Every access since creation.
    pub fn log(&self) -> &[Access] {
        &self.log
    }

    /// Number of VLAN table commands issued.
    pub fn cam_commands(&self) -> usize {
        self.cam_commands
    }

    /// Values written to `reg`, in order.
    pub fn writes_to(&self, reg: u32) -> impl Iterator<Item = u32> + '_ {
        self.log.iter().filter_map(move |access| match *access {
            Access::Write(r, value) if r == reg => Some(value),
            _ => None,
        })
    }

    /// Number of reads of `reg`.
    pub fn reads_of(&self, reg: u32) -> usize {
        self.log
            .iter()
            .filter(|access| matches!(access, Access::Read(r, _) if *r == reg))
            .count()
    }

    /// All non-zero registers, by address.
    pub fn registers(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.regs
            .iter()
            .filter(|(_, value)| **value != 0)
            .map(|(reg, value)| (*reg, *value))
    }

    fn start_command(&mut self, word: u32) {
        self.cam_commands += 1;
        self.pending = Some(word);
        self.busy_remaining = self.busy_polls;
        self.regs.insert(regs::VTCR, word);
    }

    fn complete_command(&mut self, word: u32) {
        let slot = (word & vtcr::VID_MASK) as usize;
        let func = (word >> vtcr::FUNC_SHIFT) & vtcr::FUNC_MASK;

        if slot >= NUM_VLANS {
            debug!(slot = slot, "Simulated command on a slot past the table");
        } else if func == CamCommand::Write as u32 {
            self.cam[slot] = (self.peek(regs::VAWD1), self.peek(regs::VAWD2));
        } else if func == CamCommand::Read as u32 {
            let (vawd1, vawd2) = self.cam[slot];
            self.regs.insert(regs::VAWD1, vawd1);
            self.regs.insert(regs::VAWD2, vawd2);
        }

        self.regs.insert(regs::VTCR, word & !vtcr::BUSY);
    }

    fn read_vtcr(&mut self) -> u32 {
        if let Some(word) = self.pending {
            if self.stuck_cam {
                return word;
            }
            if self.busy_remaining > 0 {
                self.busy_remaining -= 1;
                return word;
            }
            self.pending = None;
            self.complete_command(word);
        }
        self.peek(regs::VTCR)
    }
}

impl RegisterTransport for SimulatedChip {
    fn read(&mut self, reg: u32) -> u32 {
        let value = if reg == regs::VTCR {
            self.read_vtcr()
        } else {
            self.peek(reg)
        };
        self.log.push(Access::Read(reg, value));
        value
    }

    fn write(&mut self, reg: u32, value: u32) {
        self.log.push(Access::Write(reg, value));
        if reg == regs::VTCR && value & vtcr::BUSY != 0 {
            self.start_command(value);
        } else {
            self.poke(reg, value);
        }
    }

    fn kind(&self) -> TransportKind {
        self.kind
    }
}

/// The chip side of paged management bus access.
///
/// A low-half read latches the high half for the following read of the high
/// sub-register; a high-half write commits the 32-bit value.
#[derive(Debug, Clone)]
pub struct SimulatedMdioBus {
    chip: SimulatedChip,
    page: u16,
    low: Option<(u8, u16)>,
    high: u16,
    transactions: usize,
}

impl SimulatedMdioBus {
    /// Puts `chip` behind a management bus.
    pub fn new(chip: SimulatedChip) -> Self {
        Self {
            chip: chip.with_kind(TransportKind::Indirect),
            page: 0,
            low: None,
            high: 0,
            transactions: 0,
        }
    }

    /// The chip behind the bus.
    pub fn chip(&self) -> &SimulatedChip {
        &self.chip
    }

    /// The chip behind the bus.
    pub fn chip_mut(&mut self) -> &mut SimulatedChip {
        &mut self.chip
    }

    /// Returns the chip.
    pub fn into_chip(self) -> SimulatedChip {
        self.chip
    }

    /// Number of bus transactions seen.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    fn address(&self, sub: u8) -> u32 {
        (u32::from(self.page) << 6) | (u32::from(sub & 0xf) << 2)
    }
}

const PHY_ADDR: u8 = MdioTransport::<SimulatedMdioBus>::PHY_ADDR;
const PAGE_REG: u8 = MdioTransport::<SimulatedMdioBus>::PAGE_REG;
const HIGH_REG: u8 = MdioTransport::<SimulatedMdioBus>::HIGH_REG;

impl MdioBus for SimulatedMdioBus {
    fn read(&mut self, phy: u8, reg: u8) -> u16 {
        self.transactions += 1;
        if phy != PHY_ADDR {
            return 0xffff;
        }

        match reg {
            HIGH_REG => self.high,
            PAGE_REG => self.page,
            sub => {
                let value = self.chip.read(self.address(sub));
                self.high = (value >> 16) as u16;
                (value & 0xffff) as u16
            }
        }
    }

    fn write(&mut self, phy: u8, reg: u8, value: u16) {
        self.transactions += 1;
        if phy != PHY_ADDR {
            return;
        }

        match reg {
            PAGE_REG => self.page = value & 0x3ff,
            HIGH_REG => match self.low.take() {
                Some((sub, low)) => {
                    let addr = self.address(sub);
                    self.chip.write(addr, (u32::from(value) << 16) | u32::from(low));
                }
                None => debug!("High half written without a low half"),
            },
            sub => self.low = Some((sub, value)),
        }
    }
}
