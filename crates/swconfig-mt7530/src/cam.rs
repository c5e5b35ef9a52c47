//! VLAN table (CAM) command protocol.
//!
//! A command is issued by writing VTCR with the busy flag set; the chip
//! clears the flag once the VAWD registers have been committed to, or loaded
//! from, the addressed slot.

use std::thread;
use std::time::Duration;
use tracing::warn;

use swconfig_common::{SwConfigError, SwResult};

use crate::regs::{self, vtcr};
use crate::transport::RegisterTransport;

/// Number of VTCR polls before giving up. Matches the hardware timing.
pub const POLL_LIMIT: u32 = 20;
/// Delay after each busy poll.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// VTCR command codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum CamCommand {
    /// Load a slot into VAWD1/VAWD2
    Read = 0,
    /// Store VAWD1/VAWD2 into a slot
    Write = 1,
}

/// Builds the VTCR word that starts `cmd` on `slot`.
pub const fn vtcr_word(cmd: CamCommand, slot: u32) -> u32 {
    vtcr::BUSY | (((cmd as u32) & vtcr::FUNC_MASK) << vtcr::FUNC_SHIFT) | (slot & vtcr::VID_MASK)
}

/// Issues a command and waits for the busy flag to clear.
///
/// Returns the number of polls it took, or a hardware timeout after
/// [`POLL_LIMIT`] busy polls.
pub fn execute<T: RegisterTransport>(t: &mut T, cmd: CamCommand, slot: u32) -> SwResult<u32> {
    t.write(regs::VTCR, vtcr_word(cmd, slot));

    for poll in 1..=POLL_LIMIT {
        if t.read(regs::VTCR) & vtcr::BUSY == 0 {
            return Ok(poll);
        }
        thread::sleep(POLL_INTERVAL);
    }

    Err(SwConfigError::hardware_timeout(regs::VTCR, POLL_LIMIT))
}

/// Runs a command, logging a timeout instead of returning it.
///
/// The chip gives no other completion signal, so a stuck command leaves the
/// slot in whatever state the hardware reached.
pub fn command<T: RegisterTransport>(t: &mut T, cmd: CamCommand, slot: u32) {
    if let Err(e) = execute(t, cmd, slot) {
        warn!(command = ?cmd, slot = slot, error = %e, "VLAN table command timed out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportKind;

    /// VTCR that stays busy for a fixed number of reads.
    struct BusyFor {
        remaining: u32,
        reads: u32,
        writes: Vec<(u32, u32)>,
    }

    impl BusyFor {
        fn new(remaining: u32) -> Self {
            Self {
                remaining,
                reads: 0,
                writes: vec![],
            }
        }
    }

    impl RegisterTransport for BusyFor {
        fn read(&mut self, reg: u32) -> u32 {
            assert_eq!(reg, regs::VTCR);
            self.reads += 1;
            if self.remaining == 0 {
                0
            } else {
                self.remaining -= 1;
                vtcr::BUSY
            }
        }

        fn write(&mut self, reg: u32, value: u32) {
            self.writes.push((reg, value));
        }

        fn kind(&self) -> TransportKind {
            TransportKind::Direct
        }
    }

    #[test]
    fn test_vtcr_word() {
        assert_eq!(vtcr_word(CamCommand::Write, 3), 0x8000_1003);
        assert_eq!(vtcr_word(CamCommand::Read, 15), 0x8000_000f);
    }

    #[test]
    fn test_completes_immediately() {
        let mut t = BusyFor::new(0);
        assert_eq!(execute(&mut t, CamCommand::Write, 1), Ok(1));
        assert_eq!(t.writes, vec![(regs::VTCR, 0x8000_1001)]);
        assert_eq!(t.reads, 1);
    }

    #[test]
    fn test_completes_after_polls() {
        let mut t = BusyFor::new(4);
        assert_eq!(execute(&mut t, CamCommand::Read, 2), Ok(5));
        assert_eq!(t.reads, 5);
    }

    #[test]
    fn test_last_poll_still_counts() {
        let mut t = BusyFor::new(POLL_LIMIT - 1);
        assert_eq!(execute(&mut t, CamCommand::Read, 0), Ok(POLL_LIMIT));
    }

    #[test]
    fn test_timeout_bound() {
        let mut t = BusyFor::new(u32::MAX);
        let err = execute(&mut t, CamCommand::Write, 7).unwrap_err();
        assert_eq!(err, SwConfigError::hardware_timeout(regs::VTCR, 20));
        assert_eq!(t.writes.len(), 1);
        assert_eq!(t.reads, 20);
    }

    #[test]
    fn test_command_swallows_timeout() {
        let mut t = BusyFor::new(u32::MAX);
        command(&mut t, CamCommand::Write, 7);
        assert_eq!(t.reads, POLL_LIMIT);
    }
}
