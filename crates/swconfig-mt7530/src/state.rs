//! In-memory model of the switch configuration.
//!
//! The driver stages every change here. [`crate::sync::apply_config`] is the
//! only path from this model to the hardware.

use serde::Serialize;

/// Number of switch ports.
pub const NUM_PORTS: usize = 8;
/// Number of VLAN table slots.
pub const NUM_VLANS: usize = 16;
/// Port wired to the SoC / CPU.
pub const CPU_PORT: usize = 6;
pub use swconfig_common::{MAX_VID, MIN_VID};

/// One VLAN table slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VlanEntry {
    /// VLAN id
    pub vid: u16,
    /// Member port mask, bit n = port n
    pub member: u8,
    /// Tagged egress mask, bit n = port n
    pub etags: u8,
}

/// Per-port settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortEntry {
    /// Default VLAN id for untagged ingress
    pub pvid: u16,
}

/// Staged switch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwitchState {
    /// VLAN mode; selects how `apply_config` programs the chip
    pub vlan_enabled: bool,
    /// Port table
    pub ports: [PortEntry; NUM_PORTS],
    /// VLAN table
    pub vlans: [VlanEntry; NUM_VLANS],
}

impl SwitchState {
    /// Creates an all-zero state.
    pub fn new(vlan_enabled: bool) -> Self {
        Self {
            vlan_enabled,
            ..Default::default()
        }
    }

    /// Clears every port and VLAN entry, then gives slot `i` VLAN id `i`.
    ///
    /// `vlan_enabled` is left alone.
    pub fn reset(&mut self) {
        self.ports = [PortEntry::default(); NUM_PORTS];
        self.vlans = [VlanEntry::default(); NUM_VLANS];
        for (i, vlan) in self.vlans.iter_mut().enumerate() {
            vlan.vid = i as u16;
        }
    }
}
