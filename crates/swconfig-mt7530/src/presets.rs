//! Default port maps selected by the board.
//!
//! A board names its wiring (`"llllw"`: four LAN ports then the WAN port) and
//! the driver seeds its model from the matching preset at attach time.

use crate::state::{SwitchState, NUM_PORTS, NUM_VLANS};

/// A named default configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingPreset {
    /// Preset name as supplied by the board
    pub name: &'static str,
    /// PVID of each port
    pub pvids: [u16; NUM_PORTS],
    /// Member mask of each VLAN slot
    pub members: [u8; NUM_VLANS],
    /// Tagged egress mask of each VLAN slot
    pub etags: [u8; NUM_VLANS],
    /// VLAN id of each VLAN slot
    pub vids: [u16; NUM_VLANS],
}

/// Pads the leading values of a table with zeroes.
const fn table<T: Copy, const N: usize, const M: usize>(head: [T; M], zero: T) -> [T; N] {
    let mut out = [zero; N];
    let mut i = 0;
    while i < M {
        out[i] = head[i];
        i += 1;
    }
    out
}

/// All known presets.
pub const PRESETS: &[MappingPreset] = &[
    MappingPreset {
        name: "llllw",
        pvids: table([1, 1, 1, 1, 2, 1, 1], 0),
        members: table([0, 0x6f, 0x50], 0),
        etags: table([0, 0x40, 0x40], 0),
        vids: table([0, 1, 2], 0),
    },
    MappingPreset {
        name: "wllll",
        pvids: table([2, 1, 1, 1, 1, 1, 1], 0),
        members: table([0, 0x7e, 0x41], 0),
        etags: table([0, 0x40, 0x40], 0),
        vids: table([0, 1, 2], 0),
    },
];

/// Looks up a preset by exact name.
pub fn find(name: &str) -> Option<&'static MappingPreset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Returns the names of all presets.
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

impl MappingPreset {
    /// Overwrites the port and VLAN tables of `state` with this preset.
    pub fn apply_to(&self, state: &mut SwitchState) {
        for (port, pvid) in state.ports.iter_mut().zip(self.pvids) {
            port.pvid = pvid;
        }

        for (i, vlan) in state.vlans.iter_mut().enumerate() {
            vlan.member = self.members[i];
            vlan.etags = self.etags[i];
            vlan.vid = self.vids[i];
        }
    }
}
