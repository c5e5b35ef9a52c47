//! Pushes the staged model to the chip.

use tracing::{debug, info, instrument};

use crate::cam::{self, CamCommand};
use crate::regs::{self, port_ctrl};
use crate::state::{SwitchState, NUM_PORTS};
use crate::transport::RegisterTransport;

/// Re-programs the whole switch from `state`.
///
/// With VLANs disabled only the per-port control registers are written and
/// the VLAN table is left as is. With VLANs enabled every VLAN slot is
/// rewritten and committed, then every port PVID. Hardware timeouts are
/// logged by the CAM layer and do not stop the sync.
#[instrument(skip_all, fields(vlan_enabled = state.vlan_enabled))]
pub fn apply_config<T: RegisterTransport>(t: &mut T, state: &SwitchState) {
    if !state.vlan_enabled {
        for port in 0..NUM_PORTS {
            t.write(regs::pcr(port), port_ctrl::PCR_MATRIX);
        }
        for port in 0..NUM_PORTS {
            t.write(regs::pvc(port), port_ctrl::PVC_TRANSPARENT);
        }
        info!("Switch programmed for plain forwarding");
        return;
    }

    for port in 0..NUM_PORTS {
        t.write(regs::pcr(port), port_ctrl::PCR_SECURITY);
    }
    for port in 0..NUM_PORTS {
        t.write(regs::pvc(port), port_ctrl::PVC_USER);
    }

    for (slot, vlan) in state.vlans.iter().enumerate() {
        debug!(
            slot = slot,
            vid = vlan.vid,
            member = format_args!("{:#04x}", vlan.member),
            etags = format_args!("{:#04x}", vlan.etags),
            "Writing VLAN entry"
        );

        t.modify(regs::vtim(slot), |word| {
            *word = regs::vtim_insert(*word, slot, vlan.vid)
        });
        t.write(regs::VAWD1, regs::vawd1_entry(vlan.member));
        t.write(regs::VAWD2, regs::vawd2_entry(vlan.etags, NUM_PORTS));

        cam::command(t, CamCommand::Write, slot as u32);
    }

    for (port, entry) in state.ports.iter().enumerate() {
        t.modify(regs::ppbv1(port), |word| {
            *word = (*word & !regs::VID_MASK) | (u32::from(entry.pvid) & regs::VID_MASK)
        });
    }

    info!("Switch programmed with VLAN table");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Access, SimulatedChip};
    use crate::state::VlanEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_disabled_mode_writes_only_port_control() {
        let mut chip = SimulatedChip::new();
        let mut state = SwitchState::new(false);
        state.vlans[1] = VlanEntry {
            vid: 5,
            member: 0x41,
            etags: 0x40,
        };

        apply_config(&mut chip, &state);

        let mut expected: Vec<Access> = (0..NUM_PORTS)
            .map(|p| Access::Write(regs::pcr(p), port_ctrl::PCR_MATRIX))
            .collect();
        expected.extend((0..NUM_PORTS).map(|p| Access::Write(regs::pvc(p), port_ctrl::PVC_TRANSPARENT)));
        assert_eq!(chip.log(), expected.as_slice());
        assert_eq!(chip.cam_commands(), 0);
    }

    #[test]
    fn test_enabled_mode_programs_slots_in_order() {
        let mut chip = SimulatedChip::new();
        let mut state = SwitchState::new(true);
        state.reset();
        state.vlans[1] = VlanEntry {
            vid: 10,
            member: 0x41,
            etags: 0x40,
        };

        apply_config(&mut chip, &state);

        let vtcr_writes: Vec<u32> = chip
            .writes_to(regs::VTCR)
            .collect();
        assert_eq!(vtcr_writes.len(), 16);
        for (slot, word) in vtcr_writes.iter().enumerate() {
            assert_eq!(*word, 0x8000_1000 | slot as u32);
        }

        assert_eq!(chip.cam_entry(1), Some((0x5041_0001, 0x2000)));
        assert_eq!(chip.cam_entry(0), Some((0, 0)));
        assert_eq!(chip.peek(regs::vtim(1)), 10 << 12);
    }

    #[test]
    fn test_enabled_mode_port_control_and_pvid() {
        let mut chip = SimulatedChip::new();
        chip.poke(regs::ppbv1(2), 0xffff_f123);
        let mut state = SwitchState::new(true);
        state.ports[2].pvid = 0x456;

        apply_config(&mut chip, &state);

        assert_eq!(chip.peek(regs::pcr(0)), port_ctrl::PCR_SECURITY);
        assert_eq!(chip.peek(regs::pvc(7)), port_ctrl::PVC_USER);
        assert_eq!(chip.peek(regs::ppbv1(2)), 0xffff_f456);
    }

    #[test]
    fn test_vid_packing_keeps_neighbour() {
        let mut chip = SimulatedChip::new();
        let mut state = SwitchState::new(true);
        state.vlans[4].vid = 100;
        state.vlans[5].vid = 200;
        apply_config(&mut chip, &state);
        assert_eq!(chip.peek(regs::vtim(4)), (200 << 12) | 100);

        state.vlans[4].vid = 300;
        apply_config(&mut chip, &state);
        assert_eq!(regs::vtim_extract(chip.peek(regs::vtim(5)), 5), 200);
        assert_eq!(regs::vtim_extract(chip.peek(regs::vtim(4)), 4), 300);
    }

    #[test]
    fn test_stuck_cam_does_not_abort_sync() {
        let mut chip = SimulatedChip::new().with_stuck_cam();
        let mut state = SwitchState::new(true);
        state.ports[0].pvid = 3;
        state.vlans[15].vid = 15;

        apply_config(&mut chip, &state);

        assert_eq!(chip.writes_to(regs::VTCR).count(), 16);
        assert_eq!(chip.peek(regs::ppbv1(0)) & 0xfff, 3);
    }
}
