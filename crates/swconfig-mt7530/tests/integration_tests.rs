//! Switch operation integration tests
//!
//! Drives the driver through `SwitchOps` against the simulated chip and checks
//! both the values read back and the register traffic.

use pretty_assertions::assert_eq;

use swconfig_common::{Duplex, LinkSpeed, PortLink, SwConfigError, SwitchOps, SwitchPort};
use swconfig_mt7530::regs::{self, port_ctrl};
use swconfig_mt7530::{
    cam, Access, AttachOptions, Mt7530, SimulatedChip, SwitchState, NUM_PORTS, NUM_VLANS,
};

fn vlan_switch() -> Mt7530<SimulatedChip> {
    Mt7530::new(SimulatedChip::new(), true)
}

fn ports_from_masks(member: u8, etags: u8) -> Vec<SwitchPort> {
    (0..NUM_PORTS as u8)
        .filter(|p| member & (1 << p) != 0)
        .map(|p| SwitchPort {
            id: p,
            tagged: etags & (1 << p) != 0,
        })
        .collect()
}

/// Every slot keeps its own port set and tag flags through apply_config.
#[test]
fn test_vlan_ports_round_trip() {
    let mut sw = vlan_switch();

    let mut expected = Vec::new();
    for slot in 0..NUM_VLANS {
        let member = (slot as u8).wrapping_mul(37).wrapping_add(11);
        let etags = member & (slot as u8).wrapping_mul(53);
        let ports = ports_from_masks(member, etags);

        // hand the list over in descending order
        let reversed: Vec<SwitchPort> = ports.iter().rev().copied().collect();
        sw.set_vlan_ports(slot, &reversed).unwrap();
        expected.push(ports);
    }

    sw.apply_config();

    for (slot, ports) in expected.iter().enumerate() {
        assert_eq!(&sw.get_vlan_ports(slot).unwrap(), ports, "slot {}", slot);
    }
}

#[test]
fn test_vlan_ports_all_and_none() {
    let mut sw = vlan_switch();
    let all: Vec<SwitchPort> = (0..8).map(SwitchPort::tagged).collect();
    sw.set_vlan_ports(0, &all).unwrap();
    sw.set_vlan_ports(1, &[]).unwrap();
    sw.apply_config();

    assert_eq!(sw.get_vlan_ports(0).unwrap(), all);
    assert!(sw.get_vlan_ports(1).unwrap().is_empty());
    assert_eq!(sw.transport().cam_entry(1), Some((0, 0)));
}

/// Reads observe the chip, not the staged model.
#[test]
fn test_staged_write_live_read() {
    let mut sw = vlan_switch();
    sw.set_vlan_ports(2, &[SwitchPort::untagged(1)]).unwrap();
    sw.set_vid(2, 42).unwrap();

    assert!(sw.get_vlan_ports(2).unwrap().is_empty());
    assert_eq!(sw.get_vid(2), Ok(0));

    sw.apply_config();
    assert_eq!(sw.get_vlan_ports(2).unwrap(), vec![SwitchPort::untagged(1)]);
    assert_eq!(sw.get_vid(2), Ok(42));
}

#[test]
fn test_range_validation_leaves_state_alone() {
    let mut sw = vlan_switch();
    let before = sw.state().clone();

    let rejected = [
        sw.set_port_pvid(8, 1),
        sw.set_port_pvid(0, 4095),
        sw.set_port_pvid(usize::MAX, 0),
        sw.set_vid(16, 1),
        sw.set_vid(3, 4095),
        sw.set_vid(3, u16::MAX),
        sw.set_vlan_ports(0, &[SwitchPort::untagged(8)]),
        sw.set_vlan_ports(16, &[SwitchPort::untagged(0)]),
        sw.set_vlan_ports(0, &[SwitchPort::untagged(0); 9]),
    ];
    for result in rejected {
        match result {
            Err(SwConfigError::InvalidArgument { .. }) => {}
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }
    assert!(sw.get_vid(16).is_err());
    assert!(sw.get_vlan_ports(16).is_err());
    assert!(sw.get_port_pvid(8).is_err());
    assert!(sw.get_port_link(8).is_err());

    assert_eq!(*sw.state(), before);
    assert!(sw.transport().log().is_empty());
}

#[test]
fn test_range_edges_accepted() {
    let mut sw = vlan_switch();
    sw.set_port_pvid(7, 4094).unwrap();
    sw.set_port_pvid(0, 0).unwrap();
    sw.set_vid(15, 4094).unwrap();
    sw.set_vid(0, 0).unwrap();
    sw.apply_config();

    assert_eq!(sw.get_port_pvid(7), Ok(4094));
    assert_eq!(sw.get_vid(15), Ok(4094));
}

#[test]
fn test_vid_packing_isolation() {
    let mut sw = vlan_switch();
    for slot in 0..NUM_VLANS {
        sw.set_vid(slot, 100 + slot as u16).unwrap();
    }
    sw.apply_config();

    sw.set_vid(4, 4094).unwrap();
    sw.set_vid(9, 1).unwrap();
    sw.apply_config();

    for slot in 0..NUM_VLANS {
        let want = match slot {
            4 => 4094,
            9 => 1,
            _ => 100 + slot as u16,
        };
        assert_eq!(sw.get_vid(slot), Ok(want), "slot {}", slot);
    }
}

#[test]
fn test_disabled_mode_touches_only_port_control() {
    let mut sw = Mt7530::new(SimulatedChip::new(), false);
    sw.set_vlan_ports(1, &[SwitchPort::untagged(0), SwitchPort::tagged(6)])
        .unwrap();
    sw.set_vid(1, 7).unwrap();
    sw.set_port_pvid(0, 7).unwrap();

    sw.apply_config();

    let chip = sw.transport();
    assert_eq!(chip.cam_commands(), 0);
    assert_eq!(chip.log().len(), 2 * NUM_PORTS);
    for access in chip.log() {
        match *access {
            Access::Write(reg, value) => {
                let pcr = (0..NUM_PORTS).any(|p| reg == regs::pcr(p));
                let pvc = (0..NUM_PORTS).any(|p| reg == regs::pvc(p));
                assert!(pcr || pvc, "unexpected write to {:#06x}", reg);
                if pcr {
                    assert_eq!(value, port_ctrl::PCR_MATRIX);
                } else {
                    assert_eq!(value, port_ctrl::PVC_TRANSPARENT);
                }
            }
            Access::Read(reg, _) => panic!("unexpected read of {:#06x}", reg),
        }
    }
}

#[test]
fn test_mode_switch_at_runtime() {
    let mut sw = Mt7530::new(SimulatedChip::new(), false);
    sw.apply_config();
    assert_eq!(sw.transport().peek(regs::pcr(3)), port_ctrl::PCR_MATRIX);

    sw.set_vlan_enable(true);
    sw.apply_config();
    assert_eq!(sw.transport().peek(regs::pcr(3)), port_ctrl::PCR_SECURITY);
    assert_eq!(sw.transport().peek(regs::pvc(3)), port_ctrl::PVC_USER);
    assert_eq!(sw.transport().cam_commands(), NUM_VLANS);
}

#[test]
fn test_port_link_table() {
    let mut sw = vlan_switch();
    let cases = [
        (0b0000, false, Duplex::Half, LinkSpeed::Mbps10),
        (0b0101, true, Duplex::Half, LinkSpeed::Mbps100),
        (0b1011, true, Duplex::Full, LinkSpeed::Mbps1000),
        (0b1110, false, Duplex::Full, LinkSpeed::Mbps1000),
    ];

    for (port, (raw, link, duplex, speed)) in cases.into_iter().enumerate() {
        sw.transport_mut().set_port_status(port, raw);
        assert_eq!(
            sw.get_port_link(port),
            Ok(PortLink {
                link,
                duplex,
                speed
            })
        );
    }
}

#[test]
fn test_link_status_register_stride() {
    let mut sw = vlan_switch();
    sw.transport_mut().set_port_status(6, 0b1011);
    sw.get_port_link(6).unwrap();
    assert_eq!(sw.transport().log(), &[Access::Read(0x3608, 0b1011)]);
}

/// A stuck CAM costs exactly one command write and twenty polls.
#[test]
fn test_cam_timeout_bound() {
    let mut sw = Mt7530::new(SimulatedChip::new().with_stuck_cam(), true);

    let ports = sw.get_vlan_ports(5).unwrap();

    assert!(ports.is_empty());
    let chip = sw.transport();
    assert_eq!(chip.writes_to(regs::VTCR).count(), 1);
    assert_eq!(chip.reads_of(regs::VTCR), cam::POLL_LIMIT as usize);
    assert_eq!(cam::POLL_LIMIT, 20);
}

#[test]
fn test_slow_cam_still_commits() {
    let mut sw = Mt7530::new(SimulatedChip::new().with_busy_polls(5), true);
    sw.set_vlan_ports(3, &[SwitchPort::untagged(2)]).unwrap();
    sw.apply_config();

    assert_eq!(sw.get_vlan_ports(3).unwrap(), vec![SwitchPort::untagged(2)]);
}

#[test]
fn test_llllw_scenario() {
    let opts = AttachOptions {
        port_map: Some("llllw".to_string()),
        enable_vlan: true,
    };
    let mut sw = Mt7530::probe(SimulatedChip::new(), &opts);

    assert_eq!(sw.get_port_pvid(4), Ok(2));
    assert_eq!(sw.get_port_pvid(0), Ok(1));
    assert_eq!(sw.get_port_pvid(7), Ok(0));
    assert_eq!(sw.get_vlan_ports(1).unwrap(), ports_from_masks(0x6f, 0x40));
    assert_eq!(sw.get_vlan_ports(2).unwrap(), ports_from_masks(0x50, 0x40));
    assert_eq!(sw.get_vid(1), Ok(1));
    assert_eq!(sw.get_vid(2), Ok(2));
}

#[test]
fn test_wllll_scenario() {
    let opts = AttachOptions {
        port_map: Some("wllll".to_string()),
        enable_vlan: true,
    };
    let mut sw = Mt7530::probe(SimulatedChip::new(), &opts);

    assert_eq!(sw.get_port_pvid(0), Ok(2));
    assert_eq!(sw.get_port_pvid(4), Ok(1));
    assert_eq!(
        sw.get_vlan_ports(2).unwrap(),
        vec![SwitchPort::untagged(0), SwitchPort::tagged(6)]
    );
}

#[test]
fn test_reset_then_apply() {
    let opts = AttachOptions {
        port_map: Some("llllw".to_string()),
        enable_vlan: true,
    };
    let mut sw = Mt7530::probe(SimulatedChip::new(), &opts);

    sw.reset_switch();
    let mut expected = SwitchState::new(true);
    expected.reset();
    assert_eq!(*sw.state(), expected);

    sw.apply_config();
    for slot in 0..NUM_VLANS {
        assert_eq!(sw.get_vid(slot), Ok(slot as u16));
        assert!(sw.get_vlan_ports(slot).unwrap().is_empty());
    }
    assert_eq!(sw.get_port_pvid(4), Ok(0));
}
