//! MT7530 / MT7620 switch register map.
//!
//! Addresses are byte offsets into the switch register space. The per-port
//! blocks repeat every 0x100 bytes.

/// VLAN table control: command, operand and busy flag.
pub const VTCR: u32 = 0x90;
/// VLAN table access data 1: membership and flags.
pub const VAWD1: u32 = 0x94;
/// VLAN table access data 2: per-port egress tag control.
pub const VAWD2: u32 = 0x98;

/// Hardware trap (bootstrap strapping) register.
pub const HWTRAP: u32 = 0x7804;
/// The strapping value the firmware expects in [`HWTRAP`].
pub const HWTRAP_MAGIC: u32 = 0x0111_7edf;

/// VLAN id register holding the VIDs of slots `2n` and `2n + 1`.
pub const fn vtim(slot: usize) -> u32 {
    0x100 + 4 * (slot as u32 / 2)
}

/// Port control register.
pub const fn pcr(port: usize) -> u32 {
    0x2004 | ((port as u32) << 8)
}

/// Port VLAN control register.
pub const fn pvc(port: usize) -> u32 {
    0x2010 | ((port as u32) << 8)
}

/// Port-and-protocol based VLAN register 1 (PVID in the low 12 bits).
pub const fn ppbv1(port: usize) -> u32 {
    0x2014 | ((port as u32) << 8)
}

/// Port MAC status register.
pub const fn pmsr(port: usize) -> u32 {
    0x3008 + 0x100 * port as u32
}

/// VTCR fields.
pub mod vtcr {
    /// Command in progress; cleared by the hardware when done.
    pub const BUSY: u32 = 1 << 31;
    /// Shift of the 4-bit command field.
    pub const FUNC_SHIFT: u32 = 12;
    /// Mask of the command field after shifting.
    pub const FUNC_MASK: u32 = 0xf;
    /// Mask of the slot operand.
    pub const VID_MASK: u32 = 0xfff;
}

/// VAWD1 fields.
pub mod vawd1 {
    /// Independent VLAN learning.
    pub const IVL_MAC: u32 = 1 << 30;
    /// Per-VLAN egress tag control enable.
    pub const VTAG_EN: u32 = 1 << 28;
    /// Shift of the 8-bit member port mask.
    pub const PORT_MEM_SHIFT: u32 = 16;
    /// Mask of the member field after shifting.
    pub const PORT_MEM_MASK: u32 = 0xff;
    /// Entry is valid.
    pub const VALID: u32 = 1 << 0;
}

/// Per-port control values written by the synchronizer.
pub mod port_ctrl {
    /// PCR: all ports in the port matrix, plain forwarding.
    pub const PCR_MATRIX: u32 = 0x00ff_0000;
    /// PCR: port matrix plus security (VLAN table) mode.
    pub const PCR_SECURITY: u32 = 0x00ff_0003;
    /// PVC: transparent port, accept all frames.
    pub const PVC_TRANSPARENT: u32 = 0x8100_00c0;
    /// PVC: user port, VLAN tag aware ingress.
    pub const PVC_USER: u32 = 0x8100_0000;
}

/// PMSR fields.
pub mod pmsr {
    /// Link up.
    pub const LINK: u32 = 1 << 0;
    /// Full duplex.
    pub const DUPLEX: u32 = 1 << 1;
    /// Shift of the speed code.
    pub const SPEED_SHIFT: u32 = 2;
    /// Mask of the speed code after shifting.
    pub const SPEED_MASK: u32 = 0x3;
}

/// Mask of a 12-bit VLAN id.
pub const VID_MASK: u32 = 0xfff;

/// Egress tag control code for one port in VAWD2.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum EgressTag {
    /// Transmit untagged
    Untag = 0,
    /// Swap customer and service tags
    Swap = 1,
    /// Transmit tagged
    Tag = 2,
    /// Stack a service tag
    Stack = 3,
}

impl EgressTag {
    /// Decodes a 2-bit field value.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => EgressTag::Untag,
            1 => EgressTag::Swap,
            2 => EgressTag::Tag,
            _ => EgressTag::Stack,
        }
    }
}

/// Places `vid` into the half of a VTIM word that belongs to `slot`.
///
/// Even slots own bits 0..12 and odd slots bits 12..24; the other slot's
/// field is preserved.
pub const fn vtim_insert(word: u32, slot: usize, vid: u16) -> u32 {
    let vid = vid as u32 & VID_MASK;
    if slot % 2 == 0 {
        (word & (VID_MASK << 12)) | vid
    } else {
        (word & VID_MASK) | (vid << 12)
    }
}

/// Extracts the VID of `slot` from a VTIM word.
pub const fn vtim_extract(word: u32, slot: usize) -> u16 {
    let word = if slot % 2 == 1 { word >> 12 } else { word };
    (word & VID_MASK) as u16
}

/// Builds the VAWD1 value for a member mask; an empty mask clears the entry.
pub const fn vawd1_entry(member: u8) -> u32 {
    if member == 0 {
        0
    } else {
        vawd1::IVL_MAC
            | vawd1::VTAG_EN
            | ((member as u32) << vawd1::PORT_MEM_SHIFT)
            | vawd1::VALID
    }
}

/// Extracts the member mask from a VAWD1 value.
pub const fn vawd1_members(word: u32) -> u8 {
    ((word >> vawd1::PORT_MEM_SHIFT) & vawd1::PORT_MEM_MASK) as u8
}

/// Builds the VAWD2 value: [`EgressTag::Tag`] for ports set in `etags`,
/// [`EgressTag::Untag`] for the rest.
pub fn vawd2_entry(etags: u8, ports: usize) -> u32 {
    (0..ports).fold(0, |word, port| {
        let code = if etags & (1 << port) != 0 {
            EgressTag::Tag
        } else {
            EgressTag::Untag
        };
        word | ((code as u32) << (port * 2))
    })
}

/// Extracts the egress code of `port` from a VAWD2 value.
pub const fn vawd2_port(word: u32, port: usize) -> EgressTag {
    EgressTag::from_bits(word >> (port * 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_register_addresses() {
        assert_eq!(pcr(0), 0x2004);
        assert_eq!(pvc(3), 0x2310);
        assert_eq!(ppbv1(7), 0x2714);
        assert_eq!(pmsr(0), 0x3008);
        assert_eq!(pmsr(6), 0x3608);
    }

    #[test]
    fn test_vtim_addresses() {
        assert_eq!(vtim(0), 0x100);
        assert_eq!(vtim(1), 0x100);
        assert_eq!(vtim(2), 0x104);
        assert_eq!(vtim(15), 0x11c);
    }

    #[test]
    fn test_vtim_insert_even_preserves_odd() {
        let word = vtim_insert(0x0023_4000, 0, 0x567);
        assert_eq!(word, 0x0023_4567);
        assert_eq!(vtim_extract(word, 1), 0x234);
        assert_eq!(vtim_extract(word, 0), 0x567);
    }

    #[test]
    fn test_vtim_insert_odd_preserves_even() {
        let word = vtim_insert(0x0000_0abc, 1, 0xffe);
        assert_eq!(word, 0x00ff_eabc);
        assert_eq!(vtim_extract(word, 0), 0xabc);
        assert_eq!(vtim_extract(word, 1), 0xffe);
    }

    #[test]
    fn test_vawd1_entry() {
        assert_eq!(vawd1_entry(0), 0);
        assert_eq!(vawd1_entry(0x6f), 0x506f_0001);
        assert_eq!(vawd1_members(0x506f_0001), 0x6f);
    }

    #[test]
    fn test_vawd2_entry() {
        // port 6 tagged, everything else untagged
        assert_eq!(vawd2_entry(0x40, 8), 0x2000);
        assert_eq!(vawd2_entry(0xff, 8), 0xaaaa);
        assert_eq!(vawd2_port(0x2000, 6), EgressTag::Tag);
        assert_eq!(vawd2_port(0x2000, 5), EgressTag::Untag);
        assert_eq!(vawd2_port(0x0004, 1), EgressTag::Swap);
        assert_eq!(vawd2_port(0x000c, 1), EgressTag::Stack);
    }
}
