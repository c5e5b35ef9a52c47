//! Port link status decoding.

use swconfig_common::{Duplex, LinkSpeed, PortLink};

use crate::regs::{self, pmsr};
use crate::transport::RegisterTransport;

/// Decodes a PMSR value.
///
/// Speed codes 2 and 3 both mean gigabit; a forced gigabit port reports 3.
pub fn decode_pmsr(word: u32) -> PortLink {
    let speed = match (word >> pmsr::SPEED_SHIFT) & pmsr::SPEED_MASK {
        0 => LinkSpeed::Mbps10,
        1 => LinkSpeed::Mbps100,
        2 | 3 => LinkSpeed::Mbps1000,
        _ => LinkSpeed::Unknown,
    };

    PortLink {
        link: word & pmsr::LINK != 0,
        duplex: if word & pmsr::DUPLEX != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        },
        speed,
    }
}

/// Reads and decodes the link status of `port`.
///
/// The caller has already range-checked `port`.
pub fn read_port_link<T: RegisterTransport>(t: &mut T, port: usize) -> PortLink {
    decode_pmsr(t.read(regs::pmsr(port)))
}
