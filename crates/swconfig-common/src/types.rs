//! Value types exchanged between switch drivers and the subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest usable VLAN id.
pub const MIN_VID: u16 = 0;
/// Largest usable VLAN id; 4095 is reserved.
pub const MAX_VID: u16 = 4094;

/// One member port of a VLAN, as seen by the subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchPort {
    /// Port index
    pub id: u8,
    /// Egress frames of this VLAN leave the port tagged
    pub tagged: bool,
}

impl SwitchPort {
    /// Creates an untagged member port.
    pub const fn untagged(id: u8) -> Self {
        Self { id, tagged: false }
    }

    /// Creates a tagged member port.
    pub const fn tagged(id: u8) -> Self {
        Self { id, tagged: true }
    }
}

/// Port link speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSpeed {
    /// 10 Mb/s
    Mbps10,
    /// 100 Mb/s
    Mbps100,
    /// 1000 Mb/s
    Mbps1000,
    /// Speed could not be determined
    #[default]
    Unknown,
}

impl LinkSpeed {
    /// Returns the speed in Mb/s, or `None` when unknown.
    pub const fn as_mbps(&self) -> Option<u32> {
        match self {
            LinkSpeed::Mbps10 => Some(10),
            LinkSpeed::Mbps100 => Some(100),
            LinkSpeed::Mbps1000 => Some(1000),
            LinkSpeed::Unknown => None,
        }
    }
}

impl fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_mbps() {
            Some(mbps) => write!(f, "{}baseT", mbps),
            None => write!(f, "unknown"),
        }
    }
}

/// Port duplex mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duplex {
    /// Half duplex
    #[default]
    Half,
    /// Full duplex
    Full,
}

/// Link state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortLink {
    /// Link is up
    pub link: bool,
    /// Duplex mode
    pub duplex: Duplex,
    /// Negotiated or forced speed
    pub speed: LinkSpeed,
}

impl fmt::Display for PortLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.link {
            return write!(f, "link:down");
        }
        let duplex = match self.duplex {
            Duplex::Full => "full-duplex",
            Duplex::Half => "half-duplex",
        };
        write!(f, "link:up speed:{} {}", self.speed, duplex)
    }
}

/// Static description of a switch, handed to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDev {
    /// Device name
    pub name: String,
    /// Alias used by configuration files
    pub alias: String,
    /// Index of the port wired to the CPU
    pub cpu_port: usize,
    /// Number of ports
    pub ports: usize,
    /// Number of VLAN table slots
    pub vlans: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_port_ctors() {
        assert_eq!(SwitchPort::tagged(6), SwitchPort { id: 6, tagged: true });
        assert_eq!(SwitchPort::untagged(0), SwitchPort { id: 0, tagged: false });
    }

    #[test]
    fn test_link_speed_mbps() {
        assert_eq!(LinkSpeed::Mbps10.as_mbps(), Some(10));
        assert_eq!(LinkSpeed::Mbps1000.as_mbps(), Some(1000));
        assert_eq!(LinkSpeed::Unknown.as_mbps(), None);
    }

    #[test]
    fn test_port_link_display() {
        let link = PortLink {
            link: true,
            duplex: Duplex::Full,
            speed: LinkSpeed::Mbps1000,
        };
        assert_eq!(link.to_string(), "link:up speed:1000baseT full-duplex");
        assert_eq!(PortLink::default().to_string(), "link:down");
    }
}
