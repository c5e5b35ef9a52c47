//! Port list parsing and formatting.
//!
//! Configuration files describe VLAN membership as a whitespace separated
//! list of port numbers, where a `t` suffix marks a tagged member:
//!
//! ```
//! use swconfig_common::portlist::{format_ports, parse_ports};
//! use swconfig_common::SwitchPort;
//!
//! let ports = parse_ports("0 1 6t").unwrap();
//! assert_eq!(ports[2], SwitchPort::tagged(6));
//! assert_eq!(format_ports(&ports), "0 1 6t");
//! ```
//!
//! A `u` or `*` suffix is accepted as an explicit untagged marker.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SwConfigError, SwResult};
use crate::types::SwitchPort;

/// Matches one port token: decimal id plus optional mode suffix.
static PORT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)([tu*]?)$").expect("Invalid regex pattern"));

/// Parses a port list such as `"0 1 2 3 6t"`.
///
/// Only the syntax is checked here; range checks against the switch geometry
/// are left to the driver.
pub fn parse_ports(s: &str) -> SwResult<Vec<SwitchPort>> {
    s.split_whitespace().map(parse_token).collect()
}

fn parse_token(token: &str) -> SwResult<SwitchPort> {
    let caps = PORT_TOKEN_RE
        .captures(token)
        .ok_or_else(|| SwConfigError::invalid_argument("ports", format!("bad port '{}'", token)))?;

    let id = caps[1].parse::<u8>().map_err(|_| {
        SwConfigError::invalid_argument("ports", format!("port id '{}' out of range", &caps[1]))
    })?;

    Ok(SwitchPort {
        id,
        tagged: &caps[2] == "t",
    })
}

/// Formats a port list in the syntax accepted by [`parse_ports`].
pub fn format_ports(ports: &[SwitchPort]) -> String {
    ports
        .iter()
        .map(|p| {
            if p.tagged {
                format!("{}t", p.id)
            } else {
                p.id.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
