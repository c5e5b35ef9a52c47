//! Declarative switch configuration files.
//!
//! File format (YAML):
//!
//! ```yaml
//! enable_vlan: true
//! ports:
//!   - port: 4
//!     pvid: 2
//! vlans:
//!   - vlan: 1
//!     vid: 1
//!     ports: "0 1 2 3 6t"
//!   - vlan: 2
//!     ports: "4 6t"
//! ```
//!
//! [`SwitchConfig::apply`] checks the whole file against the switch geometry,
//! then pushes it through the [`SwitchOps`] setters and finishes with a single
//! `apply_config`. A rejected file leaves the switch untouched.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{SwConfigError, SwResult};
use crate::ops::SwitchOps;
use crate::portlist::parse_ports;
use crate::types::{SwitchDev, SwitchPort, MAX_VID, MIN_VID};

fn default_reset() -> bool {
    true
}

/// Per-port settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// Port index
    pub port: usize,
    /// Default VLAN id for untagged ingress
    pub pvid: u16,
}

/// Per-VLAN-slot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanConfig {
    /// VLAN slot index
    pub vlan: usize,
    /// VLAN id; left unchanged when absent
    #[serde(default)]
    pub vid: Option<u16>,
    /// Member ports, e.g. `"0 1 6t"`; left unchanged when absent
    #[serde(default)]
    pub ports: Option<String>,
}

/// A complete switch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// VLAN mode; left unchanged when absent
    #[serde(default)]
    pub enable_vlan: Option<bool>,
    /// Reset the switch model before applying
    #[serde(default = "default_reset")]
    pub reset: bool,
    /// Port settings
    #[serde(default)]
    pub ports: Vec<PortConfig>,
    /// VLAN settings
    #[serde(default)]
    pub vlans: Vec<VlanConfig>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            enable_vlan: None,
            reset: default_reset(),
            ports: Vec::new(),
            vlans: Vec::new(),
        }
    }
}

impl SwitchConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(s: &str) -> SwResult<Self> {
        serde_yaml::from_str(s)
            .map_err(|e| SwConfigError::config(format!("failed to parse YAML: {}", e)))
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> SwResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SwConfigError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "Loaded switch configuration");
        Self::from_yaml_str(&text)
    }

    /// Checks every entry against `dev` without touching the switch.
    ///
    /// Returns the parsed member list of each VLAN entry, `None` where the
    /// entry does not set membership.
    pub fn validate(&self, dev: &SwitchDev) -> SwResult<Vec<Option<Vec<SwitchPort>>>> {
        for port in &self.ports {
            check_index("port", port.port, dev.ports)?;
            check_vid("pvid", port.pvid)?;
        }

        self.vlans
            .iter()
            .map(|vlan| {
                check_index("vlan", vlan.vlan, dev.vlans)?;
                if let Some(vid) = vlan.vid {
                    check_vid("vid", vid)?;
                }
                vlan.ports
                    .as_deref()
                    .map(|list| parse_members(list, dev.ports))
                    .transpose()
            })
            .collect()
    }

    /// Applies the configuration to a switch and commits it to hardware.
    ///
    /// The whole configuration is validated against `dev` first; on error
    /// nothing is staged and `apply_config` is not called.
    pub fn apply(&self, dev: &SwitchDev, sw: &mut dyn SwitchOps) -> SwResult<()> {
        let members = self.validate(dev)?;

        if self.reset {
            sw.reset_switch();
        }

        if let Some(enable) = self.enable_vlan {
            sw.set_vlan_enable(enable);
        }

        for port in &self.ports {
            debug!(port = port.port, pvid = port.pvid, "Configuring port");
            sw.set_port_pvid(port.port, port.pvid)?;
        }

        for (vlan, ports) in self.vlans.iter().zip(&members) {
            debug!(vlan = vlan.vlan, vid = ?vlan.vid, ports = ?vlan.ports, "Configuring VLAN");
            if let Some(vid) = vlan.vid {
                sw.set_vid(vlan.vlan, vid)?;
            }
            if let Some(ports) = ports {
                sw.set_vlan_ports(vlan.vlan, ports)?;
            }
        }

        sw.apply_config();
        info!(
            switch = %dev.name,
            ports = self.ports.len(),
            vlans = self.vlans.len(),
            "Applied switch configuration"
        );
        Ok(())
    }
}

fn check_index(field: &str, index: usize, count: usize) -> SwResult<()> {
    if index >= count {
        return Err(SwConfigError::invalid_argument(
            field,
            format!("{} >= {}", index, count),
        ));
    }
    Ok(())
}

fn check_vid(field: &str, vid: u16) -> SwResult<()> {
    if !(MIN_VID..=MAX_VID).contains(&vid) {
        return Err(SwConfigError::invalid_argument(
            field,
            format!("{} outside [{}, {}]", vid, MIN_VID, MAX_VID),
        ));
    }
    Ok(())
}

fn parse_members(list: &str, ports: usize) -> SwResult<Vec<SwitchPort>> {
    let members = parse_ports(list)?;
    if members.len() > ports {
        return Err(SwConfigError::invalid_argument(
            "ports",
            format!("{} ports listed, switch has {}", members.len(), ports),
        ));
    }
    for p in &members {
        check_index("ports", usize::from(p.id), ports)?;
    }
    Ok(members)
}
