//! The switch operations trait and attribute descriptors.
//!
//! A driver implements [`SwitchOps`] and hands a boxed instance to the
//! [`SwitchRegistry`](crate::SwitchRegistry). The registry never looks inside
//! the driver; it only calls these operations, one at a time.

use crate::error::SwResult;
use crate::types::{PortLink, SwitchPort};

/// Which object an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrScope {
    /// Whole-switch attribute.
    Global,
    /// Per-port attribute.
    Port,
    /// Per-VLAN-slot attribute.
    Vlan,
}

impl AttrScope {
    /// Returns the scope name as used by configuration tools.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrScope::Global => "global",
            AttrScope::Port => "port",
            AttrScope::Vlan => "vlan",
        }
    }
}

/// The object an attribute access is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrTarget {
    /// The switch itself.
    Global,
    /// A port index.
    Port(usize),
    /// A VLAN slot index.
    Vlan(usize),
}

impl AttrTarget {
    /// Returns the scope this target addresses.
    pub fn scope(&self) -> AttrScope {
        match self {
            AttrTarget::Global => AttrScope::Global,
            AttrTarget::Port(_) => AttrScope::Port,
            AttrTarget::Vlan(_) => AttrScope::Vlan,
        }
    }
}

/// An integer attribute exposed by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchAttr {
    /// Driver-private identifier
    pub id: u32,
    /// Attribute name
    pub name: &'static str,
    /// Human readable description
    pub description: &'static str,
    /// Largest accepted value (smallest is 0)
    pub max: i64,
}

/// The attribute tables of a driver, one per scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttrTable {
    /// Global attributes
    pub global: &'static [SwitchAttr],
    /// Per-port attributes
    pub port: &'static [SwitchAttr],
    /// Per-VLAN attributes
    pub vlan: &'static [SwitchAttr],
}

impl AttrTable {
    /// Returns the attributes of one scope.
    pub fn scope(&self, scope: AttrScope) -> &'static [SwitchAttr] {
        match scope {
            AttrScope::Global => self.global,
            AttrScope::Port => self.port,
            AttrScope::Vlan => self.vlan,
        }
    }

    /// Finds an attribute by name within a scope.
    pub fn find(&self, scope: AttrScope, name: &str) -> Option<&'static SwitchAttr> {
        self.scope(scope).iter().find(|attr| attr.name == name)
    }
}

/// Operations a switch driver exposes to the configuration subsystem.
///
/// Setters stage changes in the driver's model; nothing reaches the hardware
/// until [`apply_config`](SwitchOps::apply_config) runs. Getters that talk to
/// the chip take `&mut self` because register access is not reentrant.
///
/// # Example
///
/// ```ignore
/// use swconfig_common::{SwitchOps, SwitchPort, SwResult};
///
/// fn lan_wan(sw: &mut dyn SwitchOps) -> SwResult<()> {
///     sw.set_vlan_enable(true);
///     sw.set_vlan_ports(1, &[SwitchPort::untagged(0), SwitchPort::tagged(6)])?;
///     sw.set_port_pvid(0, 1)?;
///     sw.apply_config();
///     Ok(())
/// }
/// ```
pub trait SwitchOps {
    /// Returns the attribute tables of this driver.
    fn attributes(&self) -> AttrTable;

    /// Reads an attribute value.
    fn get_attr(&mut self, attr: &SwitchAttr, target: AttrTarget) -> SwResult<i64>;

    /// Writes an attribute value.
    ///
    /// The registry has already checked `0 <= value <= attr.max`.
    fn set_attr(&mut self, attr: &SwitchAttr, target: AttrTarget, value: i64) -> SwResult<()>;

    /// Returns whether VLAN mode is enabled.
    fn get_vlan_enable(&self) -> bool;

    /// Enables or disables VLAN mode.
    fn set_vlan_enable(&mut self, enable: bool);

    /// Reads the default VLAN id of a port.
    fn get_port_pvid(&mut self, port: usize) -> SwResult<u16>;

    /// Stages the default VLAN id of a port.
    fn set_port_pvid(&mut self, port: usize, pvid: u16) -> SwResult<()>;

    /// Reads the member ports of a VLAN slot, in ascending port order.
    fn get_vlan_ports(&mut self, vlan: usize) -> SwResult<Vec<SwitchPort>>;

    /// Stages the member ports of a VLAN slot.
    fn set_vlan_ports(&mut self, vlan: usize, ports: &[SwitchPort]) -> SwResult<()>;

    /// Reads the VLAN id of a VLAN slot.
    fn get_vid(&mut self, vlan: usize) -> SwResult<u16>;

    /// Stages the VLAN id of a VLAN slot.
    fn set_vid(&mut self, vlan: usize, vid: u16) -> SwResult<()>;

    /// Reads the link state of a port.
    fn get_port_link(&mut self, port: usize) -> SwResult<PortLink>;

    /// Pushes the staged configuration to the hardware.
    fn apply_config(&mut self);

    /// Clears the staged configuration back to defaults.
    fn reset_switch(&mut self);
}
