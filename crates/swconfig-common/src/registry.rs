//! Registry of switch drivers.
//!
//! Drivers register once at attach time. Afterwards every configuration
//! request goes through the registry, which resolves the switch by name,
//! validates attribute targets and values against the device description,
//! and forwards to the driver's [`SwitchOps`].

use tracing::{debug, info};

use crate::error::{SwConfigError, SwResult};
use crate::ops::{AttrTarget, SwitchOps};
use crate::types::SwitchDev;

/// A registered switch: its description and the driver behind it.
struct RegisteredSwitch {
    dev: SwitchDev,
    ops: Box<dyn SwitchOps>,
}

/// The set of switches known to the configuration subsystem.
#[derive(Default)]
pub struct SwitchRegistry {
    switches: Vec<RegisteredSwitch>,
}

impl SwitchRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a switch driver.
    ///
    /// On error the driver is dropped and nothing is registered.
    pub fn register(&mut self, dev: SwitchDev, ops: Box<dyn SwitchOps>) -> SwResult<()> {
        if dev.name.is_empty() {
            return Err(SwConfigError::registration("", "switch name is empty"));
        }
        if dev.ports == 0 {
            return Err(SwConfigError::registration(&dev.name, "switch has no ports"));
        }
        if dev.cpu_port >= dev.ports {
            return Err(SwConfigError::registration(
                &dev.name,
                format!("cpu port {} out of range (ports={})", dev.cpu_port, dev.ports),
            ));
        }
        if self.contains(&dev.name) {
            return Err(SwConfigError::AlreadyRegistered { name: dev.name });
        }

        self.switches
            .try_reserve(1)
            .map_err(|_| SwConfigError::out_of_memory("switch registry entry"))?;

        info!(
            name = %dev.name,
            alias = %dev.alias,
            ports = dev.ports,
            vlans = dev.vlans,
            cpu_port = dev.cpu_port,
            "Registered switch"
        );
        self.switches.push(RegisteredSwitch { dev, ops });
        Ok(())
    }

    /// Removes a switch, returning its driver.
    pub fn unregister(&mut self, name: &str) -> SwResult<Box<dyn SwitchOps>> {
        let idx = self.index_of(name)?;
        let entry = self.switches.remove(idx);
        info!(name = %name, "Unregistered switch");
        Ok(entry.ops)
    }

    /// Returns true if a switch with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s.dev.name == name)
    }

    /// Returns the number of registered switches.
    pub fn len(&self) -> usize {
        self.switches.len()
    }

    /// Returns true if no switch is registered.
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Iterates over the descriptions of all registered switches.
    pub fn devices(&self) -> impl Iterator<Item = &SwitchDev> {
        self.switches.iter().map(|s| &s.dev)
    }

    /// Looks up a switch description by name.
    pub fn device(&self, name: &str) -> SwResult<&SwitchDev> {
        let idx = self.index_of(name)?;
        Ok(&self.switches[idx].dev)
    }

    /// Looks up a switch driver by name.
    pub fn get_mut(&mut self, name: &str) -> SwResult<&mut dyn SwitchOps> {
        let idx = self.index_of(name)?;
        Ok(self.switches[idx].ops.as_mut())
    }

    /// Reads a named attribute of a switch.
    pub fn get_attr(&mut self, name: &str, target: AttrTarget, attr_name: &str) -> SwResult<i64> {
        let idx = self.index_of(name)?;
        let entry = &mut self.switches[idx];
        Self::check_target(&entry.dev, target)?;

        let attr = entry
            .ops
            .attributes()
            .find(target.scope(), attr_name)
            .ok_or_else(|| SwConfigError::unknown_attribute(attr_name))?;

        entry.ops.get_attr(attr, target)
    }

    /// Writes a named attribute of a switch.
    pub fn set_attr(
        &mut self,
        name: &str,
        target: AttrTarget,
        attr_name: &str,
        value: i64,
    ) -> SwResult<()> {
        let idx = self.index_of(name)?;
        let entry = &mut self.switches[idx];
        Self::check_target(&entry.dev, target)?;

        let attr = entry
            .ops
            .attributes()
            .find(target.scope(), attr_name)
            .ok_or_else(|| SwConfigError::unknown_attribute(attr_name))?;

        if value < 0 || value > attr.max {
            return Err(SwConfigError::invalid_argument(
                attr.name,
                format!("{} outside [0, {}]", value, attr.max),
            ));
        }

        debug!(
            switch = %name,
            attr = attr.name,
            scope = target.scope().as_str(),
            value = value,
            "Setting attribute"
        );
        entry.ops.set_attr(attr, target, value)
    }

    fn index_of(&self, name: &str) -> SwResult<usize> {
        self.switches
            .iter()
            .position(|s| s.dev.name == name)
            .ok_or_else(|| SwConfigError::SwitchNotFound {
                name: name.to_string(),
            })
    }

    fn check_target(dev: &SwitchDev, target: AttrTarget) -> SwResult<()> {
        match target {
            AttrTarget::Global => Ok(()),
            AttrTarget::Port(port) if port >= dev.ports => Err(SwConfigError::invalid_argument(
                "port",
                format!("{} >= {}", port, dev.ports),
            )),
            AttrTarget::Vlan(vlan) if vlan >= dev.vlans => Err(SwConfigError::invalid_argument(
                "vlan",
                format!("{} >= {}", vlan, dev.vlans),
            )),
            _ => Ok(()),
        }
    }
}
