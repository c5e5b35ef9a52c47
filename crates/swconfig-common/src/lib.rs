//! Switch configuration subsystem interface.
//!
//! This crate is the contract between switch chip drivers and the code that
//! configures them:
//!
//! - [`SwitchOps`]: the operations a driver exposes (attributes, port PVIDs,
//!   VLAN membership, link state, apply/reset)
//! - [`SwitchRegistry`]: where drivers register at attach time and through
//!   which all later requests are routed
//! - [`error`]: the error taxonomy and its errno mapping
//! - [`portlist`] and [`config`]: the textual port list syntax and the
//!   declarative YAML configuration built on it
//!
//! # Architecture
//!
//! 1. A driver probes its chip and builds a [`SwitchDev`] description
//! 2. The driver registers itself with [`SwitchRegistry::register`]
//! 3. Callers stage changes through [`SwitchOps`] setters
//! 4. [`SwitchOps::apply_config`] commits the staged state to the hardware
//!
//! # Example
//!
//! ```ignore
//! use swconfig_common::{AttrTarget, SwitchConfig, SwitchRegistry};
//!
//! fn configure(registry: &mut SwitchRegistry) -> swconfig_common::SwResult<()> {
//!     registry.set_attr("mt7530", AttrTarget::Global, "enable_vlan", 1)?;
//!     let cfg = SwitchConfig::load("/etc/switch.yaml")?;
//!     let dev = registry.device("mt7530")?.clone();
//!     cfg.apply(&dev, registry.get_mut("mt7530")?)
//! }
//! ```

pub mod config;
pub mod error;
pub mod ops;
pub mod portlist;
pub mod registry;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{PortConfig, SwitchConfig, VlanConfig};
pub use error::{SwConfigError, SwResult};
pub use ops::{AttrScope, AttrTable, AttrTarget, SwitchAttr, SwitchOps};
pub use registry::SwitchRegistry;
pub use types::{Duplex, LinkSpeed, PortLink, SwitchDev, SwitchPort, MAX_VID, MIN_VID};
