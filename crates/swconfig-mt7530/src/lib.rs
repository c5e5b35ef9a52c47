//! swconfig-mt7530 - MediaTek MT7530 / MT7620 switch driver
//!
//! Keeps an in-memory model of the port and VLAN tables, programs it into
//! the chip on request, and exposes it through
//! [`SwitchOps`](swconfig_common::SwitchOps).
//!
//! The same switch core is reached two ways: memory mapped inside the
//! MT7620 SoC, or as a discrete MT7530 paged through the MDIO bus. The
//! driver is generic over [`RegisterTransport`] and only looks at the
//! transport kind while attaching.
//!
//! ```ignore
//! use swconfig_common::SwitchRegistry;
//! use swconfig_mt7530::{attach, AttachOptions, MdioTransport};
//!
//! let mut registry = SwitchRegistry::new();
//! let opts = AttachOptions {
//!     port_map: Some("llllw".into()),
//!     enable_vlan: true,
//! };
//! attach(&mut registry, MdioTransport::new(bus), &opts)?;
//! ```

pub mod bootstrap;
pub mod cam;
pub mod link;
pub mod presets;
pub mod regs;
pub mod sim;
pub mod state;
pub mod switch;
pub mod sync;
pub mod transport;

pub use presets::MappingPreset;
pub use sim::{Access, SimulatedChip, SimulatedMdioBus};
pub use state::{PortEntry, SwitchState, VlanEntry, CPU_PORT, MAX_VID, MIN_VID, NUM_PORTS, NUM_VLANS};
pub use switch::{attach, AttachOptions, Mt7530, GLOBAL_ATTRS, VLAN_ATTRS};
pub use transport::{MdioBus, MdioTransport, MmioTransport, RegisterTransport, TransportKind};
