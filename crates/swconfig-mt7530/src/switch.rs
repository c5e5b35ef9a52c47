//! The MT7530 driver: attach sequence and the switch operations.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use swconfig_common::{
    AttrTable, AttrTarget, PortLink, SwConfigError, SwResult, SwitchAttr, SwitchDev, SwitchOps,
    SwitchPort, SwitchRegistry,
};

use crate::bootstrap;
use crate::cam::{self, CamCommand};
use crate::link;
use crate::presets;
use crate::regs::{self, EgressTag};
use crate::state::{SwitchState, CPU_PORT, MAX_VID, MIN_VID, NUM_PORTS, NUM_VLANS};
use crate::sync;
use crate::transport::{RegisterTransport, TransportKind};

const ATTR_ENABLE_VLAN: u32 = 0;
const ATTR_VID: u32 = 1;

/// Whole-switch attributes.
pub const GLOBAL_ATTRS: &[SwitchAttr] = &[SwitchAttr {
    id: ATTR_ENABLE_VLAN,
    name: "enable_vlan",
    description: "VLAN mode (1:enabled)",
    max: 1,
}];

/// Per-VLAN attributes.
pub const VLAN_ATTRS: &[SwitchAttr] = &[SwitchAttr {
    id: ATTR_VID,
    name: "vid",
    description: "VLAN ID (0-4094)",
    max: MAX_VID as i64,
}];

/// Board supplied attach parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOptions {
    /// Name of the preset port map, e.g. `"llllw"`
    #[serde(default)]
    pub port_map: Option<String>,
    /// Start in VLAN mode
    #[serde(default)]
    pub enable_vlan: bool,
}

/// An MT7530 or MT7620 switch behind a register transport.
pub struct Mt7530<T: RegisterTransport> {
    transport: T,
    state: SwitchState,
}

impl<T: RegisterTransport> Mt7530<T> {
    /// Creates a driver with an all-zero model. Nothing is written to the chip.
    pub fn new(transport: T, vlan_enabled: bool) -> Self {
        Self {
            transport,
            state: SwitchState::new(vlan_enabled),
        }
    }

    /// Brings up the chip: seeds the model from the board's port map,
    /// programs it, and on the MT7530 repairs the trap register.
    #[instrument(skip(transport))]
    pub fn probe(transport: T, opts: &AttachOptions) -> Self {
        let mut sw = Self::new(transport, opts.enable_vlan);

        if let Some(name) = opts.port_map.as_deref() {
            match presets::find(name) {
                Some(preset) => {
                    info!(port_map = name, "Applying port map");
                    preset.apply_to(&mut sw.state);
                }
                None => debug!(port_map = name, "No preset for port map"),
            }
        }

        sync::apply_config(&mut sw.transport, &sw.state);

        if sw.transport.kind() == TransportKind::Indirect {
            bootstrap::fixup_hwtrap(&mut sw.transport);
        }

        sw
    }

    /// Device description handed to the registry.
    pub fn device(&self) -> SwitchDev {
        let name = match self.transport.kind() {
            TransportKind::Indirect => "mt7530",
            TransportKind::Direct => "mt7620",
        };

        SwitchDev {
            name: name.to_string(),
            alias: name.to_string(),
            cpu_port: CPU_PORT,
            ports: NUM_PORTS,
            vlans: NUM_VLANS,
        }
    }

    /// The staged model.
    pub fn state(&self) -> &SwitchState {
        &self.state
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn check_port(port: usize) -> SwResult<()> {
        if port >= NUM_PORTS {
            return Err(SwConfigError::invalid_argument(
                "port",
                format!("{} >= {}", port, NUM_PORTS),
            ));
        }
        Ok(())
    }

    fn check_slot(slot: usize) -> SwResult<()> {
        if slot >= NUM_VLANS {
            return Err(SwConfigError::invalid_argument(
                "vlan",
                format!("{} >= {}", slot, NUM_VLANS),
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
}

/// Probes the chip and registers it.
///
/// On error nothing stays registered and the driver is dropped.
pub fn attach<T>(
    registry: &mut SwitchRegistry,
    transport: T,
    opts: &AttachOptions,
) -> SwResult<SwitchDev>
where
    T: RegisterTransport + 'static,
{
    let sw = Mt7530::probe(transport, opts);
    let dev = sw.device();

    registry.register(dev.clone(), Box::new(sw))?;

    info!("loaded {} driver", dev.name);
    Ok(dev)
}

impl<T: RegisterTransport> SwitchOps for Mt7530<T> {
    fn attributes(&self) -> AttrTable {
        AttrTable {
            global: GLOBAL_ATTRS,
            port: &[],
            vlan: VLAN_ATTRS,
        }
    }

    fn get_attr(&mut self, attr: &SwitchAttr, target: AttrTarget) -> SwResult<i64> {
        match (attr.id, target) {
            (ATTR_ENABLE_VLAN, AttrTarget::Global) => Ok(i64::from(self.get_vlan_enable())),
            (ATTR_VID, AttrTarget::Vlan(slot)) => Ok(i64::from(self.get_vid(slot)?)),
            _ => Err(SwConfigError::unknown_attribute(attr.name)),
        }
    }

    fn set_attr(&mut self, attr: &SwitchAttr, target: AttrTarget, value: i64) -> SwResult<()> {
        match (attr.id, target) {
            (ATTR_ENABLE_VLAN, AttrTarget::Global) => {
                self.set_vlan_enable(value != 0);
                Ok(())
            }
            (ATTR_VID, AttrTarget::Vlan(slot)) => {
                let vid = u16::try_from(value).map_err(|_| {
                    SwConfigError::invalid_argument(attr.name, format!("{} out of range", value))
                })?;
                self.set_vid(slot, vid)
            }
            _ => Err(SwConfigError::unknown_attribute(attr.name)),
        }
    }

    fn get_vlan_enable(&self) -> bool {
        self.state.vlan_enabled
    }

    #[instrument(skip(self))]
    fn set_vlan_enable(&mut self, enable: bool) {
        self.state.vlan_enabled = enable;
    }

    fn get_port_pvid(&mut self, port: usize) -> SwResult<u16> {
        Self::check_port(port)?;
        Ok((self.transport.read(regs::ppbv1(port)) & regs::VID_MASK) as u16)
    }

    #[instrument(skip(self))]
    fn set_port_pvid(&mut self, port: usize, pvid: u16) -> SwResult<()> {
        Self::check_port(port)?;
        Self::check_vid("pvid", pvid)?;

        self.state.ports[port].pvid = pvid;
        debug!("Staged port pvid");
        Ok(())
    }

    #[instrument(skip(self))]
    fn get_vlan_ports(&mut self, vlan: usize) -> SwResult<Vec<SwitchPort>> {
        Self::check_slot(vlan)?;

        cam::command(&mut self.transport, CamCommand::Read, vlan as u32);
        let member = regs::vawd1_members(self.transport.read(regs::VAWD1));
        let etags = self.transport.read(regs::VAWD2);

        let mut ports = Vec::with_capacity(NUM_PORTS);
        for port in 0..NUM_PORTS {
            if member & (1 << port) == 0 {
                continue;
            }

            let tagged = match regs::vawd2_port(etags, port) {
                EgressTag::Tag => true,
                EgressTag::Untag => false,
                other => {
                    warn!(
                        port = port,
                        code = ?other,
                        "VLAN egress tag control neither untag nor tag"
                    );
                    false
                }
            };
            ports.push(SwitchPort {
                id: port as u8,
                tagged,
            });
        }

        Ok(ports)
    }

    #[instrument(skip(self))]
    fn set_vlan_ports(&mut self, vlan: usize, ports: &[SwitchPort]) -> SwResult<()> {
        Self::check_slot(vlan)?;
        if ports.len() > NUM_PORTS {
            return Err(SwConfigError::invalid_argument(
                "ports",
                format!("{} ports listed, switch has {}", ports.len(), NUM_PORTS),
            ));
        }

        let mut member = 0u8;
        let mut etags = 0u8;
        for p in ports {
            let id = usize::from(p.id);
            if id >= NUM_PORTS {
                return Err(SwConfigError::invalid_argument(
                    "ports",
                    format!("port {} >= {}", id, NUM_PORTS),
                ));
            }
            member |= 1 << id;
            if p.tagged {
                etags |= 1 << id;
            }
        }

        let entry = &mut self.state.vlans[vlan];
        entry.member = member;
        entry.etags = etags;
        debug!(
            member = format_args!("{:#04x}", member),
            etags = format_args!("{:#04x}", etags),
            "Staged VLAN members"
        );
        Ok(())
    }

    fn get_vid(&mut self, vlan: usize) -> SwResult<u16> {
        Self::check_slot(vlan)?;
        let word = self.transport.read(regs::vtim(vlan));
        Ok(regs::vtim_extract(word, vlan))
    }

    #[instrument(skip(self))]
    fn set_vid(&mut self, vlan: usize, vid: u16) -> SwResult<()> {
        Self::check_slot(vlan)?;
        Self::check_vid("vid", vid)?;

        self.state.vlans[vlan].vid = vid;
        debug!("Staged VLAN id");
        Ok(())
    }

    fn get_port_link(&mut self, port: usize) -> SwResult<PortLink> {
        Self::check_port(port)?;
        Ok(link::read_port_link(&mut self.transport, port))
    }

    fn apply_config(&mut self) {
        sync::apply_config(&mut self.transport, &self.state);
    }

    #[instrument(skip(self))]
    fn reset_switch(&mut self) {
        self.state.reset();
        debug!("Switch model reset");
    }
}
