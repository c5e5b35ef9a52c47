//! mt7530ctl - MT7530 / MT7620 switch planning tool
//!
//! Attaches the driver to a simulated chip, optionally applies a switch
//! configuration file, and prints the register writes the driver issued, the
//! resulting register file, and the configuration read back through the
//! switch operations.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use swconfig_common::portlist::format_ports;
use swconfig_common::{SwitchConfig, SwitchDev, SwitchOps};
use swconfig_mt7530::{
    presets, Access, AttachOptions, MdioTransport, Mt7530, RegisterTransport, SimulatedChip,
    SimulatedMdioBus, NUM_PORTS, NUM_VLANS,
};

/// MT7530 / MT7620 switch planning tool
#[derive(Parser, Debug)]
#[command(name = "mt7530ctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in port maps
    Presets,
    /// Show the register writes for a port map and configuration
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Register access path of the simulated chip
    #[arg(long, value_enum, default_value = "indirect")]
    transport: TransportArg,

    /// Port map preset applied at attach
    #[arg(long)]
    port_map: Option<String>,

    /// Attach in VLAN mode
    #[arg(long)]
    enable_vlan: bool,

    /// Switch configuration file (YAML) applied after attach
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TransportArg {
    /// Memory-mapped MT7620 switch
    Direct,
    /// MT7530 behind the MDIO bus
    Indirect,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct RegWrite {
    reg: String,
    value: String,
}

impl RegWrite {
    fn new(reg: u32, value: u32) -> Self {
        Self {
            reg: format!("{:#06x}", reg),
            value: format!("{:#010x}", value),
        }
    }
}

#[derive(Debug, Serialize)]
struct VlanView {
    vlan: usize,
    vid: u16,
    ports: String,
}

#[derive(Debug, Serialize)]
struct PortView {
    port: usize,
    pvid: u16,
    link: String,
}

#[derive(Debug, Serialize)]
struct Plan {
    device: SwitchDev,
    vlan_enabled: bool,
    writes: Vec<RegWrite>,
    registers: Vec<RegWrite>,
    vlans: Vec<VlanView>,
    ports: Vec<PortView>,
}

/// Initializes tracing/logging subsystem
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn direct_chip(t: &SimulatedChip) -> &SimulatedChip {
    t
}

fn indirect_chip(t: &MdioTransport<SimulatedMdioBus>) -> &SimulatedChip {
    t.bus().chip()
}

fn build_plan<T: RegisterTransport>(
    transport: T,
    args: &PlanArgs,
    chip: fn(&T) -> &SimulatedChip,
) -> Result<Plan> {
    let opts = AttachOptions {
        port_map: args.port_map.clone(),
        enable_vlan: args.enable_vlan,
    };
    let mut sw = Mt7530::probe(transport, &opts);

    if let Some(path) = &args.config {
        let cfg = SwitchConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        cfg.apply(&sw.device(), &mut sw)
            .with_context(|| format!("Failed to apply {}", path.display()))?;
    }

    let writes = chip(sw.transport())
        .log()
        .iter()
        .filter_map(|access| match *access {
            Access::Write(reg, value) => Some(RegWrite::new(reg, value)),
            Access::Read(..) => None,
        })
        .collect();
    let registers = chip(sw.transport())
        .registers()
        .map(|(reg, value)| RegWrite::new(reg, value))
        .collect();

    let mut vlans = Vec::new();
    for vlan in 0..NUM_VLANS {
        let ports = sw.get_vlan_ports(vlan)?;
        if ports.is_empty() {
            continue;
        }
        vlans.push(VlanView {
            vlan,
            vid: sw.get_vid(vlan)?,
            ports: format_ports(&ports),
        });
    }

    let mut ports = Vec::with_capacity(NUM_PORTS);
    for port in 0..NUM_PORTS {
        ports.push(PortView {
            port,
            pvid: sw.get_port_pvid(port)?,
            link: sw.get_port_link(port)?.to_string(),
        });
    }

    Ok(Plan {
        device: sw.device(),
        vlan_enabled: sw.get_vlan_enable(),
        writes,
        registers,
        vlans,
        ports,
    })
}

fn print_text(plan: &Plan) {
    println!(
        "{} ({} ports, {} vlans, cpu port {}), vlan mode {}",
        plan.device.name,
        plan.device.ports,
        plan.device.vlans,
        plan.device.cpu_port,
        if plan.vlan_enabled { "on" } else { "off" }
    );

    println!("\nregister writes ({}):", plan.writes.len());
    for w in &plan.writes {
        println!("  {} <- {}", w.reg, w.value);
    }

    println!("\nregisters ({}):", plan.registers.len());
    for r in &plan.registers {
        println!("  {} = {}", r.reg, r.value);
    }

    println!("\nvlans:");
    for v in &plan.vlans {
        println!("  vlan {:2}  vid {:4}  ports {}", v.vlan, v.vid, v.ports);
    }

    println!("\nports:");
    for p in &plan.ports {
        println!("  port {}  pvid {:4}  {}", p.port, p.pvid, p.link);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Presets => {
            for name in presets::names() {
                println!("{}", name);
            }
        }
        Command::Plan(args) => {
            info!(transport = ?args.transport, port_map = ?args.port_map, "Planning");
            let plan = match args.transport {
                TransportArg::Direct => build_plan(SimulatedChip::new(), &args, direct_chip)?,
                TransportArg::Indirect => build_plan(
                    MdioTransport::new(SimulatedMdioBus::new(SimulatedChip::new())),
                    &args,
                    indirect_chip,
                )?,
            };

            match args.format {
                OutputFormat::Text => print_text(&plan),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
