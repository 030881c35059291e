//! SynthPanel - panel controller to NRPN routing
//!
//! Loads settings and a panel layout, builds the controller manager and runs
//! one command against it.

#![warn(missing_docs)]

mod logging_setup;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use synthpanel_control::{
    ControllerManager, NrpnMessage, NrpnOutput, PanelLayout, PanelSettings, PatchManager,
    WidgetTree,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "synthpanel", about = "Route panel controllers to synth NRPNs")]
struct Cli {
    /// Settings file (.toml or .json)
    #[arg(long)]
    settings: PathBuf,
    /// Panel layout file (.json or .toml)
    #[arg(long)]
    layout: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List discovered controllers
    List,
    /// Print a synth's values in patch order
    Dump {
        #[arg(long)]
        synth: String,
    },
    /// Re-send every value of a synth
    SendAll {
        #[arg(long)]
        synth: String,
    },
    /// Apply an inbound value and show the affected controllers
    Set {
        #[arg(long)]
        channel: u8,
        #[arg(long)]
        nrpn: u16,
        #[arg(long)]
        value: u16,
    },
}

/// Prints outgoing NRPNs to stdout
struct StdoutOutput;

impl NrpnOutput for StdoutOutput {
    fn send_nrpn(&self, channel: u8, nrpn: u16, value: u16) {
        let message = NrpnMessage {
            channel,
            nrpn,
            value,
        };
        println!("{}", message);
    }
}

/// Logs patch actions; this binary has no patch storage
struct LoggingPatches;

impl PatchManager for LoggingPatches {
    fn on_load(&self, synth: &str) {
        info!(synth, "Patch load requested");
    }

    fn on_save(&self, synth: &str) {
        info!(synth, "Patch save requested");
    }

    fn on_send(&self, synth: &str) {
        info!(synth, "Patch send requested");
    }

    fn on_receive(&self, synth: &str) {
        info!(synth, "Patch receive requested");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = PanelSettings::load(&cli.settings)
        .with_context(|| format!("Failed to load settings: {:?}", cli.settings))?;
    let _log_guard = logging_setup::init(&settings.log)?;

    let (tree, screens) = PanelLayout::load(&cli.layout)
        .with_context(|| format!("Failed to load layout: {:?}", cli.layout))?
        .build()?;

    let mut manager = ControllerManager::new(tree, screens)?;
    manager.set_channels(&settings.channels())?;
    manager.initialise_controllers(
        &settings.options_lists,
        Rc::new(StdoutOutput),
        Rc::new(LoggingPatches),
    )?;

    match cli.command {
        Command::List => {
            for &id in manager.controllers() {
                let Some(controller) = manager.tree().controller(id) else {
                    continue;
                };
                let name = manager.tree().get(id).and_then(|w| w.name()).unwrap_or("-");
                println!(
                    "{id}\t{name}\t{:?}\tsynth={}\tchannel={}\tnrpn={}\tlinked={}",
                    controller.kind(),
                    controller.synth().unwrap_or("-"),
                    display_opt(controller.channel()),
                    display_opt(controller.nrpn()),
                    controller.linked().len(),
                );
            }
        }
        Command::Dump { synth } => {
            let Some(order) = settings.nrpn_order(&synth) else {
                bail!("no patch order for synth {synth}");
            };
            let snapshot = manager.snapshot(&synth, order);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::SendAll { synth } => manager.send_all(&synth),
        Command::Set {
            channel,
            nrpn,
            value,
        } => {
            let updated = manager.set_controller_value(channel, nrpn, value);
            println!("updated {updated} controller(s)");
        }
    }

    Ok(())
}

fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
