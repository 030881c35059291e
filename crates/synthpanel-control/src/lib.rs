//! SynthPanel Control - Panel Controllers to NRPN Routing
//!
//! This crate connects a tree of on-screen controllers to a synthesizer's
//! NRPN parameters:
//! - **Discovery**: find every controller widget on every screen
//! - **Propagation**: push synth and NRPN settings down each widget tree
//! - **Linking**: pair controllers that address the same channel and NRPN
//! - **Routing**: inbound values to widgets, widget edits to the transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use synthpanel_control::{
//!     ControllerManager, OptionLists, PanelLayout, PanelSettings, RecordingOutput,
//! };
//! # use synthpanel_control::PatchManager;
//! # struct Patches;
//! # impl PatchManager for Patches {
//! #     fn on_load(&self, _: &str) {}
//! #     fn on_save(&self, _: &str) {}
//! #     fn on_send(&self, _: &str) {}
//! #     fn on_receive(&self, _: &str) {}
//! # }
//!
//! # fn main() -> synthpanel_control::Result<()> {
//! let settings = PanelSettings::load("settings.toml".as_ref())?;
//! let (tree, screens) = PanelLayout::load("panel.json".as_ref())?.build()?;
//!
//! let mut manager = ControllerManager::new(tree, screens)?;
//! manager.set_channels(&settings.channels())?;
//! manager.initialise_controllers(
//!     &settings.options_lists,
//!     Rc::new(RecordingOutput::new()),
//!     Rc::new(Patches),
//! )?;
//!
//! // Inbound value from the synth: updates widgets, sends nothing back
//! manager.set_controller_value(1, 7, 64);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`widget`] - Widget tree accessor, arena and layouts
//! - [`controller`] - Controller state and handlers
//! - [`walk`] - Tree walking and controller discovery
//! - [`propagate`] - Property propagation
//! - [`link`] - Controller linking
//! - [`manager`] - Controller manager
//! - [`settings`] - Settings and logging configuration
//! - [`notice`] - Non-fatal condition catalog
//! - [`error`] - Error types

#![allow(missing_docs)]

// Core modules
/// Error types
pub mod error;
/// Central controller manager
pub mod manager;
/// Non-fatal notices
pub mod notice;
/// Widget tree model
pub mod widget;

/// Controller state
pub mod controller;
/// Controller linking
pub mod link;
/// Property propagation
pub mod propagate;
/// Tree walking
pub mod walk;

/// NRPN transport seam
pub mod midi;
/// Patch persistence seam
pub mod patch;
/// Settings
pub mod settings;

// Re-exports
pub use controller::{Controller, UtilityAction};
pub use error::{ControlError, Result};
pub use manager::ControllerManager;
pub use midi::{NrpnMessage, NrpnOutput, RecordingOutput};
pub use notice::Notice;
pub use patch::{PatchManager, PatchSnapshot};
pub use propagate::{Family, PropagationPass, DEFAULT_SYNTH};
pub use settings::{Channels, LogConfig, OptionLists, PanelSettings, SynthSettings};
pub use widget::{
    ControllerKind, Lookup, PanelLayout, Property, PropertyValue, Screens, WidgetArena,
    WidgetId, WidgetKind, WidgetTree,
};
