//! Controller manager
//!
//! Owns the panel's widget tree for the session and mediates between it and
//! the NRPN protocol:
//!
//! - **Construction**: discovers every controller on every screen, then
//!   propagates synth and NRPN settings down each tree.
//! - **Initialisation**: links controllers sharing a coordinate, binds
//!   outgoing handlers to the transport and patch collaborators, fills
//!   drop-down options and shows each controller's current state.
//! - **Routing**: applies inbound values without echoing them back, and
//!   re-emits or snapshots a synth's values on request.

use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::controller::UtilityAction;
use crate::error::{ControlError, Result};
use crate::link::link;
use crate::midi::NrpnOutput;
use crate::notice::Notice;
use crate::patch::{PatchManager, PatchSnapshot};
use crate::propagate::{set_if_absent, Family, PropagationPass};
use crate::settings::{Channels, OptionLists};
use crate::walk::{discover, visit};
use crate::widget::{
    ControllerKind, Property, PropertyValue, Screens, WidgetArena, WidgetId, WidgetTree,
};

/// Mediates between panel controllers and the NRPN protocol
#[derive(Debug)]
pub struct ControllerManager<T: WidgetTree = WidgetArena> {
    tree: T,
    screens: Screens,
    /// Discovery order; membership is fixed after construction
    controllers: Rc<[WidgetId]>,
    channels: Channels,
    initialised: bool,
}

impl<T: WidgetTree> ControllerManager<T> {
    /// Discover controllers on every screen and propagate settings
    pub fn new(mut tree: T, screens: Screens) -> Result<Self> {
        let controllers: Rc<[WidgetId]> = discover(&tree, &screens).into();

        for root in screens.roots() {
            for pass in PropagationPass::standard() {
                pass.run(&mut tree, root)?;
            }
        }

        info!(
            screens = screens.len(),
            controllers = controllers.len(),
            "Controller manager built"
        );

        Ok(Self {
            tree,
            screens,
            controllers,
            channels: Channels::new(),
            initialised: false,
        })
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable tree access for the GUI layer. Controller membership stays fixed.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn screens(&self) -> &Screens {
        &self.screens
    }

    /// Controllers in discovery order
    pub fn controllers(&self) -> &[WidgetId] {
        &self.controllers
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Distinct synths addressed by any controller, sorted
    pub fn synths(&self) -> Vec<String> {
        self.controllers
            .iter()
            .filter_map(|&id| self.tree.controller(id))
            .filter_map(|c| c.synth().map(str::to_string))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Channel recorded for `synth` by the last `set_channels`
    pub fn channel_of(&self, synth: &str) -> Option<u8> {
        self.channels.get(synth).copied()
    }

    /// Assign every controller the channel of its synth.
    ///
    /// Every synth must be registered; nothing is changed otherwise.
    pub fn set_channels(&mut self, channels: &Channels) -> Result<()> {
        let mut assignments = Vec::with_capacity(self.controllers.len());
        for &id in self.controllers.iter() {
            let Some(controller) = self.tree.controller(id) else {
                continue;
            };
            let synth = controller.synth().unwrap_or_default();
            match channels.get(synth) {
                Some(&channel) => assignments.push((id, channel)),
                None => {
                    Notice::SynthNotRegistered(synth.to_string()).report();
                    return Err(ControlError::SynthNotRegistered(synth.to_string()));
                }
            }
        }

        for (id, channel) in assignments {
            if let Some(controller) = self.tree.controller_mut(id) {
                controller.set_channel(channel);
            }
        }
        self.channels = channels.clone();
        debug!(synths = channels.len(), "Channels assigned");
        Ok(())
    }

    /// Link, bind and prepare every controller. Runs once per session.
    pub fn initialise_controllers(
        &mut self,
        options_lists: &OptionLists,
        output: Rc<dyn NrpnOutput>,
        patch_manager: Rc<dyn PatchManager>,
    ) -> Result<()> {
        if self.initialised {
            return Err(ControlError::AlreadyInitialised);
        }

        let controllers = Rc::clone(&self.controllers);
        let mut links = 0;
        for &id in controllers.iter() {
            let Some(kind) = self.tree.controller(id).map(|c| c.kind()) else {
                continue;
            };

            if kind.is_base_family() {
                links += link(&mut self.tree, id, &controllers);

                if let Some(controller) = self.tree.controller_mut(id) {
                    let output = Rc::clone(&output);
                    controller.bind_send(Box::new(move |channel, nrpn, value| {
                        output.send_nrpn(channel, nrpn, value)
                    }));
                }

                if kind == ControllerKind::Radio {
                    self.connect_radio_group(id)?;
                }
                if kind == ControllerKind::DropDown {
                    self.add_drop_down_options(id, options_lists);
                }

                if let Some(controller) = self.tree.controller_mut(id) {
                    controller.setup();
                }
                self.display_selected(id);
            } else {
                self.bind_patch_manager(id, &patch_manager);
            }
        }

        self.initialised = true;
        info!(
            controllers = controllers.len(),
            links, "Controllers initialised"
        );
        Ok(())
    }

    /// Give radio buttons under a radio controller its group
    fn connect_radio_group(&mut self, id: WidgetId) -> Result<()> {
        let group = match self.tree.controller(id).and_then(|c| c.group()) {
            Some(group) => PropertyValue::Text(group.to_string()),
            None => return Ok(()),
        };
        set_if_absent(&mut self.tree, id, Property::Group, &group, Family::RadioButton)
    }

    /// Fill a drop-down from the option catalog; missing entries are skipped
    fn add_drop_down_options(&mut self, id: WidgetId, options_lists: &OptionLists) {
        let Some(controller) = self.tree.controller(id) else {
            return;
        };
        let (Some(synth), Some(key)) = (controller.synth(), controller.option_list()) else {
            debug!(widget = %id, "Drop-down has no option list");
            return;
        };

        let labels = match options_lists.get(synth) {
            Some(lists) => lists.get(key).cloned(),
            None => {
                Notice::NoSynthData(synth.to_string()).report();
                return;
            }
        };

        match labels {
            Some(labels) => {
                if let Some(controller) = self.tree.controller_mut(id) {
                    controller.add_options(&labels);
                }
            }
            None => warn!(widget = %id, synth, key, "Option list not found"),
        }
    }

    fn bind_patch_manager(&mut self, id: WidgetId, patch_manager: &Rc<dyn PatchManager>) {
        let Some(controller) = self.tree.controller_mut(id) else {
            return;
        };
        for action in UtilityAction::ALL {
            let patches = Rc::clone(patch_manager);
            controller.bind_utility(
                action,
                Box::new(move |synth: &str| match action {
                    UtilityAction::Load => patches.on_load(synth),
                    UtilityAction::Save => patches.on_save(synth),
                    UtilityAction::Send => patches.on_send(synth),
                    UtilityAction::Receive => patches.on_receive(synth),
                }),
            );
        }
    }

    /// Refresh a controller's shown state; radio controllers also switch
    /// their group's buttons so only the one matching the value is active.
    fn display_selected(&mut self, id: WidgetId) {
        let Some(controller) = self.tree.controller_mut(id) else {
            return;
        };
        controller.display_selected();
        if controller.kind() != ControllerKind::Radio {
            return;
        }

        let group = controller.group().map(str::to_string);
        let value = controller.get_value();
        let mut buttons = Vec::new();
        visit(&self.tree, id, &(), &mut |tree, node, _| {
            if let Some(button) = tree.controller(node) {
                if button.kind() == ControllerKind::RadioButton
                    && button.group() == group.as_deref()
                {
                    buttons.push((node, button.get_value() == value));
                }
            }
        });
        for (node, active) in buttons {
            if let Some(button) = self.tree.controller_mut(node) {
                button.set_active(active);
            }
        }
    }

    fn matching(&self, channel: u8, nrpn: u16) -> Vec<WidgetId> {
        self.controllers
            .iter()
            .copied()
            .filter(|&id| {
                self.tree
                    .controller(id)
                    .is_some_and(|c| c.addresses(channel, nrpn))
            })
            .collect()
    }

    /// Apply an inbound value to every controller at `(channel, nrpn)`.
    ///
    /// Never sends. Returns the number of controllers updated.
    pub fn set_controller_value(&mut self, channel: u8, nrpn: u16, value: u16) -> usize {
        let targets = self.matching(channel, nrpn);
        if targets.is_empty() {
            debug!(channel, nrpn, "No controller for inbound value");
        }
        for &id in &targets {
            if let Some(controller) = self.tree.controller_mut(id) {
                controller.set_without_sending_midi(value);
            }
            if self.initialised {
                self.display_selected(id);
            }
        }
        targets.len()
    }

    /// Apply `data` positionally against `nrpn_order`.
    ///
    /// The key is matched against controller channels, as
    /// `set_controller_value` does. Callers holding a synth name resolve it
    /// with [`channel_of`](Self::channel_of) first.
    pub fn set_controller_values(&mut self, channel: u8, nrpn_order: &[u16], data: &[u16]) {
        if data.len() > nrpn_order.len() {
            warn!(
                values = data.len(),
                addresses = nrpn_order.len(),
                "More values than addresses, extra values ignored"
            );
        }
        for (&nrpn, &value) in nrpn_order.iter().zip(data) {
            self.set_controller_value(channel, nrpn, value);
        }
    }

    /// Current values of `synth`'s controllers, in `nrpn_order`.
    ///
    /// Addresses without a controller contribute nothing.
    pub fn get_controller_values(&self, synth: &str, nrpn_order: &[u16]) -> Vec<u16> {
        let mut values = Vec::new();
        for &nrpn in nrpn_order {
            for &id in self.controllers.iter() {
                if let Some(controller) = self.tree.controller(id) {
                    if controller.synth() == Some(synth) && controller.nrpn() == Some(nrpn) {
                        values.push(controller.get_value());
                    }
                }
            }
        }
        values
    }

    /// Re-emit every value of `synth` through the transport
    pub fn send_all(&self, synth: &str) {
        let mut sent = 0;
        for &id in self.controllers.iter() {
            if let Some(controller) = self.tree.controller(id) {
                if controller.kind().is_base_family() && controller.synth() == Some(synth) {
                    controller.send_value();
                    sent += 1;
                }
            }
        }
        debug!(synth, sent, "Sent all controller values");
    }

    /// UI edit: set, send, then mirror onto linked controllers without sending
    pub fn edit_controller(&mut self, id: WidgetId, value: u16) -> Result<()> {
        let controller = self
            .tree
            .controller_mut(id)
            .ok_or(ControlError::UnknownWidget(id))?;
        controller.set_without_sending_midi(value);
        controller.send_value();
        let linked = controller.linked().to_vec();
        self.display_selected(id);

        for peer in linked {
            if let Some(controller) = self.tree.controller_mut(peer) {
                controller.set_without_sending_midi(value);
            }
            self.display_selected(peer);
        }
        Ok(())
    }

    /// Fire a utility controller's patch action
    pub fn trigger_utility(&self, id: WidgetId, action: UtilityAction) -> Result<bool> {
        let controller = self
            .tree
            .controller(id)
            .ok_or(ControlError::UnknownWidget(id))?;
        Ok(controller.trigger(action))
    }

    /// Capture `synth`'s values in patch order
    pub fn snapshot(&self, synth: &str, nrpn_order: &[u16]) -> PatchSnapshot {
        PatchSnapshot::new(synth, self.get_controller_values(synth, nrpn_order))
    }

    /// Apply a snapshot to `synth`'s controllers.
    ///
    /// A snapshot of another synth is reported and skipped (`Ok(false)`).
    pub fn apply_snapshot(
        &mut self,
        snapshot: &PatchSnapshot,
        synth: &str,
        nrpn_order: &[u16],
    ) -> Result<bool> {
        if !snapshot.is_for(synth) {
            Notice::IncorrectSynth(synth.to_string()).report();
            return Ok(false);
        }
        let channel = self
            .channel_of(synth)
            .ok_or_else(|| ControlError::SynthNotRegistered(synth.to_string()))?;
        self.set_controller_values(channel, nrpn_order, &snapshot.values);
        Ok(true)
    }
}
