//! Controller state carried by protocol-aware widgets
//!
//! A [`Controller`] is the runtime side of a panel widget: its protocol
//! coordinate, current value, linked peers and the handlers the manager
//! binds at initialisation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::widget::{ControllerKind, Lookup, Property, PropertyValue, WidgetId};

/// Outgoing value handler: `(channel, nrpn, value)`
pub type SendHandler = Box<dyn Fn(u8, u16, u16)>;

/// Patch action handler, called with the controller's synth
pub type SynthHandler = Box<dyn Fn(&str)>;

/// Actions a utility controller can fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityAction {
    /// Load a stored patch
    Load,
    /// Store the current patch
    Save,
    /// Send the current patch to the synth
    Send,
    /// Request the patch from the synth
    Receive,
}

impl UtilityAction {
    pub const ALL: [UtilityAction; 4] = [
        UtilityAction::Load,
        UtilityAction::Save,
        UtilityAction::Send,
        UtilityAction::Receive,
    ];

    fn slot(self) -> usize {
        match self {
            UtilityAction::Load => 0,
            UtilityAction::Save => 1,
            UtilityAction::Send => 2,
            UtilityAction::Receive => 3,
        }
    }
}

/// One handler per event kind
#[derive(Default)]
struct Handlers {
    send: Option<SendHandler>,
    utility: [Option<SynthHandler>; 4],
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let utility: Vec<UtilityAction> = UtilityAction::ALL
            .into_iter()
            .filter(|action| self.utility[action.slot()].is_some())
            .collect();
        f.debug_struct("Handlers")
            .field("send", &self.send.is_some())
            .field("utility", &utility)
            .finish()
    }
}

/// Runtime state of a controller widget
#[derive(Debug)]
pub struct Controller {
    kind: ControllerKind,
    synth: Option<String>,
    nrpn: Option<u16>,
    group: Option<String>,
    option_list: Option<String>,
    channel: Option<u8>,
    value: u16,
    displayed: Option<u16>,
    active: bool,
    ready: bool,
    linked: Vec<WidgetId>,
    options: Vec<String>,
    handlers: Handlers,
}

impl Controller {
    /// Create a controller with nothing set
    pub fn new(kind: ControllerKind) -> Self {
        Self {
            kind,
            synth: None,
            nrpn: None,
            group: None,
            option_list: None,
            channel: None,
            value: 0,
            displayed: None,
            active: false,
            ready: false,
            linked: Vec::new(),
            options: Vec::new(),
            handlers: Handlers::default(),
        }
    }

    pub fn with_synth(mut self, synth: impl Into<String>) -> Self {
        self.synth = Some(synth.into());
        self
    }

    pub fn with_nrpn(mut self, nrpn: u16) -> Self {
        self.nrpn = Some(nrpn);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_option_list(mut self, key: impl Into<String>) -> Self {
        self.option_list = Some(key.into());
        self
    }

    pub fn with_value(mut self, value: u16) -> Self {
        self.value = value;
        self
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn synth(&self) -> Option<&str> {
        self.synth.as_deref()
    }

    pub fn nrpn(&self) -> Option<u16> {
        self.nrpn
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn option_list(&self) -> Option<&str> {
        self.option_list.as_deref()
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    pub fn set_channel(&mut self, channel: u8) {
        self.channel = Some(channel);
    }

    /// Protocol coordinate used for linking and inbound routing
    pub fn coordinate(&self) -> (Option<u8>, Option<u16>) {
        (self.channel, self.nrpn)
    }

    /// Whether this controller answers to `(channel, nrpn)`
    pub fn addresses(&self, channel: u8, nrpn: u16) -> bool {
        self.kind.is_base_family() && self.channel == Some(channel) && self.nrpn == Some(nrpn)
    }

    /// Controllers sharing this controller's coordinate, excluding itself
    pub fn linked(&self) -> &[WidgetId] {
        &self.linked
    }

    pub(crate) fn link(&mut self, other: WidgetId) {
        self.linked.push(other);
    }

    pub fn get_value(&self) -> u16 {
        self.value
    }

    /// Value shown by the widget the last time it refreshed
    pub fn displayed(&self) -> Option<u16> {
        self.displayed
    }

    /// Whether `setup` has run
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Radio button state
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Option label at the current value
    pub fn selected_option(&self) -> Option<&str> {
        self.options.get(self.value as usize).map(String::as_str)
    }

    /// Append selectable option labels
    pub fn add_options<S: AsRef<str>>(&mut self, labels: &[S]) {
        self.options
            .extend(labels.iter().map(|label| label.as_ref().to_string()));
    }

    /// Apply a value coming from the synth. Never sends.
    pub fn set_without_sending_midi(&mut self, value: u16) {
        self.value = value;
        if self.ready {
            self.display_selected();
        }
    }

    /// Emit the current value through the bound send handler
    pub fn send_value(&self) {
        match (&self.handlers.send, self.channel, self.nrpn) {
            (Some(send), Some(channel), Some(nrpn)) => send(channel, nrpn, self.value),
            (None, _, _) => debug!(kind = ?self.kind, "send skipped, no handler bound"),
            _ => debug!(kind = ?self.kind, "send skipped, controller has no address"),
        }
    }

    /// One-time preparation after options and handlers are in place.
    /// The value is left as is, even past the last option.
    pub fn setup(&mut self) {
        self.ready = true;
    }

    /// Refresh the displayed state from the current value
    pub fn display_selected(&mut self) {
        self.displayed = Some(self.value);
    }

    /// Install the outgoing value handler, replacing any previous one
    pub fn bind_send(&mut self, handler: SendHandler) {
        self.handlers.send = Some(handler);
    }

    /// Install a patch action handler, replacing any previous one
    pub fn bind_utility(&mut self, action: UtilityAction, handler: SynthHandler) {
        self.handlers.utility[action.slot()] = Some(handler);
    }

    pub fn has_send_handler(&self) -> bool {
        self.handlers.send.is_some()
    }

    pub fn has_utility_handler(&self, action: UtilityAction) -> bool {
        self.handlers.utility[action.slot()].is_some()
    }

    /// Fire a patch action with this controller's synth.
    ///
    /// Returns `false` when nothing was called.
    pub fn trigger(&self, action: UtilityAction) -> bool {
        match (&self.handlers.utility[action.slot()], self.synth.as_deref()) {
            (Some(handler), Some(synth)) => {
                handler(synth);
                true
            }
            _ => false,
        }
    }

    /// Read a property from the typed table
    pub fn property(&self, property: Property) -> Lookup {
        if !self.kind.declares(property) {
            return Lookup::Undeclared;
        }
        let value = match property {
            Property::Synth => self.synth.clone().map(PropertyValue::Text),
            Property::Nrpn => self.nrpn.map(PropertyValue::Address),
            Property::Group => self.group.clone().map(PropertyValue::Text),
            Property::OptionList => self.option_list.clone().map(PropertyValue::Text),
        };
        value.map_or(Lookup::Unset, Lookup::Set)
    }

    /// Write a property; `false` if undeclared or the value type is wrong
    pub(crate) fn assign(&mut self, property: Property, value: PropertyValue) -> bool {
        if !self.kind.declares(property) {
            return false;
        }
        match (property, value) {
            (Property::Synth, PropertyValue::Text(text)) => self.synth = Some(text),
            (Property::Nrpn, PropertyValue::Address(address)) => self.nrpn = Some(address),
            (Property::Group, PropertyValue::Text(text)) => self.group = Some(text),
            (Property::OptionList, PropertyValue::Text(text)) => self.option_list = Some(text),
            _ => return false,
        }
        true
    }
}
