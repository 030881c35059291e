//! Widget tree model
//!
//! The manager sees a panel as an opaque tree: every node has an ordered list
//! of children and a typed property table. [`WidgetTree`] is that accessor;
//! [`WidgetArena`] is the in-memory implementation used by layouts and tests.

mod arena;
mod layout;

pub use arena::{Widget, WidgetArena};
pub use layout::{PanelLayout, ScreenLayout, WidgetLayout};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::controller::Controller;
use crate::error::Result;

/// Handle of a widget inside a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(pub usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of controller variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Generic control bound to one NRPN
    Base,
    /// Mutually exclusive group of radio buttons
    Radio,
    /// Member button of a radio group
    RadioButton,
    /// Enumerated option control
    DropDown,
    /// Load/save/send/receive of a whole patch
    Utility,
}

impl ControllerKind {
    /// Controllers that carry a channel and an NRPN
    pub fn is_base_family(self) -> bool {
        matches!(
            self,
            ControllerKind::Base | ControllerKind::Radio | ControllerKind::DropDown
        )
    }

    /// Controllers the manager keeps in its list
    pub fn is_tracked(self) -> bool {
        self.is_base_family() || self == ControllerKind::Utility
    }

    /// Whether this variant has a slot for `property`
    pub fn declares(self, property: Property) -> bool {
        match property {
            Property::Synth => self != ControllerKind::RadioButton,
            Property::Nrpn => self.is_base_family(),
            Property::Group => matches!(self, ControllerKind::Radio | ControllerKind::RadioButton),
            Property::OptionList => self == ControllerKind::DropDown,
        }
    }
}

/// What a node is, as far as the manager cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Layout or decoration node
    Container,
    /// Protocol-aware node
    Controller(ControllerKind),
}

impl WidgetKind {
    /// Controller variant, if any
    pub fn controller_kind(self) -> Option<ControllerKind> {
        match self {
            WidgetKind::Container => None,
            WidgetKind::Controller(kind) => Some(kind),
        }
    }
}

/// Inheritable widget properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Target synthesizer name
    Synth,
    /// NRPN parameter address
    Nrpn,
    /// Radio group name
    Group,
    /// Key into the option catalog
    OptionList,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Property::Synth => "synth",
            Property::Nrpn => "nrpn",
            Property::Group => "group",
            Property::OptionList => "option_list",
        };
        f.write_str(name)
    }
}

/// Typed property value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Names (synth, group, option list key)
    Text(String),
    /// NRPN addresses
    Address(u16),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Address(_) => None,
        }
    }

    pub fn as_address(&self) -> Option<u16> {
        match self {
            PropertyValue::Address(address) => Some(*address),
            PropertyValue::Text(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        PropertyValue::Text(text.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(text: String) -> Self {
        PropertyValue::Text(text)
    }
}

impl From<u16> for PropertyValue {
    fn from(address: u16) -> Self {
        PropertyValue::Address(address)
    }
}

/// Result of reading a property from a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The node type has no such property
    Undeclared,
    /// Declared but not set
    Unset,
    /// Declared and set
    Set(PropertyValue),
}

impl Lookup {
    /// Collapse "undeclared" and "unset" into `None`
    pub fn value(self) -> Option<PropertyValue> {
        match self {
            Lookup::Set(value) => Some(value),
            Lookup::Undeclared | Lookup::Unset => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Lookup::Set(_))
    }
}

/// Accessor over a widget tree owned by the GUI layer.
///
/// Unknown ids read as childless containers with no properties.
pub trait WidgetTree {
    /// Ordered children of `id`
    fn children(&self, id: WidgetId) -> &[WidgetId];

    /// Node kind of `id`
    fn kind(&self, id: WidgetId) -> WidgetKind;

    /// Read a property without failing on undeclared names
    fn property(&self, id: WidgetId, property: Property) -> Lookup;

    /// Write a declared property
    fn set_property(&mut self, id: WidgetId, property: Property, value: PropertyValue)
        -> Result<()>;

    /// Controller state of `id`, if it is a controller
    fn controller(&self, id: WidgetId) -> Option<&Controller>;

    /// Mutable controller state of `id`, if it is a controller
    fn controller_mut(&mut self, id: WidgetId) -> Option<&mut Controller>;
}

/// Ordered mapping from screen name to root widget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screens {
    entries: Vec<(String, WidgetId)>,
}

impl Screens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a screen, replacing the root of an existing one with the same name
    pub fn insert(&mut self, name: impl Into<String>, root: WidgetId) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = root,
            None => self.entries.push((name, root)),
        }
    }

    pub fn get(&self, name: &str) -> Option<WidgetId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, root)| *root)
    }

    /// Roots in insertion order
    pub fn roots(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.entries.iter().map(|(_, root)| *root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, WidgetId)> {
        self.entries.iter().map(|(name, root)| (name.as_str(), *root))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, WidgetId)> for Screens {
    fn from_iter<I: IntoIterator<Item = (S, WidgetId)>>(iter: I) -> Self {
        let mut screens = Screens::new();
        for (name, root) in iter {
            screens.insert(name, root);
        }
        screens
    }
}
