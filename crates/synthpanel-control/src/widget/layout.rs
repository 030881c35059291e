//! Serializable panel layouts
//!
//! A layout is an ordered list of screens, each a nested widget description.
//! Building one produces a [`WidgetArena`] and the matching [`Screens`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{ControllerKind, Property, PropertyValue, Screens, WidgetArena, WidgetId};
use crate::controller::Controller;
use crate::error::{ControlError, Result};

/// Panel layout document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub screens: Vec<ScreenLayout>,
}

/// One named screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenLayout {
    pub name: String,
    pub root: WidgetLayout,
}

/// One widget and its subtree. A missing `kind` means a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetLayout {
    #[serde(default)]
    pub kind: Option<ControllerKind>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub synth: Option<String>,
    #[serde(default)]
    pub nrpn: Option<u16>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub option_list: Option<String>,
    #[serde(default)]
    pub value: Option<u16>,
    #[serde(default)]
    pub children: Vec<WidgetLayout>,
}

impl WidgetLayout {
    fn given_properties(&self) -> Vec<(Property, PropertyValue)> {
        let mut given = Vec::new();
        if let Some(synth) = &self.synth {
            given.push((Property::Synth, PropertyValue::Text(synth.clone())));
        }
        if let Some(nrpn) = self.nrpn {
            given.push((Property::Nrpn, PropertyValue::Address(nrpn)));
        }
        if let Some(group) = &self.group {
            given.push((Property::Group, PropertyValue::Text(group.clone())));
        }
        if let Some(key) = &self.option_list {
            given.push((Property::OptionList, PropertyValue::Text(key.clone())));
        }
        given
    }

    fn build_into(&self, arena: &mut WidgetArena) -> Result<WidgetId> {
        let id = match self.kind {
            None => {
                let id = arena.add_container(self.name.as_deref());
                for (property, value) in self.given_properties() {
                    arena.declare(id, property, Some(value))?;
                }
                id
            }
            Some(kind) => {
                let mut controller = Controller::new(kind).with_value(self.value.unwrap_or(0));
                for (property, value) in self.given_properties() {
                    if !controller.assign(property, value) {
                        return Err(ControlError::InvalidSettings(format!(
                            "{:?} widget {} cannot carry property {}",
                            kind,
                            self.name.as_deref().unwrap_or("<unnamed>"),
                            property
                        )));
                    }
                }
                arena.add_controller(self.name.as_deref(), controller)
            }
        };
        for child in &self.children {
            let child_id = child.build_into(arena)?;
            arena.add_child(id, child_id)?;
        }
        Ok(id)
    }
}

impl PanelLayout {
    /// Load from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("toml") => Self::from_toml(&text),
            other => Err(ControlError::InvalidSettings(format!(
                "unsupported layout format: {:?}",
                other
            ))),
        }
    }

    /// Build the widget arena and screen map
    pub fn build(&self) -> Result<(WidgetArena, Screens)> {
        let mut arena = WidgetArena::new();
        let mut screens = Screens::new();
        for screen in &self.screens {
            let root = screen.root.build_into(&mut arena)?;
            screens.insert(screen.name.clone(), root);
        }
        Ok((arena, screens))
    }
}
