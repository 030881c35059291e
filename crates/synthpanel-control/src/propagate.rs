//! Downward inheritance of widget properties
//!
//! Each node's effective value is its own value when set, otherwise the value
//! inherited from its parent. Nodes of the pass's target family get the
//! effective value written onto them, so inherited defaults become explicit.

use crate::error::Result;
use crate::walk::walk;
use crate::widget::{ControllerKind, Property, PropertyValue, WidgetId, WidgetKind, WidgetTree};

/// Synth assigned when no ancestor names one
pub const DEFAULT_SYNTH: &str = "default";

/// Node filter for a propagation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Base, Radio and DropDown controllers
    Base,
    /// Utility controllers
    Utility,
    /// Radio buttons
    RadioButton,
}

impl Family {
    pub fn matches(self, kind: WidgetKind) -> bool {
        match (self, kind.controller_kind()) {
            (Family::Base, Some(kind)) => kind.is_base_family(),
            (Family::Utility, Some(kind)) => kind == ControllerKind::Utility,
            (Family::RadioButton, Some(kind)) => kind == ControllerKind::RadioButton,
            (_, None) => false,
        }
    }
}

/// One (property, default, filter) propagation
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationPass {
    pub property: Property,
    pub default: Option<PropertyValue>,
    pub family: Family,
}

impl PropagationPass {
    pub fn new(property: Property, default: Option<PropertyValue>, family: Family) -> Self {
        Self {
            property,
            default,
            family,
        }
    }

    /// Synth to Base-family, synth to Utility, then NRPN to Base-family
    pub fn standard() -> [PropagationPass; 3] {
        [
            PropagationPass::new(Property::Synth, Some(DEFAULT_SYNTH.into()), Family::Base),
            PropagationPass::new(Property::Synth, Some(DEFAULT_SYNTH.into()), Family::Utility),
            PropagationPass::new(Property::Nrpn, None, Family::Base),
        ]
    }

    /// Run this pass over the tree rooted at `root`
    pub fn run<T>(&self, tree: &mut T, root: WidgetId) -> Result<()>
    where
        T: WidgetTree + ?Sized,
    {
        walk(tree, root, &self.default, &mut |tree, id, inherited| {
            // Undeclared reads as absent, so the inherited value falls through
            let own = tree.property(id, self.property).value();
            let is_own = own.is_some();
            let effective = own.or_else(|| inherited.clone());
            if let Some(value) = &effective {
                if !is_own && self.family.matches(tree.kind(id)) {
                    tree.set_property(id, self.property, value.clone())?;
                }
            }
            Ok(effective)
        })
    }
}

/// Set `property` to a fixed `value` on every `family` node under `root` that
/// has no value yet. Nodes that already carry one keep it.
pub fn set_if_absent<T>(
    tree: &mut T,
    root: WidgetId,
    property: Property,
    value: &PropertyValue,
    family: Family,
) -> Result<()>
where
    T: WidgetTree + ?Sized,
{
    walk(tree, root, &(), &mut |tree, id, _| {
        if family.matches(tree.kind(id)) && !tree.property(id, property).is_set() {
            tree.set_property(id, property, value.clone())?;
        }
        Ok(())
    })
}
