//! Arena-backed widget tree

use std::collections::BTreeMap;

use super::{Lookup, Property, PropertyValue, WidgetId, WidgetKind, WidgetTree};
use crate::controller::Controller;
use crate::error::{ControlError, Result};

#[derive(Debug)]
enum WidgetBody {
    /// Declared properties, each with an optional value
    Container(BTreeMap<Property, Option<PropertyValue>>),
    Controller(Controller),
}

/// A node in the arena
#[derive(Debug)]
pub struct Widget {
    name: Option<String>,
    children: Vec<WidgetId>,
    body: WidgetBody,
}

impl Widget {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }
}

/// Owns every widget of a panel; ids index into it
#[derive(Debug, Default)]
pub struct WidgetArena {
    widgets: Vec<Widget>,
}

impl WidgetArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a container with no declared properties
    pub fn add_container(&mut self, name: Option<&str>) -> WidgetId {
        self.push(name, WidgetBody::Container(BTreeMap::new()))
    }

    pub fn add_controller(&mut self, name: Option<&str>, controller: Controller) -> WidgetId {
        self.push(name, WidgetBody::Controller(controller))
    }

    fn push(&mut self, name: Option<&str>, body: WidgetBody) -> WidgetId {
        let id = WidgetId(self.widgets.len());
        self.widgets.push(Widget {
            name: name.map(str::to_string),
            children: Vec::new(),
            body,
        });
        id
    }

    /// Append `child` to `parent`'s children
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        if child.0 >= self.widgets.len() {
            return Err(ControlError::UnknownWidget(child));
        }
        self.widgets
            .get_mut(parent.0)
            .ok_or(ControlError::UnknownWidget(parent))?
            .children
            .push(child);
        Ok(())
    }

    /// Declare a property on a container, optionally with a value
    pub fn declare(
        &mut self,
        id: WidgetId,
        property: Property,
        value: Option<PropertyValue>,
    ) -> Result<()> {
        let widget = self
            .widgets
            .get_mut(id.0)
            .ok_or(ControlError::UnknownWidget(id))?;
        match &mut widget.body {
            WidgetBody::Container(properties) => {
                properties.insert(property, value);
                Ok(())
            }
            WidgetBody::Controller(_) => Err(ControlError::InvalidSettings(format!(
                "controller {} has a fixed property table",
                id
            ))),
        }
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0)
    }

    /// First widget with the given name
    pub fn find_by_name(&self, name: &str) -> Option<WidgetId> {
        self.widgets
            .iter()
            .position(|w| w.name.as_deref() == Some(name))
            .map(WidgetId)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl WidgetTree for WidgetArena {
    fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.widgets
            .get(id.0)
            .map(|w| w.children.as_slice())
            .unwrap_or(&[])
    }

    fn kind(&self, id: WidgetId) -> WidgetKind {
        match self.widgets.get(id.0).map(|w| &w.body) {
            Some(WidgetBody::Controller(controller)) => WidgetKind::Controller(controller.kind()),
            _ => WidgetKind::Container,
        }
    }

    fn property(&self, id: WidgetId, property: Property) -> Lookup {
        match self.widgets.get(id.0).map(|w| &w.body) {
            Some(WidgetBody::Container(properties)) => match properties.get(&property) {
                None => Lookup::Undeclared,
                Some(None) => Lookup::Unset,
                Some(Some(value)) => Lookup::Set(value.clone()),
            },
            Some(WidgetBody::Controller(controller)) => controller.property(property),
            None => Lookup::Undeclared,
        }
    }

    fn set_property(
        &mut self,
        id: WidgetId,
        property: Property,
        value: PropertyValue,
    ) -> Result<()> {
        let widget = self
            .widgets
            .get_mut(id.0)
            .ok_or(ControlError::UnknownWidget(id))?;
        match &mut widget.body {
            WidgetBody::Container(properties) => match properties.get_mut(&property) {
                Some(slot) => {
                    *slot = Some(value);
                    Ok(())
                }
                None => Err(ControlError::UndeclaredProperty {
                    widget: id,
                    property,
                }),
            },
            WidgetBody::Controller(controller) => {
                if !controller.kind().declares(property) {
                    return Err(ControlError::UndeclaredProperty {
                        widget: id,
                        property,
                    });
                }
                if controller.assign(property, value) {
                    Ok(())
                } else {
                    Err(ControlError::PropertyTypeMismatch {
                        widget: id,
                        property,
                    })
                }
            }
        }
    }

    fn controller(&self, id: WidgetId) -> Option<&Controller> {
        match self.widgets.get(id.0).map(|w| &w.body) {
            Some(WidgetBody::Controller(controller)) => Some(controller),
            _ => None,
        }
    }

    fn controller_mut(&mut self, id: WidgetId) -> Option<&mut Controller> {
        match self.widgets.get_mut(id.0).map(|w| &mut w.body) {
            Some(WidgetBody::Controller(controller)) => Some(controller),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::ControllerKind;

    #[test]
    fn test_container_properties() {
        let mut arena = WidgetArena::new();
        let root = arena.add_container(Some("root"));

        assert_eq!(arena.property(root, Property::Synth), Lookup::Undeclared);
        assert!(arena.set_property(root, Property::Synth, "lead".into()).is_err());

        arena.declare(root, Property::Synth, None).unwrap();
        assert_eq!(arena.property(root, Property::Synth), Lookup::Unset);

        arena
            .set_property(root, Property::Synth, "lead".into())
            .unwrap();
        assert_eq!(
            arena.property(root, Property::Synth),
            Lookup::Set(PropertyValue::Text("lead".into()))
        );
    }

    #[test]
    fn test_controller_properties() {
        let mut arena = WidgetArena::new();
        let knob = arena.add_controller(None, Controller::new(ControllerKind::Base));

        assert_eq!(arena.kind(knob), WidgetKind::Controller(ControllerKind::Base));
        assert!(matches!(
            arena.set_property(knob, Property::Group, "g".into()),
            Err(ControlError::UndeclaredProperty { .. })
        ));
        assert!(matches!(
            arena.set_property(knob, Property::Nrpn, "x".into()),
            Err(ControlError::PropertyTypeMismatch { .. })
        ));
        arena.set_property(knob, Property::Nrpn, 12u16.into()).unwrap();
        assert_eq!(arena.controller(knob).unwrap().nrpn(), Some(12));
    }

    #[test]
    fn test_children_and_lookup() {
        let mut arena = WidgetArena::new();
        let root = arena.add_container(Some("root"));
        let child = arena.add_container(Some("child"));
        arena.add_child(root, child).unwrap();

        assert_eq!(arena.children(root), &[child]);
        assert!(arena.children(WidgetId(99)).is_empty());
        assert_eq!(arena.kind(WidgetId(99)), WidgetKind::Container);
        assert_eq!(arena.find_by_name("child"), Some(child));
        assert!(arena.add_child(root, WidgetId(42)).is_err());
    }
}
