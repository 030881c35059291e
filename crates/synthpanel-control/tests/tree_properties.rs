use std::rc::Rc;

use proptest::prelude::*;
use synthpanel_control::walk::discover;
use synthpanel_control::{
    Channels, Controller, ControllerKind, ControllerManager, Lookup, OptionLists, PatchManager,
    Property, PropagationPass, PropertyValue, RecordingOutput, Screens, WidgetArena, WidgetId,
    WidgetTree, DEFAULT_SYNTH,
};

struct NoPatches;

impl PatchManager for NoPatches {
    fn on_load(&self, _: &str) {}
    fn on_save(&self, _: &str) {}
    fn on_send(&self, _: &str) {}
    fn on_receive(&self, _: &str) {}
}

/// Generated node: (parent choice, kind, synth, nrpn)
type NodeShape = (Option<usize>, u8, Option<u8>, Option<u16>);

fn kind_of(code: u8) -> Option<ControllerKind> {
    match code % 6 {
        0 => None,
        1 => Some(ControllerKind::Base),
        2 => Some(ControllerKind::Radio),
        3 => Some(ControllerKind::RadioButton),
        4 => Some(ControllerKind::DropDown),
        _ => Some(ControllerKind::Utility),
    }
}

struct Generated {
    arena: WidgetArena,
    screens: Screens,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

fn build(shapes: &[NodeShape]) -> Generated {
    let mut arena = WidgetArena::new();
    let mut children = vec![Vec::new(); shapes.len()];
    let mut roots = Vec::new();

    for (i, &(parent, code, synth, nrpn)) in shapes.iter().enumerate() {
        let synth = synth.map(|s| format!("s{}", s % 3));
        let id = match kind_of(code) {
            None => {
                let id = arena.add_container(None);
                if let Some(synth) = synth {
                    arena.declare(id, Property::Synth, Some(synth.into())).unwrap();
                }
                if let Some(nrpn) = nrpn {
                    arena.declare(id, Property::Nrpn, Some(nrpn.into())).unwrap();
                }
                id
            }
            Some(kind) => {
                let mut controller = Controller::new(kind);
                if let (true, Some(synth)) = (kind.declares(Property::Synth), synth) {
                    controller = controller.with_synth(synth);
                }
                if let (true, Some(nrpn)) = (kind.declares(Property::Nrpn), nrpn) {
                    controller = controller.with_nrpn(nrpn);
                }
                arena.add_controller(None, controller)
            }
        };
        assert_eq!(id, WidgetId(i));

        match parent {
            Some(p) if i > 0 => {
                let p = p % i;
                arena.add_child(WidgetId(p), id).unwrap();
                children[p].push(i);
            }
            _ => roots.push(i),
        }
    }

    let screens = roots
        .iter()
        .map(|&r| (format!("screen{r}"), WidgetId(r)))
        .collect();
    Generated {
        arena,
        screens,
        children,
        roots,
    }
}

fn node_shapes() -> impl Strategy<Value = Vec<NodeShape>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.9, any::<usize>()),
            any::<u8>(),
            prop::option::of(any::<u8>()),
            prop::option::of(0u16..16),
        ),
        1..40,
    )
}

fn snapshot(arena: &WidgetArena) -> Vec<(Lookup, Lookup)> {
    (0..arena.len())
        .map(|i| {
            let id = WidgetId(i);
            (
                arena.property(id, Property::Synth),
                arena.property(id, Property::Nrpn),
            )
        })
        .collect()
}

fn propagate_all(generated: &mut Generated) {
    for root in generated.screens.roots() {
        for pass in PropagationPass::standard() {
            pass.run(&mut generated.arena, root).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn discovery_is_complete_and_preorder(shapes in node_shapes()) {
        let generated = build(&shapes);

        let mut expected = Vec::new();
        for &root in &generated.roots {
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                if kind_of(shapes[node].1).is_some_and(|k| k.is_tracked()) {
                    expected.push(WidgetId(node));
                }
                stack.extend(generated.children[node].iter().rev());
            }
        }

        prop_assert_eq!(discover(&generated.arena, &generated.screens), expected);
    }

    #[test]
    fn propagation_is_idempotent(shapes in node_shapes()) {
        let mut generated = build(&shapes);
        propagate_all(&mut generated);
        let once = snapshot(&generated.arena);
        propagate_all(&mut generated);
        prop_assert_eq!(snapshot(&generated.arena), once);
    }

    #[test]
    fn explicit_values_are_never_overwritten(shapes in node_shapes()) {
        let mut generated = build(&shapes);
        let before = snapshot(&generated.arena);
        propagate_all(&mut generated);
        let after = snapshot(&generated.arena);

        for (old, new) in before.iter().zip(&after) {
            if old.0.is_set() {
                prop_assert_eq!(&old.0, &new.0);
            }
            if old.1.is_set() {
                prop_assert_eq!(&old.1, &new.1);
            }
        }
    }

    #[test]
    fn default_synth_fills_unset_trees(shapes in node_shapes()) {
        let shapes: Vec<NodeShape> = shapes
            .into_iter()
            .map(|(parent, code, _, nrpn)| (parent, code, None, nrpn))
            .collect();
        let mut generated = build(&shapes);
        propagate_all(&mut generated);

        for i in 0..generated.arena.len() {
            if let Some(controller) = generated.arena.controller(WidgetId(i)) {
                if controller.kind().is_tracked() {
                    prop_assert_eq!(controller.synth(), Some(DEFAULT_SYNTH));
                }
            }
        }
    }

    #[test]
    fn linking_is_symmetric(coordinates in prop::collection::vec((0u8..3, 0u16..3), 1..24)) {
        let mut arena = WidgetArena::new();
        let root = arena.add_container(None);
        let mut ids = Vec::new();
        for &(synth, nrpn) in &coordinates {
            let id = arena.add_controller(
                None,
                Controller::new(ControllerKind::Base)
                    .with_synth(format!("s{synth}"))
                    .with_nrpn(nrpn),
            );
            arena.add_child(root, id).unwrap();
            ids.push(id);
        }
        let screens: Screens = [("main", root)].into_iter().collect();
        let channels: Channels = (0u8..3).map(|c| (format!("s{c}"), c)).collect();

        let mut manager = ControllerManager::new(arena, screens).unwrap();
        manager.set_channels(&channels).unwrap();
        manager
            .initialise_controllers(
                &OptionLists::new(),
                Rc::new(RecordingOutput::new()),
                Rc::new(NoPatches),
            )
            .unwrap();

        let tree = manager.tree();
        for (i, &a) in ids.iter().enumerate() {
            let linked_a = tree.controller(a).unwrap().linked();
            prop_assert!(!linked_a.contains(&a));
            for (j, &b) in ids.iter().enumerate() {
                if i == j {
                    continue;
                }
                let same = coordinates[i] == coordinates[j];
                prop_assert_eq!(linked_a.contains(&b), same);
                prop_assert_eq!(tree.controller(b).unwrap().linked().contains(&a), same);
            }
        }
    }

    #[test]
    fn inbound_routing_never_sends(
        values in prop::collection::vec((0u8..4, 0u16..8, any::<u16>()), 0..64)
    ) {
        let mut arena = WidgetArena::new();
        let root = arena.add_container(None);
        for nrpn in 0..8u16 {
            let id = arena.add_controller(
                None,
                Controller::new(ControllerKind::Base).with_synth("lead").with_nrpn(nrpn),
            );
            arena.add_child(root, id).unwrap();
        }
        let screens: Screens = [("main", root)].into_iter().collect();
        let output = Rc::new(RecordingOutput::new());

        let mut manager = ControllerManager::new(arena, screens).unwrap();
        manager.set_channels(&Channels::from([("lead".to_string(), 1)])).unwrap();
        manager
            .initialise_controllers(&OptionLists::new(), output.clone(), Rc::new(NoPatches))
            .unwrap();

        for &(channel, nrpn, value) in &values {
            manager.set_controller_value(channel, nrpn, value);
        }
        prop_assert!(output.sent().is_empty());
    }
}

#[test]
fn undeclared_container_property_reads_absent() {
    let mut arena = WidgetArena::new();
    let root = arena.add_container(None);
    assert_eq!(arena.property(root, Property::Nrpn), Lookup::Undeclared);
    arena
        .declare(root, Property::Nrpn, Some(PropertyValue::Address(3)))
        .unwrap();
    assert!(arena.property(root, Property::Nrpn).is_set());
}
