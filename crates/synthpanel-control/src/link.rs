//! Linking of controllers that share a protocol coordinate

use crate::widget::{WidgetId, WidgetTree};

/// Append to `id`'s linked list every other Base-family controller in
/// `controllers` with the same channel and NRPN. Returns the number added.
pub fn link<T>(tree: &mut T, id: WidgetId, controllers: &[WidgetId]) -> usize
where
    T: WidgetTree + ?Sized,
{
    let coordinate = match tree.controller(id) {
        Some(controller) if controller.kind().is_base_family() => controller.coordinate(),
        _ => return 0,
    };

    let peers: Vec<WidgetId> = controllers
        .iter()
        .copied()
        .filter(|&other| other != id)
        .filter(|&other| {
            tree.controller(other).is_some_and(|c| {
                c.kind().is_base_family() && c.coordinate() == coordinate
            })
        })
        .collect();

    if let Some(controller) = tree.controller_mut(id) {
        for &peer in &peers {
            controller.link(peer);
        }
    }
    peers.len()
}
