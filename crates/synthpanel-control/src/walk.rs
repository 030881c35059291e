//! Depth-first tree walking with downward value threading
//!
//! At each node the transform maps the inherited value to the value handed to
//! every child. Nothing flows back up. Extra arguments are captured by the
//! closure. Input trees must be acyclic.

use crate::error::Result;
use crate::widget::{Screens, WidgetId, WidgetTree};

/// Pre-order walk with read-only access to the tree
pub fn visit<T, V, F>(tree: &T, node: WidgetId, inherited: &V, f: &mut F)
where
    T: WidgetTree + ?Sized,
    F: FnMut(&T, WidgetId, &V) -> V,
{
    let value = f(tree, node, inherited);
    for &child in tree.children(node) {
        visit(tree, child, &value, f);
    }
}

/// Pre-order walk whose transform may mutate the tree
pub fn walk<T, V, F>(tree: &mut T, node: WidgetId, inherited: &V, f: &mut F) -> Result<()>
where
    T: WidgetTree + ?Sized,
    F: FnMut(&mut T, WidgetId, &V) -> Result<V>,
{
    let value = f(tree, node, inherited)?;
    let children = tree.children(node).to_vec();
    for child in children {
        walk(tree, child, &value, f)?;
    }
    Ok(())
}

/// Collect every tracked controller, screen by screen, in pre-order
pub fn discover<T>(tree: &T, screens: &Screens) -> Vec<WidgetId>
where
    T: WidgetTree + ?Sized,
{
    let mut found = Vec::new();
    for root in screens.roots() {
        visit(tree, root, &(), &mut |tree, id, _| {
            if let Some(kind) = tree.kind(id).controller_kind() {
                if kind.is_tracked() {
                    found.push(id);
                }
            }
        });
    }
    found
}
