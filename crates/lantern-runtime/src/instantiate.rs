//! Symbol instantiation
//!
//! Symbols (glTF imports, parsed scene files) live in the asset library as
//! standalone scenes. Instantiating moves their nodes, stores and components
//! into a live scene under a chosen parent.

use lantern_component::{
    AmbientLight, DirectionalLight, PerspectiveCamera, PointLight, Renderer, SpotLight, Surface,
    Transform,
};
use lantern_core::{NodeId, Result};
use lantern_scene::{Component, Scene};
use std::collections::HashMap;

/// Merge `symbol` into `target` under `parent`, consuming it.
///
/// Node names are kept where free and suffixed where taken. Returns the ids
/// of the created nodes corresponding to the symbol root's children.
pub fn instantiate(target: &mut Scene, parent: NodeId, mut symbol: Scene) -> Result<Vec<NodeId>> {
    let mut mapping: HashMap<NodeId, NodeId> = HashMap::new();
    mapping.insert(symbol.root(), parent);

    let symbol_root = symbol.root();
    let nodes = symbol.descendants(symbol_root);
    let mut roots = Vec::new();

    for node in nodes {
        if node == symbol_root {
            continue;
        }

        let base = symbol.name(node)?.to_string();
        let mut name = base.clone();
        let mut attempt = 1;
        let id = loop {
            match target.create_node(name.clone()) {
                Ok(id) => break id,
                Err(_) => {
                    name = format!("{base}_{attempt}");
                    attempt += 1;
                }
            }
        };

        let symbol_parent = symbol.parent(node).unwrap_or(symbol_root);
        let new_parent = mapping.get(&symbol_parent).copied().unwrap_or(parent);
        target.add_child(new_parent, id)?;
        if new_parent == parent {
            roots.push(id);
        }
        mapping.insert(node, id);

        target.set_layout(id, symbol.layout(node))?;
        for provider in symbol.store(node)?.providers().cloned().collect::<Vec<_>>() {
            target.store_mut(id)?.add_provider(provider);
        }

        move_component::<Transform>(&mut symbol, node, target, id)?;
        move_component::<PerspectiveCamera>(&mut symbol, node, target, id)?;
        move_component::<AmbientLight>(&mut symbol, node, target, id)?;
        move_component::<DirectionalLight>(&mut symbol, node, target, id)?;
        move_component::<PointLight>(&mut symbol, node, target, id)?;
        move_component::<SpotLight>(&mut symbol, node, target, id)?;
        move_component::<Surface>(&mut symbol, node, target, id)?;
        move_component::<Renderer>(&mut symbol, node, target, id)?;
    }

    Ok(roots)
}

fn move_component<C: Component>(
    symbol: &mut Scene,
    from: NodeId,
    target: &mut Scene,
    to: NodeId,
) -> Result<()> {
    if let Some(component) = symbol.take_component::<C>(from) {
        target.add_component(to, *component)?;
    }
    Ok(())
}
