//! Scene validation command

use anyhow::Result;
use lantern_component::Surface;
use lantern_scene::NodeSet;

pub fn run(scene: &str, assets: &[String]) -> Result<()> {
    let manager = super::load_into_manager(scene, assets)?;
    let scene = manager.scene();
    let library = manager.library();

    let nodes = scene.descendants(scene.root());
    println!("Nodes: {}", nodes.len() - 1);

    let mut missing = 0;
    for node in NodeSet::descendants(scene, scene.root())
        .with_component::<Surface>()
        .into_vec()
    {
        let name = scene.name(node)?;
        let surface = scene
            .component::<Surface>(node)
            .ok_or_else(|| anyhow::anyhow!("surface on {name} disappeared"))?;

        if library.geometry(surface.geometry()).is_none() {
            println!("  {name}: unknown geometry '{}'", surface.geometry());
            missing += 1;
        }
        match library.effect(surface.effect()) {
            None => {
                println!("  {name}: unknown effect '{}'", surface.effect());
                missing += 1;
            }
            Some(effect) => {
                if !effect.has_technique(surface.technique()) {
                    println!(
                        "  {name}: effect '{}' has no technique '{}'",
                        surface.effect(),
                        surface.technique()
                    );
                    missing += 1;
                }
            }
        }
    }

    if missing > 0 {
        anyhow::bail!("{missing} unresolved reference(s)");
    }
    println!("OK");
    Ok(())
}
