//! CLI command implementations

pub mod effect;
pub mod render;
pub mod snapshot;
pub mod validate;

use anyhow::{Context, Result};
use lantern_asset::LoadError;
use lantern_runtime::SceneManager;
use std::cell::RefCell;
use std::rc::Rc;

/// Build a manager with built-in geometries, queue the given asset files,
/// then load the scene into it.
pub fn load_into_manager(scene: &str, assets: &[String]) -> Result<SceneManager> {
    let mut manager = SceneManager::new();

    let library = manager.library_mut();
    library.set_geometry("cube", lantern_geometry::cube());
    library.set_geometry("quad", lantern_geometry::quad());
    library.set_geometry("sphere", lantern_geometry::sphere(32));

    let mut loader = library.loader();
    for asset in assets {
        loader.queue(asset);
    }

    let errors: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    loader.error().connect(move |e: &LoadError| {
        sink.borrow_mut()
            .push(format!("{}: {}", e.filename, e.message));
    });

    let failed = loader.load(manager.library_mut());
    for error in errors.borrow().iter() {
        eprintln!("error: {error}");
    }
    if failed > 0 {
        anyhow::bail!("{failed} asset(s) failed to load");
    }

    let loaded = lantern_runtime::load_scene(scene, manager.library())
        .with_context(|| format!("failed to load {scene}"))?;
    manager.set_scene(loaded);
    Ok(manager)
}
