//! The frame loop driver

use crate::SceneParser;
use lantern_asset::AssetLibrary;
use lantern_component::{collect_lights, update_cameras, update_world_transforms, Renderer};
use lantern_core::{Result, Signal};
use lantern_render::{FrameStats, RenderContext};
use lantern_scene::{NodeSet, Scene};
use std::rc::Rc;

/// Payload of the frame signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    pub frame: u64,
    /// Total time in seconds
    pub time: f32,
    /// Time since the previous frame in seconds
    pub dt: f32,
}

/// Owns the scene and the asset library and drives them through frames.
///
/// `next_frame` runs the fixed system order: transforms, cameras, lights,
/// then every [`Renderer`] in descending priority. Renderer components are
/// taken off their nodes while rendering so the pool can read the scene it
/// is part of.
pub struct SceneManager {
    scene: Scene,
    library: AssetLibrary,
    frame: u64,
    frame_begin: Signal<FrameEvent>,
    frame_end: Signal<FrameEvent>,
    rendering_begin: Signal<u64>,
    rendering_end: Signal<u64>,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    /// Create a manager with an empty scene and a default library that also
    /// understands `.scene.toml` files.
    pub fn new() -> Self {
        let mut library = AssetLibrary::new();
        library.register_parser("scene.toml", Rc::new(SceneParser));

        Self {
            scene: Scene::new(),
            library,
            frame: 0,
            frame_begin: Signal::new(),
            frame_end: Signal::new(),
            rendering_begin: Signal::new(),
            rendering_end: Signal::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Replace the active scene
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut AssetLibrary {
        &mut self.library
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Signal emitted at the top of every frame
    pub fn frame_begin(&mut self) -> &mut Signal<FrameEvent> {
        &mut self.frame_begin
    }

    /// Signal emitted after every frame completes
    pub fn frame_end(&mut self) -> &mut Signal<FrameEvent> {
        &mut self.frame_end
    }

    /// Signal emitted after scene updates, before the first renderer runs
    pub fn rendering_begin(&mut self) -> &mut Signal<u64> {
        &mut self.rendering_begin
    }

    /// Signal emitted after the last renderer finished
    pub fn rendering_end(&mut self) -> &mut Signal<u64> {
        &mut self.rendering_end
    }

    /// Advance the world one frame and render it.
    pub fn next_frame(
        &mut self,
        time: f32,
        dt: f32,
        ctx: &mut dyn RenderContext,
    ) -> Result<FrameStats> {
        let event = FrameEvent {
            frame: self.frame,
            time,
            dt,
        };
        self.frame_begin.emit(&event);

        let root = self.scene.root();
        self.scene.store_mut(root)?.set("time", time);

        self.library.upload_textures(ctx);

        update_world_transforms(&mut self.scene)?;
        update_cameras(&mut self.scene)?;
        collect_lights(&mut self.scene)?;

        self.rendering_begin.emit(&self.frame);

        let mut renderer_nodes: Vec<_> = NodeSet::descendants(&self.scene, root)
            .with_component::<Renderer>()
            .into_vec()
            .into_iter()
            .map(|node| {
                let priority = self
                    .scene
                    .component::<Renderer>(node)
                    .map(Renderer::priority)
                    .unwrap_or(0.0);
                (node, priority)
            })
            .collect();
        renderer_nodes
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut stats = FrameStats::default();
        for (node, _) in renderer_nodes {
            let Some(mut renderer) = self.scene.take_component::<Renderer>(node) else {
                continue;
            };
            let result = renderer.render(&self.scene, node, &self.library, ctx);
            self.scene.put_component(node, renderer);
            stats.merge(&result?);
        }

        self.rendering_end.emit(&self.frame);
        self.frame_end.emit(&event);
        self.frame += 1;

        Ok(stats)
    }
}
