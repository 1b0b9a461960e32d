//! The renderer component

use crate::Surface;
use glam::{Mat4, Vec4};
use lantern_core::{Layout, NodeId, Result};
use lantern_data::Value;
use lantern_render::{
    DrawCallPool, FrameStats, Frustum, RenderContext, RenderResources, SurfaceDesc,
};
use lantern_scene::{NodeSet, Scene};
use std::collections::HashMap;

/// Renders every visible [`Surface`] in its layout mask.
///
/// Sits on the camera node and reads `view_matrix` and
/// `world_to_screen_matrix` from that node's store; without a camera the
/// frame renders from the origin without culling. Surfaces are re-collected
/// every frame, so nodes and components added or removed since the last
/// frame are picked up without any subscription bookkeeping.
pub struct Renderer {
    background: Vec4,
    layout_mask: Layout,
    enabled: bool,
    /// Renderers run in descending priority order within a frame
    priority: f32,
    pool: DrawCallPool,
    gpu_geometries: HashMap<u64, (u32, u32)>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            layout_mask: Layout::DEFAULT,
            enabled: true,
            priority: 0.0,
            pool: DrawCallPool::new(),
            gpu_geometries: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: Vec4) -> Self {
        self.background = background;
        self
    }

    pub fn with_layout_mask(mut self, mask: Layout) -> Self {
        self.layout_mask = mask;
        self
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn background(&self) -> Vec4 {
        self.background
    }

    pub fn set_background(&mut self, background: Vec4) {
        self.background = background;
    }

    pub fn layout_mask(&self) -> Layout {
        self.layout_mask
    }

    pub fn set_layout_mask(&mut self, mask: Layout) {
        self.layout_mask = mask;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    /// Draw calls currently held by the pool
    pub fn num_draw_calls(&self) -> usize {
        self.pool.num_draw_calls()
    }

    /// Collect surfaces, sync the draw-call pool and submit one frame.
    pub fn render(
        &mut self,
        scene: &Scene,
        renderer_node: NodeId,
        resources: &dyn RenderResources,
        ctx: &mut dyn RenderContext,
    ) -> Result<FrameStats> {
        if !self.enabled {
            return Ok(FrameStats::default());
        }

        let surfaces = self.collect_surfaces(scene);
        self.pool.update(
            scene,
            renderer_node,
            &surfaces,
            resources,
            ctx,
            &mut self.gpu_geometries,
        )?;

        let store = scene.store(renderer_node)?;
        let view = store
            .get("view_matrix")
            .and_then(Value::as_mat4)
            .unwrap_or(Mat4::IDENTITY);
        let frustum = store
            .get("world_to_screen_matrix")
            .and_then(Value::as_mat4)
            .map(Frustum::from_matrix);

        ctx.begin_frame(self.background);
        let stats = self
            .pool
            .render(scene, renderer_node, view, frustum.as_ref(), ctx)?;
        ctx.end_frame();

        Ok(stats)
    }

    fn collect_surfaces(&self, scene: &Scene) -> Vec<SurfaceDesc> {
        NodeSet::descendants(scene, scene.root())
            .with_component::<Surface>()
            .in_layout(self.layout_mask)
            .into_vec()
            .into_iter()
            .filter_map(|node| {
                let surface = scene.component::<Surface>(node)?;
                if !surface.visible() {
                    return None;
                }
                Some(SurfaceDesc {
                    node,
                    geometry: surface.geometry().to_string(),
                    effect: surface.effect().to_string(),
                    technique: surface.technique().to_string(),
                    layout: scene.layout(node),
                })
            })
            .collect()
    }
}

impl lantern_scene::Component for Renderer {
    fn type_name(&self) -> &'static str {
        "Renderer"
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attach_surface, update_world_transforms, Transform};
    use lantern_data::Provider;
    use lantern_geometry::{cube, Geometry};
    use lantern_render::{parse_effect, Effect, HeadlessContext, RenderCommand};

    const EFFECT: &str = r#"
name = "basic"

[uniforms]
u_model_to_world = { property = "model_to_world_matrix" }
u_diffuse_color = { property = "diffuse_color" }

[[techniques]]
name = "default"

[[techniques.passes]]
name = "base"
vertex_shader = "vs"
fragment_shader = "fs"
"#;

    struct TestResources {
        effect: Effect,
        geometry: Geometry,
    }

    impl RenderResources for TestResources {
        fn effect(&self, name: &str) -> Option<&Effect> {
            (name == "basic").then_some(&self.effect)
        }
        fn geometry(&self, name: &str) -> Option<&Geometry> {
            (name == "cube").then_some(&self.geometry)
        }
    }

    fn resources() -> TestResources {
        TestResources {
            effect: parse_effect(EFFECT).unwrap(),
            geometry: cube(),
        }
    }

    fn scene_with_drawable() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let camera = scene.create_node("camera").unwrap();
        let drawable = scene.create_node("drawable").unwrap();
        scene.add_child(scene.root(), camera).unwrap();
        scene.add_child(scene.root(), drawable).unwrap();

        scene.add_component(drawable, Transform::identity()).unwrap();
        attach_surface(
            &mut scene,
            drawable,
            Surface::new(
                "cube",
                Provider::new("phong").with("diffuse_color", Vec4::ONE),
                "basic",
            ),
        )
        .unwrap();
        update_world_transforms(&mut scene).unwrap();

        (scene, camera)
    }

    #[test]
    fn test_renders_visible_surfaces() {
        let (scene, camera) = scene_with_drawable();
        let mut renderer = Renderer::new();
        let mut ctx = HeadlessContext::new();

        let stats = renderer
            .render(&scene, camera, &resources(), &mut ctx)
            .unwrap();

        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.triangles, 12);
        assert!(matches!(
            ctx.commands.first(),
            Some(RenderCommand::BeginFrame { .. })
        ));
        assert!(matches!(ctx.commands.last(), Some(RenderCommand::EndFrame)));
    }

    #[test]
    fn test_invisible_surface_skipped() {
        let (mut scene, camera) = scene_with_drawable();
        let drawable = scene.node_by_name("drawable").unwrap();
        scene
            .component_mut::<Surface>(drawable)
            .unwrap()
            .set_visible(false);

        let mut renderer = Renderer::new();
        let mut ctx = HeadlessContext::new();
        let stats = renderer
            .render(&scene, camera, &resources(), &mut ctx)
            .unwrap();

        assert_eq!(stats.draw_calls, 0);
        assert_eq!(renderer.num_draw_calls(), 0);
    }

    #[test]
    fn test_layout_mask_filters_surfaces() {
        let (mut scene, camera) = scene_with_drawable();
        let drawable = scene.node_by_name("drawable").unwrap();
        scene.set_layout(drawable, Layout::DEBUG).unwrap();

        let mut renderer = Renderer::new(); // DEFAULT mask
        let mut ctx = HeadlessContext::new();
        let stats = renderer
            .render(&scene, camera, &resources(), &mut ctx)
            .unwrap();
        assert_eq!(stats.draw_calls, 0);

        renderer.set_layout_mask(Layout::DEBUG);
        let stats = renderer
            .render(&scene, camera, &resources(), &mut ctx)
            .unwrap();
        assert_eq!(stats.draw_calls, 1);
    }

    #[test]
    fn test_disabled_renderer_is_a_no_op() {
        let (scene, camera) = scene_with_drawable();
        let mut renderer = Renderer::new();
        renderer.set_enabled(false);
        let mut ctx = HeadlessContext::new();

        let stats = renderer
            .render(&scene, camera, &resources(), &mut ctx)
            .unwrap();

        assert_eq!(stats, FrameStats::default());
        assert!(ctx.commands.is_empty());
    }
}
