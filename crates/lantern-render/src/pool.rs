//! The draw-call pool
//!
//! The pool owns the draw calls of one renderer. Surfaces are synced in every
//! frame; draw calls are rebuilt only when the surface description or its
//! macro signature changed. Submission sorts opaque calls for state batching
//! (priority, program, geometry) and z-sorted calls back-to-front.

use crate::{
    DrawCall, Effect, FrameStats, Frustum, ProgramSignature, RenderContext, RenderResources,
    ResolvedDrawCall,
};
use glam::Mat4;
use lantern_core::{LanternError, Layout, NodeId, Result};
use lantern_data::Value;
use lantern_geometry::BoundingBox;
use lantern_scene::Scene;
use log::{debug, warn};
use std::collections::HashMap;

/// Technique fallbacks followed before a surface is given up on
const MAX_FALLBACK_ATTEMPTS: usize = 32;

/// Everything the pool needs to know about one drawable surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub node: NodeId,
    /// Geometry asset name
    pub geometry: String,
    /// Effect asset name
    pub effect: String,
    /// Technique within the effect
    pub technique: String,
    pub layout: Layout,
}

struct GpuGeometry {
    vertex_buffer: u32,
    index_buffer: u32,
    index_count: u32,
    triangle_count: usize,
}

struct SurfaceEntry {
    desc: SurfaceDesc,
    signature: ProgramSignature,
    /// Technique actually used after following fallbacks
    technique_used: String,
    draw_calls: Vec<DrawCall>,
    object_bounds: BoundingBox,
}

/// Draw calls for one renderer, with variant caching and sorting.
#[derive(Default)]
pub struct DrawCallPool {
    entries: HashMap<NodeId, SurfaceEntry>,
}

impl DrawCallPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draw calls currently held
    pub fn num_draw_calls(&self) -> usize {
        self.entries.values().map(|e| e.draw_calls.len()).sum()
    }

    /// Number of surfaces currently held
    pub fn num_surfaces(&self) -> usize {
        self.entries.len()
    }

    /// The technique a surface ended up with after fallbacks
    pub fn technique_used(&self, node: NodeId) -> Option<&str> {
        self.entries.get(&node).map(|e| e.technique_used.as_str())
    }

    /// Drop every entry (GPU resources stay with the context)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sync the pool against the surfaces visible to a renderer.
    ///
    /// Surfaces gone from `surfaces` are dropped; new or changed surfaces
    /// get their draw calls (re)built. Surfaces whose effect or geometry is
    /// not in `resources` yet are kept without draw calls and retried on the
    /// next sync, which is how drawables waiting on async asset loads behave.
    pub fn update(
        &mut self,
        scene: &Scene,
        renderer_node: NodeId,
        surfaces: &[SurfaceDesc],
        resources: &dyn RenderResources,
        ctx: &mut dyn RenderContext,
        gpu_geometries: &mut HashMap<u64, (u32, u32)>,
    ) -> Result<()> {
        let root = scene.root_of(renderer_node);
        self.entries
            .retain(|node, _| surfaces.iter().any(|s| s.node == *node));

        for desc in surfaces {
            let target_store = scene.store(desc.node)?;
            let renderer_store = scene.store(renderer_node)?;
            let root_store = scene.store(root)?;

            let Some(effect) = resources.effect(&desc.effect) else {
                debug!("surface {}: effect '{}' not loaded yet", desc.node, desc.effect);
                self.entries.remove(&desc.node);
                continue;
            };
            let Some(geometry) = resources.geometry(&desc.geometry) else {
                debug!(
                    "surface {}: geometry '{}' not loaded yet",
                    desc.node, desc.geometry
                );
                self.entries.remove(&desc.node);
                continue;
            };

            // Pick the technique, following fallbacks while a pass has
            // required bindings that cannot resolve right now.
            let (technique_name, signature) = select_technique(
                effect,
                &desc.technique,
                target_store,
                renderer_store,
                root_store,
            )?;

            let unchanged = self.entries.get(&desc.node).is_some_and(|e| {
                e.desc == *desc && e.signature == signature && e.technique_used == technique_name
            });
            if unchanged {
                continue;
            }

            let technique = effect.technique(&technique_name)?;
            let (vertex_buffer, index_buffer) =
                *gpu_geometries.entry(geometry.id()).or_insert_with(|| {
                    (
                        ctx.create_vertex_buffer(geometry.vertex_data()),
                        ctx.create_index_buffer(geometry.indices()),
                    )
                });
            let gpu = GpuGeometry {
                vertex_buffer,
                index_buffer,
                index_count: geometry.indices().len() as u32,
                triangle_count: geometry.triangle_count(),
            };

            let mut draw_calls = Vec::with_capacity(technique.passes.len());
            for pass in &technique.passes {
                let label = format!("{}/{}/{}", effect.name(), technique.name, pass.name);
                let program = ctx.create_program(
                    &label,
                    &pass.vertex_shader,
                    &pass.fragment_shader,
                    signature.defines(),
                )?;
                draw_calls.push(DrawCall {
                    node: desc.node,
                    pass_name: pass.name.clone(),
                    program,
                    uniform_bindings: pass.uniform_bindings.clone(),
                    states: pass.states.clone(),
                    geometry_id: geometry.id(),
                    vertex_buffer: gpu.vertex_buffer,
                    index_buffer: gpu.index_buffer,
                    index_count: gpu.index_count,
                    triangle_count: gpu.triangle_count,
                });
            }

            self.entries.insert(
                desc.node,
                SurfaceEntry {
                    desc: desc.clone(),
                    signature,
                    technique_used: technique_name,
                    draw_calls,
                    object_bounds: *geometry.bounds(),
                },
            );
        }

        Ok(())
    }

    /// Submit the pool's draw calls.
    ///
    /// Calls are culled against `frustum` (unless their layout opts out),
    /// sorted, resolved against the stores and handed to the context. The
    /// caller brackets this with `begin_frame`/`end_frame`.
    pub fn render(
        &self,
        scene: &Scene,
        renderer_node: NodeId,
        view_matrix: Mat4,
        frustum: Option<&Frustum>,
        ctx: &mut dyn RenderContext,
    ) -> Result<FrameStats> {
        let root = scene.root_of(renderer_node);
        let renderer_store = scene.store(renderer_node)?;
        let root_store = scene.store(root)?;

        let mut stats = FrameStats::default();

        struct Submission<'a> {
            call: &'a DrawCall,
            depth: f32,
        }
        let mut submissions: Vec<Submission<'_>> = Vec::with_capacity(self.num_draw_calls());

        for entry in self.entries.values() {
            let target_store = scene.store(entry.desc.node)?;
            let world = target_store
                .get("model_to_world_matrix")
                .and_then(Value::as_mat4)
                .unwrap_or(Mat4::IDENTITY);
            let world_bounds = entry.object_bounds.transformed(&world);

            if let Some(frustum) = frustum {
                let cullable = !entry.desc.layout.intersects(Layout::IGNORE_CULLING);
                if cullable && !frustum.is_visible(&world_bounds) {
                    stats.culled += 1;
                    continue;
                }
            }

            let depth = view_matrix
                .transform_point3(world_bounds.center())
                .z;
            for call in &entry.draw_calls {
                submissions.push(Submission { call, depth });
            }
        }

        // Opaque calls batch by program then geometry and render first;
        // z-sorted calls render after them, back-to-front (most negative
        // eye-space z first). Each bucket sorts under its own total order.
        let (mut opaque, mut translucent): (Vec<Submission<'_>>, Vec<Submission<'_>>) =
            submissions.into_iter().partition(|s| !s.call.states.z_sorted);

        opaque.sort_by(|a, b| {
            b.call
                .states
                .priority
                .partial_cmp(&a.call.states.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    (a.call.program, a.call.geometry_id)
                        .cmp(&(b.call.program, b.call.geometry_id))
                })
        });
        translucent.sort_by(|a, b| {
            b.call
                .states
                .priority
                .partial_cmp(&a.call.states.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.depth
                        .partial_cmp(&b.depth)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        for submission in opaque.iter().chain(translucent.iter()) {
            let call = submission.call;
            let target_store = scene.store(call.node)?;
            let (uniforms, missing) =
                call.resolve_uniforms(target_store, renderer_store, root_store);

            if !missing.is_empty() {
                warn!(
                    "skipping incomplete draw call {}/{}: missing {}",
                    call.node,
                    call.pass_name,
                    missing.join(", ")
                );
                stats.incomplete += 1;
                continue;
            }

            ctx.draw(&ResolvedDrawCall {
                program: call.program,
                vertex_buffer: call.vertex_buffer,
                index_buffer: call.index_buffer,
                index_count: call.index_count,
                uniforms: &uniforms,
                states: &call.states,
            });
            stats.draw_calls += 1;
            stats.triangles += call.triangle_count;
        }

        Ok(stats)
    }
}

/// Resolve the technique for a surface, following pass fallbacks while any
/// pass of the candidate technique has a required binding that cannot be
/// satisfied yet.
fn select_technique(
    effect: &Effect,
    requested: &str,
    target: &lantern_data::Store,
    renderer: &lantern_data::Store,
    root: &lantern_data::Store,
) -> Result<(String, ProgramSignature)> {
    let mut name = requested.to_string();

    for _ in 0..MAX_FALLBACK_ATTEMPTS {
        let technique = effect.technique(&name)?;

        let mut fallback = None;
        for pass in &technique.passes {
            let probe = DrawCall {
                node: NodeId::from_raw(0),
                pass_name: pass.name.clone(),
                program: 0,
                uniform_bindings: pass.uniform_bindings.clone(),
                states: pass.states.clone(),
                geometry_id: 0,
                vertex_buffer: 0,
                index_buffer: 0,
                index_count: 0,
                triangle_count: 0,
            };
            let (_, missing) = probe.resolve_uniforms(target, renderer, root);
            if !missing.is_empty() {
                fallback = pass.fallback.clone();
                break;
            }
        }

        match fallback {
            Some(next) if next != name => name = next,
            // No fallback left: keep the technique; unresolved calls are
            // skipped at submission and recover once the properties appear.
            _ => break,
        }
    }

    // Signature is computed against the macro bindings of the first pass of
    // the selected technique; passes of one technique share their macros.
    let technique = effect.technique(&name)?;
    let macros = technique
        .passes
        .first()
        .map(|p| &p.macro_bindings)
        .ok_or_else(|| {
            LanternError::EffectError(format!(
                "technique {}/{} has no passes",
                effect.name(),
                name
            ))
        })?;
    let signature = ProgramSignature::resolve(macros, target, renderer, root);

    Ok((name, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_effect, HeadlessContext};
    use lantern_data::Provider;
    use lantern_geometry::cube;

    const EFFECT: &str = r#"
name = "basic"

[uniforms]
u_model_to_world = { property = "model_to_world_matrix" }
u_diffuse_color = { property = "diffuse_color" }

[macros]
HAS_LIGHTS = { property = "directional_light_count", source = "root" }

[[techniques]]
name = "default"

[[techniques.passes]]
name = "base"
vertex_shader = "vs"
fragment_shader = "fs"
"#;

    struct TestResources {
        effect: Effect,
        geometry: lantern_geometry::Geometry,
    }

    impl RenderResources for TestResources {
        fn effect(&self, name: &str) -> Option<&Effect> {
            (name == "basic").then_some(&self.effect)
        }
        fn geometry(&self, name: &str) -> Option<&lantern_geometry::Geometry> {
            (name == "cube").then_some(&self.geometry)
        }
    }

    fn resources() -> TestResources {
        TestResources {
            effect: parse_effect(EFFECT).unwrap(),
            geometry: cube(),
        }
    }

    fn drawable_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let renderer = scene.create_node("camera").unwrap();
        let drawable = scene.create_node("drawable").unwrap();
        scene.add_child(scene.root(), renderer).unwrap();
        scene.add_child(scene.root(), drawable).unwrap();

        let store = scene.store_mut(drawable).unwrap();
        store.add_provider(
            Provider::new("transform").with("model_to_world_matrix", Mat4::IDENTITY),
        );
        store.add_provider(
            Provider::new("material").with("diffuse_color", glam::Vec4::ONE),
        );
        (scene, renderer, drawable)
    }

    fn desc(node: NodeId) -> SurfaceDesc {
        SurfaceDesc {
            node,
            geometry: "cube".to_string(),
            effect: "basic".to_string(),
            technique: "default".to_string(),
            layout: Layout::DEFAULT,
        }
    }

    #[test]
    fn test_update_builds_draw_calls() {
        let (scene, renderer, drawable) = drawable_scene();
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        pool.update(&scene, renderer, &[desc(drawable)], &resources(), &mut ctx, &mut gpu)
            .unwrap();

        assert_eq!(pool.num_draw_calls(), 1);
        assert_eq!(ctx.num_buffers(), 2);
    }

    #[test]
    fn test_update_is_idempotent_when_unchanged() {
        let (scene, renderer, drawable) = drawable_scene();
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();
        let res = resources();

        pool.update(&scene, renderer, &[desc(drawable)], &res, &mut ctx, &mut gpu)
            .unwrap();
        pool.update(&scene, renderer, &[desc(drawable)], &res, &mut ctx, &mut gpu)
            .unwrap();

        assert_eq!(pool.num_draw_calls(), 1);
        assert_eq!(ctx.num_buffers(), 2);
        assert_eq!(ctx.num_programs(), 1);
    }

    #[test]
    fn test_macro_change_recompiles_variant() {
        let (mut scene, renderer, drawable) = drawable_scene();
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();
        let res = resources();

        pool.update(&scene, renderer, &[desc(drawable)], &res, &mut ctx, &mut gpu)
            .unwrap();

        let root = scene.root();
        scene
            .store_mut(root)
            .unwrap()
            .set("directional_light_count", 2i32);
        pool.update(&scene, renderer, &[desc(drawable)], &res, &mut ctx, &mut gpu)
            .unwrap();

        assert_eq!(ctx.num_programs(), 2);
    }

    #[test]
    fn test_removed_surface_dropped() {
        let (scene, renderer, drawable) = drawable_scene();
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();
        let res = resources();

        pool.update(&scene, renderer, &[desc(drawable)], &res, &mut ctx, &mut gpu)
            .unwrap();
        pool.update(&scene, renderer, &[], &res, &mut ctx, &mut gpu)
            .unwrap();

        assert_eq!(pool.num_draw_calls(), 0);
    }

    #[test]
    fn test_missing_effect_retried() {
        let (scene, renderer, drawable) = drawable_scene();
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        struct Empty;
        impl RenderResources for Empty {
            fn effect(&self, _: &str) -> Option<&Effect> {
                None
            }
            fn geometry(&self, _: &str) -> Option<&lantern_geometry::Geometry> {
                None
            }
        }

        pool.update(&scene, renderer, &[desc(drawable)], &Empty, &mut ctx, &mut gpu)
            .unwrap();
        assert_eq!(pool.num_draw_calls(), 0);

        // The asset shows up later; the next sync picks it up.
        pool.update(&scene, renderer, &[desc(drawable)], &resources(), &mut ctx, &mut gpu)
            .unwrap();
        assert_eq!(pool.num_draw_calls(), 1);
    }

    #[test]
    fn test_fallback_technique_selected() {
        const FALLBACK_EFFECT: &str = r#"
name = "basic"

[uniforms]
u_model_to_world = { property = "model_to_world_matrix" }

[[techniques]]
name = "fancy"

[[techniques.passes]]
name = "base"
vertex_shader = "vs-fancy"
fragment_shader = "fs-fancy"
fallback = "default"

[techniques.passes.uniforms]
u_environment_map = { property = "environment_map" }

[[techniques]]
name = "default"

[[techniques.passes]]
name = "base"
vertex_shader = "vs"
fragment_shader = "fs"
"#;
        let (scene, renderer, drawable) = drawable_scene();
        let res = TestResources {
            effect: parse_effect(FALLBACK_EFFECT).unwrap(),
            geometry: cube(),
        };
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        // No environment_map property anywhere: "fancy" cannot complete.
        let mut surface = desc(drawable);
        surface.technique = "fancy".to_string();
        pool.update(&scene, renderer, &[surface], &res, &mut ctx, &mut gpu)
            .unwrap();

        assert_eq!(pool.technique_used(drawable), Some("default"));
        assert_eq!(pool.num_draw_calls(), 1);
    }

    #[test]
    fn test_render_submits_and_counts() {
        let (scene, renderer, drawable) = drawable_scene();
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        pool.update(&scene, renderer, &[desc(drawable)], &resources(), &mut ctx, &mut gpu)
            .unwrap();
        let stats = pool
            .render(&scene, renderer, Mat4::IDENTITY, None, &mut ctx)
            .unwrap();

        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.triangles, 12);
        assert_eq!(ctx.draws().len(), 1);
    }

    #[test]
    fn test_render_skips_incomplete_calls() {
        let (mut scene, renderer, drawable) = drawable_scene();
        scene.store_mut(drawable).unwrap().remove_provider("material");

        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        pool.update(&scene, renderer, &[desc(drawable)], &resources(), &mut ctx, &mut gpu)
            .unwrap();
        let stats = pool
            .render(&scene, renderer, Mat4::IDENTITY, None, &mut ctx)
            .unwrap();

        assert_eq!(stats.draw_calls, 0);
        assert_eq!(stats.incomplete, 1);
    }

    #[test]
    fn test_translucent_renders_after_opaque_back_to_front() {
        const MIXED_EFFECT: &str = r#"
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

[[techniques]]
name = "translucent"

[[techniques.passes]]
name = "blend"
vertex_shader = "vs"
fragment_shader = "fs"

[techniques.passes.states]
blending = "alpha"
z_sorted = true
depth_mask = false
"#;

        fn drawable(scene: &mut Scene, name: &str, z: f32, color: glam::Vec4) -> NodeId {
            let node = scene.create_node(name).unwrap();
            scene.add_child(scene.root(), node).unwrap();
            let store = scene.store_mut(node).unwrap();
            store.add_provider(Provider::new("transform").with(
                "model_to_world_matrix",
                Mat4::from_translation(glam::Vec3::new(0.0, 0.0, z)),
            ));
            store.add_provider(Provider::new("material").with("diffuse_color", color));
            node
        }

        let mut scene = Scene::new();
        let renderer = scene.create_node("camera").unwrap();
        scene.add_child(scene.root(), renderer).unwrap();
        let far = drawable(&mut scene, "far_glass", -5.0, glam::Vec4::X);
        let near = drawable(&mut scene, "near_glass", -1.0, glam::Vec4::Y);
        let solid = drawable(&mut scene, "solid", -3.0, glam::Vec4::Z);

        let res = TestResources {
            effect: parse_effect(MIXED_EFFECT).unwrap(),
            geometry: cube(),
        };
        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        let translucent = |node| {
            let mut d = desc(node);
            d.technique = "translucent".to_string();
            d
        };
        // Both techniques keep the default priority, so the three calls tie.
        pool.update(
            &scene,
            renderer,
            &[translucent(near), desc(solid), translucent(far)],
            &res,
            &mut ctx,
            &mut gpu,
        )
        .unwrap();
        let stats = pool
            .render(&scene, renderer, Mat4::IDENTITY, None, &mut ctx)
            .unwrap();
        assert_eq!(stats.draw_calls, 3);

        let colors: Vec<glam::Vec4> = ctx
            .draws()
            .iter()
            .map(|c| match c {
                crate::RenderCommand::Draw { uniforms, .. } => uniforms
                    .iter()
                    .find(|(name, _)| name == "u_diffuse_color")
                    .and_then(|(_, v)| v.as_vec4())
                    .unwrap(),
                _ => unreachable!(),
            })
            .collect();

        // The opaque call first, then the translucent pair back-to-front.
        assert_eq!(colors, vec![glam::Vec4::Z, glam::Vec4::X, glam::Vec4::Y]);
    }

    #[test]
    fn test_frustum_culling() {
        let (mut scene, renderer, drawable) = drawable_scene();
        // Push the cube far behind the camera.
        scene.store_mut(drawable).unwrap().set(
            "model_to_world_matrix",
            Mat4::from_translation(glam::Vec3::new(0.0, 0.0, 100.0)),
        );

        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 50.0);
        let view = Mat4::look_at_rh(glam::Vec3::ZERO, glam::Vec3::NEG_Z, glam::Vec3::Y);
        let frustum = Frustum::from_matrix(projection * view);

        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        pool.update(&scene, renderer, &[desc(drawable)], &resources(), &mut ctx, &mut gpu)
            .unwrap();
        let stats = pool
            .render(&scene, renderer, view, Some(&frustum), &mut ctx)
            .unwrap();

        assert_eq!(stats.draw_calls, 0);
        assert_eq!(stats.culled, 1);
    }

    #[test]
    fn test_ignore_culling_layout() {
        let (mut scene, renderer, drawable) = drawable_scene();
        scene.store_mut(drawable).unwrap().set(
            "model_to_world_matrix",
            Mat4::from_translation(glam::Vec3::new(0.0, 0.0, 100.0)),
        );

        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 50.0);
        let view = Mat4::look_at_rh(glam::Vec3::ZERO, glam::Vec3::NEG_Z, glam::Vec3::Y);
        let frustum = Frustum::from_matrix(projection * view);

        let mut surface = desc(drawable);
        surface.layout = Layout::DEFAULT | Layout::IGNORE_CULLING;

        let mut pool = DrawCallPool::new();
        let mut ctx = HeadlessContext::new();
        let mut gpu = HashMap::new();

        pool.update(&scene, renderer, &[surface], &resources(), &mut ctx, &mut gpu)
            .unwrap();
        let stats = pool
            .render(&scene, renderer, view, Some(&frustum), &mut ctx)
            .unwrap();

        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.culled, 0);
    }
}
