//! The GPU abstraction
//!
//! Everything above this trait works with plain ids: buffers, textures and
//! programs are u32 handles owned by the context. The draw-call pool resolves
//! bindings into a [`ResolvedDrawCall`] and hands it over; what "draw" means
//! (a wgpu render pass, a recorded command in tests) is the context's
//! business.

use crate::States;
use glam::Vec4;
use lantern_core::Result;
use lantern_data::Value;
use lantern_geometry::Geometry;

/// Per-frame render counters reported by renderers and the scene manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls issued
    pub draw_calls: usize,
    /// Triangles submitted
    pub triangles: usize,
    /// Surfaces skipped by frustum culling
    pub culled: usize,
    /// Draw calls skipped because a required binding was missing
    pub incomplete: usize,
}

impl FrameStats {
    /// Accumulate another renderer's stats
    pub fn merge(&mut self, other: &FrameStats) {
        self.draw_calls += other.draw_calls;
        self.triangles += other.triangles;
        self.culled += other.culled;
        self.incomplete += other.incomplete;
    }
}

/// A fully resolved draw call, ready for submission.
pub struct ResolvedDrawCall<'a> {
    pub program: u32,
    pub vertex_buffer: u32,
    pub index_buffer: u32,
    pub index_count: u32,
    /// Uniform values in shader-input name order
    pub uniforms: &'a [(String, Value)],
    pub states: &'a States,
}

/// Commands a context executes; the headless context records these verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    BeginFrame { clear_color: Vec4 },
    Draw {
        program: u32,
        vertex_buffer: u32,
        index_buffer: u32,
        index_count: u32,
        uniforms: Vec<(String, Value)>,
    },
    EndFrame,
}

/// A GPU backend.
pub trait RenderContext {
    /// Upload interleaved vertex data, returning a buffer id
    fn create_vertex_buffer(&mut self, data: &[f32]) -> u32;

    /// Upload triangle indices, returning a buffer id
    fn create_index_buffer(&mut self, data: &[u32]) -> u32;

    /// Upload an RGBA8 texture, returning a texture id
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> u32;

    /// Compile a program variant. `defines` is the resolved macro list; equal
    /// inputs may return a cached id.
    fn create_program(
        &mut self,
        label: &str,
        vertex_shader: &str,
        fragment_shader: &str,
        defines: &[(String, i32)],
    ) -> Result<u32>;

    /// Start a frame, clearing color and depth
    fn begin_frame(&mut self, clear_color: Vec4);

    /// Submit one draw call
    fn draw(&mut self, call: &ResolvedDrawCall<'_>);

    /// Finish and present/submit the frame
    fn end_frame(&mut self);
}

/// Read access to named render resources.
///
/// Implemented by the asset library; defined here so the render and component
/// crates stay independent of asset loading.
pub trait RenderResources {
    fn effect(&self, name: &str) -> Option<&crate::Effect>;
    fn geometry(&self, name: &str) -> Option<&Geometry>;
}
