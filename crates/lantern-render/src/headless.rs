//! A recording context for tests and tooling
//!
//! Resources are handed out as incrementing ids and every submitted command
//! is kept in order, so tests can assert on exactly what a frame did without
//! touching a GPU.

use crate::{RenderCommand, RenderContext, ResolvedDrawCall};
use glam::Vec4;
use lantern_core::Result;
use std::collections::HashMap;

/// An in-memory [`RenderContext`] that records instead of rendering.
#[derive(Default)]
pub struct HeadlessContext {
    next_id: u32,
    programs: HashMap<String, u32>,
    pub commands: Vec<RenderCommand>,
    num_buffers: usize,
    num_textures: usize,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Recorded draw commands only
    pub fn draws(&self) -> Vec<&RenderCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Draw { .. }))
            .collect()
    }

    /// Number of distinct compiled program variants
    pub fn num_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn num_buffers(&self) -> usize {
        self.num_buffers
    }

    pub fn num_textures(&self) -> usize {
        self.num_textures
    }

    /// Drop recorded commands, keeping resources
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl RenderContext for HeadlessContext {
    fn create_vertex_buffer(&mut self, _data: &[f32]) -> u32 {
        self.num_buffers += 1;
        self.next_id()
    }

    fn create_index_buffer(&mut self, _data: &[u32]) -> u32 {
        self.num_buffers += 1;
        self.next_id()
    }

    fn create_texture(&mut self, _width: u32, _height: u32, _rgba: &[u8]) -> u32 {
        self.num_textures += 1;
        self.next_id()
    }

    fn create_program(
        &mut self,
        label: &str,
        vertex_shader: &str,
        fragment_shader: &str,
        defines: &[(String, i32)],
    ) -> Result<u32> {
        let key = format!("{label}|{vertex_shader}|{fragment_shader}|{defines:?}");
        if let Some(id) = self.programs.get(&key) {
            return Ok(*id);
        }
        let id = self.next_id();
        self.programs.insert(key, id);
        Ok(id)
    }

    fn begin_frame(&mut self, clear_color: Vec4) {
        self.commands.push(RenderCommand::BeginFrame { clear_color });
    }

    fn draw(&mut self, call: &ResolvedDrawCall<'_>) {
        self.commands.push(RenderCommand::Draw {
            program: call.program,
            vertex_buffer: call.vertex_buffer,
            index_buffer: call.index_buffer,
            index_count: call.index_count,
            uniforms: call.uniforms.to_vec(),
        });
    }

    fn end_frame(&mut self) {
        self.commands.push(RenderCommand::EndFrame);
    }
}
