//! Lantern Render - Effects, techniques, passes and draw-call assembly
//!
//! The render crate turns surfaces into sorted draw calls:
//! - [`Effect`]s declare techniques, passes, bindings and states, parsed from
//!   TOML effect files.
//! - [`DrawCallPool`] resolves macro signatures against property stores,
//!   compiles program variants, and keeps a sorted draw list with a separate
//!   back-to-front bucket for z-sorted passes.
//! - [`RenderContext`] abstracts the GPU: [`HeadlessContext`] records
//!   commands for tests and tooling, [`WgpuContext`] executes them on a wgpu
//!   device with an offscreen target.

mod context;
mod draw_call;
mod effect;
mod effect_format;
mod frustum;
mod headless;
mod pool;
mod signature;
mod states;
mod wgpu_context;

pub use context::{FrameStats, RenderCommand, RenderContext, RenderResources, ResolvedDrawCall};
pub use draw_call::DrawCall;
pub use effect::{Effect, Pass, Technique};
pub use effect_format::parse_effect;
pub use frustum::{Containment, Frustum};
pub use headless::HeadlessContext;
pub use pool::{DrawCallPool, SurfaceDesc};
pub use signature::ProgramSignature;
pub use states::{Blending, CompareMode, States, TriangleCulling};
pub use wgpu_context::WgpuContext;
