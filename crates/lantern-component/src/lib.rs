//! Lantern Component - Behaviors attached to scene nodes
//!
//! Components carry per-node state; the systems in this crate walk the scene
//! each frame and publish their results into node property stores, where
//! effect bindings pick them up:
//! - [`Transform`] publishes `model_to_world_matrix`.
//! - [`PerspectiveCamera`] publishes view/projection matrices and the camera
//!   position.
//! - Lights are gathered scene-wide into flat arrays on the root store.
//! - [`Surface`] marks a node drawable; [`Renderer`] collects surfaces into a
//!   draw-call pool and submits frames.

mod camera;
mod light;
mod renderer;
mod surface;
mod transform;

pub use camera::{update_cameras, PerspectiveCamera};
pub use light::{collect_lights, AmbientLight, DirectionalLight, PointLight, SpotLight};
pub use renderer::Renderer;
pub use surface::{attach_surface, Surface};
pub use transform::{update_world_transforms, Transform};
