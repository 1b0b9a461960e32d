//! Lantern runtime
//!
//! Ties the engine crates together: scene file loading and saving, symbol
//! instantiation, the frame clock and the [`SceneManager`] frame loop.

pub mod clock;
pub mod format;
pub mod instantiate;
pub mod loader;
pub mod saver;
pub mod scene_manager;
pub mod scene_parser;

pub use clock::GameClock;
pub use format::{
    CameraDef, LightDef, LightKind, NodeDef, RendererDef, SceneFile, SceneMetadata, SurfaceDef,
    TransformDef,
};
pub use instantiate::instantiate;
pub use loader::{load_scene, load_scene_string};
pub use saver::{save_scene, save_scene_string};
pub use scene_manager::{FrameEvent, SceneManager};
pub use scene_parser::SceneParser;
