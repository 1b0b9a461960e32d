//! Lantern Asset - Loading pipeline and typed asset registries
//!
//! An [`AssetLibrary`] holds everything loaded so far (geometries, effects,
//! textures, materials, symbol scenes, raw blobs) together with the
//! [`AssetParser`]s and [`Protocol`]s that fill it. A [`Loader`] drains a
//! queue of uris through protocol fetch and parser dispatch, reporting
//! progress and failures over signals. [`Options`] configure a load and are
//! inherited loader-to-file, sharing processing hooks.

mod effect_parser;
mod gltf_parser;
mod library;
mod loader;
mod material_parser;
mod options;
mod parser;
mod protocol;
mod texture_parser;

pub use effect_parser::EffectParser;
pub use gltf_parser::GltfParser;
pub use library::{AssetLibrary, Blob, TextureAsset};
pub use loader::{LoadError, LoadProgress, Loader};
pub use material_parser::MaterialParser;
pub use options::Options;
pub use parser::AssetParser;
pub use protocol::{FileProtocol, HttpProtocol, MemoryProtocol, Protocol};
pub use texture_parser::TextureParser;
