//! The asset library

use crate::{AssetParser, Loader, Options, Protocol};
use lantern_core::{ContentHash, LanternError, Result};
use lantern_data::{Provider, Value};
use lantern_geometry::Geometry;
use lantern_render::{Effect, RenderContext, RenderResources};
use lantern_scene::Scene;
use std::collections::HashMap;
use std::rc::Rc;

/// A decoded RGBA8 image, uploaded to the GPU on demand.
pub struct TextureAsset {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    context_id: Option<u32>,
}

impl TextureAsset {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            context_id: None,
        }
    }

    /// GPU texture id, once uploaded through a context
    pub fn context_id(&self) -> Option<u32> {
        self.context_id
    }
}

/// Raw bytes kept for files no parser claimed.
pub struct Blob {
    pub bytes: Vec<u8>,
    pub hash: ContentHash,
}

/// Typed registries of loaded assets plus the parsers and protocols that
/// fill them.
///
/// Entries are keyed by the name they were queued under; parsers that know a
/// better name (an effect's declared name, a glTF mesh name) register under
/// that name as well.
pub struct AssetLibrary {
    geometries: HashMap<String, Geometry>,
    effects: HashMap<String, Effect>,
    textures: HashMap<String, TextureAsset>,
    materials: HashMap<String, Provider>,
    symbols: HashMap<String, Scene>,
    blobs: HashMap<String, Blob>,
    parsers: Vec<(String, Rc<dyn AssetParser>)>,
    protocols: HashMap<String, Rc<dyn Protocol>>,
    default_options: Options,
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLibrary {
    /// Create a library with the stock parsers and the file and http
    /// protocols registered.
    pub fn new() -> Self {
        let mut library = Self::empty();

        library.register_protocol("file", Rc::new(crate::FileProtocol));
        let http = Rc::new(crate::HttpProtocol);
        library.register_protocol("http", http.clone());
        library.register_protocol("https", http);

        let effect = Rc::new(crate::EffectParser);
        library.register_parser("effect.toml", effect.clone());
        library.register_parser("effect", effect);
        library.register_parser("material.toml", Rc::new(crate::MaterialParser));
        let texture = Rc::new(crate::TextureParser);
        library.register_parser("png", texture.clone());
        library.register_parser("jpg", texture.clone());
        library.register_parser("jpeg", texture);
        let gltf = Rc::new(crate::GltfParser);
        library.register_parser("gltf", gltf.clone());
        library.register_parser("glb", gltf);

        library
    }

    /// Create a library with no parsers or protocols registered
    pub fn empty() -> Self {
        Self {
            geometries: HashMap::new(),
            effects: HashMap::new(),
            textures: HashMap::new(),
            materials: HashMap::new(),
            symbols: HashMap::new(),
            blobs: HashMap::new(),
            parsers: Vec::new(),
            protocols: HashMap::new(),
            default_options: Options::new(),
        }
    }

    pub fn geometry(&self, name: &str) -> Option<&Geometry> {
        self.geometries.get(name)
    }

    pub fn set_geometry(&mut self, name: impl Into<String>, geometry: Geometry) {
        self.geometries.insert(name.into(), geometry);
    }

    pub fn effect(&self, name: &str) -> Option<&Effect> {
        self.effects.get(name)
    }

    pub fn set_effect(&mut self, name: impl Into<String>, effect: Effect) {
        self.effects.insert(name.into(), effect);
    }

    pub fn texture(&self, name: &str) -> Option<&TextureAsset> {
        self.textures.get(name)
    }

    pub fn set_texture(&mut self, name: impl Into<String>, texture: TextureAsset) {
        self.textures.insert(name.into(), texture);
    }

    pub fn material(&self, name: &str) -> Option<&Provider> {
        self.materials.get(name)
    }

    pub fn set_material(&mut self, name: impl Into<String>, material: Provider) {
        self.materials.insert(name.into(), material);
    }

    pub fn symbol(&self, name: &str) -> Option<&Scene> {
        self.symbols.get(name)
    }

    pub fn set_symbol(&mut self, name: impl Into<String>, symbol: Scene) {
        self.symbols.insert(name.into(), symbol);
    }

    pub fn blob(&self, name: &str) -> Option<&Blob> {
        self.blobs.get(name)
    }

    pub fn set_blob(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let hash = ContentHash::from_bytes(&bytes);
        self.blobs.insert(name.into(), Blob { bytes, hash });
    }

    /// True when any registry holds an entry under `name`; the loader serves
    /// such names from cache instead of re-fetching.
    pub fn contains(&self, name: &str) -> bool {
        self.geometries.contains_key(name)
            || self.effects.contains_key(name)
            || self.textures.contains_key(name)
            || self.materials.contains_key(name)
            || self.symbols.contains_key(name)
            || self.blobs.contains_key(name)
    }

    /// Register a parser for a filename suffix ("png", "effect.toml", ...)
    pub fn register_parser(&mut self, suffix: impl Into<String>, parser: Rc<dyn AssetParser>) {
        self.parsers.push((suffix.into(), parser));
    }

    /// The parser whose suffix matches `filename` best (longest wins)
    pub fn parser_for(&self, filename: &str) -> Option<Rc<dyn AssetParser>> {
        self.parsers
            .iter()
            .filter(|(suffix, _)| filename.ends_with(&format!(".{suffix}")))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, parser)| parser.clone())
    }

    /// Register a protocol for a uri scheme ("file", "http", ...)
    pub fn register_protocol(&mut self, scheme: impl Into<String>, protocol: Rc<dyn Protocol>) {
        self.protocols.insert(scheme.into(), protocol);
    }

    /// The protocol for a uri. Uris without a scheme use "file".
    pub fn protocol_for(&self, uri: &str) -> Result<Rc<dyn Protocol>> {
        let scheme = match uri.split_once("://") {
            Some((scheme, _)) => scheme,
            None => "file",
        };
        self.protocols
            .get(scheme)
            .cloned()
            .ok_or_else(|| LanternError::NoProtocol(scheme.to_string()))
    }

    pub fn default_options(&self) -> &Options {
        &self.default_options
    }

    pub fn set_default_options(&mut self, options: Options) {
        self.default_options = options;
    }

    /// Spawn a loader inheriting the library's default options
    pub fn loader(&self) -> Loader {
        Loader::new(Options::inherit(&self.default_options))
    }

    /// Clone a material, swapping string values that name an uploaded
    /// texture for that texture's context id. References to textures not
    /// uploaded yet stay strings.
    pub fn material_instance(&self, name: &str) -> Option<Provider> {
        let material = self.materials.get(name)?;
        let mut instance = Provider::new(material.name());
        for (property, value) in material.iter() {
            let resolved = match value {
                Value::String(reference) => self
                    .textures
                    .get(reference)
                    .and_then(TextureAsset::context_id)
                    .map(Value::Texture)
                    .unwrap_or_else(|| value.clone()),
                _ => value.clone(),
            };
            instance.set(property, resolved);
        }
        Some(instance)
    }

    /// Upload every not-yet-uploaded texture, returning how many were sent.
    pub fn upload_textures(&mut self, ctx: &mut dyn RenderContext) -> usize {
        let mut uploaded = 0;
        for texture in self.textures.values_mut() {
            if texture.context_id.is_none() {
                texture.context_id =
                    Some(ctx.create_texture(texture.width, texture.height, &texture.pixels));
                uploaded += 1;
            }
        }
        uploaded
    }
}

impl RenderResources for AssetLibrary {
    fn effect(&self, name: &str) -> Option<&Effect> {
        self.effects.get(name)
    }

    fn geometry(&self, name: &str) -> Option<&Geometry> {
        self.geometries.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_registration_hashes_content() {
        let mut library = AssetLibrary::empty();
        library.set_blob("raw.bin", vec![1, 2, 3]);

        let blob = library.blob("raw.bin").unwrap();
        assert_eq!(blob.bytes, vec![1, 2, 3]);
        assert_eq!(blob.hash, ContentHash::from_bytes(&[1, 2, 3]));
        assert!(library.contains("raw.bin"));
    }

    #[test]
    fn test_parser_longest_suffix_wins() {
        let library = AssetLibrary::new();

        let parser = library.parser_for("phong.effect.toml").unwrap();
        assert_eq!(parser.name(), "effect");
        assert!(library.parser_for("notes.txt").is_none());
    }

    #[test]
    fn test_material_instance_resolves_uploaded_textures() {
        use lantern_render::HeadlessContext;

        let mut library = AssetLibrary::empty();
        library.set_texture("wood.png", TextureAsset::new(1, 1, vec![0, 0, 0, 255]));
        library.set_material(
            "wood",
            Provider::new("material").with("diffuse_map", "wood.png"),
        );

        // Not uploaded yet: the reference stays a string.
        let instance = library.material_instance("wood").unwrap();
        assert_eq!(instance.get("diffuse_map"), Some(&Value::from("wood.png")));

        let mut ctx = HeadlessContext::new();
        assert_eq!(library.upload_textures(&mut ctx), 1);
        assert_eq!(library.upload_textures(&mut ctx), 0);

        let id = library.texture("wood.png").unwrap().context_id().unwrap();
        let instance = library.material_instance("wood").unwrap();
        assert_eq!(instance.get("diffuse_map"), Some(&Value::Texture(id)));
    }

    #[test]
    fn test_protocol_selection() {
        let library = AssetLibrary::new();
        assert!(library.protocol_for("textures/wood.png").is_ok());
        assert!(library.protocol_for("https://example.com/wood.png").is_ok());
        assert!(matches!(
            library.protocol_for("ftp://example.com/wood.png"),
            Err(LanternError::NoProtocol(_))
        ));
    }
}
