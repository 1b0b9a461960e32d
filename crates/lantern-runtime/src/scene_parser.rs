//! Scene files as loadable assets

use crate::load_scene_string;
use lantern_asset::{AssetLibrary, AssetParser, Options};
use lantern_core::{LanternError, Result};

/// Parses `.scene.toml` files into library symbols.
///
/// The runtime registers this parser on its library, so scene files can be
/// queued through a [`lantern_asset::Loader`] like any other asset and
/// instantiated later.
pub struct SceneParser;

impl AssetParser for SceneParser {
    fn name(&self) -> &'static str {
        "scene"
    }

    fn parse(
        &self,
        filename: &str,
        bytes: &[u8],
        _options: &Options,
        library: &mut AssetLibrary,
    ) -> Result<()> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| LanternError::ParseError(format!("{filename}: {e}")))?;
        let scene = load_scene_string(content, library)?;
        library.set_symbol(filename, scene);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_asset::MemoryProtocol;
    use std::rc::Rc;

    #[test]
    fn test_scene_files_load_as_symbols() {
        let mut library = AssetLibrary::new();
        library.register_parser("scene.toml", Rc::new(SceneParser));
        library.register_protocol(
            "mem",
            Rc::new(MemoryProtocol::new().with(
                "demo.scene.toml",
                br#"
[scene]
name = "demo"

[[nodes]]
name = "crate"
surface = { geometry = "cube" }
"#
                .to_vec(),
            )),
        );

        let mut loader = library.loader();
        loader.queue("mem://demo.scene.toml");
        assert_eq!(loader.load(&mut library), 0);

        let symbol = library.symbol("mem://demo.scene.toml").unwrap();
        assert!(symbol.node_by_name("crate").is_some());
    }
}
