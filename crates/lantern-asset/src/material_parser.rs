//! Material file parsing

use crate::{AssetLibrary, AssetParser, Options};
use lantern_core::{LanternError, Result};
use lantern_data::{value_from_toml, Provider};

/// Parses `.material.toml` files into [`Provider`]s.
///
/// ```toml
/// name = "wood"
///
/// [properties]
/// diffuse_color = [0.6, 0.4, 0.2, 1.0]
/// shininess = 32.0
/// diffuse_map = "textures/wood.png"
/// ```
///
/// Float arrays map by length: 2/3/4 become vectors, 16 a matrix, anything
/// else a flat float array. Strings stay strings; texture references are
/// swapped for texture ids when the material is instantiated from the
/// library.
pub struct MaterialParser;

#[derive(serde::Deserialize)]
struct MaterialFile {
    name: Option<String>,
    #[serde(default)]
    properties: std::collections::BTreeMap<String, toml::Value>,
}

impl AssetParser for MaterialParser {
    fn name(&self) -> &'static str {
        "material"
    }

    fn parse(
        &self,
        filename: &str,
        bytes: &[u8],
        options: &Options,
        library: &mut AssetLibrary,
    ) -> Result<()> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| LanternError::ParseError(format!("{filename}: {e}")))?;
        let file: MaterialFile = toml::from_str(content)?;

        let name = file.name.unwrap_or_else(|| filename.to_string());
        let mut material = Provider::new("material");
        for (property, value) in &file.properties {
            material.set(property.clone(), value_from_toml(property, value)?);
        }
        let material = options.process_material(material);

        if name != filename {
            library.set_material(name, material.clone());
        }
        library.set_material(filename, material);
        Ok(())
    }
}
