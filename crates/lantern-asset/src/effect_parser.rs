//! Effect file parsing

use crate::{AssetLibrary, AssetParser, Options};
use lantern_core::{LanternError, Result};
use lantern_render::parse_effect;

/// Parses `.effect.toml` files.
///
/// The effect registers under its declared name and under the filename it
/// was queued as, so both `library.effect("phong")` and the queue name
/// resolve.
pub struct EffectParser;

impl AssetParser for EffectParser {
    fn name(&self) -> &'static str {
        "effect"
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
        let effect = parse_effect(content)?;

        library.set_effect(effect.name().to_string(), effect.clone());
        library.set_effect(filename, effect);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_under_both_names() {
        let mut library = AssetLibrary::empty();
        let content = br#"
name = "phong"

[[techniques]]
name = "default"

[[techniques.passes]]
name = "base"
vertex_shader = "vs"
fragment_shader = "fs"
"#;

        EffectParser
            .parse("fx/phong.effect.toml", content, &Options::new(), &mut library)
            .unwrap();

        assert!(library.effect("phong").is_some());
        assert!(library.effect("fx/phong.effect.toml").is_some());
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut library = AssetLibrary::empty();
        let result = EffectParser.parse("bad.effect.toml", &[0xff], &Options::new(), &mut library);
        assert!(matches!(result, Err(LanternError::ParseError(_))));
    }
}
