//! Image decoding

use crate::{AssetLibrary, AssetParser, Options, TextureAsset};
use lantern_core::{LanternError, Result};

/// Decodes png/jpeg files into RGBA8 [`TextureAsset`]s.
///
/// Decoding happens here; the GPU upload is deferred to
/// [`AssetLibrary::upload_textures`] so loading never needs a context.
pub struct TextureParser;

impl AssetParser for TextureParser {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn parse(
        &self,
        filename: &str,
        bytes: &[u8],
        _options: &Options,
        library: &mut AssetLibrary,
    ) -> Result<()> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| LanternError::ParseError(format!("{filename}: {e}")))?
            .to_rgba8();

        let (width, height) = image.dimensions();
        library.set_texture(filename, TextureAsset::new(width, height, image.into_raw()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_2x2() -> Vec<u8> {
        let mut bytes = Vec::new();
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decodes_to_rgba8() {
        let mut library = AssetLibrary::empty();
        TextureParser
            .parse("red.png", &png_2x2(), &Options::new(), &mut library)
            .unwrap();

        let texture = library.texture("red.png").unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(texture.pixels.len(), 16);
        assert_eq!(&texture.pixels[..4], &[255, 0, 0, 255]);
        assert_eq!(texture.context_id(), None);
    }

    #[test]
    fn test_garbage_rejected() {
        let mut library = AssetLibrary::empty();
        let result = TextureParser.parse("bad.png", &[0, 1, 2], &Options::new(), &mut library);
        assert!(matches!(result, Err(LanternError::ParseError(_))));
    }
}
