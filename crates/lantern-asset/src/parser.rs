//! The parser seam

use crate::{AssetLibrary, Options};
use lantern_core::Result;

/// Turns fetched bytes into library entries.
///
/// Parsers are registered on the library by filename suffix; the loader
/// routes each fetched file to the parser with the longest matching suffix
/// and stores files nothing matches as raw blobs.
pub trait AssetParser {
    /// Parser name, for logs and errors
    fn name(&self) -> &'static str;

    /// Parse `bytes` fetched for `filename` into the library.
    fn parse(
        &self,
        filename: &str,
        bytes: &[u8],
        options: &Options,
        library: &mut AssetLibrary,
    ) -> Result<()>;
}
