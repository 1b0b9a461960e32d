//! Byte-fetching protocols
//!
//! A protocol turns a uri into bytes. The scheme prefix picks the protocol
//! (`file://`, `http://`, `mem://`); uris without a scheme go to the file
//! protocol.

use crate::Options;
use lantern_core::{LanternError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A source of asset bytes addressed by uri.
pub trait Protocol {
    /// Fetch the file behind `uri`. The scheme prefix has not been stripped.
    fn fetch(&self, uri: &str, options: &Options) -> Result<Vec<u8>>;
}

fn strip_scheme<'a>(uri: &'a str, scheme: &str) -> &'a str {
    uri.strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
        .unwrap_or(uri)
}

/// Local filesystem access with include-path search.
#[derive(Debug, Default)]
pub struct FileProtocol;

impl FileProtocol {
    /// Resolve `path` directly, then against each include path in order.
    fn resolve(path: &Path, options: &Options) -> Option<PathBuf> {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        if path.is_absolute() {
            return None;
        }
        options
            .include_paths()
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists())
    }
}

impl Protocol for FileProtocol {
    fn fetch(&self, uri: &str, options: &Options) -> Result<Vec<u8>> {
        let path = Path::new(strip_scheme(uri, "file"));
        let resolved = Self::resolve(path, options).ok_or_else(|| LanternError::ProtocolError {
            uri: uri.to_string(),
            message: "file not found on any include path".to_string(),
        })?;
        Ok(std::fs::read(resolved)?)
    }
}

/// Remote fetch over http/https.
#[derive(Debug, Default)]
pub struct HttpProtocol;

impl Protocol for HttpProtocol {
    fn fetch(&self, uri: &str, _options: &Options) -> Result<Vec<u8>> {
        let mut response = ureq::get(uri)
            .call()
            .map_err(|e| LanternError::ProtocolError {
                uri: uri.to_string(),
                message: e.to_string(),
            })?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| LanternError::ProtocolError {
                uri: uri.to_string(),
                message: e.to_string(),
            })
    }
}

/// An in-memory uri map, for tests and embedded assets.
#[derive(Debug, Default)]
pub struct MemoryProtocol {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file under `name` (without the `mem://` prefix)
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), bytes.into());
        self
    }
}

impl Protocol for MemoryProtocol {
    fn fetch(&self, uri: &str, _options: &Options) -> Result<Vec<u8>> {
        let name = strip_scheme(uri, "mem");
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| LanternError::ProtocolError {
                uri: uri.to_string(),
                message: "not seeded".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_protocol() {
        let protocol = MemoryProtocol::new().with("a.txt", b"hello".to_vec());
        let options = Options::new();

        assert_eq!(protocol.fetch("mem://a.txt", &options).unwrap(), b"hello");
        assert!(protocol.fetch("mem://missing.txt", &options).is_err());
    }

    #[test]
    fn test_file_protocol_searches_include_paths() {
        let dir = std::env::temp_dir().join("lantern-protocol-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("asset.bin"), b"data").unwrap();

        let protocol = FileProtocol;
        let options = Options::new().with_include_path(&dir);

        assert_eq!(protocol.fetch("asset.bin", &options).unwrap(), b"data");
        assert!(protocol.fetch("missing.bin", &options).is_err());
    }
}
