use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Files served from a base directory.
///
/// Request paths are mapped below the base directory component by component;
/// anything that would climb out of it (`..`, absolute roots, prefixes) is
/// rejected.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// Filesystem path for `url_path` if it names an existing regular file.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        self.map_path(url_path).filter(|p| p.is_file())
    }

    pub fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            _ => "application/octet-stream",
        }
    }

    /// Read `url_path` and return its bytes with a content type.
    ///
    /// # Errors
    ///
    /// `NotFound` when the path escapes the base directory or is not a file,
    /// otherwise the underlying read error.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .resolve(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))?;
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }
}
