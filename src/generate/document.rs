use std::path::Path;

use crate::error::GenerationError;

/// Largest document sent inline with a request
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// An uploaded PDF. The bytes are passed through untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| GenerationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(GenerationError::NotPdf(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, bytes)
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, GenerationError> {
        let name = name.into();
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(GenerationError::NotPdf(name.into()));
        }
        if bytes.len() > MAX_INLINE_BYTES {
            return Err(GenerationError::DocumentTooLarge {
                size: bytes.len(),
                limit: MAX_INLINE_BYTES,
            });
        }
        Ok(Self { name, bytes })
    }

    /// File name without its extension, used as the session title
    pub fn title(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}
