//! Persistence of inline binary parts (generated images, audio, documents).

use std::fs;
use std::io;
use std::path::PathBuf;

/// Stores an inline payload and returns where it was written.
pub trait MediaSink {
    fn persist(&mut self, mime_type: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes payloads as `inline-<n>.<ext>` into one directory, creating it on first use.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: usize,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }
}

impl MediaSink for DirectorySink {
    fn persist(&mut self, mime_type: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let dir = fs::canonicalize(&self.dir)?;

        // Never clobber payloads from an earlier turn.
        let path = loop {
            self.written += 1;
            let candidate = dir.join(format!(
                "inline-{}.{}",
                self.written,
                extension_for(mime_type)
            ));
            if !candidate.exists() {
                break candidate;
            }
        };

        fs::write(&path, bytes)?;
        log::debug!("stored {} bytes of {mime_type} at {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// File extension for a MIME type; parameters are ignored and unknown types get `bin`.
/// Prefers the extension spelled like the subtype (`image/jpeg` -> `jpeg`) when one exists.
pub fn extension_for(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some(extensions) = mime_guess::get_mime_extensions_str(&essence) else {
        return "bin";
    };
    let subtype = essence.rsplit('/').next().unwrap_or_default();
    extensions
        .iter()
        .find(|ext| **ext == subtype)
        .or_else(|| extensions.first())
        .copied()
        .unwrap_or("bin")
}
