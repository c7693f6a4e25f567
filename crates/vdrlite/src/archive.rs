//! ZIP archive unpacking into in-memory documents.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};

use crate::config::{DocumentFormat, LimitsConfig};
use crate::error::ArchiveError;
use crate::sanitize::redact_name;

/// One supported file pulled out of the archive.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Entry file name with directory components stripped.
    pub name: String,
    pub bytes: Vec<u8>,
    /// Lower-cased extension without the dot.
    pub extension: String,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            bytes,
            extension,
        }
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_extension(&self.extension)
    }
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy)]
pub struct ArchiveExtractor {
    max_archive_bytes: usize,
    max_file_bytes: u64,
}

impl ArchiveExtractor {
    pub fn new(max_archive_bytes: usize, max_file_bytes: u64) -> Self {
        Self {
            max_archive_bytes,
            max_file_bytes,
        }
    }

    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self::new(limits.max_archive_bytes, limits.max_file_bytes)
    }

    /// Unpacks every supported entry in archive enumeration order.
    ///
    /// The archive is spooled into a scratch directory that is removed before
    /// this returns, whether or not extraction succeeded.
    pub fn extract(&self, bytes: &[u8]) -> Result<Vec<RawDocument>, ArchiveError> {
        let _span = tracing::info_span!("archive.extract", size = bytes.len()).entered();

        if bytes.len() > self.max_archive_bytes {
            return Err(ArchiveError::TooLarge {
                size: bytes.len(),
                limit: self.max_archive_bytes,
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("vdrlite-")
            .tempdir()
            .map_err(ArchiveError::Scratch)?;
        let spool_path = scratch.path().join("upload.zip");
        std::fs::write(&spool_path, bytes).map_err(ArchiveError::Scratch)?;
        let file = File::open(&spool_path).map_err(ArchiveError::Scratch)?;

        let mut archive = zip::ZipArchive::new(file)?;
        let mut documents = Vec::new();

        for index in 0..archive.len() {
            // Filter on raw metadata so skipped entries are never decrypted or inflated.
            let (entry_name, declared_size) = {
                let raw = archive.by_index_raw(index)?;
                if raw.is_dir() {
                    continue;
                }
                let entry_name = raw.name().to_string();
                if raw.enclosed_name().is_none() {
                    warn!("Skipping archive entry with unsafe path: {:?}", entry_name);
                    continue;
                }
                (entry_name, raw.size())
            };

            if is_resource_fork(&entry_name) {
                debug!("Skipping resource fork entry: {}", entry_name);
                continue;
            }

            let name = redact_name(&entry_name);
            let extension = extension_of(&name);
            if DocumentFormat::from_extension(&extension).is_none() {
                debug!("Skipping unsupported archive entry: {}", name);
                continue;
            }

            if declared_size > self.max_file_bytes {
                return Err(ArchiveError::EntryTooLarge {
                    name,
                    size: declared_size,
                    limit: self.max_file_bytes,
                });
            }

            let entry = archive.by_index(index)?;
            // Bound the read by the limit rather than the declared size.
            let mut data = Vec::with_capacity(declared_size as usize);
            entry
                .take(self.max_file_bytes + 1)
                .read_to_end(&mut data)
                .map_err(|e| ArchiveError::ReadEntry {
                    name: name.clone(),
                    source: e,
                })?;
            if data.len() as u64 > self.max_file_bytes {
                return Err(ArchiveError::EntryTooLarge {
                    name,
                    size: data.len() as u64,
                    limit: self.max_file_bytes,
                });
            }

            documents.push(RawDocument {
                name,
                bytes: data,
                extension,
            });
        }

        info!(
            "Extracted {} supported documents from {} archive entries",
            documents.len(),
            archive.len()
        );

        Ok(documents)
    }
}

/// macOS Finder adds `__MACOSX/` shadow entries and `._name` AppleDouble files.
fn is_resource_fork(entry_name: &str) -> bool {
    entry_name.starts_with("__MACOSX/")
        || entry_name.contains("/__MACOSX/")
        || redact_name(entry_name).starts_with("._")
}
