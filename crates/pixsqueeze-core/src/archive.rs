//! In-memory zip archives for bundling compressed results.
//!
//! Entries keep insertion order. Each one may carry its own compression
//! method; entries without one use the method chosen at serialization.

use std::io::{Cursor, Read, Write};

use thiserror::Error;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Upper bound on the read buffer reserved from an entry's declared size.
/// Headers are untrusted, so larger entries grow the buffer as they read.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Errors from reading or writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How an entry's bytes are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Store,
    Deflate,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Store => CompressionMethod::Stored,
            Compression::Deflate => CompressionMethod::Deflated,
        }
    }

    fn from_method(method: CompressionMethod) -> Option<Self> {
        match method {
            CompressionMethod::Stored => Some(Compression::Store),
            CompressionMethod::Deflated => Some(Compression::Deflate),
            _ => None,
        }
    }
}

/// Per-entry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Overrides the archive-wide method.
    pub compression: Option<Compression>,
}

/// Settings for [`Archive::serialize`].
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    pub compression: Compression,
    /// Deflate level 0..=9; the codec default when unset.
    pub level: Option<i32>,
    pub comment: Option<String>,
}

/// Progress of a serialization, reported once per entry and once at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveProgress {
    pub percent: f64,
    /// The entry being written, `None` once everything is written.
    pub current_file: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    path: String,
    bytes: Vec<u8>,
    dir: bool,
    options: EntryOptions,
}

#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
    comment: Option<String>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every entry of a serialized archive into memory.
    pub fn open(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut archive = Archive::new();
        if !zip.comment().is_empty() {
            archive.comment = Some(String::from_utf8_lossy(zip.comment()).into_owned());
        }

        for index in 0..zip.len() {
            let mut file = zip.by_index(index)?;
            let path = file.name().to_string();
            let options = EntryOptions {
                compression: Compression::from_method(file.compression()),
            };
            if file.is_dir() {
                archive.push(Entry {
                    path,
                    bytes: Vec::new(),
                    dir: true,
                    options,
                });
                continue;
            }

            let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
            file.read_to_end(&mut bytes)?;
            archive.push(Entry {
                path,
                bytes,
                dir: false,
                options,
            });
        }

        log::debug!("opened archive with {} entries", archive.len());
        Ok(archive)
    }

    /// Add a file, replacing any entry with the same path.
    pub fn add_entry(
        &mut self,
        path: impl Into<String>,
        bytes: Vec<u8>,
        options: EntryOptions,
    ) -> &mut Self {
        self.push(Entry {
            path: path.into(),
            bytes,
            dir: false,
            options,
        });
        self
    }

    /// Add an empty directory entry. A trailing `/` is added if missing.
    pub fn add_directory(&mut self, path: impl Into<String>) -> &mut Self {
        let mut path = path.into();
        if !path.ends_with('/') {
            path.push('/');
        }
        self.push(Entry {
            path,
            bytes: Vec::new(),
            dir: true,
            options: EntryOptions::default(),
        });
        self
    }

    fn push(&mut self, entry: Entry) {
        match self.entries.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Contents of a file entry.
    pub fn entry(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| !e.dir && e.path == path)
            .map(|e| e.bytes.as_slice())
    }

    /// Remove an entry, returning whether it existed.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.path != path);
        self.entries.len() != before
    }

    /// Paths of all entries in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the archive to bytes.
    ///
    /// `on_update` is called before each entry is written and once more with
    /// 100 percent when done.
    pub fn serialize(
        &self,
        options: &SerializeOptions,
        mut on_update: impl FnMut(ArchiveProgress),
    ) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let total = self.entries.len().max(1) as f64;

        for (index, entry) in self.entries.iter().enumerate() {
            on_update(ArchiveProgress {
                percent: index as f64 * 100.0 / total,
                current_file: Some(entry.path.clone()),
            });

            let compression = entry.options.compression.unwrap_or(options.compression);
            let mut file_options = FileOptions::default().compression_method(compression.method());
            if compression == Compression::Deflate {
                file_options = file_options.compression_level(options.level);
            }

            if entry.dir {
                writer.add_directory(entry.path.as_str(), file_options)?;
            } else {
                writer.start_file(entry.path.as_str(), file_options)?;
                writer.write_all(&entry.bytes)?;
            }
        }

        if let Some(comment) = options.comment.as_ref().or(self.comment.as_ref()) {
            writer.set_comment(comment.clone());
        }
        let bytes = writer.finish()?.into_inner();

        on_update(ArchiveProgress {
            percent: 100.0,
            current_file: None,
        });
        log::debug!("serialized {} entries into {} bytes", self.entries.len(), bytes.len());
        Ok(bytes)
    }
}
