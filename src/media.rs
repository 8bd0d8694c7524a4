//! Storage for uploaded character and weapon images.
//!
//! Files land under `<root>/<kind>/YYYY/MM/DD/<file name>`; the path stored
//! in the database is the part relative to the root. A name already taken
//! that day gets a `_<n>` suffix, so a stored file is never overwritten.

use chrono::{Datelike, NaiveDate, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CodexError, Result};

/// An image submitted with a form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, guessing the content type from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CodexError::validation(format!("bad file name: {}", path.display())))?
            .to_string();

        Ok(Self {
            content_type: guess_content_type(&file_name).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Reject anything whose content type is not `image/*`
    pub fn validate(&self) -> Result<()> {
        if !self.is_image() {
            return Err(CodexError::validation(format!(
                "'{}' is not an image ({})",
                self.file_name, self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(CodexError::validation(format!("'{}' is empty", self.file_name)));
        }
        Ok(())
    }
}

pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// `"a.tar.png"` -> `("a.tar", ".png")`; no extension gives an empty one
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    }
}

/// Upload directory kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Characters,
    Weapons,
}

impl MediaKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Characters => "characters",
            MediaKind::Weapons => "weapons",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Save under today's date; returns the stored relative path
    pub fn save(&self, kind: MediaKind, upload: &ImageUpload) -> Result<String> {
        self.save_on(kind, upload, Utc::now().date_naive())
    }

    pub fn save_on(&self, kind: MediaKind, upload: &ImageUpload, date: NaiveDate) -> Result<String> {
        upload.validate()?;

        let file_name = Path::new(&upload.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CodexError::validation("image has no file name"))?;

        let dir = format!(
            "{}/{:04}/{:02}/{:02}",
            kind.dir_name(),
            date.year(),
            date.month(),
            date.day()
        );
        fs::create_dir_all(self.root.join(&dir))?;

        let (stem, ext) = split_extension(file_name);
        let mut attempt = 0;
        let (relative, mut file) = loop {
            let candidate = match attempt {
                0 => format!("{}/{}", dir, file_name),
                n => format!("{}/{}_{}{}", dir, stem, n, ext),
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&candidate))
            {
                Ok(file) => break (candidate, file),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => return Err(err.into()),
            }
        };

        if let Err(err) = file.write_all(&upload.bytes) {
            fs::remove_file(self.root.join(&relative)).ok();
            return Err(err.into());
        }

        info!(path = %relative, bytes = upload.bytes.len(), "stored image");
        Ok(relative)
    }
}
