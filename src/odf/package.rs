//! ODF package (ZIP archive) access.
//!
//! Only text document packages are accepted; the `mimetype` entry decides.

use super::constants::{MIMETYPE, is_text_mime_type};
use crate::common::{Error, Result};
use std::cell::RefCell;
use std::io::{Read, Seek};

/// Most bytes reserved up front for one entry; larger entries grow on read.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// Buffer capacity for an entry whose header declares `size` bytes
fn initial_capacity(size: u64) -> usize {
    size.min(PREALLOC_LIMIT) as usize
}

/// An opened ODF text package
pub struct Package<R> {
    archive: RefCell<zip::ZipArchive<R>>,
    mimetype: String,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package, rejecting archives that are not ODF text documents.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| Error::InvalidFormat(format!("Not a ZIP archive: {}", e)))?;
        let mimetype = {
            let mut entry = archive
                .by_name(MIMETYPE)
                .map_err(|_| Error::InvalidFormat("Package has no mimetype entry".to_string()))?;
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            text.trim().to_string()
        };
        if !is_text_mime_type(&mimetype) {
            return Err(Error::InvalidFormat(format!(
                "Not an OpenDocument text package: {}",
                mimetype
            )));
        }
        log::debug!("Opened {} package with {} entries", mimetype, archive.len());
        Ok(Self {
            archive: RefCell::new(archive),
            mimetype,
        })
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// Bytes of a package entry
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut entry = archive
            .by_name(path)
            .map_err(|_| Error::ComponentNotFound(path.to_string()))?;
        let mut bytes = Vec::with_capacity(initial_capacity(entry.size()));
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Like [`read`](Self::read), but a missing entry is `None`.
    pub fn read_optional(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(Error::ComponentNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Paths of every file entry; directories are left out.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect()
    }
}
