//! Conversion output artifacts.

use crate::common::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

pub const LATEX_MIME: &str = "application/x-latex";
pub const BIBTEX_MIME: &str = "application/x-bibtex";

/// One named output artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl OutputFile {
    pub fn new(name: &str, mime_type: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data,
        }
    }

    /// File name relative to the output directory
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Contents as text (lossy for binary artifacts)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    pub fn write_bytes<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(&self.data).map_err(|source| Error::Output {
            name: self.name.clone(),
            source,
        })
    }
}

/// The artifacts of one conversion; the LaTeX document comes first.
#[derive(Debug, Clone, Default)]
pub struct ConverterResult {
    files: Vec<OutputFile>,
}

impl ConverterResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: OutputFile) {
        self.files.push(file);
    }

    /// The main LaTeX document
    pub fn master(&self) -> Option<&OutputFile> {
        self.files.first()
    }

    /// Text of the main LaTeX document
    pub fn master_text(&self) -> String {
        self.master().map(OutputFile::text).unwrap_or_default()
    }

    pub fn files(&self) -> &[OutputFile] {
        &self.files
    }

    pub fn get(&self, name: &str) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every artifact into `dir`, creating it if needed.
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for file in &self.files {
            let path = dir.join(&file.name);
            let mut sink = fs::File::create(&path).map_err(|source| Error::Output {
                name: path.display().to_string(),
                source,
            })?;
            file.write_bytes(&mut sink)?;
        }
        Ok(())
    }
}
