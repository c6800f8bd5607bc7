use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagnostic::{Diagnostic, E_FORMAT, E_IO};
use crate::error::GendocError;
use crate::position::Position;
use crate::session::Session;
use crate::writer::Writer;

/// Converts a document in some other format into gendoc markup.
pub trait FormatReader {
    fn read(&self, source: &str) -> Result<String, GendocError>;
}

impl<F> FormatReader for F
where
    F: Fn(&str) -> Result<String, GendocError>,
{
    fn read(&self, source: &str) -> Result<String, GendocError> {
        self(source)
    }
}

/// Format readers by lower case file extension. `xml` and files without an
/// extension are gendoc markup and never go through a reader.
#[derive(Default)]
pub struct ReaderRegistry {
    readers: HashMap<String, Box<dyn FormatReader>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, extension: &str, reader: impl FormatReader + 'static) {
        self.readers
            .insert(extension.to_ascii_lowercase(), Box::new(reader));
    }

    pub fn get(&self, extension: &str) -> Option<&dyn FormatReader> {
        self.readers.get(extension).map(|reader| reader.as_ref())
    }
}

impl fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.readers.keys()).finish()
    }
}

/// Why a source file could not be taken as text.
#[derive(Debug)]
pub(crate) enum ReadFailure {
    Unreadable,
    NotUtf8 { valid_up_to: usize },
}

impl ReadFailure {
    /// Suffix for the diagnostic message, empty for plain read failures.
    pub(crate) fn detail(&self) -> String {
        match self {
            ReadFailure::Unreadable => String::new(),
            ReadFailure::NotUtf8 { valid_up_to } => {
                format!(", invalid UTF-8 after byte {valid_up_to}")
            }
        }
    }
}

/// Reads a non-empty UTF-8 text file.
pub(crate) fn read_text(path: &Path) -> Result<String, ReadFailure> {
    let bytes = fs::read(path).map_err(|err| {
        debug!(path = %path.display(), %err, "read");
        ReadFailure::Unreadable
    })?;
    if bytes.is_empty() {
        return Err(ReadFailure::Unreadable);
    }
    String::from_utf8(bytes).map_err(|err| ReadFailure::NotUtf8 {
        valid_up_to: err.utf8_error().valid_up_to(),
    })
}

impl<W: Writer> Session<W> {
    /// Reads `path`, relative to the current file, and parses it in place.
    /// A file that is already being included is skipped with an error.
    pub fn include(&mut self, path: impl AsRef<Path>) {
        let full = self.position.resolve(path);
        let key = fs::canonicalize(&full).unwrap_or_else(|_| full.clone());
        if self.including.contains(&key) {
            self.report_error(E_IO, format!("recursive include '{}'", full.display()));
            return;
        }
        let source = match read_text(&full) {
            Ok(source) => source,
            Err(failure) => {
                self.diagnostics.push(Diagnostic::error(
                    &Position::new(&full, 0),
                    E_IO,
                    format!("unable to read{}", failure.detail()),
                ));
                return;
            }
        };
        self.including.push(key);
        let saved = self.enter(Position::new(full.clone(), 1));
        if let Some(source) = self.convert(&full, source) {
            self.parse(&source);
        }
        self.leave(saved);
        self.including.pop();
    }

    /// Parses markup that did not come from a file on disk, reporting
    /// positions against `file`.
    pub fn include_source(&mut self, file: impl Into<PathBuf>, source: &str) {
        let saved = self.enter(Position::new(file, 1));
        self.parse(source);
        self.leave(saved);
    }

    fn convert(&mut self, path: &Path, source: String) -> Option<String> {
        let extension = match path.extension().and_then(|ext| ext.to_str()) {
            None => return Some(source),
            Some(ext) if ext.eq_ignore_ascii_case("xml") => return Some(source),
            Some(ext) => ext.to_ascii_lowercase(),
        };
        let converted = self
            .readers
            .get(&extension)
            .map(|reader| reader.read(&source));
        match converted {
            Some(Ok(markup)) => Some(markup),
            Some(Err(err)) => {
                self.report_error(E_FORMAT, err.to_string());
                None
            }
            None => {
                self.report_error(
                    E_FORMAT,
                    format!("there is no gendoc_{extension} plugin to read this format."),
                );
                Some(source)
            }
        }
    }
}
