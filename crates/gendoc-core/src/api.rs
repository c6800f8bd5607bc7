//! API reference generated from documentation comments in source files.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::diagnostic::E_IO;
use crate::include::read_text;
use crate::session::Session;
use crate::writer::Writer;

static BLOCK_DOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ims)/\*\*[^*](.*?)\*/\r?\n(.*?)$").expect("valid block doc comment regex")
});
static BLOCK_DOC_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*\*[ \t]*").expect("valid block doc line regex"));
static PYTHON_DOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ims)##[^#](.*?)^[ \t]*def\b(.*?)$").expect("valid python doc comment regex")
});
static PYTHON_DOC_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*#[ \t]*").expect("valid python doc line regex"));

/// One documented declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiEntry {
    pub declaration: String,
    /// Description lines with the comment markers removed, already escaped.
    pub lines: Vec<String>,
}

/// Finds documented declarations. Python uses `##` comment blocks before a
/// `def`; every other language uses `/** */` blocks directly followed by
/// the declaration line.
pub fn extract(lang: &str, source: &str) -> Vec<ApiEntry> {
    let (block, line_marker) = if lang == "python" {
        (&*PYTHON_DOC, &*PYTHON_DOC_LINE)
    } else {
        (&*BLOCK_DOC, &*BLOCK_DOC_LINE)
    };
    block
        .captures_iter(source)
        .map(|caps| ApiEntry {
            declaration: caps[2].trim().to_string(),
            lines: caps[1]
                .split('\n')
                .map(|line| {
                    let line = line_marker.replace(line, "");
                    html_escape::encode_text(line.trim()).into_owned()
                })
                .filter(|line| !line.is_empty())
                .collect(),
        })
        .collect()
}

impl<W: Writer> Session<W> {
    /// Reads a source file relative to the current file and renders a data
    /// list entry per documented declaration.
    pub fn api(&mut self, lang: &str, path: impl AsRef<Path>) {
        let full = self.position.resolve(path);
        let source = match read_text(&full) {
            Ok(source) => source,
            Err(failure) => {
                let message =
                    format!("unable to read source '{}'{}", full.display(), failure.detail());
                self.report_error(E_IO, message);
                return;
            }
        };
        let entries = extract(lang, &source);
        debug!(path = %full.display(), entries = entries.len(), "api source");
        for entry in &entries {
            self.api_entry(lang, entry);
        }
    }

    fn api_entry(&mut self, lang: &str, entry: &ApiEntry) {
        self.data_list_open();
        self.data_topic_open();
        self.source_code(&entry.declaration, Some(lang));
        self.data_topic_close();
        self.data_description_open();
        let mut table = false;
        for line in &entry.lines {
            if let Some(arg) = line.strip_prefix("@param ") {
                if !table {
                    table = true;
                    self.table_open();
                    self.table_row_open();
                    self.table_header_open(false);
                    let label = self.vars.get("args").to_string();
                    self.text(&label);
                    self.table_header_close();
                    self.table_row_close();
                }
                self.api_cell(arg);
            } else if let Some(value) = line.strip_prefix("@return ") {
                if !table {
                    table = true;
                    self.table_open();
                }
                self.table_row_open();
                self.table_header_open(false);
                let label = self.vars.get("rval").to_string();
                self.text(&label);
                self.table_header_close();
                self.table_row_close();
                self.api_cell(value);
            } else if !table {
                self.text(&format!("{line} "));
            }
        }
        if table {
            self.table_close();
        }
        self.data_description_close();
        self.data_list_close();
        self.line_break();
    }

    fn api_cell(&mut self, text: &str) {
        self.table_row_open();
        self.table_cell_open(false, false);
        self.text(text.trim());
        self.table_cell_close();
        self.table_row_close();
    }
}
