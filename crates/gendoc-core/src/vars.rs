use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::position::Position;

const DEFAULTS: &[(&str, &str)] = &[
    ("lang", "en"),
    ("titleimg", ""),
    ("title", ""),
    ("url", "#"),
    ("version", "stable"),
    ("theme", ""),
    ("rslt", "Search Results"),
    ("home", "Home"),
    ("link", "Permalink to this headline"),
    ("info", "Important"),
    ("hint", "Hint"),
    ("note", "Note"),
    ("also", "See Also"),
    ("todo", "To Do"),
    ("warn", "Warning"),
    ("args", "Arguments"),
    ("rval", "Return Value"),
    ("prev", "Previous"),
    ("next", "Next"),
    ("copy", "unknown"),
];

static DOC_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^/][^>]+)>([^<]*)").expect("valid doc entry regex"));

/// Document-wide settings and UI labels, filled from `<doc>` blocks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vars {
    values: BTreeMap<String, String>,
}

impl Default for Vars {
    fn default() -> Self {
        Self {
            values: DEFAULTS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, or an empty string when it was never set.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Applies every `<key>value` pair of a `<doc>` block body. File paths in
    /// `theme` and `titleimg` are taken relative to the file containing the block.
    pub fn apply_doc_block(&mut self, body: &str, base: &Position) {
        for caps in DOC_ENTRY.captures_iter(body) {
            let key = caps[1].trim().to_string();
            let raw = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            let value = match key.as_str() {
                "theme" if !raw.is_empty() => base.resolve(raw).display().to_string(),
                "titleimg" if !raw.is_empty() => match raw.split_once(' ') {
                    Some((path, alt)) => format!("{} {}", base.resolve(path).display(), alt),
                    None => base.resolve(raw).display().to_string(),
                },
                _ => raw.to_string(),
            };
            debug!(%key, %value, "doc setting");
            self.values.insert(key, value);
        }
    }
}
