use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::error::GendocError;

const GENERIC_COMMENTS: &[&str] = &[r"//.*?$", r"/\*.*?\*/", r"#.*?$"];
const GENERIC_OPERATORS: &[&str] = &[r"[:=<>+\-*/%&^|!][:=]?"];
const GENERIC_NUMBERS: &[&str] = &[r"[0-9][0-9bx]?[0-9.a-fp]*"];
const GENERIC_STRINGS: &[&str] = &["\"", "'", "`"];
const GENERIC_BRACKETS: &[&str] = &["[", "]", "{", "}", ",", ";", ":"];
const GENERIC_TYPES: &[&str] = &[
    "char", "int", "float", "true", "false", "nil", "null", "nullptr", "none", "public", "static",
    "struct", "enum", "typedef", "from", "with", "new", "delete", "void",
];
const GENERIC_KEYWORDS: &[&str] = &[
    "import", "def", "if", "then", "elseif", "else", "endif", "elif", "switch", "case", "loop",
    "until", "for", "foreach", "as", "is", "in", "or", "and", "while", "do", "break", "continue",
    "function", "return", "try", "catch", "volatile", "class", "sizeof",
];

static GENERIC: Lazy<RuleSet> = Lazy::new(|| {
    let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    RuleSet::from_lists([
        owned(GENERIC_COMMENTS),
        Vec::new(),
        owned(GENERIC_OPERATORS),
        owned(GENERIC_NUMBERS),
        owned(GENERIC_STRINGS),
        owned(GENERIC_BRACKETS),
        owned(GENERIC_TYPES),
        owned(GENERIC_KEYWORDS),
    ])
    .expect("valid generic highlight rules")
});

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment regex"));

/// Patterns and word lists driving the tokenizer for one language.
#[derive(Clone, Debug)]
pub struct RuleSet {
    pub comments: Vec<Regex>,
    pub pseudo: Vec<Regex>,
    pub operators: Vec<Regex>,
    pub numbers: Vec<Regex>,
    pub strings: Vec<String>,
    pub brackets: Vec<String>,
    pub types: Vec<String>,
    pub keywords: Vec<String>,
}

impl RuleSet {
    /// Built-in rules used when a block names no language or an unknown one.
    pub fn generic() -> &'static RuleSet {
        &GENERIC
    }

    /// Builds a rule set from the eight lists in their fixed order: comments,
    /// pseudo instructions, operators, numbers, string delimiters, brackets,
    /// types and keywords.
    pub fn from_lists(lists: [Vec<String>; 8]) -> Result<Self, GendocError> {
        let [comments, pseudo, operators, numbers, strings, brackets, types, keywords] = lists;
        Ok(Self {
            comments: compile_all(&comments)?,
            pseudo: compile_all(&pseudo)?,
            operators: compile_all(&operators)?,
            numbers: compile_all(&numbers)?,
            strings: strings.into_iter().filter(|s| !s.is_empty()).collect(),
            brackets: brackets.into_iter().filter(|s| !s.is_empty()).collect(),
            types: types.iter().map(|s| s.to_lowercase()).collect(),
            keywords: keywords.iter().map(|s| s.to_lowercase()).collect(),
        })
    }

    /// Parses a rule file: a JSON array of eight string arrays. `/* */`
    /// comments are allowed and backslashes are taken literally, so regex
    /// escapes need no doubling; only `\"` keeps its JSON meaning.
    pub fn parse(text: &str) -> Result<Self, GendocError> {
        let stripped = BLOCK_COMMENT.replace_all(text, "");
        let escaped = stripped.replace('\\', "\\\\").replace("\\\\\"", "\\\"");
        let lists: Vec<Vec<String>> = serde_json::from_str(&escaped)?;
        let mut lists = lists.into_iter();
        let mut next = || lists.next().unwrap_or_default();
        Self::from_lists([
            next(),
            next(),
            next(),
            next(),
            next(),
            next(),
            next(),
            next(),
        ])
    }

    /// Reads and parses one rule file. Parse failures name the file.
    pub fn load(path: &Path) -> Result<Self, GendocError> {
        let text = fs::read_to_string(path).map_err(|err| GendocError::io(path, err))?;
        Self::parse(&text).map_err(|err| GendocError::RuleSet {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn is_bracket(&self, ch: char) -> bool {
        self.brackets
            .iter()
            .any(|b| b.chars().next() == Some(ch) && b.len() == ch.len_utf8())
    }

    pub fn is_type(&self, word: &str) -> bool {
        self.types.iter().any(|t| *t == word)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| *k == word)
    }
}

/// Anchors a pattern at the cursor, case-insensitive with `.` spanning lines
/// and `^`/`$` matching at line boundaries.
fn compile(pattern: &str) -> Result<Regex, GendocError> {
    let regex = RegexBuilder::new(&format!(r"\A(?:{pattern})"))
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(true)
        .crlf(true)
        .build()?;
    Ok(regex)
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, GendocError> {
    patterns.iter().map(|p| compile(p)).collect()
}

/// Rule sets by language tag.
#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    sets: HashMap<String, RuleSet>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lang: impl Into<String>, rules: RuleSet) {
        self.sets.insert(lang.into(), rules);
    }

    pub fn get(&self, lang: &str) -> Option<&RuleSet> {
        self.sets.get(lang)
    }

    pub fn contains(&self, lang: &str) -> bool {
        self.sets.contains_key(lang)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Loads every `hl_<lang>.json` file in `dir`. Files that fail to parse
    /// are skipped with a warning; an unreadable directory is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, GendocError> {
        let mut registry = Self::new();
        let entries = fs::read_dir(dir).map_err(|err| GendocError::io(dir, err))?;
        for entry in entries {
            let path = entry.map_err(|err| GendocError::io(dir, err))?.path();
            let Some(lang) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix("hl_"))
                .and_then(|name| name.strip_suffix(".json"))
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
            else {
                continue;
            };
            match RuleSet::load(&path) {
                Ok(rules) => {
                    debug!(%lang, "loaded highlight rules");
                    registry.insert(lang, rules);
                }
                Err(err) => warn!(%err, "skipping highlight rules"),
            }
        }
        Ok(registry)
    }
}
