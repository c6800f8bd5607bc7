use indexmap::IndexMap;
use serde::Serialize;

use crate::position::Position;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TocEntry {
    /// 0 for captions, 1..=6 for headings.
    pub level: u8,
    pub name: String,
}

impl TocEntry {
    pub fn is_caption(&self) -> bool {
        self.level == 0
    }
}

/// Table of contents in document order. Keys are heading ids; captions get
/// synthetic `!n` keys that can never collide with a slug.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Toc {
    entries: IndexMap<String, TocEntry>,
    #[serde(skip)]
    captions: usize,
}

impl Toc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_caption(&mut self, name: &str) -> String {
        let key = format!("!{}", self.captions);
        self.captions += 1;
        self.entries.insert(
            key.clone(),
            TocEntry {
                level: 0,
                name: name.to_string(),
            },
        );
        key
    }

    /// Records a heading. An existing entry is never overwritten; `false`
    /// is returned instead.
    pub fn insert(&mut self, id: &str, level: u8, name: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(
            id.to_string(),
            TocEntry {
                level,
                name: name.to_string(),
            },
        );
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TocEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TocEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Ids of the level 1 headings, one per page.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, entry)| entry.level == 1)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Text inserted in place of a link target that is not known yet.
pub fn placeholder(slug: &str) -> String {
    format!("@GENDOC:{slug}@")
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingLink {
    pub slug: String,
    pub name: String,
    pub position: Position,
}

/// Links to headings that had not been seen when the link was written.
/// Only the first use of each target is remembered, so a missing heading
/// is reported once.
#[derive(Clone, Debug, Default)]
pub struct ForwardRefs {
    pending: IndexMap<String, PendingLink>,
}

impl ForwardRefs {
    pub fn register(&mut self, slug: &str, name: &str, position: &Position) {
        self.pending
            .entry(slug.to_string())
            .or_insert_with(|| PendingLink {
                slug: slug.to_string(),
                name: name.to_string(),
                position: position.clone(),
            });
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.pending.contains_key(slug)
    }

    pub fn take(&mut self, slug: &str) -> Option<PendingLink> {
        self.pending.shift_remove(slug)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = PendingLink> + '_ {
        self.pending.drain(..).map(|(_, link)| link)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Page sequence state for the previous/next navigation buttons.
/// `"_"` stands for the welcome page.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PageChain {
    pub first: String,
    pub last: String,
    pub prev: String,
}

pub const WELCOME_PAGE: &str = "_";

impl PageChain {
    pub fn start_with_welcome(&mut self) {
        self.first = WELCOME_PAGE.to_string();
        self.last = WELCOME_PAGE.to_string();
    }

    pub fn advance(&mut self, id: &str) {
        self.prev = std::mem::replace(&mut self.last, id.to_string());
    }

    /// Radio button suffix for the home label; the welcome page's button is
    /// plain `_`.
    pub fn home_target(&self) -> &str {
        target_of(&self.first)
    }
}

/// Maps a page id to the suffix after `_` in its radio button id.
pub fn target_of(page: &str) -> &str {
    if page == WELCOME_PAGE { "" } else { page }
}
