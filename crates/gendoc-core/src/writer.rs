//! The output side of a session. Every tag the scanner recognises becomes
//! one [`Event`] handed to a [`Writer`]; the default writer builds HTML and
//! [`crate::EventWriter`] records the events for other consumers.

use serde::Serialize;

use crate::media::EmbeddedImage;
use crate::tokenizer::Token;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Hint,
    Note,
    Also,
    Todo,
    Warn,
}

impl AlertKind {
    /// Name of the label variable, which is also the tag name.
    pub fn key(self) -> &'static str {
        match self {
            AlertKind::Info => "info",
            AlertKind::Hint => "hint",
            AlertKind::Note => "note",
            AlertKind::Also => "also",
            AlertKind::Todo => "todo",
            AlertKind::Warn => "warn",
        }
    }

    /// Boxes share three looks.
    pub fn css_class(self) -> &'static str {
        match self {
            AlertKind::Hint => "hint",
            AlertKind::Todo | AlertKind::Warn => "warn",
            _ => "info",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlign {
    Inline,
    Left,
    Right,
    Center,
    Wide,
}

impl ImageAlign {
    pub fn as_char(self) -> char {
        match self {
            ImageAlign::Inline => 't',
            ImageAlign::Left => 'l',
            ImageAlign::Right => 'r',
            ImageAlign::Center => 'c',
            ImageAlign::Wide => 'w',
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Wheel,
}

impl MouseButton {
    pub fn css_class(self) -> &'static str {
        match self {
            MouseButton::Left => "mouseleft",
            MouseButton::Right => "mouseright",
            MouseButton::Wheel => "mousewheel",
        }
    }
}

/// How a level 1 heading starts its page.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageStart {
    /// The unlinked first page, without breadcrumbs.
    Welcome,
    /// A regular page with a breadcrumb back to `home`.
    Chapter { home: String, home_label: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Event {
    Heading {
        level: u8,
        id: Option<String>,
        alias: Option<String>,
        name: String,
        page: Option<PageStart>,
    },
    PrevLink {
        target: String,
        title: Option<String>,
        label: String,
    },
    /// Ends a page; `target` is the page that follows, if it has an id.
    NextLink {
        target: Option<String>,
        title: String,
        label: String,
        clear: bool,
    },
    PageEnd,
    ParagraphOpen,
    ParagraphClose,
    BoldOpen,
    BoldClose,
    ItalicOpen,
    ItalicClose,
    UnderlineOpen,
    UnderlineClose,
    StrikeOpen,
    StrikeClose,
    SuperscriptOpen,
    SuperscriptClose,
    SubscriptOpen,
    SubscriptClose,
    QuoteOpen,
    QuoteClose,
    LineBreak,
    HorizontalRule,
    OrderedListOpen,
    OrderedListClose,
    UnorderedListOpen,
    UnorderedListClose,
    ListItemOpen,
    ListItemClose,
    DataListOpen,
    DataListClose,
    DataTopicOpen,
    DataTopicClose,
    DataDescriptionOpen,
    DataDescriptionClose,
    GridOpen,
    GridClose,
    GridRowOpen,
    GridRowClose,
    GridCellOpen {
        wide: bool,
    },
    GridCellClose,
    TableOpen,
    TableClose,
    TableRowOpen,
    TableRowClose,
    TableHeaderOpen {
        wide: bool,
    },
    TableHeaderClose,
    TableCellOpen {
        wide: bool,
        numeric: bool,
    },
    TableCellClose,
    Teletype {
        text: String,
    },
    Preformatted {
        text: String,
    },
    SourceCode {
        lang: Option<String>,
        text: String,
        tokens: Vec<Token>,
    },
    InternalLink {
        name: String,
        target: String,
    },
    ExternalLinkOpen {
        url: String,
    },
    ExternalLinkClose,
    UserInterfaceOpen {
        variant: u8,
    },
    UserInterfaceClose,
    Keyboard {
        key: String,
    },
    MouseButton {
        button: MouseButton,
    },
    Image {
        align: ImageAlign,
        name: String,
        image: EmbeddedImage,
    },
    Figure {
        caption: String,
    },
    AlertBoxOpen {
        kind: AlertKind,
        label: String,
    },
    AlertBoxClose,
    Text {
        text: String,
    },
}

pub trait Writer {
    fn emit(&mut self, event: Event);

    /// Replaces every placeholder left for a forward link with the real id.
    fn resolve_link(&mut self, placeholder: &str, id: &str);

    /// Drops whitespace at both ends of the output so far.
    fn trim(&mut self);

    fn is_empty(&self) -> bool;

    fn ends_with_newline(&self) -> bool;
}
