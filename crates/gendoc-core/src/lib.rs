mod api;
mod diagnostic;
mod error;
mod events;
mod html;
mod include;
mod media;
mod position;
mod rules;
mod scanner;
mod session;
mod slug;
mod tokenizer;
mod toc;
mod validate;
mod vars;
mod writer;

pub use api::{ApiEntry, extract as extract_api};
pub use diagnostic::{
    Diagnostic, DiagnosticSeverity, E_ALREADY_OPEN, E_FORMAT, E_HEADING_DUP, E_HEADING_EMPTY,
    E_HEADING_LEVEL, E_HEADING_NO_ID, E_IMAGE, E_IO, E_LINK_UNRESOLVED, E_NOT_OPEN,
    E_OUT_OF_CONTEXT, E_STILL_OPEN, E_UNCLOSED, E_UNTERMINATED, W_RULES_MISSING,
    W_TAG_UNSUPPORTED, error_count,
};
pub use error::GendocError;
pub use events::EventWriter;
pub use html::HtmlWriter;
pub use include::{FormatReader, ReaderRegistry};
pub use media::{EmbeddedImage, INLINE_IMAGE_HEIGHT, sniff as sniff_image};
pub use position::Position;
pub use rules::{RuleRegistry, RuleSet};
pub use session::{Build, Session};
pub use slug::slug;
pub use toc::{ForwardRefs, PageChain, PendingLink, Toc, TocEntry, placeholder};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use validate::{Container, Validator, Violation};
pub use vars::Vars;
pub use writer::{AlertKind, Event, ImageAlign, MouseButton, PageStart, Writer};
