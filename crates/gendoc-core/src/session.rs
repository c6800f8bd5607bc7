//! One document build. A [`Session`] owns the position, table of contents,
//! forward references and validator counters for the whole run and offers
//! one operation per markup construct; the scanner calls them in document
//! order and they emit events to the writer chosen at construction.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::diagnostic::{
    Diagnostic, E_HEADING_DUP, E_HEADING_EMPTY, E_HEADING_LEVEL, E_HEADING_NO_ID, E_IMAGE,
    E_LINK_UNRESOLVED, E_UNCLOSED, W_RULES_MISSING, error_count,
};
use crate::error::GendocError;
use crate::include::ReaderRegistry;
use crate::media::{EmbeddedImage, INLINE_IMAGE_HEIGHT};
use crate::position::Position;
use crate::rules::{RuleRegistry, RuleSet};
use crate::slug::slug;
use crate::toc::{ForwardRefs, PageChain, Toc, WELCOME_PAGE, placeholder, target_of};
use crate::tokenizer::tokenize;
use crate::validate::{Container, Validator, Violation};
use crate::vars::Vars;
use crate::writer::{AlertKind, Event, ImageAlign, MouseButton, PageStart, Writer};

/// What a finished session hands back to the caller.
#[derive(Debug)]
pub struct Build<W> {
    pub writer: W,
    pub toc: Toc,
    pub vars: Vars,
    /// Whether the document has a welcome page.
    pub welcome: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl<W> Build<W> {
    pub fn error_count(&self) -> usize {
        error_count(&self.diagnostics)
    }
}

pub struct Session<W: Writer> {
    pub(crate) writer: W,
    pub(crate) position: Position,
    pub(crate) vars: Vars,
    pub(crate) rules: RuleRegistry,
    pub(crate) readers: ReaderRegistry,
    pub(crate) toc: Toc,
    pub(crate) forward: ForwardRefs,
    pub(crate) validator: Validator,
    pub(crate) pages: PageChain,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Name of the current section, for unclosed container reports.
    pub(crate) section: String,
    pub(crate) has_welcome: bool,
    pub(crate) in_welcome: bool,
    /// Canonical paths of the files currently being included.
    pub(crate) including: Vec<PathBuf>,
}

impl<W: Writer> Session<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: Position::default(),
            vars: Vars::default(),
            rules: RuleRegistry::default(),
            readers: ReaderRegistry::default(),
            toc: Toc::default(),
            forward: ForwardRefs::default(),
            validator: Validator::default(),
            pages: PageChain::default(),
            diagnostics: Vec::new(),
            section: String::new(),
            has_welcome: false,
            in_welcome: false,
            including: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: RuleRegistry) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_readers(mut self, readers: ReaderRegistry) -> Self {
        self.readers = readers;
        self
    }

    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = vars;
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Moves the reporting position, e.g. to the output file before
    /// [`Session::finish`] so end of build diagnostics point there.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        error_count(&self.diagnostics)
    }

    pub fn report_error(&mut self, code: &'static str, message: impl Into<String>) {
        let diag = Diagnostic::error(&self.position, code, message);
        debug!(%diag, "reported");
        self.diagnostics.push(diag);
    }

    pub fn report_warning(&mut self, code: &'static str, message: impl Into<String>) {
        let diag = Diagnostic::warning(&self.position, code, message);
        warn!(file = %diag.file, line = diag.line, "{}", diag.message);
        self.diagnostics.push(diag);
    }

    fn report_violation(&mut self, violation: Violation) {
        self.report_error(violation.code(), violation.to_string());
    }

    /// Replaces the current position and returns the previous one, to be
    /// handed back to [`Session::leave`] once the nested content is done.
    pub(crate) fn enter(&mut self, position: Position) -> Position {
        std::mem::replace(&mut self.position, position)
    }

    pub(crate) fn leave(&mut self, saved: Position) {
        self.position = saved;
    }

    fn open(&mut self, container: Container, event: Event) {
        match self.validator.open(container) {
            Ok(()) => self.writer.emit(event),
            Err(violation) => self.report_violation(violation),
        }
    }

    fn close(&mut self, container: Container, event: Event) {
        match self.validator.close(container) {
            Ok(still_open) => {
                if let Some(violation) = still_open {
                    self.report_violation(violation);
                }
                self.writer.emit(event);
            }
            Err(violation) => self.report_violation(violation),
        }
    }

    /// Reports containers left open in the section that just ended and
    /// starts counting afresh for `next`.
    fn end_section(&mut self, next: &str) {
        for container in self.validator.take_unclosed() {
            let section = if self.section.is_empty() {
                "unknown"
            } else {
                self.section.as_str()
            };
            let message = format!("unclosed {} in section {}", container.description(), section);
            self.report_error(E_UNCLOSED, message);
        }
        self.section = next.to_string();
    }

    pub fn text(&mut self, text: &str) {
        if !text.is_empty() {
            self.writer.emit(Event::Text {
                text: text.to_string(),
            });
        }
    }

    pub(crate) fn writer_ends_with_newline(&self) -> bool {
        self.writer.ends_with_newline()
    }

    pub fn hello_open(&mut self) {
        self.has_welcome = true;
        self.in_welcome = true;
        self.pages.start_with_welcome();
    }

    pub fn hello_close(&mut self) {
        self.in_welcome = false;
    }

    /// A table of contents entry that is not rendered in the body.
    pub fn caption(&mut self, name: &str) {
        let name = name.trim();
        self.end_section(name);
        self.toc.add_caption(name);
    }

    pub fn heading(&mut self, level: u8, name: &str, id: Option<&str>, alias: Option<&str>) {
        if !(1..=6).contains(&level) {
            self.report_error(E_HEADING_LEVEL, "invalid heading level");
            return;
        }
        let name = name.trim();
        self.end_section(name);
        if name.is_empty() {
            self.report_error(E_HEADING_EMPTY, "empty heading name");
            return;
        }
        if self.in_welcome {
            self.writer.emit(Event::Heading {
                level,
                id: None,
                alias: None,
                name: name.to_string(),
                page: (level == 1).then_some(PageStart::Welcome),
            });
            return;
        }

        let mut id = slug(id.filter(|id| !id.trim().is_empty()).unwrap_or(name));
        let alias = alias.map(slug).filter(|alias| !alias.is_empty());
        self.writer.trim();
        if level == 1 {
            if !self.writer.is_empty() {
                self.prev_link();
                self.next_link(&id, name);
                self.pages.advance(&id);
            } else if self.pages.last.is_empty() {
                self.pages.last = id.clone();
            }
        }
        if id.is_empty() {
            self.report_error(E_HEADING_NO_ID, format!("no id for heading ({name})"));
        } else if !self.toc.insert(&id, level, name) {
            self.report_error(E_HEADING_DUP, format!("id for heading isn't unique ({id})"));
            id.clear();
        }
        let name_slug = slug(name);
        if self.forward.contains(&name_slug) {
            self.resolve_link(&name_slug, &id);
        }

        let page = if level == 1 {
            if self.pages.first.is_empty() {
                self.pages.first = id.clone();
            }
            Some(PageStart::Chapter {
                home: self.pages.home_target().to_string(),
                home_label: self.vars.get("home").to_string(),
            })
        } else {
            None
        };
        debug!(level, %id, "heading");
        self.writer.emit(Event::Heading {
            level,
            id: (!id.is_empty()).then_some(id),
            alias,
            name: name.to_string(),
            page,
        });
    }

    fn prev_link(&mut self) {
        if self.pages.prev.is_empty() {
            return;
        }
        let prev = self.pages.prev.as_str();
        let title = if prev == WELCOME_PAGE {
            None
        } else {
            Some(
                self.toc
                    .get(prev)
                    .map(|entry| entry.name.clone())
                    .unwrap_or_default(),
            )
        };
        let event = Event::PrevLink {
            target: target_of(prev).to_string(),
            title,
            label: self.vars.get("prev").to_string(),
        };
        self.writer.emit(event);
    }

    fn next_link(&mut self, id: &str, name: &str) {
        let event = Event::NextLink {
            target: (!id.is_empty()).then(|| id.to_string()),
            title: name.to_string(),
            label: self.vars.get("next").to_string(),
            clear: self.pages.prev.is_empty(),
        };
        self.writer.emit(event);
    }

    /// Links to a heading by name. Targets not seen yet get a placeholder
    /// that is patched when the heading shows up.
    pub fn internal_link(&mut self, name: &str, target: Option<&str>) {
        let link = slug(target.filter(|t| !t.trim().is_empty()).unwrap_or(name));
        if link.is_empty() {
            return;
        }
        let target = if self.toc.contains(&link) {
            link
        } else {
            self.forward.register(&link, name, &self.position);
            placeholder(&link)
        };
        self.writer.emit(Event::InternalLink {
            name: name.to_string(),
            target,
        });
    }

    pub fn resolve_link(&mut self, slug: &str, id: &str) {
        self.forward.take(slug);
        self.writer.resolve_link(&placeholder(slug), id);
    }

    pub fn external_link_open(&mut self, url: &str) {
        self.writer.emit(Event::ExternalLinkOpen {
            url: url.trim().to_string(),
        });
    }

    pub fn link_close(&mut self) {
        self.writer.emit(Event::ExternalLinkClose);
    }

    pub fn paragraph_open(&mut self) {
        self.open(Container::Paragraph, Event::ParagraphOpen);
    }

    pub fn paragraph_close(&mut self) {
        self.close(Container::Paragraph, Event::ParagraphClose);
    }

    pub fn bold_open(&mut self) {
        self.open(Container::Bold, Event::BoldOpen);
    }

    pub fn bold_close(&mut self) {
        self.close(Container::Bold, Event::BoldClose);
    }

    pub fn italic_open(&mut self) {
        self.open(Container::Italic, Event::ItalicOpen);
    }

    pub fn italic_close(&mut self) {
        self.close(Container::Italic, Event::ItalicClose);
    }

    pub fn underline_open(&mut self) {
        self.open(Container::Underline, Event::UnderlineOpen);
    }

    pub fn underline_close(&mut self) {
        self.close(Container::Underline, Event::UnderlineClose);
    }

    pub fn strike_open(&mut self) {
        self.open(Container::Strike, Event::StrikeOpen);
    }

    pub fn strike_close(&mut self) {
        self.close(Container::Strike, Event::StrikeClose);
    }

    pub fn superscript_open(&mut self) {
        self.open(Container::Superscript, Event::SuperscriptOpen);
    }

    pub fn superscript_close(&mut self) {
        self.close(Container::Superscript, Event::SuperscriptClose);
    }

    pub fn subscript_open(&mut self) {
        self.open(Container::Subscript, Event::SubscriptOpen);
    }

    pub fn subscript_close(&mut self) {
        self.close(Container::Subscript, Event::SubscriptClose);
    }

    pub fn quote_open(&mut self) {
        self.open(Container::Quote, Event::QuoteOpen);
    }

    pub fn quote_close(&mut self) {
        self.close(Container::Quote, Event::QuoteClose);
    }

    pub fn line_break(&mut self) {
        self.writer.emit(Event::LineBreak);
    }

    pub fn horizontal_rule(&mut self) {
        self.writer.emit(Event::HorizontalRule);
    }

    pub fn ordered_list_open(&mut self) {
        self.open(Container::OrderedList, Event::OrderedListOpen);
    }

    pub fn ordered_list_close(&mut self) {
        self.close(Container::OrderedList, Event::OrderedListClose);
    }

    pub fn unordered_list_open(&mut self) {
        self.open(Container::UnorderedList, Event::UnorderedListOpen);
    }

    pub fn unordered_list_close(&mut self) {
        self.close(Container::UnorderedList, Event::UnorderedListClose);
    }

    pub fn list_item_open(&mut self) {
        self.open(Container::ListItem, Event::ListItemOpen);
    }

    pub fn list_item_close(&mut self) {
        self.close(Container::ListItem, Event::ListItemClose);
    }

    pub fn data_list_open(&mut self) {
        self.open(Container::DataList, Event::DataListOpen);
    }

    pub fn data_list_close(&mut self) {
        self.close(Container::DataList, Event::DataListClose);
    }

    pub fn data_topic_open(&mut self) {
        self.open(Container::DataTopic, Event::DataTopicOpen);
    }

    pub fn data_topic_close(&mut self) {
        self.close(Container::DataTopic, Event::DataTopicClose);
    }

    pub fn data_description_open(&mut self) {
        self.open(Container::DataDescription, Event::DataDescriptionOpen);
    }

    pub fn data_description_close(&mut self) {
        self.close(Container::DataDescription, Event::DataDescriptionClose);
    }

    pub fn grid_open(&mut self) {
        self.open(Container::Grid, Event::GridOpen);
    }

    pub fn grid_close(&mut self) {
        self.close(Container::Grid, Event::GridClose);
    }

    pub fn grid_row_open(&mut self) {
        self.open(Container::GridRow, Event::GridRowOpen);
    }

    pub fn grid_row_close(&mut self) {
        self.close(Container::GridRow, Event::GridRowClose);
    }

    pub fn grid_cell_open(&mut self, wide: bool) {
        self.open(Container::GridCell, Event::GridCellOpen { wide });
    }

    pub fn grid_cell_close(&mut self) {
        self.close(Container::GridCell, Event::GridCellClose);
    }

    pub fn table_open(&mut self) {
        self.open(Container::Table, Event::TableOpen);
    }

    pub fn table_close(&mut self) {
        self.close(Container::Table, Event::TableClose);
    }

    pub fn table_row_open(&mut self) {
        self.open(Container::TableRow, Event::TableRowOpen);
    }

    pub fn table_row_close(&mut self) {
        self.close(Container::TableRow, Event::TableRowClose);
    }

    pub fn table_header_open(&mut self, wide: bool) {
        self.open(Container::TableHeader, Event::TableHeaderOpen { wide });
    }

    pub fn table_header_close(&mut self) {
        self.close(Container::TableHeader, Event::TableHeaderClose);
    }

    pub fn table_cell_open(&mut self, wide: bool, numeric: bool) {
        self.open(Container::TableCell, Event::TableCellOpen { wide, numeric });
    }

    pub fn table_cell_close(&mut self) {
        self.close(Container::TableCell, Event::TableCellClose);
    }

    pub fn teletype(&mut self, text: &str) {
        self.writer.emit(Event::Teletype {
            text: text.to_string(),
        });
    }

    pub fn preformatted(&mut self, text: &str) {
        self.writer.emit(Event::Preformatted {
            text: text.to_string(),
        });
    }

    /// Tokenizes a code listing with the rules registered for `lang`,
    /// falling back to the generic rules with a warning.
    pub fn source_code(&mut self, text: &str, lang: Option<&str>) {
        let lang = lang.map(str::trim).filter(|lang| !lang.is_empty());
        let rules = lang.and_then(|lang| self.rules.get(lang));
        let tokens = tokenize(text, rules.unwrap_or_else(|| RuleSet::generic()));
        if let Some(lang) = lang.filter(|lang| !self.rules.contains(lang)) {
            self.report_warning(
                W_RULES_MISSING,
                format!("no highlight rules for '{lang}' using generics"),
            );
        }
        self.writer.emit(Event::SourceCode {
            lang: lang.map(str::to_string),
            text: text.to_string(),
            tokens,
        });
    }

    pub fn user_interface_open(&mut self, variant: u8) {
        self.open(
            Container::UserInterface,
            Event::UserInterfaceOpen { variant },
        );
    }

    pub fn user_interface_close(&mut self) {
        self.close(Container::UserInterface, Event::UserInterfaceClose);
    }

    pub fn keyboard(&mut self, key: &str) {
        self.writer.emit(Event::Keyboard {
            key: key.to_string(),
        });
    }

    pub fn mouse_button(&mut self, button: MouseButton) {
        self.writer.emit(Event::MouseButton { button });
    }

    /// Embeds an image file as a data URI. Paths starting with the document
    /// URL are taken relative to the current file.
    pub fn image(&mut self, align: ImageAlign, path: &str) {
        let path = path.trim();
        let url = self.vars.get("url");
        let relative = if url.is_empty() {
            path
        } else {
            path.strip_prefix(url).unwrap_or(path)
        };
        let full = self.position.resolve(relative);
        let image = match EmbeddedImage::load(&full) {
            Ok(image) => image,
            Err(err) => {
                debug!(%err, "image");
                self.report_error(
                    E_IMAGE,
                    format!("unable to read image '{}'", full.display()),
                );
                return;
            }
        };
        let image = if align == ImageAlign::Inline {
            image.fit_height(INLINE_IMAGE_HEIGHT)
        } else {
            image
        };
        let name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.writer.emit(Event::Image { align, name, image });
    }

    pub fn figure(&mut self, caption: &str) {
        self.writer.emit(Event::Figure {
            caption: caption.to_string(),
        });
    }

    pub fn alert_box_open(&mut self, kind: AlertKind) {
        let label = self.vars.get(kind.key()).to_string();
        self.open(Container::AlertBox, Event::AlertBoxOpen { kind, label });
    }

    pub fn alert_box_close(&mut self) {
        self.close(Container::AlertBox, Event::AlertBoxClose);
    }

    /// Applies a `<doc>` block relative to the current file.
    pub fn doc_block(&mut self, body: &str) {
        self.vars.apply_doc_block(body, &self.position);
    }

    /// Runs the end of build checks and hands back the output. Unresolved
    /// links and unclosed containers become diagnostics; a document without
    /// a single heading or caption is a hard error.
    pub fn finish(mut self) -> Result<Build<W>, GendocError> {
        let pending: Vec<_> = self.forward.drain().collect();
        for link in pending {
            self.diagnostics.push(Diagnostic::error(
                &link.position,
                E_LINK_UNRESOLVED,
                format!("unresolved link: {}", link.name),
            ));
        }
        self.end_section("");
        if self.toc.is_empty() {
            return Err(GendocError::EmptyToc {
                diagnostics: self.diagnostics,
            });
        }
        self.writer.trim();
        if !self.writer.is_empty() {
            self.prev_link();
            self.writer.emit(Event::PageEnd);
        }
        debug!(
            entries = self.toc.len(),
            errors = error_count(&self.diagnostics),
            "build finished"
        );
        Ok(Build {
            writer: self.writer,
            toc: self.toc,
            vars: self.vars,
            welcome: self.has_welcome,
            diagnostics: self.diagnostics,
        })
    }
}
