//! Single pass over the markup. At every `<` the ordered tag table below is
//! consulted; everything else is literal text with whitespace normalised.

use tracing::trace;

use crate::diagnostic::{E_UNTERMINATED, W_TAG_UNSUPPORTED};
use crate::session::Session;
use crate::writer::{AlertKind, ImageAlign, MouseButton, Writer};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Tag {
    Comment,
    Doc,
    HelloOpen,
    HelloClose,
    Heading(u8),
    Caption,
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
    GridCellOpen { wide: bool },
    GridCellClose,
    TableOpen,
    TableClose,
    TableRowOpen,
    TableRowClose,
    TableHeaderOpen { wide: bool },
    TableHeaderClose,
    TableCellOpen { wide: bool, numeric: bool },
    TableCellClose,
    InternalLink,
    ExternalLink,
    LinkClose,
    Teletype,
    Preformatted,
    SourceCode,
    UserInterfaceOpen(u8),
    UserInterfaceClose,
    Keyboard,
    Mouse(MouseButton),
    Image(ImageAlign),
    Figure,
    AlertOpen(AlertKind),
    AlertClose,
    Include,
    Api,
}

/// Literal markers in match order. Tags are case sensitive (`<td>` and
/// `<tD>` differ) and a marker listed earlier wins, so attributed forms
/// like `<a ` never shadow `<a>` and vice versa.
const TAGS: &[(&str, Tag)] = &[
    ("<!--", Tag::Comment),
    ("<doc>", Tag::Doc),
    ("<hello>", Tag::HelloOpen),
    ("</hello>", Tag::HelloClose),
    ("<h1", Tag::Heading(1)),
    ("<h2", Tag::Heading(2)),
    ("<h3", Tag::Heading(3)),
    ("<h4", Tag::Heading(4)),
    ("<h5", Tag::Heading(5)),
    ("<h6", Tag::Heading(6)),
    ("<cap>", Tag::Caption),
    ("<p>", Tag::ParagraphOpen),
    ("</p>", Tag::ParagraphClose),
    ("<b>", Tag::BoldOpen),
    ("</b>", Tag::BoldClose),
    ("<i>", Tag::ItalicOpen),
    ("</i>", Tag::ItalicClose),
    ("<u>", Tag::UnderlineOpen),
    ("</u>", Tag::UnderlineClose),
    ("<s>", Tag::StrikeOpen),
    ("</s>", Tag::StrikeClose),
    ("<sup>", Tag::SuperscriptOpen),
    ("</sup>", Tag::SuperscriptClose),
    ("<sub>", Tag::SubscriptOpen),
    ("</sub>", Tag::SubscriptClose),
    ("<quote>", Tag::QuoteOpen),
    ("</quote>", Tag::QuoteClose),
    ("<br>", Tag::LineBreak),
    ("<hr>", Tag::HorizontalRule),
    ("<ol>", Tag::OrderedListOpen),
    ("</ol>", Tag::OrderedListClose),
    ("<ul>", Tag::UnorderedListOpen),
    ("</ul>", Tag::UnorderedListClose),
    ("<li>", Tag::ListItemOpen),
    ("</li>", Tag::ListItemClose),
    ("<dl>", Tag::DataListOpen),
    ("</dl>", Tag::DataListClose),
    ("<dt>", Tag::DataTopicOpen),
    ("</dt>", Tag::DataTopicClose),
    ("<dd>", Tag::DataDescriptionOpen),
    ("</dd>", Tag::DataDescriptionClose),
    ("<grid>", Tag::GridOpen),
    ("</grid>", Tag::GridClose),
    ("<gr>", Tag::GridRowOpen),
    ("</gr>", Tag::GridRowClose),
    ("<gd>", Tag::GridCellOpen { wide: false }),
    ("<gD>", Tag::GridCellOpen { wide: true }),
    ("</gd>", Tag::GridCellClose),
    ("</gD>", Tag::GridCellClose),
    ("<table>", Tag::TableOpen),
    ("</table>", Tag::TableClose),
    ("<tr>", Tag::TableRowOpen),
    ("</tr>", Tag::TableRowClose),
    ("<th>", Tag::TableHeaderOpen { wide: false }),
    ("<tH>", Tag::TableHeaderOpen { wide: true }),
    ("</th>", Tag::TableHeaderClose),
    ("</tH>", Tag::TableHeaderClose),
    ("<td>", Tag::TableCellOpen { wide: false, numeric: false }),
    ("<tD>", Tag::TableCellOpen { wide: true, numeric: false }),
    ("<tn>", Tag::TableCellOpen { wide: false, numeric: true }),
    ("<tN>", Tag::TableCellOpen { wide: true, numeric: true }),
    ("</td>", Tag::TableCellClose),
    ("</tD>", Tag::TableCellClose),
    ("</tn>", Tag::TableCellClose),
    ("</tN>", Tag::TableCellClose),
    ("<a>", Tag::InternalLink),
    ("<a ", Tag::ExternalLink),
    ("</a>", Tag::LinkClose),
    ("<tt>", Tag::Teletype),
    ("<pre>", Tag::Preformatted),
    ("<code", Tag::SourceCode),
    ("<ui1>", Tag::UserInterfaceOpen(1)),
    ("<ui2>", Tag::UserInterfaceOpen(2)),
    ("<ui3>", Tag::UserInterfaceOpen(3)),
    ("<ui4>", Tag::UserInterfaceOpen(4)),
    ("<ui5>", Tag::UserInterfaceOpen(5)),
    ("<ui6>", Tag::UserInterfaceOpen(6)),
    ("</ui1>", Tag::UserInterfaceClose),
    ("</ui2>", Tag::UserInterfaceClose),
    ("</ui3>", Tag::UserInterfaceClose),
    ("</ui4>", Tag::UserInterfaceClose),
    ("</ui5>", Tag::UserInterfaceClose),
    ("</ui6>", Tag::UserInterfaceClose),
    ("<kbd>", Tag::Keyboard),
    ("<mbl>", Tag::Mouse(MouseButton::Left)),
    ("<mbr>", Tag::Mouse(MouseButton::Right)),
    ("<mbw>", Tag::Mouse(MouseButton::Wheel)),
    ("<imgt", Tag::Image(ImageAlign::Inline)),
    ("<imgl", Tag::Image(ImageAlign::Left)),
    ("<imgr", Tag::Image(ImageAlign::Right)),
    ("<imgc", Tag::Image(ImageAlign::Center)),
    ("<imgw", Tag::Image(ImageAlign::Wide)),
    ("<fig>", Tag::Figure),
    ("<info>", Tag::AlertOpen(AlertKind::Info)),
    ("<hint>", Tag::AlertOpen(AlertKind::Hint)),
    ("<note>", Tag::AlertOpen(AlertKind::Note)),
    ("<also>", Tag::AlertOpen(AlertKind::Also)),
    ("<todo>", Tag::AlertOpen(AlertKind::Todo)),
    ("<warn>", Tag::AlertOpen(AlertKind::Warn)),
    ("</info>", Tag::AlertClose),
    ("</hint>", Tag::AlertClose),
    ("</note>", Tag::AlertClose),
    ("</also>", Tag::AlertClose),
    ("</todo>", Tag::AlertClose),
    ("</warn>", Tag::AlertClose),
    ("<include ", Tag::Include),
    ("<api ", Tag::Api),
];

fn match_tag(rest: &str) -> Option<(&'static str, Tag)> {
    TAGS.iter()
        .find(|(marker, _)| rest.starts_with(marker))
        .copied()
}

/// Body between `start` and the next `close`, plus the cursor after `close`.
fn enclosed<'s>(src: &'s str, start: usize, close: &str) -> Option<(&'s str, usize)> {
    let idx = src.get(start..)?.find(close)?;
    Some((&src[start..start + idx], start + idx + close.len()))
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

impl<W: Writer> Session<W> {
    /// Parses a chunk of markup at the current position. The line counter
    /// is left on the last line of `src`.
    pub fn parse(&mut self, src: &str) {
        let bytes = src.as_bytes();
        let mut pos = 0;
        while pos < src.len() {
            let b = bytes[pos];
            if b != b'<' {
                pos = self.literal(src, pos);
                continue;
            }
            let rest = &src[pos..];
            pos = match match_tag(rest) {
                Some((marker, tag)) => {
                    trace!(?tag, line = self.position.line, "tag");
                    self.dispatch(src, pos, marker, tag)
                }
                None => self.unsupported(src, pos),
            };
        }
    }

    /// Copies literal text starting at `pos` up to the next character that
    /// needs attention and returns the new cursor.
    fn literal(&mut self, src: &str, pos: usize) -> usize {
        let bytes = src.as_bytes();
        match bytes[pos] {
            b' ' | b'\t' => {
                if pos == 0 || !matches!(bytes[pos - 1], b' ' | b'\t' | b'\n') {
                    self.text(" ");
                }
                pos + 1
            }
            b'\r' => pos + 1,
            b'\n' => {
                self.position.line += 1;
                if !self.writer_ends_with_newline() {
                    self.text("\n");
                }
                pos + 1
            }
            _ => {
                let end = src[pos..]
                    .find(['<', ' ', '\t', '\r', '\n'])
                    .map_or(src.len(), |idx| pos + idx);
                self.text(&src[pos..end]);
                end
            }
        }
    }

    /// Copies an unknown tag through unchanged with a warning.
    fn unsupported(&mut self, src: &str, pos: usize) -> usize {
        let bytes = src.as_bytes();
        let mut end = pos + 1;
        while end < src.len() && bytes[end] != b'<' && bytes[end - 1] != b'>' {
            end += 1;
        }
        let line = src[pos..].lines().next().unwrap_or("").trim();
        self.report_warning(
            W_TAG_UNSUPPORTED,
            format!("not gendoc compatible tag '{line}'"),
        );
        let fragment = &src[pos..end];
        self.text(fragment);
        self.position.line += newlines(fragment);
        end
    }

    /// A tag whose closing counterpart never comes. The marker is kept as
    /// literal text and scanning resumes right after it.
    fn unterminated(&mut self, pos: usize, marker: &str) -> usize {
        self.report_error(E_UNTERMINATED, format!("unterminated {} tag", marker.trim()));
        self.text(marker);
        pos + marker.len()
    }

    /// Runs `handle` on the body of a `marker ... close` pair.
    fn with_body(
        &mut self,
        src: &str,
        pos: usize,
        marker: &str,
        close: &str,
        handle: impl FnOnce(&mut Self, &str),
    ) -> usize {
        match enclosed(src, pos + marker.len(), close) {
            Some((body, next)) => {
                handle(self, body);
                self.position.line += newlines(body);
                next
            }
            None => self.unterminated(pos, marker),
        }
    }

    fn dispatch(&mut self, src: &str, pos: usize, marker: &str, tag: Tag) -> usize {
        let after = pos + marker.len();
        match tag {
            Tag::Comment => match enclosed(src, after, "-->") {
                Some((body, next)) => {
                    self.position.line += newlines(body);
                    next
                }
                None => {
                    self.position.line += newlines(&src[after..]);
                    src.len()
                }
            },
            Tag::Doc => self.with_body(src, pos, marker, "</doc>", |s, body| s.doc_block(body)),
            Tag::HelloOpen => {
                self.hello_open();
                after
            }
            Tag::HelloClose => {
                self.hello_close();
                after
            }
            Tag::Heading(level) => self.heading_tag(src, pos, marker, level),
            Tag::Caption => self.with_body(src, pos, marker, "</cap>", |s, body| s.caption(body)),
            Tag::InternalLink => {
                self.with_body(src, pos, marker, "</a>", |s, body| s.internal_link(body, None))
            }
            Tag::ExternalLink => {
                self.with_body(src, pos, marker, ">", |s, url| s.external_link_open(url))
            }
            Tag::Teletype => self.with_body(src, pos, marker, "</tt>", |s, body| s.teletype(body)),
            Tag::Preformatted => {
                self.with_body(src, pos, marker, "</pre>", |s, body| s.preformatted(body))
            }
            Tag::SourceCode => self.code_tag(src, pos, marker),
            Tag::Keyboard => self.with_body(src, pos, marker, "</kbd>", |s, body| s.keyboard(body)),
            Tag::Image(align) => {
                // one more character closes the marker, e.g. the space in `<imgc src>`
                let skip = src[after..].chars().next().map_or(0, char::len_utf8);
                match enclosed(src, after + skip, ">") {
                    Some((body, next)) => {
                        let path = body.trim().lines().next().unwrap_or("");
                        self.image(align, path);
                        self.position.line += newlines(body);
                        next
                    }
                    None => self.unterminated(pos, marker),
                }
            }
            Tag::Figure => self.with_body(src, pos, marker, "</fig>", |s, body| s.figure(body)),
            Tag::Include => {
                self.with_body(src, pos, marker, ">", |s, path| s.include(path.trim()))
            }
            Tag::Api => self.with_body(src, pos, marker, ">", |s, body| {
                match body.trim().split_once(char::is_whitespace) {
                    Some((lang, path)) => s.api(lang, path.trim()),
                    None => s.report_error(E_UNTERMINATED, "malformed <api> directive"),
                }
            }),
            simple => {
                self.simple_tag(simple);
                after
            }
        }
    }

    fn simple_tag(&mut self, tag: Tag) {
        match tag {
            Tag::ParagraphOpen => self.paragraph_open(),
            Tag::ParagraphClose => self.paragraph_close(),
            Tag::BoldOpen => self.bold_open(),
            Tag::BoldClose => self.bold_close(),
            Tag::ItalicOpen => self.italic_open(),
            Tag::ItalicClose => self.italic_close(),
            Tag::UnderlineOpen => self.underline_open(),
            Tag::UnderlineClose => self.underline_close(),
            Tag::StrikeOpen => self.strike_open(),
            Tag::StrikeClose => self.strike_close(),
            Tag::SuperscriptOpen => self.superscript_open(),
            Tag::SuperscriptClose => self.superscript_close(),
            Tag::SubscriptOpen => self.subscript_open(),
            Tag::SubscriptClose => self.subscript_close(),
            Tag::QuoteOpen => self.quote_open(),
            Tag::QuoteClose => self.quote_close(),
            Tag::LineBreak => self.line_break(),
            Tag::HorizontalRule => self.horizontal_rule(),
            Tag::OrderedListOpen => self.ordered_list_open(),
            Tag::OrderedListClose => self.ordered_list_close(),
            Tag::UnorderedListOpen => self.unordered_list_open(),
            Tag::UnorderedListClose => self.unordered_list_close(),
            Tag::ListItemOpen => self.list_item_open(),
            Tag::ListItemClose => self.list_item_close(),
            Tag::DataListOpen => self.data_list_open(),
            Tag::DataListClose => self.data_list_close(),
            Tag::DataTopicOpen => self.data_topic_open(),
            Tag::DataTopicClose => self.data_topic_close(),
            Tag::DataDescriptionOpen => self.data_description_open(),
            Tag::DataDescriptionClose => self.data_description_close(),
            Tag::GridOpen => self.grid_open(),
            Tag::GridClose => self.grid_close(),
            Tag::GridRowOpen => self.grid_row_open(),
            Tag::GridRowClose => self.grid_row_close(),
            Tag::GridCellOpen { wide } => self.grid_cell_open(wide),
            Tag::GridCellClose => self.grid_cell_close(),
            Tag::TableOpen => self.table_open(),
            Tag::TableClose => self.table_close(),
            Tag::TableRowOpen => self.table_row_open(),
            Tag::TableRowClose => self.table_row_close(),
            Tag::TableHeaderOpen { wide } => self.table_header_open(wide),
            Tag::TableHeaderClose => self.table_header_close(),
            Tag::TableCellOpen { wide, numeric } => self.table_cell_open(wide, numeric),
            Tag::TableCellClose => self.table_cell_close(),
            Tag::LinkClose => self.link_close(),
            Tag::UserInterfaceOpen(variant) => self.user_interface_open(variant),
            Tag::UserInterfaceClose => self.user_interface_close(),
            Tag::Mouse(button) => self.mouse_button(button),
            Tag::AlertOpen(kind) => self.alert_box_open(kind),
            Tag::AlertClose => self.alert_box_close(),
            other => trace!(?other, "tag has a body, not dispatched here"),
        }
    }

    /// `<hN>name</hN>`, `<hN id>name</hN>` or `<hN alias id>name</hN>`.
    fn heading_tag(&mut self, src: &str, pos: usize, marker: &str, level: u8) -> usize {
        let after = pos + marker.len();
        let Some((inner, close_at)) = enclosed(src, after, "</h") else {
            return self.unterminated(pos, marker);
        };
        let close_start = close_at - "</h".len();
        let next = src[close_start..]
            .find('>')
            .map_or(src.len(), |idx| close_start + idx + 1);
        let (attrs, name) = inner.split_once('>').unwrap_or((inner, ""));
        let words: Vec<&str> = attrs.split_whitespace().collect();
        let (id, alias) = match words.as_slice() {
            [] => (None, None),
            [id] => (Some(*id), None),
            [alias, id, ..] => (Some(*id), Some(*alias)),
        };
        self.heading(level, name, id, alias);
        self.position.line += newlines(&src[after..next]);
        next
    }

    /// `<code>` or `<code lang>`; leading blank lines are dropped and
    /// trailing whitespace trimmed.
    fn code_tag(&mut self, src: &str, pos: usize, marker: &str) -> usize {
        let after = pos + marker.len();
        let Some((attrs, body_start)) = enclosed(src, after, ">") else {
            return self.unterminated(pos, marker);
        };
        let Some((body, next)) = enclosed(src, body_start, "</code>") else {
            return self.unterminated(pos, marker);
        };
        self.position.line += newlines(attrs);
        let trimmed = body.trim_start_matches(['\r', '\n']);
        self.position.line += newlines(&body[..body.len() - trimmed.len()]);
        let lang = attrs.trim();
        self.source_code(trimmed.trim_end(), (!lang.is_empty()).then_some(lang));
        self.position.line += newlines(trimmed);
        next
    }
}
