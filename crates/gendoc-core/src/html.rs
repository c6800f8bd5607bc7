
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::tokenizer::Token;
use crate::writer::{Event, ImageAlign, PageStart, Writer};

/// Builds the HTML body of the document. Heading names, captions, link
/// names and plain text are markup already and are written as is; code,
/// keyboard keys and attribute values are escaped.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, html: &str) {
        self.out.push_str(html);
    }

    fn heading(
        &mut self,
        level: u8,
        id: Option<&str>,
        alias: Option<&str>,
        name: &str,
        page: Option<&PageStart>,
    ) {
        match page {
            Some(PageStart::Welcome) => self.push("<div class=\"page\" rel=\"_\">"),
            Some(PageStart::Chapter { home, home_label }) => {
                self.push("<div class=\"page\"");
                if let Some(id) = id {
                    self.out.push_str(&format!(" rel=\"{}\"", encode_double_quoted_attribute(id)));
                }
                self.out.push_str(&format!(
                    "><div><ul class=\"breadcrumbs\"><li><label class=\"home\" for=\"_{}\" title=\"{}\"></label>&nbsp;»</li><li>&nbsp;{}</li></ul><hr></div>",
                    home,
                    encode_double_quoted_attribute(home_label),
                    name
                ));
            }
            None => {}
        }
        self.push("\n");
        if let Some(alias) = alias {
            self.out.push_str(&format!("<span id=\"{alias}\"></span>"));
        }
        match id {
            Some(id) => {
                self.out.push_str(&format!(
                    "<h{level} id=\"{id}\">{name}<a href=\"#{id}\"></a></h{level}>"
                ));
            }
            None => {
                self.out.push_str(&format!("<h{level}>{name}</h{level}>"));
            }
        }
    }

    fn source_code(&mut self, text: &str, tokens: &[Token]) {
        let lines = text.trim_end().matches('\n').count() + 1;
        self.push("<div class=\"pre\"><pre class=\"lineno\">");
        for line in 1..=lines {
            self.out.push_str(&format!("{line}<br>"));
        }
        self.push("</pre><code>");
        let mut code = String::with_capacity(text.len());
        for token in tokens {
            match token.kind.css_class() {
                Some(class) => {
                    code.push_str(&format!(
                        "<span class=\"hl_{class}\">{}</span>",
                        encode_text(&token.text)
                    ));
                }
                None => code.push_str(&encode_text(&token.text)),
            }
        }
        self.push(&highlight_markers(&code));
        self.push("</code></div>");
    }
}

/// Turns the escaped `<hl>`/`<hm>` markers back into highlight spans.
fn highlight_markers(escaped: &str) -> String {
    escaped
        .replace("&lt;hl&gt;", "<span class=\"hl_h\">")
        .replace("&lt;/hl&gt;", "</span>")
        .replace("&lt;hm&gt;", "<span class=\"hl_h hl_b\">")
        .replace("&lt;/hm&gt;\r\n", "</span>")
        .replace("&lt;/hm&gt;\n", "</span>")
        .replace("&lt;/hm&gt;", "</span>")
}

impl Writer for HtmlWriter {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Heading {
                level,
                id,
                alias,
                name,
                page,
            } => self.heading(level, id.as_deref(), alias.as_deref(), &name, page.as_ref()),
            Event::PrevLink {
                target,
                title,
                label,
            } => {
                self.out.push_str(&format!(
                    "<br style=\"clear:both;\"><label class=\"btn prev\" accesskey=\"p\" for=\"_{target}\""
                ));
                if let Some(title) = title {
                    self.out.push_str(&format!(" title=\"{}\"", encode_double_quoted_attribute(&title)));
                }
                self.out.push_str(&format!(">{label}</label>"));
            }
            Event::NextLink {
                target,
                title,
                label,
                clear,
            } => {
                if let Some(target) = target {
                    if clear {
                        self.push("<br style=\"clear:both;\">");
                    }
                    self.out.push_str(&format!(
                        "<label class=\"btn next\" accesskey=\"n\" for=\"_{target}\" title=\"{}\">{label}</label>",
                        encode_double_quoted_attribute(&title)
                    ));
                }
                self.push("</div>\n");
            }
            Event::PageEnd => self.push("</div>"),
            Event::ParagraphOpen => self.push("<p>"),
            Event::ParagraphClose => self.push("</p>"),
            Event::BoldOpen => self.push("<b>"),
            Event::BoldClose => self.push("</b>"),
            Event::ItalicOpen => self.push("<i>"),
            Event::ItalicClose => self.push("</i>"),
            Event::UnderlineOpen => self.push("<u>"),
            Event::UnderlineClose => self.push("</u>"),
            Event::StrikeOpen => self.push("<s>"),
            Event::StrikeClose => self.push("</s>"),
            Event::SuperscriptOpen => self.push("<sup>"),
            Event::SuperscriptClose => self.push("</sup>"),
            Event::SubscriptOpen => self.push("<sub>"),
            Event::SubscriptClose => self.push("</sub>"),
            Event::QuoteOpen => self.push("<blockquote class=\"pre\"><span></span>"),
            Event::QuoteClose => self.push("</blockquote>"),
            Event::LineBreak => self.push("<br>"),
            Event::HorizontalRule => self.push("<hr>"),
            Event::OrderedListOpen => self.push("<ol>"),
            Event::OrderedListClose => self.push("</ol>"),
            Event::UnorderedListOpen => self.push("<ul>"),
            Event::UnorderedListClose => self.push("</ul>"),
            Event::ListItemOpen => self.push("<li>"),
            Event::ListItemClose => self.push("</li>"),
            Event::DataListOpen => self.push("<dl>"),
            Event::DataListClose => self.push("</dl>"),
            Event::DataTopicOpen => self.push("<dt>"),
            Event::DataTopicClose => self.push("</dt>"),
            Event::DataDescriptionOpen => self.push("<dd>"),
            Event::DataDescriptionClose => self.push("</dd>"),
            Event::GridOpen => self.push("<table class=\"grid\">"),
            Event::GridClose => self.push("</table>"),
            Event::GridRowOpen | Event::TableRowOpen => self.push("<tr>"),
            Event::GridRowClose | Event::TableRowClose => self.push("</tr>"),
            Event::GridCellOpen { wide } => {
                self.push(if wide { "<td class=\"wide\">" } else { "<td>" })
            }
            Event::GridCellClose | Event::TableCellClose => self.push("</td>"),
            Event::TableOpen => self.push("<div class=\"table\"><table>"),
            Event::TableClose => self.push("</table></div>"),
            Event::TableHeaderOpen { wide } => {
                self.push(if wide { "<th class=\"wide\">" } else { "<th>" })
            }
            Event::TableHeaderClose => self.push("</th>"),
            Event::TableCellOpen { wide, numeric } => self.push(match (numeric, wide) {
                (false, false) => "<td>",
                (false, true) => "<td class=\"wide\">",
                (true, false) => "<td class=\"right\">",
                (true, true) => "<td class=\"right wide\">",
            }),
            Event::Teletype { text } => {
                self.out.push_str(&format!("<samp>{}</samp>", encode_text(&text)));
            }
            Event::Preformatted { text } => {
                self.out.push_str(&format!(
                    "<div class=\"pre\"><pre>{}</pre></div>",
                    highlight_markers(&encode_text(&text))
                ));
            }
            Event::SourceCode { text, tokens, .. } => self.source_code(&text, &tokens),
            Event::InternalLink { name, target } => {
                self.out.push_str(&format!(
                    "<a href=\"#{target}\" onclick=\"c('{target}')\">{name}</a>"
                ));
            }
            Event::ExternalLinkOpen { url } => {
                let href = encode_double_quoted_attribute(&url);
                match url.strip_prefix('#') {
                    Some(anchor) => {
                        let anchor = encode_double_quoted_attribute(anchor);
                        self.out.push_str(&format!("<a href=\"{href}\" onclick=\"c('{anchor}')\">"));
                    }
                    None => {
                        self.out.push_str(&format!("<a href=\"{href}\" target=\"new\">"));
                    }
                }
            }
            Event::ExternalLinkClose => self.push("</a>"),
            Event::UserInterfaceOpen { variant } => {
                self.out.push_str(&format!("<span class=\"ui{variant}\">"));
            }
            Event::UserInterfaceClose => self.push("</span>"),
            Event::Keyboard { key } => {
                self.out.push_str(&format!("<kbd>{}</kbd>", encode_text(&key)));
            }
            Event::MouseButton { button } => {
                self.out.push_str(&format!("<span class=\"{}\"></span>", button.css_class()));
            }
            Event::Image { align, name, image } => {
                if align == ImageAlign::Center {
                    self.push("<div class=\"imgc\">");
                }
                self.out.push_str(&format!("<img class=\"img{}\"", align.as_char()));
                if align != ImageAlign::Wide {
                    self.out.push_str(&format!(
                        " width=\"{}\" height=\"{}\"",
                        image.width, image.height
                    ));
                }
                self.out.push_str(&format!(
                    " alt=\"{}\" src=\"{}\">",
                    encode_double_quoted_attribute(&name),
                    image.data_uri()
                ));
                if align == ImageAlign::Center {
                    self.push("</div>");
                }
            }
            Event::Figure { caption } => {
                self.out.push_str(&format!("<div class=\"fig\">{caption}</div>"));
            }
            Event::AlertBoxOpen { kind, label } => {
                self.out.push_str(&format!(
                    "<div class=\"{}\"><p><span>{label}</span></p><p>",
                    kind.css_class()
                ));
            }
            Event::AlertBoxClose => self.push("</p></div>"),
            Event::Text { text } => self.push(&text),
        }
    }

    fn resolve_link(&mut self, placeholder: &str, id: &str) {
        if self.out.contains(placeholder) {
            self.out = self.out.replace(placeholder, id);
        }
    }

    fn trim(&mut self) {
        let end = self.out.trim_end().len();
        self.out.truncate(end);
        let start = self.out.len() - self.out.trim_start().len();
        self.out.replace_range(..start, "");
    }

    fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    fn ends_with_newline(&self) -> bool {
        self.out.ends_with('\n')
    }
}
