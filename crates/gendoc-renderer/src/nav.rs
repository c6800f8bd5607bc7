//! Navigation built from the table of contents. Pages are switched with
//! hidden radio buttons, one per level 1 entry, and CSS sibling selectors.


use gendoc_core::Toc;

/// Selectors showing the checked page and its part of the side menu.
pub(crate) fn page_selectors(toc: &Toc) -> String {
    let mut out = String::new();
    for id in toc.pages() {
        out.push_str(&format!("#_{id}:checked ~ nav div ul li[rel={id}]>.toc,"));
    }
    out.push_str("div.page{display:none;}");
    for id in toc.pages() {
        out.push_str(&format!(
            "#_{id}:checked ~ nav div ul li[rel={id}]>ul,#_{id}:checked ~ nav div ul li[rel={id}]>.current,#_{id}:checked ~ div div[rel={id}],"
        ));
    }
    out.push_str("#_:checked ~ div div[rel=_]{display:block;}");
    out
}

/// One radio button per page. The welcome page, or else the first page,
/// starts out checked.
pub(crate) fn radio_inputs(toc: &Toc, welcome: bool) -> String {
    let mut out = String::new();
    if welcome {
        out.push_str("<input type=\"radio\" name=\"page\" id=\"_\" checked>");
    }
    for id in toc.pages() {
        let checked = if out.is_empty() { " checked" } else { "" };
        out.push_str(&format!("<input type=\"radio\" name=\"page\" id=\"_{id}\"{checked}>"));
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Open {
    Nothing,
    List,
    Page,
}

fn close(out: &mut String, open: Open) {
    if open == Open::Page {
        out.push_str("        </ul></li>\n");
    }
    if open != Open::Nothing {
        out.push_str("        </ul>\n");
    }
}

/// The side menu: captions as titles, pages as collapsible groups and
/// deeper headings as anchors inside them.
pub(crate) fn tree(toc: &Toc) -> String {
    let mut out = String::new();
    let mut open = Open::Nothing;
    for (id, entry) in toc.iter() {
        match entry.level {
            0 => {
                close(&mut out, open);
                open = Open::Nothing;
                out.push_str(&format!("        <p>{}</p>\n", entry.name));
            }
            1 => {
                match open {
                    Open::Nothing => out.push_str("        <ul>\n"),
                    Open::List => {}
                    Open::Page => out.push_str("        </ul></li>\n"),
                }
                open = Open::Page;
                out.push_str(&format!(
                    "        <li rel=\"{id}\"><label class=\"toc\" for=\"_{id}\">{name}</label><div class=\"current\">{name}</div><ul>\n",
                    name = entry.name
                ));
            }
            level => {
                if open == Open::Nothing {
                    out.push_str("        <ul>\n");
                    open = Open::List;
                }
                out.push_str(&format!(
                    "          <li class=\"h{level}\"><a href=\"#{id}\" onclick=\"m()\">{}</a></li>\n",
                    entry.name
                ));
            }
        }
    }
    close(&mut out, open);
    out
}
