use gendoc_core::{
    Build, Diagnostic, E_ALREADY_OPEN, E_HEADING_DUP, E_HEADING_EMPTY, E_LINK_UNRESOLVED,
    E_NOT_OPEN, E_OUT_OF_CONTEXT, E_STILL_OPEN, E_UNCLOSED, E_UNTERMINATED, Event, EventWriter,
    GendocError, HtmlWriter, Session, TokenKind, W_RULES_MISSING, W_TAG_UNSUPPORTED, Writer,
};
use pretty_assertions::assert_eq;

fn build(source: &str) -> Build<HtmlWriter> {
    let mut session = Session::new(HtmlWriter::new());
    session.include_source("doc.xml", source);
    match session.finish() {
        Ok(build) => build,
        Err(err) => panic!("build failed: {err}"),
    }
}

fn body(build: &Build<HtmlWriter>) -> &str {
    build.writer.as_str()
}

fn with_code<'a>(build: &'a Build<HtmlWriter>, code: &str) -> Vec<&'a Diagnostic> {
    build
        .diagnostics
        .iter()
        .filter(|diag| diag.code == code)
        .collect()
}

const INTRO_PAGE: &str = "<div class=\"page\" rel=\"intro\"><div><ul class=\"breadcrumbs\"><li><label class=\"home\" for=\"_intro\" title=\"Home\"></label>&nbsp;»</li><li>&nbsp;Intro</li></ul><hr></div>\n<h1 id=\"intro\">Intro<a href=\"#intro\"></a></h1>";

#[test]
fn renders_a_single_page() {
    let build = build("<h1>Intro</h1>\nHello   world\n\n\nBye <b>now</b>\n");
    assert_eq!(
        body(&build),
        format!("{INTRO_PAGE}\nHello world\nBye <b>now</b></div>")
    );
    assert!(build.diagnostics.is_empty());
    assert_eq!(build.toc.len(), 1);
}

#[test]
fn whitespace_runs_collapse_to_one_space() {
    let mut session = Session::new(EventWriter::new());
    session.parse(" \t  a \t b\t\t\tc  ");
    assert_eq!(
        session.writer().events(),
        &[Event::Text {
            text: " a b c ".into()
        }]
    );

    let mut session = Session::new(EventWriter::new());
    session.parse("\t \t");
    assert_eq!(
        session.writer().events(),
        &[Event::Text { text: " ".into() }]
    );
}

#[test]
fn forward_links_resolve_to_the_heading_anchor() {
    let build = build("<h1>Intro</h1>See <a>Setup</a>.\n<h2 install>Setup</h2>");
    let html = body(&build);
    assert!(html.contains("<a href=\"#install\" onclick=\"c('install')\">Setup</a>"));
    assert!(html.contains("<h2 id=\"install\">Setup<a href=\"#install\"></a></h2>"));
    assert!(!html.contains("@GENDOC"));
    assert_eq!(build.error_count(), 0);
}

#[test]
fn backward_links_resolve_immediately() {
    let build = build("<h1>Intro</h1><h2>Héllo, Wörld!</h2><a>Héllo, Wörld!</a>");
    assert!(body(&build).contains("<a href=\"#hello_world\" onclick=\"c('hello_world')\">Héllo, Wörld!</a>"));
}

#[test]
fn unresolved_link_is_reported_once() {
    let build = build("<h1>Intro</h1><a>Missing</a>\n<a>Missing</a>");
    let unresolved = with_code(&build, E_LINK_UNRESOLVED);
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].message, "unresolved link: Missing");
    assert_eq!(unresolved[0].line, 1);
    assert_eq!(build.error_count(), 1);
}

#[test]
fn unclosed_table_is_scoped_to_its_section() {
    let build = build("<h1>A</h1><table>\n<h1>B</h1><table></table>");
    let unclosed = with_code(&build, E_UNCLOSED);
    assert_eq!(unclosed.len(), 1);
    assert_eq!(unclosed[0].message, "unclosed table in section A");
    assert_eq!(build.error_count(), 1);
}

#[test]
fn containers_open_at_the_end_are_reported() {
    let build = build("<h1>A</h1><ul><li>one</ul>\n<p>");
    let messages: Vec<&str> = build.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "list item is still open",
            "unclosed paragraph in section A",
            "unclosed list item in section A",
        ]
    );
    assert_eq!(with_code(&build, E_STILL_OPEN).len(), 1);
}

#[test]
fn unclosed_containers_are_reported_once_per_kind() {
    let build = build("<h1>A</h1><p><p>x\n<h1>B</h1><ol><li>a<ol><li>b");
    let messages: Vec<&str> = with_code(&build, E_UNCLOSED)
        .into_iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "unclosed paragraph in section A",
            "unclosed ordered list in section B",
            "unclosed list item in section B",
        ]
    );
    assert_eq!(build.error_count(), 3);
}

#[test]
fn duplicate_heading_keeps_first_entry() {
    let build = build("<h1>Intro</h1><h2>Intro</h2>");
    let dup = with_code(&build, E_HEADING_DUP);
    assert_eq!(dup.len(), 1);
    assert_eq!(dup[0].message, "id for heading isn't unique (intro)");
    assert_eq!(build.toc.len(), 1);
    assert_eq!(build.toc.get("intro").map(|e| e.level), Some(1));
    assert!(body(&build).ends_with("\n<h2>Intro</h2></div>"));
}

#[test]
fn empty_heading_is_an_error() {
    let build = build("<h1>Intro</h1><h2>  </h2>");
    assert_eq!(with_code(&build, E_HEADING_EMPTY).len(), 1);
}

#[test]
fn exclusive_and_context_errors() {
    let build = build("<h1>A</h1><b><b>x</b></b><li><td>");
    assert_eq!(with_code(&build, E_ALREADY_OPEN).len(), 1);
    assert_eq!(with_code(&build, E_NOT_OPEN).len(), 1);
    assert_eq!(with_code(&build, E_OUT_OF_CONTEXT).len(), 2);
    assert!(body(&build).ends_with("<b>x</b></div>"));
}

#[test]
fn unknown_tags_pass_through_with_a_warning() {
    let build = build("<h1>A</h1><span class=\"x\">y</span> <img src=\"a.png\">");
    assert_eq!(with_code(&build, W_TAG_UNSUPPORTED).len(), 3);
    assert_eq!(build.error_count(), 0);
    assert!(body(&build).contains("<span class=\"x\">y</span> <img src=\"a.png\">"));
    assert_eq!(
        build.diagnostics[0].message,
        "not gendoc compatible tag '<span class=\"x\">y</span> <img src=\"a.png\">'"
    );
}

#[test]
fn comments_are_skipped_but_counted() {
    let build = build("<h1>A</h1><!-- one\ntwo\n-->\n</b>");
    let errors = with_code(&build, E_NOT_OPEN);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 4);
    assert_eq!(errors[0].file, "doc.xml");
    assert!(!body(&build).contains("one"));
}

#[test]
fn code_blocks_fall_back_to_generic_rules() {
    let build = build("<h1>A</h1><code c>\n\n  int x = 1;\n\n</code>");
    let warnings = with_code(&build, W_RULES_MISSING);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "no highlight rules for 'c' using generics");
    assert_eq!(warnings[0].line, 3);
    let html = body(&build);
    assert!(html.contains("<pre class=\"lineno\">1<br></pre><code>  <span class=\"hl_t\">int</span>"));
    assert_eq!(build.error_count(), 0);
}

#[test]
fn code_block_tokens_reach_alternate_writers() {
    let mut session = Session::new(EventWriter::new());
    session.parse("<code>if (x) { return 1; }</code>");
    let Some(Event::SourceCode { lang, tokens, .. }) = session.writer().events().first() else {
        panic!("expected a source code event");
    };
    assert_eq!(lang, &None);
    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn unterminated_heading_is_kept_as_text() {
    let build = build("<h1>A</h1>\n<h2>Broken");
    let errors = with_code(&build, E_UNTERMINATED);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unterminated <h2 tag");
    assert_eq!(errors[0].line, 2);
    assert!(body(&build).ends_with("\n<h2Broken</div>"));
}

#[test]
fn headings_with_alias_and_id() {
    let build = build("<h1>Intro</h1><h3 old_name new-name>Renamed</h3>");
    assert!(body(&build).contains(
        "\n<span id=\"old_name\"></span><h3 id=\"new_name\">Renamed<a href=\"#new_name\"></a></h3>"
    ));
    assert!(build.toc.contains("new_name"));
}

#[test]
fn pages_are_chained_with_prev_and_next() {
    let build = build("<h1>One</h1>a\n<h1>Two</h1>b\n<h1>Three</h1>c");
    let html = body(&build);
    assert!(html.contains("a<br style=\"clear:both;\"><label class=\"btn next\" accesskey=\"n\" for=\"_two\" title=\"Two\">Next</label></div>\n"));
    assert!(html.contains("b<br style=\"clear:both;\"><label class=\"btn prev\" accesskey=\"p\" for=\"_one\" title=\"One\">Previous</label><label class=\"btn next\" accesskey=\"n\" for=\"_three\" title=\"Three\">Next</label></div>\n"));
    assert!(html.ends_with("c<br style=\"clear:both;\"><label class=\"btn prev\" accesskey=\"p\" for=\"_two\" title=\"Two\">Previous</label></div>"));
    assert!(html.contains("<label class=\"home\" for=\"_one\" title=\"Home\">"));
    assert_eq!(build.toc.pages().collect::<Vec<_>>(), ["one", "two", "three"]);
}

#[test]
fn welcome_page_has_no_anchor_and_links_home() {
    let build = build("<hello><h1>Welcome</h1>Hi</hello><h1>Start</h1>Go");
    let html = body(&build);
    assert!(html.starts_with("<div class=\"page\" rel=\"_\">\n<h1>Welcome</h1>Hi<br style=\"clear:both;\"><label class=\"btn next\" accesskey=\"n\" for=\"_start\" title=\"Start\">Next</label></div>\n"));
    assert!(html.contains("<label class=\"home\" for=\"_\" title=\"Home\">"));
    assert!(html.ends_with("Go<br style=\"clear:both;\"><label class=\"btn prev\" accesskey=\"p\" for=\"_\">Previous</label></div>"));
    assert!(build.welcome);
    assert_eq!(build.toc.len(), 1);
}

#[test]
fn captions_go_to_the_toc_only() {
    let build = build("<cap>Guide</cap><h1>Intro</h1>");
    let entries: Vec<(&str, u8)> = build.toc.iter().map(|(id, e)| (id, e.level)).collect();
    assert_eq!(entries, [("!0", 0), ("intro", 1)]);
    assert!(!body(&build).contains("Guide"));
}

#[test]
fn doc_block_sets_labels() {
    let build = build("<doc>\n<title>Manual</title>\n<next>Tovább</next>\n</doc><h1>A</h1><h1>B</h1>\n<warn>careful</warn>");
    assert_eq!(build.vars.get("title"), "Manual");
    let html = body(&build);
    assert!(html.contains(">Tovább</label>"));
    assert!(html.contains("<div class=\"warn\"><p><span>Warning</span></p><p>careful</p></div>"));
}

#[test]
fn inline_markup_renders() {
    let build = build(
        "<h1>A</h1><tt>a<b</tt><kbd>Ctrl</kbd><mbl><ui2>OK</ui2><a #top>up</a><a https://x.org>x</a><fig>Figure 1</fig><pre>p <hl>q</hl></pre>",
    );
    let html = body(&build);
    assert!(html.contains("<samp>a&lt;b</samp><kbd>Ctrl</kbd><span class=\"mouseleft\"></span><span class=\"ui2\">OK</span>"));
    assert!(html.contains("<a href=\"#top\" onclick=\"c('top')\">up</a><a href=\"https://x.org\" target=\"new\">x</a>"));
    assert!(html.contains("<div class=\"fig\">Figure 1</div><div class=\"pre\"><pre>p <span class=\"hl_h\">q</span></pre></div>"));
    assert_eq!(build.error_count(), 0);
}

#[test]
fn tables_and_grids_render() {
    let build = build(
        "<h1>A</h1><table><tr><th>h</th><tH>w</tH></tr><tr><td>1</td><tn>2</tn><tN>3</tN><tD>4</tD></tr></table><grid><gr><gd>a</gd><gD>b</gD></gr></grid>",
    );
    assert!(body(&build).contains("<div class=\"table\"><table><tr><th>h</th><th class=\"wide\">w</th></tr><tr><td>1</td><td class=\"right\">2</td><td class=\"right wide\">3</td><td class=\"wide\">4</td></tr></table></div><table class=\"grid\"><tr><td>a</td><td class=\"wide\">b</td></tr></table>"));
    assert_eq!(build.error_count(), 0);
}

#[test]
fn empty_toc_is_fatal() {
    let mut session = Session::new(HtmlWriter::new());
    session.include_source("doc.xml", "just text <a>Nowhere</a>");
    match session.finish() {
        Err(GendocError::EmptyToc { diagnostics }) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].code, E_LINK_UNRESOLVED);
        }
        other => panic!("expected an empty toc error, got {other:?}"),
    }
}

#[test]
fn alternate_writer_sees_resolved_links() {
    let mut session = Session::new(EventWriter::new());
    session.include_source("doc.xml", "<h1>Intro</h1><a>Setup</a><h2>Setup</h2>");
    let build = session.finish().map_err(|err| err.to_string()).unwrap();
    let links: Vec<&str> = build
        .writer
        .events()
        .iter()
        .filter_map(|event| match event {
            Event::InternalLink { target, .. } => Some(target.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(links, ["setup"]);
    assert!(!build.writer.is_empty());
}
