use std::fs;

use gendoc_core::{E_IMAGE, HtmlWriter, Session};
use gendoc_renderer::PageTemplate;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const GIF: &[u8] = b"GIF89a\x10\x00\x08\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

#[test]
fn full_document_from_markup() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("dark.css"), "body{background:#000;}\r\n.nav{color:#fff;}\n")?;
    fs::write(dir.path().join("logo.gif"), GIF)?;
    fs::write(
        dir.path().join("manual.xml"),
        "<doc>\n<title>Manual</title>\n<theme>dark.css</theme>\n<titleimg>logo.gif Acme</titleimg>\n<copy>Acme Inc.</copy>\n</doc>\n\
         <hello><h1>Welcome</h1>Hi</hello>\n<cap>Guide</cap>\n<h1>Intro</h1>\n<h2>Setup</h2>\n",
    )?;

    let mut session = Session::new(HtmlWriter::new());
    session.include(dir.path().join("manual.xml"));
    let mut build = session.finish()?;
    let template = PageTemplate::load(&build.vars, &mut build.diagnostics);
    assert!(build.diagnostics.is_empty(), "{:?}", build.diagnostics);

    let html = template.render(build.writer.as_str(), &build.toc, build.welcome);
    assert!(html.contains("  <title>Acme Manual</title>\n"));
    assert!(html.contains("<style rel=\"theme\">body{background:#000;}.nav{color:#fff;}</style>"));
    assert!(html.contains("<a href=\"#\"><img alt=\"Acme\" src=\"data:image/gif;base64,R0lGODlh"));
    assert!(html.contains("\">Manual</a>"));
    assert!(html.contains("<input type=\"radio\" name=\"page\" id=\"_\" checked><input type=\"radio\" name=\"page\" id=\"_intro\">\n"));
    assert!(html.contains("        <p>Guide</p>\n        <ul>\n        <li rel=\"intro\">"));
    assert!(html.contains("<li class=\"h2\"><a href=\"#setup\" onclick=\"m()\">Setup</a></li>"));
    assert!(html.contains("<div class=\"page\" rel=\"_\">\n<h1>Welcome</h1>Hi"));
    assert!(html.contains("© Copyright Acme Inc.<br>"));
    Ok(())
}

#[test]
fn unreadable_title_image_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("manual.xml"),
        "<doc><titleimg>missing.png Logo</titleimg></doc><h1>Intro</h1>",
    )?;
    let mut session = Session::new(HtmlWriter::new());
    session.include(dir.path().join("manual.xml"));
    let mut build = session.finish()?;
    let template = PageTemplate::load(&build.vars, &mut build.diagnostics);

    assert_eq!(build.diagnostics.len(), 1);
    assert_eq!(build.diagnostics[0].code, E_IMAGE);
    assert!(build.diagnostics[0].message.ends_with("missing.png'"));
    assert_eq!(template.title(), "Logo");
    let html = template.render(build.writer.as_str(), &build.toc, build.welcome);
    assert!(html.contains("<div class=\"title\"><a href=\"#\">Logo</a>"));
    Ok(())
}
