//! Wraps a rendered body into the final single-file HTML document with the
//! embedded stylesheet, theme, side navigation and script.

mod nav;

use std::fs;
use std::path::Path;

use gendoc_core::{Diagnostic, E_IMAGE, E_IO, EmbeddedImage, Position, Toc, Vars};
use html_escape::encode_double_quoted_attribute;
use tracing::debug;

const BASE_CSS: &str = include_str!("../assets/gendoc.css");
const BASE_JS: &str = include_str!("../assets/gendoc.js");
const DEFAULT_THEME: &str = include_str!("../assets/theme.css");
const HOMEPAGE: &str = "https://gitlab.com/bztsrc/gendoc";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the page skeleton needs besides the body and the TOC.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    lang: String,
    /// Plain title for `<title>` and the mobile bar.
    title: String,
    /// Title link content in the side menu, with the title image if any.
    brand: String,
    url: String,
    version: String,
    copyright: String,
    permalink: String,
    search_label: String,
    theme: String,
}

impl PageTemplate {
    /// Reads the theme stylesheet and title image named in `vars`. Problems
    /// are added to `diagnostics` and the built-in defaults are used.
    pub fn load(vars: &Vars, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let theme = match vars.get("theme") {
            "" => DEFAULT_THEME.to_string(),
            path => match fs::read_to_string(path) {
                Ok(css) if !css.trim().is_empty() => {
                    debug!(%path, "theme loaded");
                    css
                }
                _ => {
                    diagnostics.push(Diagnostic::error(
                        &Position::new(path, 0),
                        E_IO,
                        "unable to read theme css",
                    ));
                    DEFAULT_THEME.to_string()
                }
            },
        };

        let mut title = vars.get("title").to_string();
        let mut brand = title.clone();
        let titleimg = vars.get("titleimg");
        if !titleimg.is_empty() {
            let (path, alt) = titleimg.split_once(' ').unwrap_or((titleimg, ""));
            title = format!("{} {}", alt, vars.get("title")).trim().to_string();
            brand = title.clone();
            match EmbeddedImage::load(Path::new(path)) {
                Ok(image) => {
                    brand = format!(
                        "<img alt=\"{}\" src=\"{}\">{}",
                        encode_double_quoted_attribute(alt),
                        image.data_uri(),
                        vars.get("title")
                    );
                }
                Err(err) => {
                    debug!(%err, "title image");
                    diagnostics.push(Diagnostic::error(
                        &Position::new(path, 0),
                        E_IMAGE,
                        format!("unable to read image '{path}'"),
                    ));
                }
            }
        }
        if title.is_empty() {
            title = "No Name".to_string();
        }
        if brand.is_empty() {
            brand = title.clone();
        }

        Self {
            lang: vars.get("lang").to_string(),
            title,
            brand,
            url: vars.get("url").to_string(),
            version: vars.get("version").to_string(),
            copyright: vars.get("copy").to_string(),
            permalink: vars.get("link").to_string(),
            search_label: vars.get("rslt").to_string(),
            theme,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The layout stylesheet followed by the page switching rules for `toc`.
    pub fn stylesheet(&self, toc: &Toc) -> String {
        let mut out: String = BASE_CSS.lines().map(str::trim).collect();
        out.push_str(&format!(
            "h1>a:hover::after,h2>a:hover::after,h3>a:hover::after,h4>a:hover::after,h5>a:hover::after,h6>a:hover::after{{content:\"{}\";display:block;padding:12px;position:absolute;margin:-8px 8px;font-weight:400;font-size:14px;background:rgba(0,0,0,.8);color:#fff;border-radius:4px;}}",
            css_string(&self.permalink)
        ));
        out.push_str(&nav::page_selectors(toc));
        out
    }

    /// The theme stylesheet on a single line.
    pub fn theme(&self) -> String {
        self.theme.trim().replace(['\r', '\n'], "")
    }

    /// Builds the complete document around `body`.
    pub fn render(&self, body: &str, toc: &Toc, welcome: bool) -> String {
        let mut out = String::with_capacity(body.len() + BASE_CSS.len() + BASE_JS.len() + 4096);
        out.push_str(&format!(
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n",
            encode_double_quoted_attribute(&self.lang)
        ));
        out.push_str("  <meta charset=\"utf-8\">\n");
        out.push_str(&format!(
            "  <meta name=\"generator\" content=\"gendoc {VERSION}: {HOMEPAGE}\">\n"
        ));
        out.push_str(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        out.push_str(&format!("  <title>{}</title>\n", self.title));
        out.push_str(&format!("  <style rel=\"logic\">{}</style>\n", self.stylesheet(toc)));
        out.push_str(&format!("  <style rel=\"theme\">{}</style>\n", self.theme()));
        out.push_str("</head>\n<body>\n  <div class=\"frame content\">\n    ");
        out.push_str(&nav::radio_inputs(toc, welcome));
        out.push_str("    <input type=\"checkbox\" id=\"menuchk\" style=\"display:none;\"><nav class=\"side nav\"><div>\n");
        out.push_str(&format!(
            "      <div class=\"title\"><a href=\"{}\">{}</a><div class=\"version\">{}</div>",
            encode_double_quoted_attribute(&self.url),
            self.brand,
            self.version
        ));
        out.push_str("<input id=\"_q\" class=\"search\" type=\"text\" required=\"required\" onkeyup=\"s(this.value);\"></div>");
        out.push_str(&format!(
            "      <div id=\"_s\" class=\"nav\" data-label=\"{}\"></div>\n",
            encode_double_quoted_attribute(&self.search_label)
        ));
        out.push_str("      <div id=\"_t\" class=\"nav\">\n");
        out.push_str(&nav::tree(toc));
        out.push_str("      </div>\n    </div></nav>\n    <div id=\"_m\">\n");
        out.push_str(&format!(
            "      <nav class=\"mobile title\">{}<label for=\"menuchk\" class=\"menu\"></label></nav>\n",
            self.title
        ));
        out.push_str(body);
        out.push_str(&format!(
            "\n      <footer><hr><p>© Copyright {}<br><small>Generated by <a href=\"{HOMEPAGE}\">gendoc</a> v{VERSION}</small></p></footer>\n",
            self.copyright
        ));
        out.push_str("    </div>\n  </div>\n<script>");
        out.push_str(BASE_JS.trim_end());
        out.push_str("</script>\n</body>\n</html>\n");
        out
    }
}

/// Escapes text for a double quoted CSS string.
fn css_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toc() -> Toc {
        let mut toc = Toc::new();
        toc.insert("intro", 1, "Intro");
        toc
    }

    #[test]
    fn defaults_without_settings() {
        let mut diagnostics = Vec::new();
        let template = PageTemplate::load(&Vars::new(), &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(template.title(), "No Name");
        assert!(template.theme().starts_with("hr,table,th,td{border-color:#e1e4e5;}th{"));
    }

    #[test]
    fn render_wraps_body() {
        let mut vars = Vars::new();
        vars.set("title", "Manual");
        vars.set("copy", "ACME");
        let template = PageTemplate::load(&vars, &mut Vec::new());
        let html = template.render("<div class=\"page\" rel=\"intro\">x</div>", &toc(), false);
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n"));
        assert!(html.contains("  <title>Manual</title>\n"));
        assert!(html.contains("<input type=\"radio\" name=\"page\" id=\"_intro\" checked>\n"));
        assert!(html.contains("<div class=\"title\"><a href=\"#\">Manual</a><div class=\"version\">stable</div>"));
        assert!(html.contains("data-label=\"Search Results\""));
        assert!(html.contains("</nav>\n<div class=\"page\" rel=\"intro\">x</div>\n      <footer><hr><p>© Copyright ACME<br>"));
        assert!(html.contains("<script>function m(){"));
        assert!(html.ends_with("</script>\n</body>\n</html>\n"));
    }

    #[test]
    fn permalink_label_is_css_escaped() {
        let mut vars = Vars::new();
        vars.set("link", "say \"hi\"");
        let template = PageTemplate::load(&vars, &mut Vec::new());
        assert!(template.stylesheet(&toc()).contains("content:\"say \\\"hi\\\"\";"));
        assert!(!template.stylesheet(&toc()).contains('\n'));
    }

    #[test]
    fn missing_theme_falls_back_with_error() {
        let mut vars = Vars::new();
        vars.set("theme", "/nonexistent/theme.css");
        let mut diagnostics = Vec::new();
        let template = PageTemplate::load(&vars, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, E_IO);
        assert_eq!(
            diagnostics[0].to_string(),
            "gendoc error: /nonexistent/theme.css:0: unable to read theme css"
        );
        assert!(template.theme().contains(".hl_k{"));
    }
}
