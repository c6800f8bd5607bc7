use std::collections::BTreeMap;

use gendoc_core::{Diagnostic, GendocError, HtmlWriter, RuleRegistry, RuleSet, Session, Toc};
use gendoc_renderer::PageTemplate;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions {
    /// Return only the page body instead of the complete document.
    fragment: Option<bool>,
    /// Highlight rule sets by language, in the `hl_<lang>.json` file format.
    rules: Option<BTreeMap<String, String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    toc: Toc,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

#[wasm_bindgen]
pub fn render_html(source: &str) -> Result<JsValue, JsValue> {
    render_html_with_options(source, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_html_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    let result = convert(source, &options).map_err(|err| JsValue::from_str(&err.to_string()))?;
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn convert(source: &str, options: &RenderOptions) -> Result<RenderResult, GendocError> {
    let mut rules = RuleRegistry::new();
    for (lang, text) in options.rules.iter().flatten() {
        rules.insert(lang.as_str(), RuleSet::parse(text)?);
    }
    let mut session = Session::new(HtmlWriter::new()).with_rules(rules);
    session.include_source("input", source);
    let build = session.finish()?;

    let mut diagnostics = build.diagnostics;
    let body = build.writer.finish();
    let html = if options.fragment.unwrap_or(false) {
        body
    } else {
        let template = PageTemplate::load(&build.vars, &mut diagnostics);
        template.render(&body, &build.toc, build.welcome)
    };
    let error_count = gendoc_core::error_count(&diagnostics);
    Ok(RenderResult {
        html,
        toc: build.toc,
        diagnostics,
        error_count,
    })
}
